use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use credit_desk::config::AppConfig;
use credit_desk::dashboard::access::{SubscriptionDirectory, SubscriptionTier};
use credit_desk::dashboard::domain::{DateWindow, StabilityBand};
use credit_desk::dashboard::months::month_key;
use credit_desk::dashboard::repository::{
    CreditAggregates, CustomerAnalytics, DebtStructureAverages, FinancialIndicatorAverages,
    ProfileDirectory, RecentStudyRow, RevenueNetIncomeRow, StudyAnalytics, TopCustomerRow,
    TurnoverAverages,
};
use credit_desk::dashboard::{dashboard_router, DashboardFilter, DashboardService};
use credit_desk::domain::{CompanyId, CustomerId, ParameterId, StoreError, StudyId, UserId};
use credit_desk::error::AppError;
use credit_desk::parameters::{ParameterResolver, STATUS_STUDY_COMPLETED};
use credit_desk::studies::domain::{FinancialInputs, ScoreRecord, StudyRecord};
use credit_desk::studies::{study_router, StudyScoringService, StudyStore};
use credit_desk::telemetry;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Credit Desk",
    about = "Run the credit back-office service or an end-to-end demo from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed an in-memory back office, score a study, and print both dashboards
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct DemoArgs {
    /// Anchor date for the dashboards (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let office = Arc::new(MemoryBackOffice::with_reference_parameters());
    let scoring = Arc::new(StudyScoringService::new(office.clone(), office.clone()));
    let dashboards = Arc::new(DashboardService::new(
        office.clone(),
        office.clone(),
        office.clone(),
        office.clone(),
        office,
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(study_router(scoring))
        .merge(dashboard_router(dashboards))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit back-office ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let company = CompanyId("co-demo".to_string());

    let office = Arc::new(MemoryBackOffice::demo_seed(&company, today));
    let scoring = StudyScoringService::new(office.clone(), office.clone());
    let dashboards = DashboardService::new(
        office.clone(),
        office.clone(),
        office.clone(),
        office.clone(),
        office,
    );

    println!("Credit back-office demo (anchored at {today})");
    println!();

    match scoring.perform(&company, &StudyId("study-0001".to_string()), Utc::now()) {
        Ok(scored) => print_json("Scored study study-0001", &scored),
        Err(err) => eprintln!("scoring failed: {err}"),
    }

    match dashboards.basic(&company, today) {
        Ok(dashboard) => print_json("Basic dashboard", &dashboard),
        Err(err) => eprintln!("basic dashboard failed: {err}"),
    }

    match dashboards.advanced(&company, &DashboardFilter::default(), today) {
        Ok(dashboard) => print_json("Advanced dashboard", &dashboard),
        Err(err) => eprintln!("advanced dashboard failed: {err}"),
    }

    Ok(())
}

fn print_json<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(body) => {
            println!("── {label} ──");
            println!("{body}");
            println!();
        }
        Err(err) => eprintln!("failed to render {label}: {err}"),
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

// ── In-memory reference back office ─────────────────────────────────────────
//
// Production deployments put a relational store behind these traits; the
// binary ships an in-memory implementation so the service and the demo run
// self-contained.

struct CustomerRow {
    id: CustomerId,
    company_id: CompanyId,
    business_name: String,
    person_type_id: ParameterId,
    economic_activity_id: Option<ParameterId>,
}

struct StudyRow {
    record: StudyRecord,
    created_at: NaiveDate,
    created_by: UserId,
    score: Option<ScoreRecord>,
    status_id: ParameterId,
}

struct MemberRow {
    company_id: CompanyId,
    user_id: UserId,
    display_name: String,
    active: bool,
}

#[derive(Default)]
struct MemoryBackOffice {
    parameter_labels: BTreeMap<ParameterId, String>,
    parameter_codes: HashMap<String, ParameterId>,
    customers: Vec<CustomerRow>,
    studies: Mutex<Vec<StudyRow>>,
    members: Vec<MemberRow>,
    subscriptions: HashMap<CompanyId, SubscriptionTier>,
}

const STATUS_IN_PROGRESS_ID: ParameterId = ParameterId(10);
const STATUS_COMPLETED_ID: ParameterId = ParameterId(11);

impl MemoryBackOffice {
    /// Empty office carrying the standard parameter rows (periods, study
    /// statuses, person types, economic activities).
    fn with_reference_parameters() -> Self {
        let mut office = Self::default();
        for (id, label) in [
            (1, "Mensual"),
            (2, "Trimestral"),
            (3, "Semestral"),
            (4, "Anual"),
            (10, "En estudio"),
            (11, "Estudio realizado"),
            (20, "Persona Natural"),
            (21, "Persona Jurídica"),
            (30, "Comercio"),
            (31, "Manufactura"),
        ] {
            office.parameter_labels.insert(ParameterId(id), label.to_string());
        }
        office
            .parameter_codes
            .insert(STATUS_STUDY_COMPLETED.to_string(), STATUS_COMPLETED_ID);
        office
    }

    /// Reference data set for the demo command: one tenant on a premium
    /// plan, three customers, and studies spread over recent months.
    fn demo_seed(company: &CompanyId, today: NaiveDate) -> Self {
        let mut office = Self::with_reference_parameters();

        office
            .subscriptions
            .insert(company.clone(), SubscriptionTier::Premium);

        office.members = vec![
            MemberRow {
                company_id: company.clone(),
                user_id: UserId("user-ana".to_string()),
                display_name: "Ana Torres".to_string(),
                active: true,
            },
            MemberRow {
                company_id: company.clone(),
                user_id: UserId("user-luis".to_string()),
                display_name: "Luis Rojas".to_string(),
                active: true,
            },
        ];

        office.customers = vec![
            CustomerRow {
                id: CustomerId("cust-001".to_string()),
                company_id: company.clone(),
                business_name: "Comercial Andina".to_string(),
                person_type_id: ParameterId(21),
                economic_activity_id: Some(ParameterId(30)),
            },
            CustomerRow {
                id: CustomerId("cust-002".to_string()),
                company_id: company.clone(),
                business_name: "Textiles del Sur".to_string(),
                person_type_id: ParameterId(21),
                economic_activity_id: Some(ParameterId(31)),
            },
            CustomerRow {
                id: CustomerId("cust-003".to_string()),
                company_id: company.clone(),
                business_name: "Marta Quintero".to_string(),
                person_type_id: ParameterId(20),
                economic_activity_id: None,
            },
        ];

        let studies = vec![
            demo_study(company, "study-0001", "cust-001", today, 0, "user-ana"),
            demo_study(company, "study-0002", "cust-002", today, 1, "user-ana"),
            demo_study(company, "study-0003", "cust-001", today, 3, "user-luis"),
            demo_study(company, "study-0004", "cust-003", today, 5, "user-luis"),
        ];
        *office.studies.lock().expect("study mutex poisoned") = studies;

        office
    }
}

fn demo_study(
    company: &CompanyId,
    id: &str,
    customer: &str,
    today: NaiveDate,
    months_back: u32,
    analyst: &str,
) -> StudyRow {
    let study_date = shift_months_back(today, months_back);
    let scale = 1.0 + months_back as f64 * 0.2;

    StudyRow {
        record: StudyRecord {
            id: StudyId(id.to_string()),
            company_id: company.clone(),
            customer_id: CustomerId(customer.to_string()),
            study_date,
            income_statement_period: Some(ParameterId(4)),
            financials: FinancialInputs {
                total_current_assets: Some(50_000_000.0 * scale),
                total_current_liabilities: Some(25_000_000.0 * scale),
                total_assets: Some(85_000_000.0 * scale),
                retained_earnings: Some(20_000_000.0 * scale),
                gross_profit: Some(30_000_000.0 * scale),
                administrative_expenses: Some(5_000_000.0 * scale),
                selling_expenses: Some(3_000_000.0 * scale),
                equity: Some(40_000_000.0 * scale),
                total_liabilities: Some(45_000_000.0 * scale),
                ordinary_activity_revenue: Some(25_000_000.0 * scale),
                cost_of_sales: Some(12_000_000.0 * scale),
                depreciation_amortization: Some(2_000_000.0 * scale),
                short_term_financial_liabilities: Some(4_000_000.0 * scale),
                financial_expenses: Some(1_000_000.0 * scale),
                suppliers_1: Some(2_000_000.0 * scale),
                suppliers_2: Some(3_000_000.0 * scale),
                inventories_1: Some(1_000_000.0 * scale),
                inventories_2: Some(2_000_000.0 * scale),
                accounts_receivable_1: Some(4_000_000.0 * scale),
                accounts_receivable_2: Some(6_000_000.0 * scale),
                net_income: Some(6_500_000.0 * scale),
                requested_term: Some(12 + months_back),
                requested_monthly_credit_line: Some(10_000_000.0 * scale),
                ..FinancialInputs::default()
            },
        },
        created_at: study_date,
        created_by: UserId(analyst.to_string()),
        score: None,
        status_id: STATUS_IN_PROGRESS_ID,
    }
}

fn shift_months_back(date: NaiveDate, months: u32) -> NaiveDate {
    let index = date.year() * 12 + date.month() as i32 - 1 - months as i32;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 15)
        .expect("valid month arithmetic")
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn study_month(date: NaiveDate) -> String {
    month_key(date.year(), date.month())
}

impl StudyStore for MemoryBackOffice {
    fn fetch(
        &self,
        id: &StudyId,
        company_id: &CompanyId,
    ) -> Result<Option<StudyRecord>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        Ok(guard
            .iter()
            .find(|row| row.record.id == *id && row.record.company_id == *company_id)
            .map(|row| row.record.clone()))
    }

    fn save_score(&self, id: &StudyId, record: &ScoreRecord) -> Result<(), StoreError> {
        let mut guard = self.studies.lock().expect("study mutex poisoned");
        if let Some(row) = guard.iter_mut().find(|row| row.record.id == *id) {
            row.score = Some(record.clone());
            row.status_id = record.status_id;
        }
        Ok(())
    }
}

impl ParameterResolver for MemoryBackOffice {
    fn parameter_label(&self, id: ParameterId) -> Result<Option<String>, StoreError> {
        Ok(self.parameter_labels.get(&id).cloned())
    }

    fn status_id_by_code(&self, code: &str) -> Result<Option<ParameterId>, StoreError> {
        Ok(self.parameter_codes.get(code).copied())
    }

    fn labels_for(&self, ids: &[ParameterId]) -> Result<BTreeMap<ParameterId, String>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.parameter_labels.get(id).map(|label| (*id, label.clone())))
            .collect())
    }
}

impl StudyAnalytics for MemoryBackOffice {
    fn count_studies(&self, company_id: &CompanyId) -> Result<u64, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        Ok(guard
            .iter()
            .filter(|row| row.record.company_id == *company_id)
            .count() as u64)
    }

    fn count_studies_created_in(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<u64, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        Ok(guard
            .iter()
            .filter(|row| row.record.company_id == *company_id && window.contains(row.created_at))
            .count() as u64)
    }

    fn credit_summary(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<CreditAggregates, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut lines = Vec::new();
        let mut terms = Vec::new();
        for row in guard
            .iter()
            .filter(|row| row.record.company_id == *company_id && window.contains(row.created_at))
        {
            if let Some(line) = row.record.financials.requested_monthly_credit_line {
                lines.push(line);
            }
            if let Some(term) = row.record.financials.requested_term {
                terms.push(f64::from(term));
            }
        }
        Ok(CreditAggregates {
            total_requested: if lines.is_empty() {
                None
            } else {
                Some(lines.iter().sum())
            },
            avg_requested: average(&lines),
            avg_term: average(&terms),
        })
    }

    fn studies_by_status(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut counts: BTreeMap<ParameterId, u64> = BTreeMap::new();
        for row in guard.iter().filter(|row| row.record.company_id == *company_id) {
            *counts.entry(row.status_id).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    fn studies_by_month(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(String, u64)>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            *counts.entry(study_month(row.record.study_date)).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    fn recent_studies(
        &self,
        company_id: &CompanyId,
        limit: usize,
    ) -> Result<Vec<RecentStudyRow>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut rows: Vec<&StudyRow> = guard
            .iter()
            .filter(|row| row.record.company_id == *company_id)
            .collect();
        rows.sort_by(|a, b| b.record.study_date.cmp(&a.record.study_date));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| RecentStudyRow {
                id: row.record.id.clone(),
                customer_name: self
                    .customers
                    .iter()
                    .find(|customer| customer.id == row.record.customer_id)
                    .map(|customer| customer.business_name.clone())
                    .unwrap_or_default(),
                study_date: row.record.study_date,
                status_label: self
                    .parameter_labels
                    .get(&row.status_id)
                    .cloned()
                    .unwrap_or_default(),
                requested_monthly_credit_line: row.record.financials.requested_monthly_credit_line,
            })
            .collect())
    }

    fn financial_indicator_averages(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<FinancialIndicatorAverages, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut ebitda = Vec::new();
        let mut capacity = Vec::new();
        let mut stability = Vec::new();
        let mut max_time = Vec::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            if let Some(score) = &row.score {
                ebitda.push(score.result.ebitda);
                capacity.push(score.result.monthly_payment_capacity as f64);
                stability.push(score.result.stability_factor);
                max_time.push(score.result.maximum_payment_time as f64);
            }
        }
        Ok(FinancialIndicatorAverages {
            ebitda: average(&ebitda),
            monthly_payment_capacity: average(&capacity),
            stability_factor: average(&stability),
            maximum_payment_time: average(&max_time),
        })
    }

    fn stability_distribution(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(StabilityBand, u64)>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut counts: BTreeMap<StabilityBand, u64> = BTreeMap::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            if let Some(score) = &row.score {
                let band = StabilityBand::from_factor(score.result.stability_factor);
                *counts.entry(band).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    fn payment_capacity_by_month(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            if let Some(score) = &row.score {
                buckets
                    .entry(study_month(row.record.study_date))
                    .or_default()
                    .push(score.result.monthly_payment_capacity as f64);
            }
        }
        Ok(buckets
            .into_iter()
            .map(|(month, values)| (month, average(&values).unwrap_or(0.0)))
            .collect())
    }

    fn turnover_averages(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<TurnoverAverages, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut receivable = Vec::new();
        let mut inventory = Vec::new();
        let mut suppliers = Vec::new();
        let mut max_time = Vec::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            if let Some(score) = &row.score {
                receivable.push(score.result.accounts_receivable_turnover as f64);
                inventory.push(score.result.inventory_turnover as f64);
                suppliers.push(score.result.suppliers_turnover as f64);
                max_time.push(score.result.maximum_payment_time as f64);
            }
        }
        Ok(TurnoverAverages {
            accounts_receivable_turnover: average(&receivable),
            inventory_turnover: average(&inventory),
            suppliers_turnover: average(&suppliers),
            maximum_payment_time: average(&max_time),
        })
    }

    fn top_customers_by_credit(
        &self,
        company_id: &CompanyId,
        limit: usize,
        window: DateWindow,
    ) -> Result<Vec<TopCustomerRow>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut totals: BTreeMap<CustomerId, (f64, u64)> = BTreeMap::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            let entry = totals.entry(row.record.customer_id.clone()).or_default();
            entry.0 += row
                .record
                .financials
                .requested_monthly_credit_line
                .unwrap_or(0.0);
            entry.1 += 1;
        }
        let mut rows: Vec<TopCustomerRow> = totals
            .into_iter()
            .map(|(customer_id, (total_credit, studies_count))| TopCustomerRow {
                business_name: self
                    .customers
                    .iter()
                    .find(|customer| customer.id == customer_id)
                    .map(|customer| customer.business_name.clone())
                    .unwrap_or_default(),
                customer_id,
                total_credit,
                studies_count,
            })
            .collect();
        rows.sort_by(|a, b| b.total_credit.total_cmp(&a.total_credit));
        rows.truncate(limit);
        Ok(rows)
    }

    fn revenue_net_income_by_month(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<RevenueNetIncomeRow>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut buckets: BTreeMap<String, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            let entry = buckets
                .entry(study_month(row.record.study_date))
                .or_default();
            if let Some(revenue) = row.record.financials.ordinary_activity_revenue {
                entry.0.push(revenue);
            }
            if let Some(net_income) = row.record.financials.net_income {
                entry.1.push(net_income);
            }
        }
        Ok(buckets
            .into_iter()
            .map(|(month, (revenue, net_income))| RevenueNetIncomeRow {
                month,
                avg_revenue: average(&revenue).unwrap_or(0.0),
                avg_net_income: average(&net_income).unwrap_or(0.0),
            })
            .collect())
    }

    fn debt_structure_averages(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<DebtStructureAverages, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut current = Vec::new();
        let mut non_current = Vec::new();
        let mut equity = Vec::new();
        let mut total = Vec::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            let financials = &row.record.financials;
            if let Some(value) = financials.total_current_liabilities {
                current.push(value);
            }
            if let Some(value) = financials.total_non_current_liabilities {
                non_current.push(value);
            }
            if let Some(value) = financials.equity {
                equity.push(value);
            }
            if let Some(value) = financials.total_liabilities {
                total.push(value);
            }
        }
        Ok(DebtStructureAverages {
            total_current_liabilities: average(&current),
            total_non_current_liabilities: average(&non_current),
            equity: average(&equity),
            total_liabilities: average(&total),
        })
    }

    fn studies_by_analyst(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(UserId, u64)>, StoreError> {
        let guard = self.studies.lock().expect("study mutex poisoned");
        let mut counts: BTreeMap<UserId, u64> = BTreeMap::new();
        for row in guard.iter().filter(|row| {
            row.record.company_id == *company_id && window.contains(row.record.study_date)
        }) {
            *counts.entry(row.created_by.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

impl CustomerAnalytics for MemoryBackOffice {
    fn count_customers(&self, company_id: &CompanyId) -> Result<u64, StoreError> {
        Ok(self
            .customers
            .iter()
            .filter(|customer| customer.company_id == *company_id)
            .count() as u64)
    }

    fn customers_by_person_type(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError> {
        let mut counts: BTreeMap<ParameterId, u64> = BTreeMap::new();
        for customer in self
            .customers
            .iter()
            .filter(|customer| customer.company_id == *company_id)
        {
            *counts.entry(customer.person_type_id).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    fn customers_by_economic_activity(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError> {
        let mut counts: BTreeMap<ParameterId, u64> = BTreeMap::new();
        for customer in self
            .customers
            .iter()
            .filter(|customer| customer.company_id == *company_id)
        {
            if let Some(activity) = customer.economic_activity_id {
                *counts.entry(activity).or_default() += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }
}

impl ProfileDirectory for MemoryBackOffice {
    fn count_active_members(&self, company_id: &CompanyId) -> Result<u64, StoreError> {
        Ok(self
            .members
            .iter()
            .filter(|member| member.company_id == *company_id && member.active)
            .count() as u64)
    }

    fn display_names_for(
        &self,
        user_ids: &[UserId],
    ) -> Result<BTreeMap<UserId, String>, StoreError> {
        Ok(self
            .members
            .iter()
            .filter(|member| user_ids.contains(&member.user_id))
            .map(|member| (member.user_id.clone(), member.display_name.clone()))
            .collect())
    }
}

impl SubscriptionDirectory for MemoryBackOffice {
    fn current_tier(
        &self,
        company_id: &CompanyId,
    ) -> Result<Option<SubscriptionTier>, StoreError> {
        Ok(self.subscriptions.get(company_id).copied())
    }
}
