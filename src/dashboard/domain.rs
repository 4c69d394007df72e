use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Optional analysis window supplied by the caller of the advanced
/// dashboard. Absent bounds fall back per query family (open window for
/// point aggregates, trailing twelve months for the month trends).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl DashboardFilter {
    pub fn resolve(&self, fallback: DateWindow) -> DateWindow {
        DateWindow {
            from: self.date_from.unwrap_or(fallback.from),
            to: self.date_to.unwrap_or(fallback.to),
        }
    }
}

/// Closed date window handed to the analytics stores; bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub const fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Effectively unbounded window so "no filter" behaves as "all time".
    pub fn open() -> Self {
        Self {
            from: NaiveDate::from_ymd_opt(1900, 1, 1).expect("valid open lower bound"),
            to: NaiveDate::from_ymd_opt(2100, 1, 1).expect("valid open upper bound"),
        }
    }

    /// Window spanning the trailing `months` calendar months ending at
    /// `today`, starting on the first day of the earliest month.
    pub fn trailing_months(months: u32, today: NaiveDate) -> Self {
        let index = today.year() * 12 + today.month() as i32 - 1 - months as i32;
        let from = NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
            .expect("valid month arithmetic");
        Self { from, to: today }
    }

    /// The calendar month `today` falls in.
    pub fn current_month(today: NaiveDate) -> Self {
        let from = today.with_day(1).expect("first of month is valid");
        let next = if today.month() == 12 {
            NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
        }
        .expect("first of next month is valid");
        Self {
            from,
            to: next - Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Risk band a study falls into by its stability factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityBand {
    HighRisk,
    MediumRisk,
    LowRisk,
}

impl StabilityBand {
    pub fn from_factor(factor: f64) -> Self {
        if factor <= 0.33 {
            Self::HighRisk
        } else if factor <= 0.66 {
            Self::MediumRisk
        } else {
            Self::LowRisk
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HighRisk => "high_risk",
            Self::MediumRisk => "medium_risk",
            Self::LowRisk => "low_risk",
        }
    }
}
