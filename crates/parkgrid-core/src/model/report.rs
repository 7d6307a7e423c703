//! Provider monthly income report.

use serde::{Deserialize, Serialize};

/// One month of completed-booking income.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthIncome {
    /// Month key as provided by the backend (e.g. "2026-07").
    pub month: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total: f64,
}

/// Response of `/reports/provider/monthly`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyIncomeReport {
    #[serde(default)]
    pub months: Vec<MonthIncome>,
    #[serde(default)]
    pub total_income: f64,
}
