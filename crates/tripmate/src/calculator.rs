//! Expense arithmetic behind the `expenses` and `arithmetic` toolkits.

use crate::validation::Amount;

pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

/// Sum of all costs
pub fn calculate_total(costs: &[Amount]) -> f64 {
    costs.iter().map(|c| c.0).sum()
}

/// Spend per day; zero when `days` is not positive
pub fn calculate_daily_budget(total: f64, days: f64) -> f64 {
    if days <= 0.0 {
        0.0
    } else {
        total / days
    }
}
