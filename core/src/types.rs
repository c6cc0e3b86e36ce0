//! Shared primitive types used across the analytics core.

/// A churn rate or probability expressed in percent, in [0, 100].
pub type Percent = f64;

/// Months of tenure. The source data never carries fractional months.
pub type Months = u32;

/// Currency amount (monthly or lifetime charges).
pub type Charge = f64;
