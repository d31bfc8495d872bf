//! Data quality audit.
//!
//! Duplicate rows, per-column missing values and the column info table.

mod auditor;

pub use auditor::QualityAuditor;
