//! SQL Review Core
//!
//! Stable, versioned domain types shared by the splitter, converter and advisors.
//! Never rename advice codes or rule type strings - they are part of the public API.

pub mod advice;
pub mod rule;
pub mod report;
pub mod config;

pub use advice::{Advice, AdviceCode, AdviceStatus};
pub use rule::{RuleLevel, RuleType, SqlReviewRule};
pub use report::{FileReport, ReportSummary, ReportVersion, ReviewReport};
pub use config::{ConfigError, Dialect, ReviewConfig};
