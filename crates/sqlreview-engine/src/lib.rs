//! SQL review engine
//!
//! This crate implements the advisor rule engine:
//! - The `Advisor` trait and per-rule factories
//! - An immutable registry of built-in rules per dialect
//! - Review orchestration (split, convert, advise)
//! - A regression harness for rule suites

pub mod advisor;
pub mod registry;
pub mod review;
pub mod rules;
pub mod testing;

pub use advisor::{Advisor, AdvisorFactory, AdvisorInput, RuleMeta, StatementContext};
pub use registry::AdvisorRegistry;
pub use review::{ReviewError, SqlReviewer};
