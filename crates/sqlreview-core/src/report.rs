//! Review report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::advice::{Advice, AdviceStatus};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of scripts reviewed
    pub files_reviewed: usize,

    /// Total number of violations (success advice excluded)
    pub total: usize,

    /// Number of blocking advice
    pub errors: usize,

    /// Number of advisory advice
    pub warnings: usize,
}

/// Review result of a single script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Script path as given on the command line
    pub path: String,

    /// SHA-256 of the script contents (hex)
    ///
    /// Lets the pipeline verify that the executed script is the reviewed one.
    pub sha256: String,

    /// Advice in statement order
    pub advices: Vec<Advice>,
}

impl FileReport {
    /// Create a file report, hashing the reviewed contents
    pub fn new(path: impl Into<String>, contents: &str, advices: Vec<Advice>) -> Self {
        Self {
            path: path.into(),
            sha256: hex::encode(Sha256::digest(contents.as_bytes())),
            advices,
        }
    }

    /// Whether any advice blocks execution
    pub fn has_errors(&self) -> bool {
        self.advices.iter().any(Advice::is_blocking)
    }
}

/// Review report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Per-script results
    pub files: Vec<FileReport>,
}

impl ReviewReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            files: Vec::new(),
        }
    }

    /// Create a report from per-script results
    pub fn from_files(files: Vec<FileReport>) -> Self {
        let mut report = Self::new();
        for file in files {
            report.add_file(file);
        }
        report
    }

    /// Add a script result to the report
    pub fn add_file(&mut self, file: FileReport) {
        for advice in &file.advices {
            match advice.status {
                AdviceStatus::Error => self.summary.errors += 1,
                AdviceStatus::Warn => self.summary.warnings += 1,
                AdviceStatus::Success => continue,
            }
            self.summary.total += 1;
        }

        self.summary.files_reviewed += 1;
        self.files.push(file);
    }

    /// Pipeline gate: true when any advice has status Error
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for ReviewReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::AdviceCode;

    #[test]
    fn empty_report() {
        let report = ReviewReport::new();
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert!(!report.has_errors());
    }

    #[test]
    fn report_with_advices() {
        let clean = FileReport::new("a.sql", "SELECT 1 FROM t WHERE id = 1;", vec![Advice::success()]);
        let dirty = FileReport::new(
            "b.sql",
            "DELETE FROM t LIMIT 1;",
            vec![
                Advice::new(AdviceStatus::Error, AdviceCode::DeleteUseLimit, "statement.disallow-limit", "x", 1),
                Advice::new(AdviceStatus::Warn, AdviceCode::StatementNoWhere, "statement.where.require", "y", 1),
            ],
        );

        let report = ReviewReport::from_files(vec![clean, dirty]);
        assert_eq!(report.summary.files_reviewed, 2);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 1);
        assert!(report.has_errors());
        assert!(!report.files[0].has_errors());
        assert!(report.files[1].has_errors());
    }

    #[test]
    fn file_hash_is_stable() {
        let a = FileReport::new("a.sql", "SELECT 1;", vec![]);
        let b = FileReport::new("b.sql", "SELECT 1;", vec![]);
        let c = FileReport::new("c.sql", "SELECT 2;", vec![]);
        assert_eq!(a.sha256, b.sha256);
        assert_ne!(a.sha256, c.sha256);
        assert_eq!(a.sha256.len(), 64);
    }

    #[test]
    fn report_serialization() {
        let report = ReviewReport::new();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"files\""));
    }
}
