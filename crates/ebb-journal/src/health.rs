//! Self-reported journal health.
//!
//! This module provides:
//! - [`HealthSeverity`] — how serious a health finding is
//! - [`HealthRecord`] — one finding from a journal health check

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a health finding, ordered from least to most serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthSeverity {
    /// Something worth watching; the journal is still operating.
    Caution,
    /// The journal is not operating normally.
    Warn,
}

impl HealthSeverity {
    /// Returns the lowercase string form of the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HealthSeverity::Caution => "caution",
            HealthSeverity::Warn => "warn",
        }
    }
}

impl fmt::Display for HealthSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding from a journal health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// How serious the finding is.
    pub severity: HealthSeverity,
    /// Human-readable description of the finding.
    pub message: String,
}

impl HealthRecord {
    /// Creates a health record.
    #[must_use]
    pub fn new(severity: HealthSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}
