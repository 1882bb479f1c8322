//! Resolution result types.

use serde::{Deserialize, Serialize};

use crate::report::ErrorReport;

/// Which tier of the fallback chain produced a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Inexpensive inference backend.
    Cheap,
    /// Expensive inference backend.
    Smart,
    /// Learned-fix memory, free to serve.
    Memory,
}

impl ModelTier {
    /// Convert to the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cheap => "cheap",
            Self::Smart => "smart",
            Self::Memory => "memory",
        }
    }

    /// Parse from the wire string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cheap" => Some(Self::Cheap),
            "smart" => Some(Self::Smart),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one resolution attempt.
///
/// Created once per attempt and not mutated afterward. Failed results carry
/// `model_used` of the last tier consulted (always [`ModelTier::Memory`],
/// since the memory fallback is the final tier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResult {
    /// Whether a fix was produced.
    pub success: bool,
    /// The error this attempt resolved.
    pub error_report: ErrorReport,
    /// Reusable fixed source, when one is available.
    pub fixed_code: Option<String>,
    /// Line-by-line description of changes; empty when no code was produced.
    pub diff: String,
    /// Human-readable description of the fix.
    pub fix_strategy: String,
    /// Estimated cost in dollars; 0.0 when served from memory.
    pub cost: f64,
    /// Which tier answered.
    pub model_used: ModelTier,
    /// Failure explanation, present only when `success` is false.
    pub message: Option<String>,
}

impl FixResult {
    /// A successful result served from memory at zero cost.
    pub fn from_memory(
        error_report: ErrorReport,
        fix_strategy: impl Into<String>,
        fixed_code: Option<String>,
        diff: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            error_report,
            fixed_code,
            diff: diff.into(),
            fix_strategy: fix_strategy.into(),
            cost: 0.0,
            model_used: ModelTier::Memory,
            message: None,
        }
    }

    /// A successful result produced by a model tier.
    pub fn from_model(
        error_report: ErrorReport,
        tier: ModelTier,
        cost: f64,
        fix_strategy: impl Into<String>,
        fixed_code: Option<String>,
        diff: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            error_report,
            fixed_code,
            diff: diff.into(),
            fix_strategy: fix_strategy.into(),
            cost,
            model_used: tier,
            message: None,
        }
    }

    /// A failed result: every tier exhausted.
    pub fn failure(error_report: ErrorReport, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_report,
            fixed_code: None,
            diff: String::new(),
            fix_strategy: String::new(),
            cost: 0.0,
            model_used: ModelTier::Memory,
            message: Some(message.into()),
        }
    }
}
