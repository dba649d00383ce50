//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category derived from the code range
///
/// - 100xxx: General
/// - 101xxx: Auth
/// - 109xxx and anything unknown: System
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Success,
    General,
    Auth,
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u32) -> Self {
        match code {
            200 => Self::Success,
            100_000..101_000 => Self::General,
            101_000..102_000 => Self::Auth,
            _ => Self::System,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::General => "general",
            Self::Auth => "auth",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
