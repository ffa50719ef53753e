use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Outcome of a graded attempt. Stored lowercase, exposed uppercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "resultstatus", rename_all = "lowercase")]
pub(crate) enum ResultStatus {
    Passed,
    Failed,
}

impl ResultStatus {
    pub(crate) const PASS_MARK: f64 = 60.0;

    pub(crate) fn from_percentage(percentage: f64) -> Self {
        if percentage >= Self::PASS_MARK {
            Self::Passed
        } else {
            Self::Failed
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
        }
    }
}
