//! Domain error types.

use chrono::NaiveDate;

use super::lane::Lane;

/// Top-level error type for hybridtrader.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("invalid bar data at index {index}: {reason}")]
    DataValidation { index: usize, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invariant violated in {lane} lane on {date}: {rule}")]
    InvariantViolation {
        lane: Lane,
        date: NaiveDate,
        rule: String,
    },

    #[error("cannot compute metrics: {reason}")]
    Metrics { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(lane: Lane, date: NaiveDate, rule: impl Into<String>) -> Self {
        TraderError::InvariantViolation {
            lane,
            date,
            rule: rule.into(),
        }
    }
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::DataSource { .. } => 3,
            TraderError::DataValidation { .. } => 5,
            TraderError::InvariantViolation { .. } => 6,
            TraderError::Metrics { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
