use thiserror::Error;

use crate::share::ShareId;

pub type Result<T> = std::result::Result<T, AuditError>;

/// Every way an audit run can fail. All of them abort the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("invalid digit '{digit}' for base {base}")]
    InvalidDigit { digit: char, base: u32 },
    #[error("empty share value")]
    EmptyValue,
    #[error("base {0} is outside the supported range 2..=36")]
    InvalidBase(u32),
    #[error("threshold k={k} is invalid for n={n} shares (need 1 <= k <= n)")]
    InvalidThreshold { n: usize, k: usize },
    #[error("duplicate x coordinate {0} in interpolation points")]
    DuplicateAbscissa(String),
    #[error("missing field `{field}` in {location}")]
    MissingField { field: String, location: String },
    #[error("share id {0} appears more than once")]
    IdCollision(ShareId),
    #[error("invalid share id `{0}` (expected a positive integer)")]
    InvalidShareId(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("C({n},{k}) combinations exceeds the configured limit of {limit}")]
    TooManyCombinations { n: usize, k: usize, limit: u128 },
}

impl AuditError {
    pub(crate) fn missing(field: &str, location: impl Into<String>) -> Self {
        AuditError::MissingField {
            field: field.to_string(),
            location: location.into(),
        }
    }
}
