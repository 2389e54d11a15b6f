use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

pub const ENV_ERROR_THRESHOLD: &str = "SHARE_AUDIT_ERROR_THRESHOLD";
pub const ENV_RANKING_LIMIT: &str = "SHARE_AUDIT_RANKING_LIMIT";
pub const ENV_MAX_COMBINATIONS: &str = "SHARE_AUDIT_MAX_COMBINATIONS";
pub const ENV_PARALLEL: &str = "SHARE_AUDIT_PARALLEL";

/// Detection policy and resource limits for an audit run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// A share is flagged only if its error rate (percent) is strictly above this.
    pub error_threshold_percent: f64,
    /// Rows kept in the ranked secret table.
    pub ranking_limit: usize,
    /// Upper bound on C(n,k); `None` disables the check.
    pub max_combinations: Option<u128>,
    pub parallel: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            error_threshold_percent: 50.0,
            ranking_limit: 10,
            max_combinations: Some(50_000_000),
            parallel: true,
        }
    }
}

impl AuditConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: AuditConfig = serde_json::from_str(text)
            .map_err(|e| AuditError::MalformedInput(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AuditError::MalformedInput(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Applies `SHARE_AUDIT_*` environment overrides on top of `self`.
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| env::var(key).ok())
    }

    fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_ERROR_THRESHOLD) {
            self.error_threshold_percent = parse_var(ENV_ERROR_THRESHOLD, &v)?;
        }
        if let Some(v) = lookup(ENV_RANKING_LIMIT) {
            self.ranking_limit = parse_var(ENV_RANKING_LIMIT, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_COMBINATIONS) {
            self.max_combinations = if v.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_var(ENV_MAX_COMBINATIONS, &v)?)
            };
        }
        if let Some(v) = lookup(ENV_PARALLEL) {
            self.parallel = parse_flag(ENV_PARALLEL, &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.error_threshold_percent) {
            return Err(AuditError::MalformedInput(format!(
                "error threshold {} is outside 0..=100",
                self.error_threshold_percent
            )));
        }
        if self.ranking_limit == 0 {
            return Err(AuditError::MalformedInput(
                "ranking limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AuditError::MalformedInput(format!("{key}={value} is not a valid value")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(AuditError::MalformedInput(format!(
            "{key}={value} is not a valid value, expected 1, 0, true or false"
        ))),
    }
}
