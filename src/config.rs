use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_VERIFICATION_TOLERANCE: f64 = 0.01;

/// Connection settings for the ledger backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Sent as a bearer token when present. Obtaining it is the caller's job.
    pub auth_token: Option<String>,
    pub ledger_path: String,
    pub detail_path: String,
    pub accounts_path: String,
}

impl Default for LedgerClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth_token: None,
            ledger_path: "/controle-efetivo".to_string(),
            detail_path: "/controle-efetivo/detalhes".to_string(),
            accounts_path: "/contas".to_string(),
        }
    }
}

impl LedgerClientConfig {
    /// Defaults overridden by `LEDGER_API_URL`, `LEDGER_API_TOKEN` and
    /// `LEDGER_API_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("LEDGER_API_URL") {
            config.base_url = url;
        }
        if let Ok(token) = env::var("LEDGER_API_TOKEN") {
            config.auth_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Ok(raw) = env::var("LEDGER_API_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                LedgerError::InvalidConfig(format!(
                    "LEDGER_API_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(LedgerError::InvalidConfig(
                "base_url must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(LedgerError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Options for the pure ledger pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Allowed absolute difference when cross-checking server figures.
    pub verification_tolerance: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            verification_tolerance: DEFAULT_VERIFICATION_TOLERANCE,
        }
    }
}
