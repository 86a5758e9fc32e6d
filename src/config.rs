//! Environment configuration, read once at startup.

use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// What deleting a transaction record does. Deletes never reverse the
/// balance/possession effect of the record; `Forbid` rejects them instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Remove the record, leaving its ledger effect in place.
    #[default]
    Destructive,
    /// Reject deletion of any committed transaction.
    Forbid,
}

impl DeletePolicy {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "destructive" => Some(Self::Destructive),
            "forbid" => Some(Self::Forbid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    /// Market-data provider credential. Absence is startup-fatal.
    pub polygon_api_key: String,
    pub polygon_base_url: String,
    pub bind_addr: String,
    pub delete_policy: DeletePolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. `from_env` passes `env::var`;
    /// tests pass a map so they never touch process-global state.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let require = |name: &'static str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        let var_or = |name: &str, default: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let delete_policy_tag = var_or("DELETE_POLICY", "destructive");
        let delete_policy = DeletePolicy::from_tag(&delete_policy_tag)
            .ok_or_else(|| ConfigError::InvalidVar("DELETE_POLICY", delete_policy_tag))?;
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            polygon_api_key: require("POLYGON_API_KEY")?,
            polygon_base_url: var_or("POLYGON_BASE_URL", "https://api.polygon.io"),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            delete_policy,
        })
    }
}
