//! Run configuration for bridge-pinger

use crate::error::ConfigError;
use alloy::transports::http::reqwest::Url;
use std::fmt;

/// Environment variable holding the hex-encoded private key
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

/// Environment variable holding the JSON-RPC endpoint
pub const RPC_URL_VAR: &str = "OPT_SEPOLIA_RPC_URL";

/// Signing secret and endpoint for one run.
///
/// Fields are private and there are no setters: a `Config` is validated once
/// in [`Config::new`] and never changes afterwards.
#[derive(Clone)]
pub struct Config {
    secret: String,
    rpc_url: Url,
}

impl Config {
    /// Validate and build a configuration
    ///
    /// Both values must be non-empty and the endpoint must be a valid URL.
    pub fn new(secret: impl Into<String>, rpc_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let secret = secret.into().trim().to_string();
        if secret.is_empty() {
            return Err(ConfigError::Missing(PRIVATE_KEY_VAR));
        }

        let raw_url = rpc_url.as_ref().trim();
        if raw_url.is_empty() {
            return Err(ConfigError::Missing(RPC_URL_VAR));
        }
        let rpc_url = raw_url
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidUrl {
                url: raw_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { secret, rpc_url })
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret = lookup(PRIVATE_KEY_VAR).ok_or(ConfigError::Missing(PRIVATE_KEY_VAR))?;
        let rpc_url = lookup(RPC_URL_VAR).ok_or(ConfigError::Missing(RPC_URL_VAR))?;
        Self::new(secret, rpc_url)
    }

    /// RPC endpoint URL
    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    /// Secret with everything but the first and last four characters hidden
    pub fn masked_secret(&self) -> String {
        let len = self.secret.chars().count();
        if len <= 8 {
            return "*".repeat(len);
        }
        let head: String = self.secret.chars().take(4).collect();
        let tail: String = self.secret.chars().skip(len - 4).collect();
        format!("{}{}{}", head, "*".repeat(len - 8), tail)
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret", &self.masked_secret())
            .field("rpc_url", &self.rpc_url.as_str())
            .finish()
    }
}
