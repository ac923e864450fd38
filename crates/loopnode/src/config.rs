//! Runtime configuration.

use crate::error::{Error, Result};
use loopnode_client::DEFAULT_API_BASE;
use std::path::PathBuf;
use std::time::Duration;

/// Seconds between cycles when `LOOPNODE_TICK_SECS` is unset.
pub const DEFAULT_TICK_SECS: u64 = 60;

/// Configuration for a loopnode run.
#[derive(Debug, Clone)]
pub struct Config {
    /// API root, without trailing slash
    pub api_base: String,

    /// `email,password[,proxy]` file
    pub credentials_path: PathBuf,

    /// `email,token[,proxy]` file
    pub sessions_path: PathBuf,

    /// Time between cycle starts
    pub tick_interval: Duration,

    /// Per-request timeout; `None` leaves requests unbounded
    pub http_timeout: Option<Duration>,

    /// Referral code used for registration; prompted for when absent
    pub invite_code: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            credentials_path: PathBuf::from("user.txt"),
            sessions_path: PathBuf::from("data.txt"),
            tick_interval: Duration::from_secs(DEFAULT_TICK_SECS),
            http_timeout: None,
            invite_code: None,
        }
    }
}

impl Config {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tick_secs = match var("LOOPNODE_TICK_SECS") {
            Some(raw) => parse_secs("LOOPNODE_TICK_SECS", &raw)?,
            None => DEFAULT_TICK_SECS,
        };
        if tick_secs == 0 {
            return Err(Error::Config("LOOPNODE_TICK_SECS must be at least 1".into()));
        }

        let http_timeout = var("LOOPNODE_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_secs("LOOPNODE_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            api_base: var("LOOPNODE_API_BASE").unwrap_or(defaults.api_base),
            credentials_path: var("LOOPNODE_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path),
            sessions_path: var("LOOPNODE_SESSIONS")
                .map(PathBuf::from)
                .unwrap_or(defaults.sessions_path),
            tick_interval: Duration::from_secs(tick_secs),
            http_timeout,
            invite_code: var("LOOPNODE_INVITE_CODE"),
        })
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.parse().map_err(|_| {
        Error::Config(format!("{} must be a whole number of seconds, got {:?}", key, raw))
    })
}
