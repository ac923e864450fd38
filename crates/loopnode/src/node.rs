//! Per-account node.
//!
//! A node is built once per persisted session when run mode starts and is
//! dropped when run mode ends. Each [`Node::tick`] makes exactly one report
//! request; failures stay inside the node and leave its balance untouched.

use loopnode_client::{ApiClient, HttpTransport};
use loopnode_store::AccountSession;
use rand::Rng;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Shown instead of the invite code when it could not be resolved.
pub const INVITE_CODE_UNAVAILABLE: &str = "unavailable";

/// Quality scores reported to the service.
pub const QUALITY_RANGE: RangeInclusive<u8> = 65..=99;

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickResult {
    Shared { quality: u8, earned: i64, balance: i64 },
    Failed { message: String },
}

impl TickResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, TickResult::Shared { .. })
    }
}

/// Runtime state for one account.
#[derive(Debug, Clone)]
pub struct Node {
    email: String,
    token: String,
    proxy: Option<String>,
    invite_code: String,
    last_balance: i64,
}

impl Node {
    /// Build a node with an already known invite code.
    pub fn new(session: AccountSession, invite_code: impl Into<String>) -> Self {
        Self {
            email: session.email,
            token: session.token,
            proxy: session.proxy,
            invite_code: invite_code.into(),
            last_balance: 0,
        }
    }

    /// Build a node, resolving its invite code with one request.
    ///
    /// Resolution failures degrade to [`INVITE_CODE_UNAVAILABLE`].
    pub async fn create<T: HttpTransport>(session: AccountSession, api: &ApiClient<T>) -> Self {
        let invite_code = match api.invite_link(&session.token, session.proxy.as_deref()).await {
            Ok(link) => match invite_code_from_link(&link) {
                Some(code) => code.to_string(),
                None => {
                    warn!("{}: invite link {:?} has no code", session.email, link);
                    INVITE_CODE_UNAVAILABLE.to_string()
                }
            },
            Err(e) => {
                warn!("{}: failed to resolve invite link: {}", session.email, e);
                INVITE_CODE_UNAVAILABLE.to_string()
            }
        };

        Self::new(session, invite_code)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn invite_code(&self) -> &str {
        &self.invite_code
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn last_balance(&self) -> i64 {
        self.last_balance
    }

    /// Submit one quality report.
    ///
    /// On success `earned = balance - last_balance` (negative if the remote
    /// balance went down) and `last_balance` becomes `balance`. A delta that
    /// does not fit in `i64` is a failed tick.
    pub async fn tick<T, R>(&mut self, api: &ApiClient<T>, rng: &mut R) -> TickResult
    where
        T: HttpTransport,
        R: Rng,
    {
        let quality = sample_quality(rng);

        match api.share(&self.token, quality, self.proxy.as_deref()).await {
            Ok(balance) => {
                let Some(earned) = balance.checked_sub(self.last_balance) else {
                    warn!("{}: balance jumped out of range: {}", self.email, balance);
                    return TickResult::Failed {
                        message: format!("balance out of range: {}", balance),
                    };
                };
                self.last_balance = balance;
                debug!("{}: quality {} earned {} balance {}", self.email, quality, earned, balance);
                TickResult::Shared {
                    quality,
                    earned,
                    balance,
                }
            }
            Err(e) => {
                warn!("{}: share failed: {}", self.email, e);
                TickResult::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Uniform sample from [`QUALITY_RANGE`].
pub fn sample_quality<R: Rng>(rng: &mut R) -> u8 {
    rng.gen_range(QUALITY_RANGE)
}

/// The final path segment of an invite link.
pub fn invite_code_from_link(link: &str) -> Option<&str> {
    link.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|code| !code.is_empty() && !code.contains(':'))
}
