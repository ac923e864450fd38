//! Typed calls against the bandwidth-sharing API.

use crate::error::{Error, Result};
use crate::transport::{HttpTransport, JsonRequest};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

/// Production API root.
pub const DEFAULT_API_BASE: &str = "https://api.openloop.so";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    name: &'a str,
    username: &'a str,
    password: &'a str,
    invite_code: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// Client for the remote API over any [`HttpTransport`].
pub struct ApiClient<T> {
    base: String,
    transport: T,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(base: impl Into<String>, transport: T) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Fetch the account's invite link (`data.inviteLink`).
    pub async fn invite_link(&self, token: &str, proxy: Option<&str>) -> Result<String> {
        let request = JsonRequest::get(self.url("/users/invite-code")).bearer(token);
        let value = self.transport.request_json(request, proxy).await?;
        string_field(&value, &["data", "inviteLink"])
    }

    /// Create an account. The display name is the local part of the email.
    ///
    /// The service answers 401 when the account already exists; that maps to
    /// [`Error::AuthConflict`]. Returns the server's message on success.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        invite_code: &str,
        proxy: Option<&str>,
    ) -> Result<String> {
        let name = email.split('@').next().unwrap_or(email);
        let body = RegisterBody {
            name,
            username: email,
            password,
            invite_code,
        };
        let request = JsonRequest::post(self.url("/users/register"), to_value(&body)?);

        match self.transport.request_json(request, proxy).await {
            Ok(value) => Ok(value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("registered")
                .to_string()),
            Err(e) if e.status == Some(401) => Err(Error::AuthConflict),
            Err(e) => Err(e.into()),
        }
    }

    /// Log in and return the bearer token (`data.accessToken`).
    pub async fn login(&self, email: &str, password: &str, proxy: Option<&str>) -> Result<String> {
        let body = LoginBody {
            username: email,
            password,
        };
        let request = JsonRequest::post(self.url("/users/login"), to_value(&body)?);
        let value = self.transport.request_json(request, proxy).await?;
        string_field(&value, &["data", "accessToken"])
    }

    /// Submit one quality report and return the point balance
    /// (`data.balances.POINT`).
    pub async fn share(&self, token: &str, quality: u8, proxy: Option<&str>) -> Result<i64> {
        let body = json!({ "quality": quality });
        let request = JsonRequest::post(self.url("/bandwidth/share"), body).bearer(token);
        let value = self.transport.request_json(request, proxy).await?;

        let points = lookup(&value, &["data", "balances", "POINT"])
            .ok_or_else(|| Error::Decode("missing data.balances.POINT".into()))?;
        let balance = points
            .as_i64()
            .or_else(|| points.as_f64().and_then(truncate_balance))
            .ok_or_else(|| Error::Decode(format!("unusable balance: {}", points)))?;

        debug!("Share accepted: quality {} balance {}", quality, balance);
        Ok(balance)
    }
}

// Fractional balances are truncated; values outside i64 are rejected.
fn truncate_balance(points: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    (points.is_finite() && (-LIMIT..LIMIT).contains(&points)).then(|| points as i64)
}

fn to_value<S: Serialize>(body: &S) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| Error::Decode(e.to_string()))
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

fn string_field(value: &Value, path: &[&str]) -> Result<String> {
    lookup(value, path)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Decode(format!("missing {}", path.join("."))))
}
