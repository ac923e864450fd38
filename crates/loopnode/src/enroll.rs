//! Registration and login for every stored credential.
//!
//! Each account is tried independently: register, then log in and persist
//! the token. A failure on one account never stops the others. Without an
//! invite code nothing is registered and every account is skipped.

use loopnode_client::{ApiClient, Error as ClientError, HttpTransport};
use loopnode_store::{AccountCredential, SessionStore};
use tracing::{error, info, warn};

/// Counters for one enrollment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrollSummary {
    /// New accounts created
    pub registered: usize,
    /// Registration refused because the account exists
    pub existing: usize,
    /// Logins whose token was saved
    pub logged_in: usize,
    /// Accounts left without a saved session
    pub failed: usize,
}

/// Enroll every credential in order.
pub async fn enroll_all<T: HttpTransport>(
    credentials: &[AccountCredential],
    invite_code: &str,
    api: &ApiClient<T>,
    store: &SessionStore,
) -> EnrollSummary {
    let mut summary = EnrollSummary::default();
    let invite_code = invite_code.trim();

    for credential in credentials {
        let proxy = credential.proxy.as_deref();

        if invite_code.is_empty() {
            warn!("Invite code is empty, skipping {}", credential.email);
            summary.failed += 1;
            continue;
        }

        info!("Registering {}", credential.email);
        match api
            .register(&credential.email, &credential.password, invite_code, proxy)
            .await
        {
            Ok(message) => {
                info!("Registered {}: {}", credential.email, message);
                summary.registered += 1;
            }
            Err(ClientError::AuthConflict) => {
                info!("{} already exists, logging in", credential.email);
                summary.existing += 1;
            }
            Err(e) => warn!("Registration failed for {}: {}; trying login", credential.email, e),
        }

        info!("Logging in {}", credential.email);
        let token = match api.login(&credential.email, &credential.password, proxy).await {
            Ok(token) => token,
            Err(e) => {
                error!("Login failed for {}: {}", credential.email, e);
                summary.failed += 1;
                continue;
            }
        };

        match store.save_session(&credential.email, &token, proxy) {
            Ok(()) => {
                info!("Logged in {}, session saved to {:?}", credential.email, store.path());
                summary.logged_in += 1;
            }
            Err(e) => {
                error!("Failed to save session for {}: {}", credential.email, e);
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use loopnode_client::NetworkError;
    use serde_json::json;
    use tempfile::tempdir;

    fn credential(email: &str, password: &str, proxy: Option<&str>) -> AccountCredential {
        AccountCredential {
            email: email.into(),
            password: password.into(),
            proxy: proxy.map(str::to_string),
        }
    }

    /// "new@" registers, "old@" conflicts, "flaky@" fails registration,
    /// password "wrong" fails login.
    fn service() -> MockTransport {
        MockTransport::new(|req, _| {
            let body = req.body.clone().unwrap_or_default();
            let user = body["username"].as_str().unwrap_or_default().to_string();
            if req.url.ends_with("/users/register") {
                assert_eq!(body["inviteCode"], json!("ol777"));
                if user.starts_with("old@") {
                    return Err(NetworkError::status(401, "exists"));
                }
                if user.starts_with("flaky@") {
                    return Err(NetworkError::status(500, "oops"));
                }
                return Ok(json!({"message": "ok"}));
            }
            if body["password"] == json!("wrong") {
                return Err(NetworkError::status(400, "bad credentials"));
            }
            Ok(json!({"data": {"accessToken": format!("token-{}", user)}}))
        })
    }

    #[tokio::test]
    async fn enrolls_each_account_independently() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data.txt"));
        let api = service().into_api();
        let credentials = vec![
            credential("new@x.com", "pw", None),
            credential("old@x.com", "pw", Some("socks5://p:1")),
            credential("flaky@x.com", "pw", None),
            credential("bad@x.com", "wrong", None),
        ];

        let summary = enroll_all(&credentials, "ol777", &api, &store).await;

        assert_eq!(
            summary,
            EnrollSummary {
                registered: 2,
                existing: 1,
                logged_in: 3,
                failed: 1,
            }
        );

        let sessions = store.load();
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions.get("old@x.com").unwrap().token, "token-old@x.com");
        assert_eq!(sessions.get("old@x.com").unwrap().proxy.as_deref(), Some("socks5://p:1"));
        assert!(sessions.get("bad@x.com").is_none());
    }

    #[tokio::test]
    async fn blank_invite_code_skips_every_account() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data.txt"));
        let api = service().into_api();
        let credentials = vec![
            credential("new@x.com", "pw", None),
            credential("old@x.com", "pw", None),
        ];

        let summary = enroll_all(&credentials, "  ", &api, &store).await;

        assert_eq!(
            summary,
            EnrollSummary {
                failed: 2,
                ..EnrollSummary::default()
            }
        );
        assert!(api.transport().paths().is_empty());
        assert!(store.load().is_empty());
    }

    #[tokio::test]
    async fn relogin_replaces_token() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data.txt"));
        store.save_session("old@x.com", "stale", None).unwrap();
        let api = service().into_api();

        enroll_all(&[credential("old@x.com", "pw", None)], "ol777", &api, &store).await;

        let sessions = store.load();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.get("old@x.com").unwrap().token, "token-old@x.com");
    }
}
