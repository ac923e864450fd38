//! Persisted sessions (`email,token[,proxy]`).
//!
//! The whole file is rewritten on every save; last writer wins. Saves only
//! happen during enrollment, never while nodes are running.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Bearer token for one account, plus the proxy it was obtained through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSession {
    pub email: String,
    pub token: String,
    pub proxy: Option<String>,
}

impl AccountSession {
    /// Serialize as a store line. The proxy field is omitted when absent.
    pub fn to_line(&self) -> String {
        match &self.proxy {
            Some(proxy) => format!("{},{},{}", self.email, self.token, proxy),
            None => format!("{},{}", self.email, self.token),
        }
    }

    /// Parse a store line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let mut fields = line.split(',').map(str::trim);
        let email = fields.next().unwrap_or_default();
        let token = fields.next().unwrap_or_default();
        let proxy = fields.next().filter(|p| !p.is_empty());

        if email.is_empty() || token.is_empty() {
            return Err(Error::validation(line, "missing email or token"));
        }

        Ok(Self {
            email: email.to_string(),
            token: token.to_string(),
            proxy: proxy.map(str::to_string),
        })
    }
}

/// Sessions keyed by email, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMap {
    entries: Vec<AccountSession>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the session for `session.email`.
    ///
    /// A replaced entry keeps its position.
    pub fn upsert(&mut self, session: AccountSession) {
        match self.entries.iter_mut().find(|s| s.email == session.email) {
            Some(existing) => *existing = session,
            None => self.entries.push(session),
        }
    }

    pub fn get(&self, email: &str) -> Option<&AccountSession> {
        self.entries.iter().find(|s| s.email == email)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountSession> {
        self.entries.iter()
    }
}

impl IntoIterator for SessionMap {
    type Item = AccountSession;
    type IntoIter = std::vec::IntoIter<AccountSession>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<AccountSession> for SessionMap {
    fn from_iter<I: IntoIterator<Item = AccountSession>>(iter: I) -> Self {
        let mut map = SessionMap::new();
        for session in iter {
            map.upsert(session);
        }
        map
    }
}

/// File-backed session store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all sessions. A missing file is an empty map.
    pub fn load(&self) -> SessionMap {
        match self.try_load() {
            Ok(sessions) => sessions,
            Err(e) => {
                error!("Failed to read sessions from {:?}: {}", self.path, e);
                SessionMap::new()
            }
        }
    }

    fn try_load(&self) -> Result<SessionMap> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SessionMap::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match AccountSession::parse_line(line) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Skipping session: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Upsert one session and rewrite the file.
    pub fn save_session(&self, email: &str, token: &str, proxy: Option<&str>) -> Result<()> {
        if email.is_empty() || token.is_empty() {
            return Err(Error::validation(
                format!("{},{}", email, token),
                "refusing to save incomplete session",
            ));
        }

        let mut sessions = self.try_load()?;
        sessions.upsert(AccountSession {
            email: email.to_string(),
            token: token.to_string(),
            proxy: proxy.filter(|p| !p.is_empty()).map(str::to_string),
        });

        let content = sessions
            .iter()
            .map(AccountSession::to_line)
            .collect::<Vec<_>>()
            .join("\n");
        std::fs::write(&self.path, content)?;

        debug!("Saved session for {} to {:?}", email, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_store_is_empty() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data.txt"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_is_an_upsert() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data.txt"));

        store.save_session("a@b.com", "tok1", None).unwrap();
        store.save_session("a@b.com", "tok2", Some("socks5://x:1")).unwrap();

        let sessions = store.load();
        assert_eq!(sessions.len(), 1);
        assert_eq!(
            sessions.get("a@b.com"),
            Some(&AccountSession {
                email: "a@b.com".into(),
                token: "tok2".into(),
                proxy: Some("socks5://x:1".into()),
            })
        );
    }

    #[test]
    fn save_keeps_unrelated_entries_in_place() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data.txt"));

        store.save_session("one@x.com", "t1", None).unwrap();
        store.save_session("two@x.com", "t2", Some("http://p:80")).unwrap();
        store.save_session("one@x.com", "t1b", None).unwrap();

        let emails: Vec<_> = store.load().iter().map(|s| s.email.clone()).collect();
        assert_eq!(emails, vec!["one@x.com", "two@x.com"]);
        assert_eq!(store.load().get("one@x.com").unwrap().token, "t1b");
    }

    #[test]
    fn proxy_field_omitted_when_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        let store = SessionStore::new(&path);

        store.save_session("a@b.com", "tok", None).unwrap();
        store.save_session("c@d.com", "tok", Some("http://p:1")).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "a@b.com,tok\nc@d.com,tok,http://p:1");
    }

    #[test]
    fn incomplete_session_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        let store = SessionStore::new(&path);

        assert!(store.save_session("a@b.com", "", None).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn load_skips_lines_without_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "a@b.com,tok\nlonely@x.com\n,tok\nc@d.com,t2,\n").unwrap();

        let sessions = SessionStore::new(&path).load();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions.get("c@d.com").unwrap().proxy, None);
    }
}
