//! Account credentials (`email,password[,proxy]`).

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{error, warn};

/// One account as listed in the credentials file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredential {
    pub email: String,
    pub password: String,
    /// `None` means a direct connection.
    pub proxy: Option<String>,
}

/// Check an address has the `local@domain.tld` shape.
///
/// No whitespace anywhere, exactly one `@`, and a dot inside the domain part
/// with at least one character on each side.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Parse a single credentials line.
pub fn parse_credential_line(line: &str) -> Result<AccountCredential> {
    let mut fields = line.split(',').map(str::trim);
    let email = fields.next().unwrap_or_default();
    let password = fields.next().unwrap_or_default();
    let proxy = fields.next().filter(|p| !p.is_empty());

    if !is_valid_email(email) {
        return Err(Error::validation(line, format!("bad email format: {:?}", email)));
    }
    if password.is_empty() {
        return Err(Error::validation(line, format!("empty password for {}", email)));
    }

    Ok(AccountCredential {
        email: email.to_string(),
        password: password.to_string(),
        proxy: proxy.map(str::to_string),
    })
}

/// Load every valid credential from `path`, in file order.
///
/// Invalid lines are logged and skipped. A missing or unreadable file is
/// logged and yields an empty list.
pub fn load_credentials<P: AsRef<Path>>(path: P) -> Vec<AccountCredential> {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to read credentials from {:?}: {}", path, e);
            return Vec::new();
        }
    };

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_credential_line(line) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!("Skipping credential: {}", e);
                None
            }
        })
        .collect()
}
