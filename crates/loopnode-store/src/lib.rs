//! Loopnode Store - account files on disk
//!
//! Two plain-text files, one account per line:
//!
//! ```text
//! user.txt   email,password[,proxy]    read-only, edited by hand
//! data.txt   email,token[,proxy]       rewritten on every login
//! ```
//!
//! Bad lines are skipped one at a time with a diagnostic; a missing or
//! unreadable file yields an empty result instead of an error.

pub mod credential;
pub mod error;
pub mod session;

pub use credential::{is_valid_email, load_credentials, parse_credential_line, AccountCredential};
pub use error::{Error, Result};
pub use session::{AccountSession, SessionMap, SessionStore};
