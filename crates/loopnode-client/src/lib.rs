//! Loopnode Client - remote API access
//!
//! - **Proxy**: classify a per-account proxy address (direct, SOCKS, HTTP)
//! - **Transport**: one JSON request, optionally tunnelled through a proxy
//! - **API**: the four calls the service exposes (invite link, register,
//!   login, share)
//!
//! The transport is a trait so the runtime can be exercised without a
//! network.

pub mod api;
pub mod error;
pub mod proxy;
pub mod transport;

pub use api::{ApiClient, DEFAULT_API_BASE};
pub use error::{Error, NetworkError, Result};
pub use proxy::ProxyRoute;
pub use transport::{HttpTransport, JsonRequest, ReqwestTransport};
