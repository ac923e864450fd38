//! Loopnode - multi-account bandwidth-sharing runner
//!
//! Logs a list of accounts into the sharing service, then keeps one node per
//! account reporting on a fixed clock.
//!
//! # Architecture
//!
//! - **Enroll**: register/login every credential, persist the bearer tokens
//! - **Node**: per-account unit holding the invite code and last balance
//! - **Registry**: the set of nodes built from persisted sessions
//! - **Scheduler**: ticks every node once per interval, in order, then renders
//! - **Render**: redraws one status block per account
//! - **App**: the interactive menu tying it together
//!
//! # Example
//!
//! ```no_run
//! use loopnode::{App, Config, ConsolePrompt};
//! use loopnode_client::{ApiClient, ReqwestTransport};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let transport = ReqwestTransport::new(config.http_timeout);
//!     let api = Arc::new(ApiClient::new(config.api_base.clone(), transport));
//!     App::new(config, api, ConsolePrompt::spawn()?).run().await;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod enroll;
pub mod error;
pub mod node;
pub mod prompt;
pub mod registry;
pub mod render;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{App, MenuChoice};
pub use config::Config;
pub use enroll::{enroll_all, EnrollSummary};
pub use error::{Error, Result};
pub use node::{Node, TickResult, INVITE_CODE_UNAVAILABLE};
pub use prompt::{ConsolePrompt, Prompt};
pub use registry::NodeRegistry;
pub use render::{ConsoleRenderer, CycleReport, NodeStatus, Renderer};
pub use scheduler::Scheduler;
