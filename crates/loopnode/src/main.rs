//! Loopnode binary
//!
//! Interactive runner: enroll the accounts in `user.txt`, then keep every
//! saved session sharing bandwidth until stopped.

use colored::Colorize;
use loopnode::{App, Config, ConsolePrompt};
use loopnode_client::{ApiClient, ReqwestTransport};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the status display.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "loopnode=info,loopnode_store=info,loopnode_client=info".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting loopnode");
    tracing::info!("  API: {}", config.api_base);
    tracing::info!("  Accounts: {:?}", config.credentials_path);
    tracing::info!("  Sessions: {:?}", config.sessions_path);
    tracing::info!("  Interval: {}s", config.tick_interval.as_secs());

    let transport = ReqwestTransport::new(config.http_timeout);
    let api = Arc::new(ApiClient::new(config.api_base.clone(), transport));
    let mut app = App::new(config, api, ConsolePrompt::spawn()?);

    tokio::select! {
        _ = app.run() => {}
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{}", "Interrupted, exiting.".green());
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
