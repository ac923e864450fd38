//! Interactive menu.
//!
//! ```text
//! 1. Register and log in all accounts
//! 2. Run bandwidth sharing
//! 3. Exit
//! ```

use crate::config::Config;
use crate::enroll::enroll_all;
use crate::prompt::Prompt;
use crate::registry::NodeRegistry;
use crate::render::{ConsoleRenderer, Renderer};
use crate::scheduler::Scheduler;
use colored::Colorize;
use loopnode_client::{ApiClient, HttpTransport};
use loopnode_store::{load_credentials, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

const BANNER_RULE: &str = "============================================";

type RendererFactory = Box<dyn Fn(Duration) -> Box<dyn Renderer> + Send>;

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Enroll,
    Run,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Enroll),
            "2" => Some(MenuChoice::Run),
            "3" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// The interactive application.
pub struct App<T, P> {
    config: Config,
    api: Arc<ApiClient<T>>,
    prompt: P,
    make_renderer: RendererFactory,
}

impl<T: HttpTransport, P: Prompt> App<T, P> {
    pub fn new(config: Config, api: Arc<ApiClient<T>>, prompt: P) -> Self {
        Self {
            config,
            api,
            prompt,
            make_renderer: Box::new(|interval| {
                Box::new(ConsoleRenderer::stdout(interval)) as Box<dyn Renderer>
            }),
        }
    }

    /// Draw run-mode cycles somewhere other than the terminal.
    pub fn with_renderer<F>(mut self, make_renderer: F) -> Self
    where
        F: Fn(Duration) -> Box<dyn Renderer> + Send + 'static,
    {
        self.make_renderer = Box::new(make_renderer);
        self
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Show the menu until the operator exits or input closes.
    pub async fn run(&mut self) {
        let invite_code = self.invite_code().await;

        loop {
            println!();
            println!("{}", BANNER_RULE.cyan());
            println!("{}", "        Loopnode bandwidth sharing          ".green());
            println!("{}", BANNER_RULE.cyan());
            println!("{}", "1. Register and log in all accounts".blue());
            println!("{}", "2. Run bandwidth sharing".blue());
            println!("{}", "3. Exit".blue());

            let Some(answer) = self.prompt.ask("Choose an option: ").await else {
                info!("Input closed, exiting");
                return;
            };

            match MenuChoice::parse(&answer) {
                Some(MenuChoice::Enroll) => {
                    self.enroll(&invite_code).await;
                    let back = self.prompt.ask("\nPress Enter to return to the menu...").await;
                    if back.is_none() {
                        return;
                    }
                }
                Some(MenuChoice::Run) => self.run_nodes().await,
                Some(MenuChoice::Exit) => {
                    println!("{}", "Goodbye!".green());
                    return;
                }
                None => warn!("Invalid option {:?}, choose 1, 2 or 3", answer.trim()),
            }
        }
    }

    /// The invite code for this session, asked for once when not configured.
    async fn invite_code(&mut self) -> String {
        if let Some(code) = &self.config.invite_code {
            return code.clone();
        }
        self.prompt
            .ask("Invite code: ")
            .await
            .map(|code| code.trim().to_string())
            .unwrap_or_default()
    }

    async fn enroll(&mut self, invite_code: &str) {
        let credentials = load_credentials(&self.config.credentials_path);
        if credentials.is_empty() {
            warn!("No usable accounts in {:?}", self.config.credentials_path);
            return;
        }

        let store = SessionStore::new(&self.config.sessions_path);
        let summary = enroll_all(&credentials, invite_code, &*self.api, &store).await;
        let line = format!(
            "Registered {}, already existing {}, logged in {}, failed {}",
            summary.registered, summary.existing, summary.logged_in, summary.failed
        );
        if summary.failed == 0 {
            println!("{}", line.green());
        } else {
            println!("{}", line.yellow());
        }
    }

    async fn run_nodes(&mut self) {
        let sessions = SessionStore::new(&self.config.sessions_path).load();
        if sessions.is_empty() {
            warn!(
                "No saved sessions in {:?}, register and log in first",
                self.config.sessions_path
            );
            return;
        }

        println!("{}", format!("Starting {} node(s)...", sessions.len()).green());
        let registry = NodeRegistry::build(sessions, &*self.api).await;
        let renderer = (self.make_renderer)(self.config.tick_interval);
        let mut scheduler = Scheduler::new(
            registry,
            Arc::clone(&self.api),
            renderer,
            self.config.tick_interval,
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let prompt = &mut self.prompt;
        let watch_input = async move {
            while let Some(line) = prompt.next_line().await {
                if line.trim().eq_ignore_ascii_case("q") {
                    info!("Stop requested, finishing current cycle");
                    let _ = stop_tx.send(true);
                    return;
                }
            }
            // Nobody can ask us to stop any more; run until interrupted.
            info!("Input closed, running until interrupted");
            std::future::pending::<()>().await;
        };

        let (cycles, ()) = tokio::join!(scheduler.run(stop_rx), watch_input);
        println!("Stopped after {} cycle(s)", cycles);
    }
}
