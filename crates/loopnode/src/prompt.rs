//! Line input from the operator.

use crate::error::Result;
use async_trait::async_trait;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::debug;

/// Source of operator input. `None` means input is closed.
#[async_trait]
pub trait Prompt: Send {
    /// Print `question` and wait for the answer line.
    async fn ask(&mut self, question: &str) -> Option<String>;

    /// Wait for the next line without printing anything.
    async fn next_line(&mut self) -> Option<String>;
}

/// Stdin-backed prompt.
///
/// A plain thread does the blocking reads and forwards lines over a channel,
/// so waiting for input never blocks the runtime or its shutdown.
pub struct ConsolePrompt {
    lines: mpsc::UnboundedReceiver<String>,
}

impl ConsolePrompt {
    /// Start the stdin reader thread.
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new().name("stdin".into()).spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
            debug!("Stdin closed");
        })?;
        Ok(Self { lines: rx })
    }
}

#[async_trait]
impl Prompt for ConsolePrompt {
    async fn ask(&mut self, question: &str) -> Option<String> {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{}", question);
        let _ = stdout.flush();
        self.next_line().await
    }

    async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await.map(|line| line.trim().to_string())
    }
}
