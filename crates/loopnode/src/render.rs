//! Per-cycle status display.

use crate::node::{Node, TickResult};
use colored::{Color, Colorize};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::warn;

const RULE: &str = "----------------------------------------";

/// One account's line in a cycle report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub email: String,
    pub invite_code: String,
    pub proxy: Option<String>,
    pub result: TickResult,
}

impl NodeStatus {
    pub fn new(node: &Node, result: TickResult) -> Self {
        Self {
            email: node.email().to_string(),
            invite_code: node.invite_code().to_string(),
            proxy: node.proxy().map(str::to_string),
            result,
        }
    }
}

/// Everything produced by one cycle, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based
    pub cycle: u64,
    pub statuses: Vec<NodeStatus>,
}

impl CycleReport {
    pub fn failures(&self) -> usize {
        self.statuses.iter().filter(|s| !s.result.is_ok()).count()
    }

    pub fn total_earned(&self) -> i64 {
        self.statuses
            .iter()
            .map(|s| match s.result {
                TickResult::Shared { earned, .. } => earned,
                TickResult::Failed { .. } => 0,
            })
            .sum()
    }
}

/// Consumes a finished cycle.
pub trait Renderer {
    fn render(&mut self, report: &CycleReport);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, report: &CycleReport) {
        (**self).render(report)
    }
}

/// Redraws the terminal with one block per account.
pub struct ConsoleRenderer<W> {
    out: W,
    interval: Duration,
    color: bool,
}

impl ConsoleRenderer<io::Stdout> {
    /// Draw to stdout, colored when stdout is a terminal.
    pub fn stdout(interval: Duration) -> Self {
        let out = io::stdout();
        let color = out.is_terminal();
        Self::new(out, interval).with_color(color)
    }
}

impl<W: Write> ConsoleRenderer<W> {
    /// Plain output to any writer.
    pub fn new(out: W, interval: Duration) -> Self {
        Self {
            out,
            interval,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render(&mut self, report: &CycleReport) {
        let text = format_report(report, self.interval, self.color);
        let drawn = queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
            .and_then(|_| self.out.write_all(text.as_bytes()))
            .and_then(|_| self.out.flush());
        if let Err(e) = drawn {
            warn!("Failed to draw status: {}", e);
        }
    }
}

/// Body of a status screen. `color` wraps lines in ANSI colors.
pub fn format_report(report: &CycleReport, interval: Duration, color: bool) -> String {
    let paint = |line: String, shade: Color| {
        if color {
            line.color(shade).to_string()
        } else {
            line
        }
    };
    let mut text = String::new();

    for status in &report.statuses {
        let _ = writeln!(text, "{}", paint(RULE.into(), Color::Cyan));
        let _ = writeln!(text, "{}", paint(format!("Account: {}", status.email), Color::Blue));
        let _ = writeln!(
            text,
            "{}",
            paint(format!("Invite code: {}", status.invite_code), Color::Green)
        );
        let proxy = status.proxy.as_deref().unwrap_or("direct");
        let _ = writeln!(text, "{}", paint(format!("Proxy: {}", proxy), Color::Yellow));
        match &status.result {
            TickResult::Shared {
                quality,
                earned,
                balance,
            } => {
                let _ = writeln!(
                    text,
                    "Quality: {} | Earned: {:+} | Balance: {}",
                    quality, earned, balance
                );
            }
            TickResult::Failed { message } => {
                let _ = writeln!(text, "{}", paint(format!("Error: {}", message), Color::Red));
            }
        }
    }
    let _ = writeln!(text, "{}", paint(RULE.into(), Color::Cyan));
    let _ = writeln!(
        text,
        "Cycle {} | {} account(s), {} failed | next update in {}s | type q + Enter to stop",
        report.cycle,
        report.statuses.len(),
        report.failures(),
        interval.as_secs()
    );

    text
}
