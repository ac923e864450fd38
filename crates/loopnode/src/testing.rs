//! In-memory collaborators for unit tests.

use crate::prompt::Prompt;
use async_trait::async_trait;
use loopnode_client::{ApiClient, HttpTransport, JsonRequest, NetworkError};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Handler = dyn Fn(&JsonRequest, Option<&str>) -> Result<Value, NetworkError> + Send + Sync;

/// Transport answering from a closure and recording every request.
pub struct MockTransport {
    handler: Box<Handler>,
    latency: Duration,
    pub calls: Arc<Mutex<Vec<JsonRequest>>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&JsonRequest, Option<&str>) -> Result<Value, NetworkError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            latency: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sleep this long (on the tokio clock) before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn into_api(self) -> ApiClient<MockTransport> {
        ApiClient::new("http://mock.local", self)
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.trim_start_matches("http://mock.local").to_string())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn request_json(
        &self,
        request: JsonRequest,
        proxy: Option<&str>,
    ) -> Result<Value, NetworkError> {
        self.calls.lock().unwrap().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        (self.handler)(&request, proxy)
    }
}

/// Prompt fed from a fixed list of lines, then EOF.
pub struct ScriptedPrompt {
    lines: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn ask(&mut self, question: &str) -> Option<String> {
        self.asked.push(question.to_string());
        self.next_line().await
    }

    async fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}
