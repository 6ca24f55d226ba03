//! Shared test helpers for the ReAct tests.

use miniagent_core::error::{ProviderError, ToolError};
use miniagent_core::message::Message;
use miniagent_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use miniagent_core::tool::{Tool, ToolRegistry, ToolResult};
use miniagent_tools::CalculatorTool;
use std::sync::Mutex;
use tokio::time::Instant;

/// A mock provider that replays a script of replies and failures.
///
/// Each call to `complete` consumes the next entry. Once the script runs
/// out every further call fails with `NotConfigured`.
pub struct SequentialMockProvider {
    script: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
    call_times: Mutex<Vec<Instant>>,
}

impl SequentialMockProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script),
            prompts: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        }
    }

    /// A script made only of successful replies.
    pub fn texts(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    /// The prompt text sent on each call, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// When each call arrived, on the tokio clock.
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);
        self.call_times.lock().unwrap().push(Instant::now());

        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Err(ProviderError::NotConfigured(
                "SequentialMockProvider: script exhausted".into(),
            ));
        }
        script.remove(0).map(|text| make_text_response(&text))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Stand-in for the web search tool: echoes the query back.
pub struct EchoSearchTool;

#[async_trait::async_trait]
impl Tool for EchoSearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Echoes the query"
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"].as_str().unwrap_or_default();
        Ok(ToolResult::text(format!("Search results for \"{query}\": echo")))
    }
}

/// A tool that always fails outward.
pub struct BrokenTool(pub &'static str);

#[async_trait::async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: self.0.into(),
            reason: "backend down".into(),
        })
    }
}

/// Calculator plus an offline search tool.
pub fn offline_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CalculatorTool));
    registry.register(Box::new(EchoSearchTool));
    registry
}

pub fn rate_limited() -> ProviderError {
    ProviderError::RateLimited {
        retry_after_secs: 30,
    }
}

pub fn server_error() -> ProviderError {
    ProviderError::ApiError {
        status_code: 500,
        message: "internal".into(),
    }
}
