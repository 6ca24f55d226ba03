//! Tool dispatcher — runs one parsed action.
//!
//! Tool failures are contained here: whatever a tool does, the caller gets
//! an observation string back.

use super::parser::Action;
use miniagent_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, warn};

pub const SEARCH_TOOL: &str = "search";
pub const CALCULATE_TOOL: &str = "calculate";

pub const NO_ACTION: &str = "No action taken";
pub const NO_QUERY: &str = "Error: No search query specified";
pub const NO_EXPRESSION: &str = "Error: No expression specified";
pub const NO_ANSWER: &str = "Error: No final answer specified";

/// Outcome of dispatching one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub observation: String,
    /// Whether the loop should stop after this step.
    pub terminal: bool,
}

impl Dispatch {
    fn proceed(observation: impl Into<String>) -> Self {
        Self {
            observation: observation.into(),
            terminal: false,
        }
    }

    fn stop(observation: impl Into<String>) -> Self {
        Self {
            observation: observation.into(),
            terminal: true,
        }
    }
}

pub struct ToolDispatcher {
    tools: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// The registered tools, as listed to the model.
    pub fn catalog(&self) -> String {
        self.tools.catalog()
    }

    pub async fn dispatch(&self, action: &Action) -> Dispatch {
        match action {
            Action::Search { query: Some(query) } => Dispatch::proceed(
                self.call_tool(SEARCH_TOOL, serde_json::json!({ "query": query }))
                    .await,
            ),
            Action::Search { query: None } => Dispatch::proceed(NO_QUERY),
            Action::Calculate {
                expression: Some(expression),
            } => Dispatch::proceed(
                self.call_tool(
                    CALCULATE_TOOL,
                    serde_json::json!({ "expression": expression }),
                )
                .await,
            ),
            Action::Calculate { expression: None } => Dispatch::proceed(NO_EXPRESSION),
            Action::FinalAnswer {
                answer: Some(answer),
            } => Dispatch::stop(answer.clone()),
            // A final answer without text does not end the run.
            Action::FinalAnswer { answer: None } => Dispatch::proceed(NO_ANSWER),
            Action::None => Dispatch::stop(NO_ACTION),
        }
    }

    async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> String {
        let call = ToolCall {
            id: format!("call_{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            arguments,
        };

        let start = std::time::Instant::now();
        match self.tools.execute(&call).await {
            Ok(result) => {
                debug!(
                    tool = name,
                    success = result.success,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool executed"
                );
                result.output
            }
            Err(e) => {
                warn!(tool = name, error = %e, "Tool failed");
                format!("Error: {e}")
            }
        }
    }
}
