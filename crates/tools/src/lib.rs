//! Built-in tool implementations for MiniAgent.
//!
//! The agent knows exactly two collaborators:
//! - `search`: a web-summary lookup (Wikipedia, then DuckDuckGo)
//! - `calculate`: a restricted arithmetic evaluator
//!
//! Both follow the same contract: any failure is reported inside the
//! returned text, never as a panic.

pub mod calculator;
pub mod web_search;

use miniagent_config::SearchConfig;
use miniagent_core::tool::ToolRegistry;

pub use calculator::{CalculatorTool, calculate};
pub use web_search::WebSearchTool;

/// Create the default tool registry with both built-in tools.
pub fn default_registry(search: &SearchConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool::new(search)));
    registry.register(Box::new(CalculatorTool));
    registry
}
