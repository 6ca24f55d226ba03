//! # MiniAgent Core
//!
//! Domain types, traits, and error definitions for the MiniAgent ReAct runtime.
//! This crate has **no framework dependencies**: it defines the model that the
//! provider, tool and agent crates implement against.
//!
//! - [`Provider`] abstracts the external reasoning model.
//! - [`Tool`] abstracts the external collaborators (search, calculator).
//! - [`ProviderError`] and [`ToolError`] classify collaborator failures.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, ToolError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
