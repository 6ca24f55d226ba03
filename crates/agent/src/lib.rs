//! The ReAct loop at the heart of MiniAgent.
//!
//! Given a natural-language request the agent repeats a fixed cycle:
//!
//! 1. **Reason**: ask the model for free-text reasoning about the next move
//! 2. **Act**: ask the model to pick one action in a strict text grammar
//! 3. **Parse** the reply into an [`Action`] (never fails)
//! 4. **Dispatch** the action to a tool, or stop
//! 5. **Observe**: record the step and feed it into the next prompt
//!
//! The loop ends on a final answer, on a no-op action, or when the step
//! budget runs out; a final model call then synthesizes the answer. If any
//! model call fails for good, a deterministic fallback answer is assembled
//! from the steps completed so far. Every model call goes through a shared
//! [`RateLimiter`].

pub mod config;
pub mod events;
pub mod rate_limit;
pub mod react;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::RunConfig;
pub use events::ReactEvent;
pub use rate_limit::RateLimiter;
pub use react::dispatcher::{Dispatch, ToolDispatcher};
pub use react::parser::{Action, ParseDiagnostic, ParsedAction, parse_action};
pub use react::step::{ActionKind, Step, StepHistory};
pub use react::{ReactAgent, ReactResult, RunState, Termination};
