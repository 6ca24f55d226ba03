//! Progress events published while a run executes.
//!
//! Consumers (the console printer, tests) receive them over an mpsc
//! channel. Delivery is best-effort: events are dropped when the receiver
//! is gone or its buffer is full, and the run never waits on them.

use crate::react::step::ActionKind;
use crate::react::{RunState, Termination};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactEvent {
    /// A new reason/act/observe cycle began (1-based).
    StepStarted { step: usize, budget: usize },

    /// The model's reasoning for the current step.
    Thought { step: usize, content: String },

    /// The action parsed from the model's reply.
    Action {
        step: usize,
        kind: ActionKind,
        input: Option<String>,
    },

    /// What the action produced.
    Observation {
        step: usize,
        output: String,
        terminal: bool,
    },

    /// The run is over; `answer` is what the caller receives.
    Finished {
        state: RunState,
        termination: Termination,
        answer: String,
    },
}

impl ReactEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StepStarted { .. } => "step_started",
            Self::Thought { .. } => "thought",
            Self::Action { .. } => "action",
            Self::Observation { .. } => "observation",
            Self::Finished { .. } => "finished",
        }
    }
}
