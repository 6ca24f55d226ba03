//! Step records and the bounded run history.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The action keywords the model may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Search,
    Calculate,
    FinalAnswer,
    None,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Calculate => "calculate",
            Self::FinalAnswer => "final_answer",
            Self::None => "none",
        }
    }

    /// Match an action keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "search" => Some(Self::Search),
            "calculate" => Some(Self::Calculate),
            "final_answer" => Some(Self::FinalAnswer),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed reason/act/observe cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub thought: String,
    pub action: ActionKind,
    /// Query, expression or answer text; absent for `none` and for actions
    /// whose parameter was missing.
    pub action_input: Option<String>,
    pub observation: String,
}

impl Step {
    /// An observation reporting a failure.
    pub fn is_error(&self) -> bool {
        self.observation.starts_with("Error:")
    }
}

/// Append-only list of steps, never longer than the step budget.
#[derive(Debug, Clone)]
pub struct StepHistory {
    steps: Vec<Step>,
    budget: usize,
}

impl StepHistory {
    pub fn new(budget: usize) -> Self {
        Self {
            steps: Vec::with_capacity(budget),
            budget,
        }
    }

    /// Append a step. Returns `false`, leaving the history untouched, once
    /// the budget is used up.
    pub fn push(&mut self, step: Step) -> bool {
        if self.is_full() {
            return false;
        }
        self.steps.push(step);
        true
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.steps.len() >= self.budget
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}
