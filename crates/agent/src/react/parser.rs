//! Action parser — turns the model's action reply into an [`Action`].
//!
//! Grammar, all keywords case-insensitive:
//!
//! ```text
//! ACTION: search        + QUERY: <rest of line>
//! ACTION: calculate     + EXPRESSION: <rest of line>
//! ACTION: final_answer  + ANSWER: <rest of the reply>
//! ACTION: none
//! ```
//!
//! Parameters must follow the `ACTION:` line. Surrounding prose and
//! markdown emphasis are tolerated. Parsing never fails: a reply without a
//! recognizable action is [`Action::None`], and a missing or empty
//! parameter is kept as `None` inside the chosen variant.

use super::step::ActionKind;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const ACTION_PATTERN: &str = r"(?i)\bACTION[ \t]*:\**[ \t]*([a-z_]+)";
const QUERY_PATTERN: &str = r"(?i)\bQUERY[ \t]*:\**[ \t]*([^\n]*)";
const EXPRESSION_PATTERN: &str = r"(?i)\bEXPRESSION[ \t]*:\**[ \t]*([^\n]*)";
const ANSWER_PATTERN: &str = r"(?is)\bANSWER[ \t]*:\**[ \t]*(.*)";

/// The action chosen for one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Search { query: Option<String> },
    Calculate { expression: Option<String> },
    FinalAnswer { answer: Option<String> },
    None,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Search { .. } => ActionKind::Search,
            Self::Calculate { .. } => ActionKind::Calculate,
            Self::FinalAnswer { .. } => ActionKind::FinalAnswer,
            Self::None => ActionKind::None,
        }
    }

    /// The action's parameter, if it has one.
    pub fn input(&self) -> Option<&str> {
        match self {
            Self::Search { query } => query.as_deref(),
            Self::Calculate { expression } => expression.as_deref(),
            Self::FinalAnswer { answer } => answer.as_deref(),
            Self::None => None,
        }
    }
}

/// Why a reply did not parse cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDiagnostic {
    NoActionLine,
    UnknownAction(String),
    MissingParameter(&'static str),
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActionLine => f.write_str("no ACTION line"),
            Self::UnknownAction(keyword) => write!(f, "unknown action '{keyword}'"),
            Self::MissingParameter(field) => write!(f, "missing {field} parameter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub action: Action,
    pub diagnostic: Option<ParseDiagnostic>,
}

impl ParsedAction {
    fn clean(action: Action) -> Self {
        Self {
            action,
            diagnostic: None,
        }
    }

    fn none(diagnostic: ParseDiagnostic) -> Self {
        Self {
            action: Action::None,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Parse the model's reply to the action prompt.
pub fn parse_action(text: &str) -> ParsedAction {
    let Some((keyword, rest)) = action_keyword(text) else {
        return ParsedAction::none(ParseDiagnostic::NoActionLine);
    };
    let Some(kind) = ActionKind::from_keyword(keyword) else {
        return ParsedAction::none(ParseDiagnostic::UnknownAction(keyword.to_string()));
    };

    let (action, field) = match kind {
        ActionKind::Search => {
            let query = parameter(QUERY_PATTERN, rest);
            (Action::Search { query }, "QUERY")
        }
        ActionKind::Calculate => {
            let expression = parameter(EXPRESSION_PATTERN, rest);
            (Action::Calculate { expression }, "EXPRESSION")
        }
        ActionKind::FinalAnswer => {
            let answer = parameter(ANSWER_PATTERN, rest);
            (Action::FinalAnswer { answer }, "ANSWER")
        }
        ActionKind::None => return ParsedAction::clean(Action::None),
    };

    if action.input().is_some() {
        ParsedAction::clean(action)
    } else {
        ParsedAction {
            action,
            diagnostic: Some(ParseDiagnostic::MissingParameter(field)),
        }
    }
}

/// The first action keyword and the text after it.
fn action_keyword(text: &str) -> Option<(&str, &str)> {
    let captures = Regex::new(ACTION_PATTERN).ok()?.captures(text)?;
    let keyword = captures.get(1)?;
    Some((keyword.as_str(), &text[keyword.end()..]))
}

/// The first capture of `pattern` in `text`, trimmed; empty counts as absent.
fn parameter(pattern: &str, text: &str) -> Option<String> {
    let captures = Regex::new(pattern).ok()?.captures(text)?;
    let value = captures.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}
