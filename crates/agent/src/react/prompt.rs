//! Prompt templates for the three model calls of a run.
//!
//! Pure string templating: the same inputs always render the same prompt.

use super::step::Step;
use std::fmt::Write;

const ACTION_GRAMMAR: &str = "\
To search the web:
ACTION: search
QUERY: <what to search for>

To evaluate a math expression:
ACTION: calculate
EXPRESSION: <math expression>

To give the final answer:
ACTION: final_answer
ANSWER: <your complete answer>

If no action is needed:
ACTION: none";

/// Ask for free-text reasoning about the next move.
///
/// `tool_catalog` is the `- name: description` listing of the registered
/// tools.
pub fn reasoning_prompt(user_request: &str, tool_catalog: &str, history: &[Step]) -> String {
    let mut prompt = format!(
        "You are a helpful assistant that solves problems step by step using tools.\n\n\
         User request: {user_request}\n\n\
         Available tools:\n{tool_catalog}\n\n"
    );

    if history.is_empty() {
        prompt.push_str("No steps have been taken yet.\n\n");
    } else {
        prompt.push_str("Steps taken so far:\n");
        prompt.push_str(&render_history(history));
        prompt.push('\n');
    }

    prompt.push_str(
        "Think about what to do next to answer the request. \
         Reply with your reasoning only; do not choose an action or answer yet.",
    );
    prompt
}

/// Ask for exactly one action in the strict output grammar.
pub fn action_prompt(thought: &str) -> String {
    format!(
        "Based on this reasoning:\n\n{thought}\n\n\
         Choose exactly ONE action and reply using one of these formats, with nothing else:\n\n\
         {ACTION_GRAMMAR}"
    )
}

/// Ask for the comprehensive answer built from everything gathered.
pub fn final_prompt(user_request: &str, history: &[Step]) -> String {
    let gathered = if history.is_empty() {
        "No information was gathered.\n".to_string()
    } else {
        render_history(history)
    };

    format!(
        "User request: {user_request}\n\n\
         Here is everything gathered while working on it:\n{gathered}\n\
         Using this information, write a comprehensive, well-organized answer to the \
         user's request. Address every part of the request."
    )
}

fn render_history(history: &[Step]) -> String {
    let mut out = String::new();
    for (index, step) in history.iter().enumerate() {
        let _ = writeln!(out, "Step {}:", index + 1);
        let _ = writeln!(out, "Thought: {}", step.thought);
        match &step.action_input {
            Some(input) => {
                let _ = writeln!(out, "Action: {} ({input})", step.action);
            }
            None => {
                let _ = writeln!(out, "Action: {}", step.action);
            }
        }
        let _ = writeln!(out, "Observation: {}", step.observation);
        out.push('\n');
    }
    out
}
