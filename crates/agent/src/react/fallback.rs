//! Deterministic answer for runs that could not finish normally.
//!
//! Only calculation results are reused: they are self-contained and need no
//! model to interpret them. Never calls the model.

use super::step::{ActionKind, Step};

pub const NOTHING_GATHERED: &str =
    "I was unable to gather any information for your request before an error occurred. \
     Please try again in a moment.";

const NO_RESULTS: &str =
    "I was unable to complete your request. No calculation results are available \
     from the steps that finished.";

pub fn synthesize(history: &[Step]) -> String {
    if history.is_empty() {
        return NOTHING_GATHERED.to_string();
    }

    let results: Vec<&str> = history
        .iter()
        .filter(|step| step.action == ActionKind::Calculate && !step.is_error())
        .map(|step| step.observation.as_str())
        .collect();

    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut answer =
        String::from("I could not complete your full request, but here is what I found:\n");
    for result in results {
        answer.push_str("\n- ");
        answer.push_str(result);
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(action: ActionKind, observation: &str) -> Step {
        Step {
            thought: "thinking".into(),
            action,
            action_input: None,
            observation: observation.into(),
        }
    }

    #[test]
    fn empty_history_has_explicit_message() {
        let text = synthesize(&[]);
        assert!(!text.is_empty());
        assert_eq!(text, NOTHING_GATHERED);
    }

    #[test]
    fn only_calculations_are_used() {
        let history = [
            step(
                ActionKind::Search,
                "Search results for \"Albert Einstein\":\n\nSummary: Physicist.",
            ),
            step(ActionKind::Calculate, "The result of 25 * 4 is 100"),
        ];
        let text = synthesize(&history);
        assert!(text.contains("- The result of 25 * 4 is 100"));
        assert!(!text.contains("Physicist"));
    }

    #[test]
    fn failed_calculations_are_skipped() {
        let history = [
            step(ActionKind::Calculate, "Error: Invalid calculation result."),
            step(ActionKind::Calculate, "The result of 2+2 is 4"),
        ];
        let text = synthesize(&history);
        assert!(!text.contains("Invalid calculation"));
        assert!(text.contains("The result of 2+2 is 4"));
    }

    #[test]
    fn history_without_calculations_is_still_non_empty() {
        let history = [step(ActionKind::Search, "Search results ...")];
        let text = synthesize(&history);
        assert_eq!(text, NO_RESULTS);
        assert!(!text.contains("Search results"));
    }
}
