//! `miniagent examples` — Built-in example prompts.

pub const EXAMPLES: [&str; 3] = [
    "Tell me about Albert Einstein and calculate 25 * 4",
    "What is the capital of France and what is 15 * 8?",
    "Search for information about quantum physics and calculate 100 / 4",
];

pub fn example(index: usize) -> Option<&'static str> {
    EXAMPLES.get(index).copied()
}

pub fn list() {
    println!("Built-in examples (use `miniagent run --example N`):");
    println!();
    for (index, prompt) in EXAMPLES.iter().enumerate() {
        println!("  {index}. {prompt}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_example_is_the_default() {
        assert_eq!(
            example(0),
            Some("Tell me about Albert Einstein and calculate 25 * 4")
        );
        assert!(example(3).is_none());
    }
}
