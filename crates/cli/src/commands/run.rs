//! `miniagent run` — Run the ReAct agent once and print its progress.

use super::examples;
use miniagent_agent::{ReactAgent, ReactEvent, RunState};
use miniagent_config::AppConfig;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub async fn run(
    config_path: Option<&Path>,
    prompt: Option<String>,
    example: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    debug!(?config, "Configuration loaded");

    let request = match prompt {
        Some(prompt) => prompt,
        None => examples::example(example)
            .ok_or_else(|| format!("No example #{example}; see `miniagent examples`"))?
            .to_string(),
    };

    ensure_api_key(&config)?;

    let router = miniagent_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;

    let (tx, rx) = mpsc::channel(64);
    let agent = ReactAgent::from_config(provider, &config)?.with_event_sink(tx);
    let printer = tokio::spawn(print_progress(rx, config.agent.observation_preview_chars));

    println!("Starting MiniAgent with ReAct Pattern...");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", agent.model());
    println!("  Request:   {request}");

    let result = agent.run(&request).await;
    info!(
        run_id = %result.run_id,
        steps = result.steps.len(),
        model_calls = result.model_calls,
        "Run finished"
    );

    // Closes the event channel so the printer drains and exits.
    drop(agent);
    printer.await?;
    Ok(())
}

async fn print_progress(mut rx: mpsc::Receiver<ReactEvent>, preview_chars: usize) {
    while let Some(event) = rx.recv().await {
        println!("{}", render(&event, preview_chars));
    }
}

/// Console rendering of one progress event.
fn render(event: &ReactEvent, preview_chars: usize) -> String {
    match event {
        ReactEvent::StepStarted { step, budget } => format!("\n--- Step {step}/{budget} ---"),
        ReactEvent::Thought { content, .. } => format!("Thought: {}", content.trim()),
        ReactEvent::Action { kind, input, .. } => match input {
            Some(input) => format!("Action: {kind} ({input})"),
            None => format!("Action: {kind}"),
        },
        ReactEvent::Observation { output, .. } => {
            format!("Observation: {}", truncate(output, preview_chars))
        }
        ReactEvent::Finished {
            state,
            termination,
            answer,
        } => {
            let heading = if *state == RunState::Failed {
                format!("Answer (fallback, {termination})")
            } else {
                "Final Answer".to_string()
            };
            format!("\n=== {heading} ===\n{answer}")
        }
    }
}

/// Fail early, with setup instructions, when no key is configured.
fn ensure_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in a .env file):");
        eprintln!("    GEMINI_API_KEY=...       (default provider)");
        eprintln!("    OPENROUTER_API_KEY=...   (with MINIAGENT_PROVIDER=openrouter)");
        eprintln!("    MINIAGENT_API_KEY=...    (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }
    Ok(())
}

/// Cut `text` to at most `max_chars` characters, marking the cut.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
