//! ReAct loop controller — Thought → Action → Observation.
//!
//! A run is a three-state machine:
//!
//! ```text
//!            ┌── terminal action / budget used up ──► DONE ──► final synthesis
//! RUNNING ───┤                                         │
//!            └── model call failed ──► FAILED ◄────────┘ (synthesis failed)
//!                                        │
//!                                        └──► fallback answer
//! ```
//!
//! Each step makes two model calls (reasoning, then action selection),
//! parses the action reply, dispatches it and appends the resulting
//! [`Step`]. The step history never outgrows the budget. Every run yields
//! text, even when every model call fails.

pub mod dispatcher;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod step;

use crate::config::RunConfig;
use crate::events::ReactEvent;
use crate::rate_limit::RateLimiter;
use dispatcher::ToolDispatcher;
use miniagent_config::AppConfig;
use miniagent_core::error::ProviderError;
use miniagent_core::provider::{Provider, ProviderRequest};
use miniagent_core::tool::ToolRegistry;
use parser::parse_action;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use step::{ActionKind, Step, StepHistory};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    FinalAnswer,
    /// The model chose no action, or its reply had none.
    NoAction,
    BudgetExhausted,
    Failed { reason: String },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FinalAnswer => f.write_str("final answer"),
            Self::NoAction => f.write_str("no action"),
            Self::BudgetExhausted => f.write_str("step budget exhausted"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// The result of a ReAct run.
#[derive(Debug, Clone, Serialize)]
pub struct ReactResult {
    pub run_id: String,
    /// Synthesized answer, or the fallback text when the run failed.
    pub answer: String,
    pub steps: Vec<Step>,
    pub state: RunState,
    pub termination: Termination,
    /// Model requests dispatched, retries included.
    pub model_calls: usize,
}

pub struct ReactAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    dispatcher: ToolDispatcher,
    tool_catalog: String,
    config: RunConfig,
    limiter: Arc<RateLimiter>,
    events: Option<mpsc::Sender<ReactEvent>>,
}

impl ReactAgent {
    /// Create a new ReAct agent with its own rate limiter.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        config: RunConfig,
    ) -> Self {
        let dispatcher = ToolDispatcher::new(tools);
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            tool_catalog: dispatcher.catalog(),
            dispatcher,
            limiter: Arc::new(RateLimiter::from_config(&config)),
            config,
            events: None,
        }
    }

    /// Build an agent from application config: default tools, the active
    /// provider's model and run settings.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        config: &AppConfig,
    ) -> Result<Self, miniagent_core::Error> {
        let run_config = RunConfig::from_settings(&config.agent)?;
        let tools = Arc::new(miniagent_tools::default_registry(&config.search));

        Ok(
            Self::new(provider, config.active_model(), tools, run_config)
                .with_temperature(config.default_temperature)
                .with_max_tokens(config.default_max_tokens),
        )
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Share a rate limiter with other agents calling the same model quota.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Publish progress events to `sender`.
    pub fn with_event_sink(mut self, sender: mpsc::Sender<ReactEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Execute the ReAct loop for `user_request`.
    pub async fn run(&self, user_request: &str) -> ReactResult {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("react_run", run_id = %run_id);
        self.execute(run_id, user_request).instrument(span).await
    }

    async fn execute(&self, run_id: String, user_request: &str) -> ReactResult {
        let mut history = StepHistory::new(self.config.max_steps as usize);
        let mut model_calls = 0usize;
        let mut state = RunState::Running;
        let mut termination = Termination::BudgetExhausted;

        info!(
            model = %self.model,
            max_steps = self.config.max_steps,
            "ReAct loop starting"
        );

        while state == RunState::Running {
            if history.is_full() {
                warn!(max_steps = self.config.max_steps, "ReAct: step budget exhausted");
                state = RunState::Done;
                continue;
            }

            let step_no = history.len() + 1;
            debug!(step = step_no, "ReAct step");
            self.emit(ReactEvent::StepStarted {
                step: step_no,
                budget: history.budget(),
            });

            match self
                .step(user_request, history.steps(), step_no, &mut model_calls)
                .await
            {
                Ok((step, terminal)) => {
                    let kind = step.action;
                    history.push(step);
                    if terminal {
                        termination = if kind == ActionKind::FinalAnswer {
                            Termination::FinalAnswer
                        } else {
                            Termination::NoAction
                        };
                        state = RunState::Done;
                    }
                }
                Err(e) => {
                    error!(step = step_no, error = %e, "ReAct step failed");
                    termination = Termination::Failed {
                        reason: e.to_string(),
                    };
                    state = RunState::Failed;
                }
            }
        }

        let answer = if state == RunState::Done {
            let final_prompt = prompt::final_prompt(user_request, history.steps());
            match self.ask(final_prompt, &mut model_calls).await {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "Final synthesis failed, using fallback answer");
                    state = RunState::Failed;
                    termination = Termination::Failed {
                        reason: format!("final synthesis failed: {e}"),
                    };
                    fallback::synthesize(history.steps())
                }
            }
        } else {
            warn!("Run failed, using fallback answer");
            fallback::synthesize(history.steps())
        };

        info!(
            steps = history.len(),
            model_calls,
            state = %state,
            termination = %termination,
            "ReAct loop completed"
        );

        self.emit(ReactEvent::Finished {
            state,
            termination: termination.clone(),
            answer: answer.clone(),
        });

        ReactResult {
            run_id,
            answer,
            steps: history.into_steps(),
            state,
            termination,
            model_calls,
        }
    }

    /// One reason/act/observe cycle. Returns the step and whether it ends
    /// the loop; only model failures are errors.
    async fn step(
        &self,
        user_request: &str,
        history: &[Step],
        step_no: usize,
        model_calls: &mut usize,
    ) -> Result<(Step, bool), ProviderError> {
        let thought = self
            .ask(
                prompt::reasoning_prompt(user_request, &self.tool_catalog, history),
                model_calls,
            )
            .await?;
        self.emit(ReactEvent::Thought {
            step: step_no,
            content: thought.clone(),
        });

        let reply = self
            .ask(prompt::action_prompt(&thought), model_calls)
            .await?;
        let parsed = parse_action(&reply);
        if let Some(diagnostic) = &parsed.diagnostic {
            debug!(step = step_no, %diagnostic, "Action reply was malformed");
        }

        let kind = parsed.action.kind();
        let input = parsed.action.input().map(str::to_owned);
        info!(step = step_no, action = %kind, "ReAct action");
        self.emit(ReactEvent::Action {
            step: step_no,
            kind,
            input: input.clone(),
        });

        let outcome = self.dispatcher.dispatch(&parsed.action).await;
        self.emit(ReactEvent::Observation {
            step: step_no,
            output: outcome.observation.clone(),
            terminal: outcome.terminal,
        });

        let step = Step {
            thought,
            action: kind,
            action_input: input,
            observation: outcome.observation,
        };
        Ok((step, outcome.terminal))
    }

    /// Send one prompt through the rate limiter and return the reply text.
    async fn ask(&self, prompt: String, model_calls: &mut usize) -> Result<String, ProviderError> {
        let request = ProviderRequest::prompt(self.model.as_str(), prompt)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let response = self
            .limiter
            .call(|| {
                *model_calls += 1;
                self.provider.complete(request.clone())
            })
            .await?;

        Ok(response.message.content)
    }

    /// Publish without waiting: a slow or absent consumer never holds up
    /// the run.
    fn emit(&self, event: ReactEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                debug!(event = event.event_type(), "Event sink full, dropping event");
            }
        }
    }
}
