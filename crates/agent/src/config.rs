//! Runtime configuration for one agent.

use miniagent_config::AgentSettings;
use miniagent_core::Error;
use std::time::Duration;

/// Step budget and rate-limit timings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum reason/act/observe cycles per run. Always > 0.
    pub max_steps: u32,
    /// Minimum spacing between the starts of two model calls.
    pub min_call_interval: Duration,
    /// Pause before the single retry after a rate-limit response.
    pub overload_retry_delay: Duration,
}

impl RunConfig {
    pub fn new(
        max_steps: u32,
        min_call_interval: Duration,
        overload_retry_delay: Duration,
    ) -> Result<Self, Error> {
        if max_steps == 0 {
            return Err(Error::Config {
                message: "step budget must be greater than zero".into(),
            });
        }
        Ok(Self {
            max_steps,
            min_call_interval,
            overload_retry_delay,
        })
    }

    pub fn from_settings(settings: &AgentSettings) -> Result<Self, Error> {
        Self::new(
            settings.max_steps,
            Duration::from_millis(settings.min_call_interval_ms),
            Duration::from_millis(settings.overload_retry_delay_ms),
        )
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: 3,
            min_call_interval: Duration::from_millis(2000),
            overload_retry_delay: Duration::from_millis(30_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_defaults() {
        let from_settings = RunConfig::from_settings(&AgentSettings::default()).unwrap();
        assert_eq!(from_settings, RunConfig::default());
        assert_eq!(from_settings.max_steps, 3);
        assert_eq!(from_settings.min_call_interval, Duration::from_secs(2));
        assert_eq!(from_settings.overload_retry_delay, Duration::from_secs(30));
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = RunConfig::new(0, Duration::ZERO, Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
