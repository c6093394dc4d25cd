use std::env;
use std::time::Duration;

use crate::error::AppError;

/// Timings and bot setup for the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long a lone joiner waits before a bot is seated opposite them.
    pub bot_fallback: Duration,
    /// Pause before the bot answers a human move.
    pub bot_move_delay: Duration,
    /// How long a dropped seat stays reclaimable before it is forfeited.
    pub reconnect_grace: Duration,
    /// How long an ended match stays in the table before release.
    pub release_linger: Duration,
    /// Fixed seed for the bot's random fallback; `None` seeds from the OS.
    pub bot_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bot_fallback: Duration::from_millis(10_000),
            bot_move_delay: Duration::from_millis(500),
            reconnect_grace: Duration::from_millis(30_000),
            release_linger: Duration::from_millis(5_000),
            bot_seed: None,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            bot_fallback: millis(&lookup, "MATCH_BOT_FALLBACK_MS")?.unwrap_or(defaults.bot_fallback),
            bot_move_delay: millis(&lookup, "MATCH_BOT_MOVE_DELAY_MS")?
                .unwrap_or(defaults.bot_move_delay),
            reconnect_grace: millis(&lookup, "MATCH_RECONNECT_GRACE_MS")?
                .unwrap_or(defaults.reconnect_grace),
            release_linger: millis(&lookup, "MATCH_RELEASE_LINGER_MS")?
                .unwrap_or(defaults.release_linger),
            bot_seed: parse_var(&lookup, "BOT_SEED")?,
        })
    }
}

fn millis<F>(lookup: &F, name: &str) -> Result<Option<Duration>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_var::<u64, F>(lookup, name)?.map(Duration::from_millis))
}

pub(crate) fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            AppError::config(format!(
                "Environment variable '{name}' has invalid value '{raw}': {e}"
            ))
        }),
    }
}
