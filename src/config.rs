//! Process configuration loaded from the environment

use crate::types::GameConfig;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Origins allowed by CORS, empty means permissive
    pub allowed_origins: Vec<String>,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
            game: GameConfig::default(),
        }
    }
}

/// Parse an env var, falling back to `default` when unset or invalid
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring invalid {}={:?}: {}", key, raw, e);
                default
            }
        },
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = GameConfig::default();

        let facilitator_name = std::env::var("FACILITATOR_NAME")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.facilitator_name);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let game = GameConfig {
            facilitator_name,
            question_seconds: env_or("QUESTION_SECONDS", defaults.question_seconds),
            answer_seconds: env_or("ANSWER_SECONDS", defaults.answer_seconds),
            vote_seconds: env_or("VOTE_SECONDS", defaults.vote_seconds),
            results_delay: Duration::from_secs(env_or(
                "RESULTS_DELAY_SECONDS",
                defaults.results_delay.as_secs(),
            )),
            tick_interval: Duration::from_millis(
                env_or("TICK_MILLIS", defaults.tick_interval.as_millis() as u64).max(1),
            ),
            answer_policy: env_or("ANSWER_ELIGIBILITY", defaults.answer_policy),
            vote_policy: env_or("VOTE_ELIGIBILITY", defaults.vote_policy),
            scoring: env_or("SCORING", defaults.scoring),
        };

        let config = Self {
            port: env_or("PORT", DEFAULT_PORT),
            allowed_origins,
            game,
        };

        tracing::info!(
            port = config.port,
            origins = config.allowed_origins.len(),
            question_seconds = config.game.question_seconds,
            answer_seconds = config.game.answer_seconds,
            vote_seconds = config.game.vote_seconds,
            "Server config loaded"
        );
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EligibilityPolicy, ScoringRule};
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "PORT",
        "ALLOWED_ORIGINS",
        "FACILITATOR_NAME",
        "QUESTION_SECONDS",
        "ANSWER_SECONDS",
        "VOTE_SECONDS",
        "RESULTS_DELAY_SECONDS",
        "TICK_MILLIS",
        "ANSWER_ELIGIBILITY",
        "VOTE_ELIGIBILITY",
        "SCORING",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = ServerConfig::from_env();

        assert_eq!(config.port, 10000);
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.game.facilitator_name, "Facu");
        assert_eq!(config.game.answer_policy, EligibilityPolicy::ExcludeAuthor);
        assert_eq!(config.game.vote_policy, EligibilityPolicy::Everyone);
        assert_eq!(config.game.scoring, ScoringRule::PerVote);
    }

    #[test]
    #[serial]
    fn test_values_from_env() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var(
            "ALLOWED_ORIGINS",
            "https://a.example, https://b.example/ ,",
        );
        std::env::set_var("FACILITATOR_NAME", " Host ");
        std::env::set_var("VOTE_SECONDS", "0");
        std::env::set_var("RESULTS_DELAY_SECONDS", "3");
        std::env::set_var("ANSWER_ELIGIBILITY", "everyone");
        std::env::set_var("SCORING", "placement");

        let config = ServerConfig::from_env();
        clear_env();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example/"]
        );
        assert_eq!(config.game.facilitator_name, "Host");
        assert_eq!(config.game.vote_seconds, 0);
        assert_eq!(config.game.results_delay, Duration::from_secs(3));
        assert_eq!(config.game.answer_policy, EligibilityPolicy::Everyone);
        assert_eq!(config.game.scoring, ScoringRule::Placement);
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("ANSWER_SECONDS", "-5");
        std::env::set_var("VOTE_ELIGIBILITY", "nobody");

        let config = ServerConfig::from_env();
        clear_env();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.game.answer_seconds, 60);
        assert_eq!(config.game.vote_policy, EligibilityPolicy::Everyone);
    }
}
