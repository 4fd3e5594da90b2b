use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

pub struct Config {
    pub api_base_url: String,
    pub quiz_id: String,
    pub database_url: String,
    pub auto_advance_ms: u64,
    pub start_at_result: bool,
    pub participant_name: Option<String>,
    pub participant_email: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            api_base_url: try_load("QUIZ_API_URL", "http://localhost:3000"),
            quiz_id: try_load("QUIZ_ID", "quiz-estilo"),
            database_url: try_load("DATABASE_URL", "sqlite:style_funnel.db"),
            auto_advance_ms: try_load("AUTO_ADVANCE_MS", "700"),
            start_at_result: flag("QUIZ_START_AT_RESULT"),
            participant_name: env::var("QUIZ_PARTICIPANT_NAME").ok(),
            participant_email: env::var("QUIZ_PARTICIPANT_EMAIL").ok(),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
