//! Configuration management

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,

    /// SQLite database with registered students
    pub users_db_path: PathBuf,

    /// Google spreadsheet holding one worksheet per subject
    pub spreadsheet_id: String,

    /// API key for the Sheets values API
    pub sheets_api_key: String,

    /// Chat-completions endpoint for study recommendations
    pub recommend_url: String,

    /// Bearer token for the recommendation backend (optional)
    pub recommend_api_key: Option<String>,

    /// Model name sent to the recommendation backend
    pub recommend_model: String,

    /// Upper bound on one spreadsheet lookup
    pub lookup_timeout: Duration,

    /// Upper bound on one recommendation request
    pub recommend_timeout: Duration,

    /// Concurrent blocking spreadsheet lookups
    pub lookup_workers: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bot_token =
            std::env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;

        let users_db_path = std::env::var("USERS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("users.db"));

        let spreadsheet_id =
            std::env::var("SPREADSHEET_ID").context("SPREADSHEET_ID must be set")?;

        let sheets_api_key =
            std::env::var("SHEETS_API_KEY").context("SHEETS_API_KEY must be set")?;

        let recommend_url = std::env::var("RECOMMEND_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());

        let recommend_api_key = std::env::var("RECOMMEND_API_KEY").ok();

        let recommend_model =
            std::env::var("RECOMMEND_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let lookup_timeout = Duration::from_secs(
            std::env::var("LOOKUP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        );

        let recommend_timeout = Duration::from_secs(
            std::env::var("RECOMMEND_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        );

        let lookup_workers = std::env::var("LOOKUP_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);

        Ok(Self {
            bot_token,
            users_db_path,
            spreadsheet_id,
            sheets_api_key,
            recommend_url,
            recommend_api_key,
            recommend_model,
            lookup_timeout,
            recommend_timeout,
            lookup_workers,
        })
    }
}
