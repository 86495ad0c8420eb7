//! Tutor Bot - Entry Point
//!
//! Long-polling Telegram bot. Configuration comes from the environment
//! (a `.env` file is honored); see `--help` for the variable list.

use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tutor_bot::{
    BotData, Config, GoogleSheetsLookup, OpenAiRecommender, SqliteUserDirectory,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Tutor Bot v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: tutor-bot");
        println!();
        println!("Environment variables:");
        println!("  TELEGRAM_BOT_TOKEN      Telegram bot token (required)");
        println!("  SPREADSHEET_ID          Google spreadsheet with subject sheets (required)");
        println!("  SHEETS_API_KEY          Google Sheets API key (required)");
        println!("  USERS_DB_PATH           SQLite users database (default: users.db)");
        println!("  RECOMMEND_API_URL       Chat-completions endpoint (default: OpenAI)");
        println!("  RECOMMEND_API_KEY       Bearer token for the endpoint (optional)");
        println!("  RECOMMEND_MODEL         Model name (default: gpt-3.5-turbo)");
        println!("  LOOKUP_TIMEOUT_SECS     Spreadsheet lookup timeout (default: 30)");
        println!("  RECOMMEND_TIMEOUT_SECS  Recommendation timeout (default: 60)");
        println!("  LOOKUP_WORKERS          Concurrent sheet lookups (default: 4)");
        return Ok(());
    }

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Tutor Bot v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!("Users database: {:?}", config.users_db_path);
    info!("Spreadsheet: {}", config.spreadsheet_id);
    info!("Recommendation endpoint: {}", config.recommend_url);

    let directory = SqliteUserDirectory::open(&config.users_db_path)?;
    let debts = GoogleSheetsLookup::new(
        &config.spreadsheet_id,
        &config.sheets_api_key,
        config.lookup_timeout,
        config.lookup_workers,
    );
    let recommender = OpenAiRecommender::new(
        &config.recommend_url,
        config.recommend_api_key.as_deref(),
        &config.recommend_model,
        config.recommend_timeout,
    )?;

    let data = Arc::new(BotData {
        directory: Arc::new(directory),
        debts: Arc::new(debts),
        recommender: Arc::new(recommender),
    });

    tutor_bot::run_bot(&config, data).await
}
