//! Telegram conversation controller
//!
//! Drives the command -> keyboard -> selection -> lookup -> reply flow.
//! Every inbound event is self-contained: selections are carried entirely in
//! callback tokens, so any token may arrive at any time and no prior step is
//! assumed. The student profile is re-resolved on every event.
//!
//! Uses explicit Dispatcher pattern for reliable message polling.

use anyhow::Result;
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::ParseMode,
    utils::command::BotCommands,
};

use crate::config::Config;
use crate::directory::UserDirectory;
use crate::keyboard::{self, CallbackToken};
use crate::messages;
use crate::recommend::Recommender;
use crate::sheets::{DebtLookup, SUBJECTS};

/// Scores below this count as a debt
pub const PASSING_SCORE: u32 = 50;

/// Injected adapters shared by all handlers
pub struct BotData {
    pub directory: Arc<dyn UserDirectory>,
    pub debts: Arc<dyn DebtLookup>,
    pub recommender: Arc<dyn Recommender>,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "greet and pick a subject")]
    Start,
    #[command(description = "show what this bot does")]
    Help,
}

/// Run the bot with an explicit Dispatcher until shutdown
pub async fn run_bot(config: &Config, data: Arc<BotData>) -> Result<()> {
    let bot = Bot::new(config.bot_token.clone());

    // Verify bot token by calling getMe
    tracing::info!("Verifying bot token...");
    match bot.get_me().await {
        Ok(me) => {
            tracing::info!(
                "Bot authenticated: @{} (ID: {})",
                me.username.as_deref().unwrap_or("unknown"),
                me.id
            );
        }
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler));

    tracing::info!("Starting dispatcher with long polling...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in update handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("Bot stopped");
    Ok(())
}

/// Command endpoint for the dispatcher
async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    data: Arc<BotData>,
) -> ResponseResult<()> {
    let user_id = msg.from.as_ref().map(|u| u.id.0 as i64).unwrap_or(0);
    tracing::info!(">>> Command received: user={}, chat={}", user_id, msg.chat.id);

    let result = match cmd {
        Command::Start => handle_start(&bot, msg.chat.id, user_id, &data).await,
        Command::Help => handle_help(&bot, msg.chat.id).await,
    };

    if let Err(e) = result {
        tracing::error!("Error handling command: {:#}", e);
    }

    Ok(())
}

/// Callback query endpoint for inline keyboard buttons
async fn callback_handler(bot: Bot, query: CallbackQuery, data: Arc<BotData>) -> ResponseResult<()> {
    let user_id = query.from.id.0 as i64;

    let chat_id = match query.message.as_ref().map(|m| m.chat().id) {
        Some(id) => id,
        None => {
            bot.answer_callback_query(&query.id).await?;
            return Ok(());
        }
    };

    let token = query
        .data
        .as_deref()
        .map(CallbackToken::decode)
        .unwrap_or(CallbackToken::Invalid);

    tracing::info!(
        "Callback query: user={}, data={:?}",
        user_id,
        query.data.as_deref().unwrap_or("")
    );

    match token {
        CallbackToken::Subject(subject) => {
            bot.answer_callback_query(&query.id).await?;
            if let Err(e) = handle_subject(&bot, chat_id, user_id, &subject, &data).await {
                tracing::error!("Error handling subject selection: {:#}", e);
            }
        }
        CallbackToken::Theme { subject, theme } => {
            bot.answer_callback_query(&query.id).await?;
            if let Err(e) = handle_theme(&bot, chat_id, &subject, &theme, &data).await {
                tracing::error!("Error handling theme selection: {:#}", e);
            }
        }
        CallbackToken::Invalid => {
            // Safe no-op: stale or corrupted token (e.g. a theme containing '_')
            tracing::debug!("Ignoring malformed callback token: {:?}", query.data);
            bot.answer_callback_query(&query.id)
                .text("Unknown action")
                .await?;
        }
    }

    Ok(())
}

/// /start: greet a registered student and offer the subject keyboard
async fn handle_start(bot: &Bot, chat_id: ChatId, user_id: i64, data: &BotData) -> Result<()> {
    match data.directory.find(user_id).await? {
        Some(profile) => {
            bot.send_message(chat_id, messages::greeting(&profile.given_name))
                .await?;
            bot.send_message(chat_id, messages::SUBJECT_PROMPT)
                .reply_markup(keyboard::subjects_keyboard(&SUBJECTS))
                .await?;
        }
        None => {
            bot.send_message(chat_id, messages::REJECTION).await?;
        }
    }
    Ok(())
}

async fn handle_help(bot: &Bot, chat_id: ChatId) -> Result<()> {
    bot.send_message(chat_id, messages::HELP_TEXT).await?;
    Ok(())
}

/// Subject selected: look up the student's row and offer debt themes
async fn handle_subject(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    subject: &str,
    data: &BotData,
) -> Result<()> {
    // Re-resolve on every event; the profile may have been removed since /start.
    let profile = match data.directory.find(user_id).await? {
        Some(p) => p,
        None => {
            bot.send_message(chat_id, messages::REJECTION).await?;
            return Ok(());
        }
    };

    let placeholder = bot.send_message(chat_id, messages::SEARCHING).await?;

    let reports = match data.debts.lookup(&profile.given_name).await {
        Ok(reports) => reports,
        Err(e) => {
            tracing::error!("Debt lookup failed for {:?}: {:#}", profile.given_name, e);
            bot.edit_message_text(chat_id, placeholder.id, messages::no_data(subject))
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
    };

    let Some(report) = reports.get(subject) else {
        bot.edit_message_text(chat_id, placeholder.id, messages::no_data(subject))
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    };

    let themes = debt_themes(&report.headers, &report.scores, PASSING_SCORE);
    if themes.is_empty() {
        bot.edit_message_text(chat_id, placeholder.id, messages::no_debts(subject))
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    bot.delete_message(chat_id, placeholder.id).await?;
    bot.send_message(chat_id, messages::themes_header(subject))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard::themes_keyboard(subject, &themes))
        .await?;

    Ok(())
}

/// Theme selected: fetch study recommendations and relay them
async fn handle_theme(
    bot: &Bot,
    chat_id: ChatId,
    subject: &str,
    theme: &str,
    data: &BotData,
) -> Result<()> {
    bot.send_message(chat_id, messages::searching_recommendations(theme))
        .parse_mode(ParseMode::Html)
        .await?;

    match data.recommender.recommend(subject, theme).await {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                bot.send_message(chat_id, messages::RECOMMEND_EMPTY).await?;
            } else {
                bot.send_message(chat_id, messages::recommendations(subject, theme, text))
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
        }
        Err(e) => {
            // Cause stays in the log; the user gets a generic retry message.
            tracing::error!("Recommendation request failed: {}", e);
            bot.send_message(chat_id, messages::RECOMMEND_FAILED).await?;
        }
    }

    Ok(())
}

/// Keep headers whose aligned score is a non-negative integer below `threshold`.
///
/// Lenient by policy: misaligned positions and non-numeric scores are skipped,
/// never treated as errors.
pub fn debt_themes(headers: &[String], scores: &[String], threshold: u32) -> Vec<String> {
    headers
        .iter()
        .zip(scores.iter())
        .filter_map(|(header, score)| {
            if score.is_empty() || !score.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            match score.parse::<u32>() {
                Ok(value) if value < threshold => Some(header.clone()),
                _ => None,
            }
        })
        .collect()
}
