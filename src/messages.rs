//! Shared text sent by the bot.
//!
//! All user-facing strings live here so the conversation flow in `telegram.rs`
//! stays readable and wording is easy to adjust in one place. Composed messages
//! use Telegram HTML parse mode, so anything interpolated from external data
//! (sheet headers, generated text) is escaped.

pub const REJECTION: &str = "❌ This bot is not for you ❌";

pub const SUBJECT_PROMPT: &str = "📜 Pick a subject to see your debts:";

pub const SEARCHING: &str = "⌛ Looking up your debts...";

pub const RECOMMEND_EMPTY: &str =
    "Unfortunately no recommendations came back. Please try again later.";

pub const RECOMMEND_FAILED: &str =
    "❌ Something went wrong while fetching recommendations. Please try again later.";

pub const HELP_TEXT: &str = "I track your study debts.\n\n\
    /start - Pick a subject and see the topics where your score is below passing.\n\
    /help - Show this text.\n\n\
    Tap a topic button to get study recommendations for it.";

pub fn greeting(given_name: &str) -> String {
    format!("👋 Hi, {}! 👋", html_escape(given_name))
}

pub fn no_data(subject: &str) -> String {
    format!("❌ No data for subject <b>{}</b>.", html_escape(subject))
}

pub fn no_debts(subject: &str) -> String {
    format!("✅ You have no debts in <b>{}</b>!", html_escape(subject))
}

pub fn themes_header(subject: &str) -> String {
    format!(
        "📚 Here are your debts in <b>{}</b>!\n\n\
         Tap a topic to get study recommendations for it:",
        html_escape(subject)
    )
}

pub fn searching_recommendations(theme: &str) -> String {
    format!(
        "⌛ Looking for recommendations on <b>{}</b>...",
        html_escape(theme)
    )
}

pub fn recommendations(subject: &str, theme: &str, text: &str) -> String {
    format!(
        "📘 Recommendations for <b>{}</b> ({}):\n\n{}",
        html_escape(theme),
        html_escape(subject),
        html_escape(text)
    )
}

/// HTML escape for Telegram
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
