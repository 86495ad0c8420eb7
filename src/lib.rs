//! Tutor Bot
//!
//! Telegram bot for students: pick a subject, see the topics where your
//! recorded score is below passing, and get AI study recommendations per topic.
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► Dispatcher ──► Conversation Controller
//!  (polling)                       │
//!                                  ├── UserDirectory (SQLite)
//!                                  ├── DebtLookup (Google Sheets, blocking pool)
//!                                  └── Recommender (chat-completions API)
//! ```
//!
//! The controller owns all decision logic (threshold filtering, keyboards,
//! reply composition); the adapters each wrap one external system behind a
//! narrow trait so handlers stay testable. Conversation state lives entirely
//! in callback tokens - there is no session store.

pub mod config;
pub mod directory;
pub mod keyboard;
pub mod messages;
pub mod recommend;
pub mod sheets;
pub mod telegram;


pub use config::Config;
pub use directory::{SqliteUserDirectory, UserDirectory, UserProfile};
pub use keyboard::CallbackToken;
pub use recommend::{OpenAiRecommender, RecommendError, Recommender};
pub use sheets::{DebtLookup, GoogleSheetsLookup, SubjectReport, SUBJECTS};
pub use telegram::{run_bot, BotData, PASSING_SCORE};
