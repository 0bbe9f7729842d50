//! Chat delivery

pub mod telegram;

pub use telegram::{MESSAGE_LIMIT, ParseMode, TelegramClient, TelegramConfig, split_message};
