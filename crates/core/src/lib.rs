pub mod format;
pub mod intent;
pub mod models;
pub mod replies;

pub use format::{currency_symbol, format_amount, format_rate, round_money, round_rate};
pub use intent::{classify_intent, normalize_text, parse_amount};
pub use models::*;
