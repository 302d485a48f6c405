//! Request handlers.

pub mod commands;
pub mod health;
pub mod status;

pub use commands::{deliver_dead_letter, deliver_restore_daily, deliver_retry_block};
pub use health::health_check;
pub use status::check_card_status;
