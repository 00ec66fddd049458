//! Relay that turns authenticated webhook triggers into Telegram chat messages.

pub mod compose;
pub mod config;
pub mod error;
pub mod handler;
pub mod http_server;
pub mod registry;
pub mod telegram;
pub mod types;

#[cfg(test)]
mod test_support;
