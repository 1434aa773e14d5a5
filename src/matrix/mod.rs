//! Matrix protocol integration for the bot.
//!
//! The Matrix SDK owns the connection, authentication and retries. This module
//! wraps it behind a narrow surface:
//! - [`BotEvent`]s delivered to a callback while syncing
//! - [`MatrixClient::send_reply`] and [`MatrixClient::send_message`] to answer
//!
//! # Examples
//!
//! ```no_run
//! use roller_bot::matrix::{BotEvent, MatrixClient, UserCredentials};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credentials = UserCredentials {
//!     user_id: "@roller:example.com".to_string(),
//!     password: "password".to_string(),
//! };
//!
//! let client = MatrixClient::new(&credentials, "./data", "roller").await?;
//! client.sync(|event: BotEvent| println!("{:?}", event)).await;
//! # Ok(())
//! # }
//! ```

mod client;
mod session;
mod sync;

pub use crate::matrix::client::MatrixClient;

/// User credentials for a Matrix account
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User ID of the matrix account
    pub user_id: String,
    /// Password of the matrix account
    pub password: String,
}

/// Events surfaced to the bot while syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    /// The first sync succeeded
    Connected,
    /// The bot joined a room after an invite
    Joined {
        /// Joined room
        room_id: String,
    },
    /// A text message was posted in a joined room by someone else
    Message {
        /// Message text
        body: String,
        /// Room of the message
        room_id: String,
        /// Matrix user ID of the author
        sender_id: String,
        /// Display name of the author in the room
        sender_name: String,
        /// Event ID of the message
        event_id: String,
    },
    /// The SDK reported an error; syncing goes on
    Error(String),
}
