//! Matrix client wrapper for bot messaging and synchronization.
//!
//! This module provides a high-level [`MatrixClient`] interface that wraps the
//! Matrix SDK client and handles login, message sending and synchronization.

use anyhow::Context;
use log::{debug, error, info};
use matrix_sdk::{
    Client,
    ruma::{
        EventId, OwnedUserId, RoomId, UserId,
        events::room::message::{
            AddMentions, ForwardThread, ReplyMetadata, RoomMessageEventContent,
        },
    },
};

use crate::matrix::{BotEvent, UserCredentials, session::MatrixSession, sync::MatrixSync};

/// High-level Matrix client for bot messaging operations.
pub struct MatrixClient {
    /// Synchronization service for handling real-time events
    matrix_sync: MatrixSync,
    /// Underlying Matrix SDK client
    client: Client,
}

impl MatrixClient {
    /// Creates a logged-in Matrix client.
    ///
    /// The session stored in `session_dir` is restored when present, otherwise
    /// the bot logs in with its password and stores the new session.
    ///
    /// # Arguments
    ///
    /// * `user_credentials` - User ID and password of the bot account
    /// * `session_dir` - Directory for the session file and the SQLite store
    /// * `display_name` - Display name set on the account
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session directory cannot be used
    /// - Login or session restoration fails
    /// - The display name cannot be set
    pub async fn new(
        user_credentials: &UserCredentials,
        session_dir: &str,
        display_name: &str,
    ) -> Result<Self, anyhow::Error> {
        let matrix_session = MatrixSession::load(session_dir)
            .await
            .context("failed to open matrix session")?;

        let client = setup_client(user_credentials, &matrix_session)
            .await
            .context("failed to setup matrix client")?;

        client
            .account()
            .set_display_name(Some(display_name))
            .await?;

        let matrix_sync = MatrixSync::new(&client, &matrix_session);

        Ok(MatrixClient {
            matrix_sync,
            client,
        })
    }

    /// Starts the Matrix synchronization loop.
    ///
    /// # Arguments
    ///
    /// * `on_event` - Callback invoked for every [`BotEvent`], in the order the
    ///   SDK delivers them. It must not block: it runs inside the sync loop.
    ///
    /// The loop runs until the process is terminated; errors are reported as
    /// [`BotEvent::Error`] and the outcome of the loop itself is logged.
    pub async fn sync<F>(&self, on_event: F)
    where
        F: Fn(BotEvent) + Send + Sync + 'static,
    {
        match self.matrix_sync.sync(on_event).await {
            Ok(_) => info!("matrix sync ended successfully"),
            Err(e) => error!("matrix sync ended with error: {:?}", e),
        }
    }

    /// Sends a reply to a specific message.
    ///
    /// # Arguments
    ///
    /// * `room_id` - The Matrix room ID where the reply should be sent
    /// * `sender_id` - The user ID of the original message sender
    /// * `event_id` - The event ID of the message being replied to
    /// * `body` - The reply content (supports Markdown formatting)
    ///
    /// Invalid IDs and send failures are logged, never returned.
    pub async fn send_reply(&self, room_id: &str, sender_id: &str, event_id: &str, body: &str) {
        let (Ok(sender), Ok(event)) = (UserId::parse(sender_id), EventId::parse(event_id)) else {
            error!("can't reply to {} from {}", event_id, sender_id);
            return;
        };

        let content = RoomMessageEventContent::text_markdown(body).make_reply_to(
            ReplyMetadata::new(&event, &sender, None),
            ForwardThread::No,
            AddMentions::No,
        );

        self.send(room_id, content).await;
    }

    /// Sends a standalone message to a room.
    ///
    /// # Arguments
    ///
    /// * `room_id` - The Matrix room ID
    /// * `body` - The message content (supports Markdown formatting)
    ///
    /// Failures are logged, never returned.
    pub async fn send_message(&self, room_id: &str, body: &str) {
        self.send(room_id, RoomMessageEventContent::text_markdown(body))
            .await;
    }

    /// Internal helper to send message content to a room.
    ///
    /// The room must be known to the client, i.e. joined during a sync.
    async fn send(&self, room_id: &str, content: RoomMessageEventContent) {
        let Ok(room_id_obj) = RoomId::parse(room_id) else {
            error!("invalid room id {}", room_id);
            return;
        };

        let Some(room) = self.client.get_room(&room_id_obj) else {
            error!("unknown room {}", room_id);
            return;
        };

        if let Err(e) = room.send(content).await {
            error!("Failed to send message: {:?}", e);
        }
    }
}

/// Logs in, or restores the stored session.
///
/// # Arguments
///
/// * `user_credentials` - Account used for a fresh login
/// * `matrix_session` - Session directory; a stored session skips the login
///
/// # Returns
///
/// A client backed by the SQLite store of the session directory, with a
/// valid session. A fresh session is persisted before returning.
async fn setup_client(
    user_credentials: &UserCredentials,
    matrix_session: &MatrixSession,
) -> Result<Client, anyhow::Error> {
    info!(
        "setting up matrix client for user {}",
        user_credentials.user_id
    );

    let user_id: OwnedUserId = user_credentials.user_id.clone().try_into()?;
    let client = Client::builder()
        .server_name(user_id.server_name())
        .sqlite_store(matrix_session.sqlite_path(), None)
        .build()
        .await?;

    debug!("matrix client created");

    if let Some(user_session) = matrix_session.user_session() {
        info!("restoring matrix session from disk");
        client.restore_session(user_session.clone()).await?;
        info!("matrix session restored successfully");
        return Ok(client);
    }

    client
        .matrix_auth()
        .login_username(&user_id, &user_credentials.password)
        .initial_device_display_name("roller bot")
        .send()
        .await?;

    let Some(user_session) = client.matrix_auth().session() else {
        anyhow::bail!("no session after login");
    };
    matrix_session
        .persist_user_session(&user_session)
        .await
        .context("error persisting user session")?;

    info!("matrix client setup complete");
    Ok(client)
}
