//! Matrix client synchronization and event handling.
//!
//! [`MatrixSync::sync`]:
//! 1. Performs an initial sync to catch up on offline events (especially invites)
//! 2. Sets up event handlers for auto-joining rooms and message processing
//! 3. Enters a continuous sync loop with automatic token persistence
//!
//! SDK events are translated into [`BotEvent`]s for the bot.

use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};
use matrix_sdk::{
    Client, LoopCtrl, Room, RoomState,
    config::SyncSettings,
    ruma::{
        api::client::filter::FilterDefinition,
        events::room::{
            member::StrippedRoomMemberEvent,
            message::{MessageType, OriginalSyncRoomMessageEvent},
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::matrix::{BotEvent, session::MatrixSession};

/// Pause before syncing again after a failed sync.
const SYNC_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Give up joining a room once the retry delay exceeds this many seconds.
const MAX_JOIN_DELAY: u64 = 3600;

/// Manages Matrix client synchronization and event processing.
pub struct MatrixSync {
    /// The matrix client
    client: Client,
    /// The matrix session
    session: MatrixSession,
}

impl MatrixSync {
    /// Creates a new MatrixSync instance.
    ///
    /// This does not start the synchronization process; call [`MatrixSync::sync`]
    /// to begin syncing.
    pub fn new(client: &Client, session: &MatrixSession) -> Self {
        MatrixSync {
            client: client.to_owned(),
            session: session.to_owned(),
        }
    }

    /// Starts the synchronization process and enters an infinite loop.
    ///
    /// Emits [`BotEvent::Connected`] once the initial sync succeeds, then
    /// [`BotEvent::Joined`] and [`BotEvent::Message`] as they happen. Failed
    /// syncs are reported as [`BotEvent::Error`] and retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK stops the sync loop.
    pub async fn sync<F>(&self, on_event: F) -> Result<()>
    where
        F: Fn(BotEvent) + Send + Sync + 'static,
    {
        info!("start syncing");

        let on_event = Arc::new(on_event);

        // Auto join rooms when invited
        self.client.add_event_handler({
            let on_event = Arc::clone(&on_event);
            move |room_member: StrippedRoomMemberEvent, client: Client, room: Room| {
                let on_event = Arc::clone(&on_event);
                async move { auto_join_room(room_member, client, room, on_event).await }
            }
        });

        // Enable room members lazy-loading
        // See <https://spec.matrix.org/v1.6/client-server-api/#lazy-loading-room-members>.
        let filter = FilterDefinition::with_lazy_loading();
        let mut sync_settings = SyncSettings::default().filter(filter.into());

        if let Some(sync_token) = self.session.sync_token() {
            sync_settings = sync_settings.token(sync_token);
        }

        // First sync to only get the invitation when the bot is offline
        let response = loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => break response,
                Err(e) => {
                    on_event(BotEvent::Error(format!("initial sync failed: {e}")));
                    sleep(SYNC_RETRY_DELAY).await;
                }
            }
        };
        self.persist_sync_token(response.next_batch.clone()).await;

        on_event(BotEvent::Connected);

        // Listen to incoming room messages. Because we are listening after the sync_once, we only get new messages.
        self.client.add_event_handler({
            let on_event = Arc::clone(&on_event);
            move |event: OriginalSyncRoomMessageEvent, room: Room, client: Client| {
                let on_event = Arc::clone(&on_event);
                async move { on_room_message(event, room, client, on_event).await }
            }
        });

        // Since we called `sync_once` before we entered our sync loop we must pass
        // that sync token to `sync_with_result_callback`
        sync_settings = sync_settings.token(response.next_batch);

        let on_event = &on_event;
        self.client
            .sync_with_result_callback(sync_settings, |sync_result| async move {
                match sync_result {
                    // We persist the token each time to be able to restore our session
                    Ok(response) => self.persist_sync_token(response.next_batch).await,
                    Err(e) => {
                        on_event(BotEvent::Error(e.to_string()));
                        sleep(SYNC_RETRY_DELAY).await;
                    }
                }

                Ok(LoopCtrl::Continue)
            })
            .await?;

        Ok(())
    }

    async fn persist_sync_token(&self, sync_token: String) {
        if let Err(err) = self.session.persist_sync_token(sync_token).await {
            error!("failed to persist sync token: {:?}", err);
        }
    }
}

/// Joins a room the bot is invited to, then emits [`BotEvent::Joined`].
///
/// # References
///
/// See <https://github.com/matrix-org/synapse/issues/4345> for the Synapse issue
/// that necessitates the retry logic.
async fn auto_join_room<F>(
    room_member: StrippedRoomMemberEvent,
    client: Client,
    room: Room,
    on_event: Arc<F>,
) where
    F: Fn(BotEvent) + Send + Sync + 'static,
{
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };

    // Ignore if the invite is not for us
    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.join().await {
            error!(
                "failed to join room {} ({err:?}), retrying in {delay}s",
                room.room_id()
            );

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > MAX_JOIN_DELAY {
                error!("can't join room {} ({err:?})", room.room_id());
                return;
            }
        }

        info!("successfully joined room {}", room.room_id());
        on_event(BotEvent::Joined {
            room_id: room.room_id().to_string(),
        });
    });
}

/// Turns a text message of a joined room into a [`BotEvent::Message`].
///
/// Messages from other rooms, non-text messages and the bot's own messages
/// are ignored.
async fn on_room_message<F>(
    event: OriginalSyncRoomMessageEvent,
    room: Room,
    client: Client,
    on_event: Arc<F>,
) where
    F: Fn(BotEvent) + Send + Sync + 'static,
{
    if room.state() != RoomState::Joined {
        return;
    }

    if client.user_id() == Some(&*event.sender) {
        return;
    }

    let MessageType::Text(text_content) = event.content.msgtype else {
        return;
    };

    let sender_name = match room.get_member_no_sync(&event.sender).await {
        Ok(Some(member)) => member.name().to_owned(),
        _ => event.sender.to_string(),
    };

    on_event(BotEvent::Message {
        body: text_content.body,
        room_id: room.room_id().to_string(),
        sender_id: event.sender.to_string(),
        sender_name,
        event_id: event.event_id.to_string(),
    });
}
