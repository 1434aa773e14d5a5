//! Bot module wiring the Matrix client to the command dispatcher.
//!
//! The [`Bot`] receives [`BotEvent`]s from the Matrix sync loop and answers
//! them:
//!
//! - `Connected` - logs that the bot is online
//! - `Joined` - sends the greeting to the room
//! - `Message` - queues the message for its room
//! - `Error` - logs the error; the SDK keeps syncing
//!
//! # Command Processing Flow
//!
//! ```text
//! Matrix Message → RoomQueues::push → room worker
//!                                        │
//!                                        ▼
//!                  Commander::parse → Dispatcher::dispatch → Send Replies
//! ```
//!
//! Every room has its own queue, consumed by a single worker task that owns
//! the room's [`Dispatcher`]. Messages of a room are therefore handled one at
//! a time in arrival order, and the unknown-command count of one room never
//! leaks into another.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use log::{debug, error, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::SendError};

use crate::{
    commands::{
        CommandParseError, Commander, Dispatcher, Registry, StdRandom, random::RandomSource,
        text_response::format_greeting,
    },
    config::Config,
    matrix::{BotEvent, MatrixClient, UserCredentials},
};

/// A message waiting in its room queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Message text
    pub body: String,
    /// Matrix user ID of the author, used to reply
    pub sender_id: String,
    /// Display name of the author
    pub sender_name: String,
    /// Event ID of the message, used to reply
    pub event_id: String,
}

/// Message queues of every room the bot talks in, created on first use.
#[derive(Default)]
pub struct RoomQueues {
    /// Sending end of the queue of each room ID
    queues: HashMap<String, UnboundedSender<IncomingMessage>>,
}

impl RoomQueues {
    /// Creates an empty set of queues.
    pub fn new() -> Self {
        RoomQueues {
            queues: HashMap::new(),
        }
    }

    /// Appends `message` to the queue of `room_id`.
    ///
    /// # Arguments
    ///
    /// * `room_id` - Room the message was posted in
    /// * `message` - The message to answer
    ///
    /// # Returns
    ///
    /// * `Some(receiver)` - A queue was created for this room, holding
    ///   `message`; the caller must start a worker consuming `receiver`
    /// * `None` - The message joined the queue of a running worker
    ///
    /// A queue whose worker has stopped is replaced by a new one.
    pub fn push(
        &mut self,
        room_id: &str,
        message: IncomingMessage,
    ) -> Option<UnboundedReceiver<IncomingMessage>> {
        let message = match self.queues.get(room_id) {
            Some(sender) => match sender.send(message) {
                Ok(()) => return None,
                Err(SendError(message)) => {
                    warn!("message worker of room {} stopped, restarting it", room_id);
                    message
                }
            },
            None => message,
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        // The receiver is alive, so the send cannot fail
        let _ = sender.send(message);
        self.queues.insert(room_id.to_owned(), sender);

        Some(receiver)
    }
}

/// Shared state handed to the event callback and the room workers.
#[derive(Clone)]
struct EventContext {
    /// Matrix client used to answer
    matrix_client: Arc<MatrixClient>,
    /// Message parser
    commander: Arc<Commander>,
    /// Command table shared by every dispatcher
    registry: Arc<Registry>,
    /// Per-room queues, only locked to push a message
    queues: Arc<Mutex<RoomQueues>>,
}

/// Main bot structure.
pub struct Bot {
    /// Matrix client for sending and receiving messages.
    matrix_client: Arc<MatrixClient>,

    /// Message parser, stateless and safely shared.
    commander: Arc<Commander>,

    /// Command table, immutable and shared by every room.
    registry: Arc<Registry>,

    /// Per-room message queues.
    ///
    /// Wrapped in a std `Mutex` because it is filled from the synchronous
    /// event callback; the lock is never held across an `.await`.
    queues: Arc<Mutex<RoomQueues>>,
}

impl Bot {
    /// Creates a new Bot from the configuration, logging in to Matrix.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration; `bot` gives the account and the
    ///   name to answer to, `session` the directory of the Matrix session
    ///
    /// # Errors
    ///
    /// Returns an error if the Matrix client cannot be set up (invalid
    /// credentials, network unreachable, unusable session directory).
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let matrix_client = Arc::new(
            MatrixClient::new(
                &UserCredentials {
                    user_id: config.bot.user_id,
                    password: config.bot.token,
                },
                &config.session.dir,
                &config.bot.name,
            )
            .await?,
        );

        Ok(Bot {
            matrix_client,
            commander: Arc::new(Commander::new(&config.bot.name)),
            registry: Arc::new(Registry::new()),
            queues: Arc::new(Mutex::new(RoomQueues::new())),
        })
    }

    /// Starts syncing and answering. Runs until the process is terminated.
    pub async fn start(self) {
        info!("answering to !{}", self.commander.name());

        let ctx = EventContext {
            matrix_client: Arc::clone(&self.matrix_client),
            commander: Arc::clone(&self.commander),
            registry: Arc::clone(&self.registry),
            queues: Arc::clone(&self.queues),
        };

        self.matrix_client
            .sync(move |event| Self::handle_event(&ctx, event))
            .await;
    }

    /// Handles an event from the sync loop.
    ///
    /// Nothing here waits on the network: replies are sent from spawned tasks
    /// so the sync loop is never blocked.
    fn handle_event(ctx: &EventContext, event: BotEvent) {
        match event {
            BotEvent::Connected => on_connect(),
            BotEvent::Error(e) => on_error(&e),
            BotEvent::Joined { room_id } => {
                let matrix_client = Arc::clone(&ctx.matrix_client);
                tokio::spawn(async move {
                    matrix_client.send_message(&room_id, &on_hello()).await;
                });
            }
            BotEvent::Message {
                body,
                room_id,
                sender_id,
                sender_name,
                event_id,
            } => {
                let message = IncomingMessage {
                    body,
                    sender_id,
                    sender_name,
                    event_id,
                };

                let receiver = ctx
                    .queues
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(&room_id, message);

                if let Some(receiver) = receiver {
                    tokio::spawn(run_room(ctx.clone(), room_id, receiver));
                }
            }
        }
    }
}

/// Answers the messages of one room, in order, until its queue is closed.
async fn run_room(
    ctx: EventContext,
    room_id: String,
    mut inbox: UnboundedReceiver<IncomingMessage>,
) {
    debug!("starting message worker for room {}", room_id);
    let mut dispatcher = Dispatcher::new(Arc::clone(&ctx.registry), StdRandom::new());

    while let Some(message) = inbox.recv().await {
        let replies = answer(
            &ctx.commander,
            &mut dispatcher,
            &message.body,
            &message.sender_name,
        );

        for reply in replies.unwrap_or_default() {
            ctx.matrix_client
                .send_reply(&room_id, &message.sender_id, &message.event_id, &reply)
                .await;
        }
    }

    debug!("message worker for room {} stopped", room_id);
}

/// Computes the replies to a message.
///
/// # Arguments
///
/// * `commander` - Parser recognizing the messages addressed to the bot
/// * `dispatcher` - Dispatcher of the room the message was posted in
/// * `body` - Message text
/// * `sender_name` - Display name of the author
///
/// # Returns
///
/// * `Some(replies)` - The message is a command for the bot
/// * `None` - Any other message; the failure count is left untouched
pub fn answer<R: RandomSource>(
    commander: &Commander,
    dispatcher: &mut Dispatcher<R>,
    body: &str,
    sender_name: &str,
) -> Option<Vec<String>> {
    let event = match commander.parse(body, sender_name) {
        Ok(event) => event,
        Err(CommandParseError::UnableToParse) | Err(CommandParseError::NotForBot) => return None,
    };

    Some(dispatcher.dispatch(&event))
}

/// Called once the bot is connected.
pub fn on_connect() {
    info!("bot successfully connected to matrix");
}

/// Called when the bot joins a room; returns the greeting to send.
pub fn on_hello() -> String {
    debug!("executed hello handler");
    format_greeting()
}

/// Called for errors reported by the Matrix SDK.
pub fn on_error(error: &str) {
    error!("got error from matrix api: {}", error);
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::commands::{
        random::MockRandomSource,
        text_response::{ESCALATION_MESSAGES, format_help, format_unknown_command},
    };

    fn create_dispatcher() -> Dispatcher<StdRandom> {
        Dispatcher::new(Arc::new(Registry::new()), StdRandom::seeded(3))
    }

    fn message(body: &str) -> IncomingMessage {
        IncomingMessage {
            body: body.to_string(),
            sender_id: "@alice:example.com".to_string(),
            sender_name: "Alice".to_string(),
            event_id: "$event".to_string(),
        }
    }

    #[test]
    fn test_answer_ignores_regular_messages() {
        let commander = Commander::new("roller");
        let mut dispatcher = create_dispatcher();

        let result = answer(&commander, &mut dispatcher, "hello everyone", "Alice");
        assert!(result.is_none());
        assert_eq!(dispatcher.failures().misses(), 0);
    }

    #[test]
    fn test_answer_ignores_other_bots() {
        let commander = Commander::new("roller");
        let mut dispatcher = create_dispatcher();

        let result = answer(&commander, &mut dispatcher, "!dicer help", "Alice");
        assert!(result.is_none());
    }

    #[test]
    fn test_answer_help() {
        let commander = Commander::new("roller");
        let mut dispatcher = create_dispatcher();

        let result = answer(&commander, &mut dispatcher, "!roller help", "Alice");
        assert_eq!(result, Some(vec![format_help()]));
    }

    #[test]
    fn test_answer_roll() {
        let commander = Commander::new("roller");
        let mut dispatcher = create_dispatcher();

        let replies = answer(&commander, &mut dispatcher, "!roller roll 12 5", "Alice").unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("Кубик брошен. Выпало "));
        assert_eq!(replies[0].matches('*').count(), 10);
    }

    #[test]
    fn test_answer_roll_with_negative_sides() {
        let commander = Commander::new("roller");
        let mut random = MockRandomSource::new();
        // Sides clamped to 2, count kept at 3
        random
            .expect_below()
            .with(eq(2))
            .times(3)
            .return_const(1usize);
        let mut dispatcher = Dispatcher::new(Arc::new(Registry::new()), random);

        let replies = answer(&commander, &mut dispatcher, "!roller roll -5 3", "Alice");
        assert_eq!(
            replies,
            Some(vec!["Кубик брошен. Выпало *2*, *2*, *2*.".to_string()])
        );
    }

    #[test]
    fn test_answer_sample_with_quoted_option() {
        let commander = Commander::new("roller");
        let mut random = MockRandomSource::new();
        random
            .expect_below()
            .with(eq(3))
            .times(1)
            .return_const(2usize);
        let mut dispatcher = Dispatcher::new(Arc::new(Registry::new()), random);

        let replies = answer(
            &commander,
            &mut dispatcher,
            r#"!roller sample Вася Петя "Нина Ивановна""#,
            "Alice",
        );
        assert_eq!(replies, Some(vec!["Я выбрал *Нина Ивановна*.".to_string()]));
    }

    #[test]
    fn test_answer_escalates_after_three_misses() {
        let commander = Commander::new("roller");
        let mut dispatcher = create_dispatcher();

        for _ in 0..3 {
            let replies = answer(&commander, &mut dispatcher, "!roller qqq", "Alice");
            assert_eq!(replies, Some(vec![format_unknown_command()]));
        }

        let replies = answer(&commander, &mut dispatcher, "!roller qqq", "Alice").unwrap();
        assert!(ESCALATION_MESSAGES.contains(&replies[0].as_str()));

        // Chat between commands does not reset the count
        answer(&commander, &mut dispatcher, "what?", "Alice");
        assert_eq!(dispatcher.failures().misses(), 4);
    }

    #[test]
    fn test_room_queues_first_message_creates_queue() {
        let mut queues = RoomQueues::new();

        let mut receiver = queues.push("!room:example.com", message("!roller roll")).unwrap();
        assert_eq!(receiver.try_recv().unwrap(), message("!roller roll"));
    }

    #[test]
    fn test_room_queues_keep_arrival_order() {
        let mut queues = RoomQueues::new();

        let mut receiver = queues.push("!room:example.com", message("!roller qqq")).unwrap();
        assert!(queues.push("!room:example.com", message("!roller help")).is_none());
        assert!(queues.push("!room:example.com", message("!roller zzz")).is_none());

        assert_eq!(receiver.try_recv().unwrap(), message("!roller qqq"));
        assert_eq!(receiver.try_recv().unwrap(), message("!roller help"));
        assert_eq!(receiver.try_recv().unwrap(), message("!roller zzz"));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_room_queues_are_separate() {
        let mut queues = RoomQueues::new();

        let mut first = queues.push("!first:example.com", message("one")).unwrap();
        let mut second = queues.push("!second:example.com", message("two")).unwrap();

        assert_eq!(first.try_recv().unwrap(), message("one"));
        assert!(first.try_recv().is_err());
        assert_eq!(second.try_recv().unwrap(), message("two"));
    }

    #[test]
    fn test_room_queues_replace_stopped_worker() {
        let mut queues = RoomQueues::new();

        let receiver = queues.push("!room:example.com", message("one")).unwrap();
        drop(receiver);

        let mut receiver = queues.push("!room:example.com", message("two")).unwrap();
        assert_eq!(receiver.try_recv().unwrap(), message("two"));
    }

    #[test]
    fn test_room_workers_do_not_share_failures() {
        let commander = Commander::new("roller");
        let registry = Arc::new(Registry::new());
        let mut first = Dispatcher::new(Arc::clone(&registry), StdRandom::seeded(1));
        let mut second = Dispatcher::new(Arc::clone(&registry), StdRandom::seeded(2));

        for _ in 0..4 {
            answer(&commander, &mut first, "!roller qqq", "Alice");
        }

        let replies = answer(&commander, &mut second, "!roller qqq", "Bob");
        assert_eq!(replies, Some(vec![format_unknown_command()]));
        assert_eq!(first.failures().misses(), 4);
        assert_eq!(second.failures().misses(), 1);
    }

    #[test]
    fn test_on_hello() {
        assert_eq!(on_hello(), "Всем чмоке в этом чате!");
    }
}
