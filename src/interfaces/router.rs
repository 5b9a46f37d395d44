use crate::application::engine::ConversationEngine;
use crate::application::reply::Reply;
use crate::domain::event::{Event, EventKind, Selection};
use crate::error::LedgerError;
use crate::interfaces::channel::{ChannelEvent, ReplyDirective};
use crate::interfaces::render::render;

const START_COMMAND: &str = "start";

/// Maps a channel update onto the state machine's event vocabulary.
///
/// Returns `None` for callback data outside the known selection codes.
pub fn route(event: ChannelEvent) -> Option<Event> {
    match event {
        ChannelEvent::Message { user_id, text } => {
            let kind = match text.trim_start().strip_prefix('/') {
                Some(command) => {
                    // "/start payload" and "/start@SomeBot" are both the start command.
                    let name = command
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .split('@')
                        .next()
                        .unwrap_or_default();
                    if name == START_COMMAND {
                        EventKind::Start
                    } else {
                        EventKind::Command(name.to_string())
                    }
                }
                None => EventKind::Text(text),
            };
            Some(Event::new(user_id, kind))
        }
        ChannelEvent::Callback { user_id, data } => match Selection::parse(&data) {
            Some(selection) => Some(Event::select(user_id, selection)),
            None => {
                tracing::warn!(%user_id, %data, "unknown selection code");
                None
            }
        },
    }
}

/// Entry point for channel updates.
///
/// Each call is isolated: whatever goes wrong while handling one update is
/// turned into a reply for that user and never escapes to the caller.
pub struct DispatchRouter {
    engine: ConversationEngine,
}

impl DispatchRouter {
    pub fn new(engine: ConversationEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    /// Handles one update and returns what to send back, if anything.
    pub async fn dispatch(&self, event: ChannelEvent) -> Option<ReplyDirective> {
        let event = route(event)?;
        let user_id = event.user_id.clone();

        let reply = match self.engine.handle(event).await {
            Ok(reply) => reply?,
            Err(LedgerError::MissingProfile(_)) => {
                tracing::warn!(%user_id, "event needs a profile that does not exist");
                Reply::RestartRequired
            }
            Err(LedgerError::ExpenseNotFound(id)) => {
                tracing::warn!(%user_id, expense_id = id, "stale expense reference");
                Reply::ExpenseNotFound
            }
            Err(e) => {
                tracing::error!(%user_id, error = %e, "failed to handle event");
                if e.is_persistence() {
                    Reply::RetryLater
                } else {
                    Reply::RestartRequired
                }
            }
        };

        Some(render(&reply))
    }
}
