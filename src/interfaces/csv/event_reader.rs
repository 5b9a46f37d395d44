use crate::error::{LedgerError, Result};
use crate::interfaces::channel::ChannelEvent;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum EventType {
    Message,
    Callback,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    user: String,
    kind: EventType,
    #[serde(default)]
    payload: String,
}

impl From<EventRecord> for ChannelEvent {
    fn from(record: EventRecord) -> Self {
        match record.kind {
            EventType::Message => ChannelEvent::message(record.user, record.payload),
            EventType::Callback => ChannelEvent::callback(record.user, record.payload),
        }
    }
}

/// Reads a script of channel events from a CSV source.
///
/// The header is `user,kind,payload` where `kind` is `message` or `callback`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes events, one per row.
    pub fn events(self) -> impl Iterator<Item = Result<ChannelEvent>> {
        self.reader
            .into_deserialize::<EventRecord>()
            .map(|result| result.map(ChannelEvent::from).map_err(LedgerError::from))
    }
}
