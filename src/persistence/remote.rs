//! Remote feed mode
//!
//! Outbound changes are pushed to the feed and never rendered locally; ideas
//! appear only when the feed echoes them back as `Added`. That keeps the feed
//! the single source of truth and rules out double renders.

use std::collections::{BTreeMap, VecDeque};

use super::PersistError;
use super::snapshot::IdeaRecord;

/// Notification from the feed
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    Added { key: String, record: IdeaRecord },
    Removed { key: String },
}

/// Push/subscribe collaborator (a real-time database in production)
pub trait RemoteFeed {
    /// Append a record; the feed assigns its key and echoes `Added`
    fn push(&mut self, record: IdeaRecord) -> Result<(), PersistError>;
    /// Delete the record stored under `key`; the feed echoes `Removed`
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
    /// Drain notifications received since the last poll, in arrival order
    fn poll_events(&mut self) -> Vec<RemoteEvent>;
}

/// Wraps the feed for the board
pub struct RemoteBridge {
    feed: Box<dyn RemoteFeed>,
}

impl RemoteBridge {
    pub fn new(feed: Box<dyn RemoteFeed>) -> Self {
        Self { feed }
    }

    pub fn push(&mut self, record: IdeaRecord) {
        if let Err(e) = self.feed.push(record) {
            log::warn!("Remote push failed: {}", e);
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Err(e) = self.feed.remove(key) {
            log::warn!("Remote remove of {} failed: {}", key, e);
        }
    }

    pub fn poll_events(&mut self) -> Vec<RemoteEvent> {
        self.feed.poll_events()
    }
}

/// In-process feed that stores records and echoes every change back.
///
/// Events from other clients can be simulated with [`LoopbackFeed::inject`];
/// a disconnected feed holds its events until reconnected.
#[derive(Debug, Default)]
pub struct LoopbackFeed {
    records: BTreeMap<String, IdeaRecord>,
    pending: VecDeque<RemoteEvent>,
    next_key: u64,
    disconnected: bool,
}

impl LoopbackFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &BTreeMap<String, IdeaRecord> {
        &self.records
    }

    /// Queue an event as if another client caused it
    pub fn inject(&mut self, event: RemoteEvent) {
        match &event {
            RemoteEvent::Added { key, record } => {
                self.records.insert(key.clone(), record.clone());
            }
            RemoteEvent::Removed { key } => {
                self.records.remove(key);
            }
        }
        self.pending.push_back(event);
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.disconnected = !connected;
    }

    fn allocate_key(&mut self) -> String {
        self.next_key += 1;
        format!("idea-{:06}", self.next_key)
    }
}

impl RemoteFeed for LoopbackFeed {
    fn push(&mut self, record: IdeaRecord) -> Result<(), PersistError> {
        if self.disconnected {
            return Err(PersistError::Remote("feed disconnected".into()));
        }
        let key = self.allocate_key();
        self.inject(RemoteEvent::Added { key, record });
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        if self.disconnected {
            return Err(PersistError::Remote("feed disconnected".into()));
        }
        if self.records.contains_key(key) {
            self.inject(RemoteEvent::Removed {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<RemoteEvent> {
        if self.disconnected {
            return Vec::new();
        }
        self.pending.drain(..).collect()
    }
}

/// Shared handle so tests and hosts can inject events into a feed the board owns
impl<F: RemoteFeed + ?Sized> RemoteFeed for std::rc::Rc<std::cell::RefCell<F>> {
    fn push(&mut self, record: IdeaRecord) -> Result<(), PersistError> {
        self.borrow_mut().push(record)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.borrow_mut().remove(key)
    }

    fn poll_events(&mut self) -> Vec<RemoteEvent> {
        self.borrow_mut().poll_events()
    }
}
