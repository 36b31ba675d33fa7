//! Cross-session change notifications
//!
//! Every open session holds a [`BroadcastChannel`] obtained from the shared
//! [`BroadcastHub`]. Publishing on a channel reaches every other channel with
//! the same name, never the sender itself, in publish order. There are no
//! acknowledgements.
//!
//! Delivery is asynchronous: each subscription runs on a local task, so
//! `subscribe` must be called from inside a `tokio::task::LocalSet`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::models::NoteId;

/// Name of the channel the app publishes note mutations on
pub const CHANNEL_NAME: &str = "notes-app";

/// Buffered events per channel before slow subscribers start lagging
const CHANNEL_CAPACITY: usize = 64;

/// What happened to a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Message exchanged between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(rename = "noteId", default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<NoteId>,
}

impl BroadcastEvent {
    pub fn created(id: NoteId) -> Self {
        Self {
            kind: ChangeKind::Created,
            note_id: Some(id),
        }
    }

    pub fn updated(id: NoteId) -> Self {
        Self {
            kind: ChangeKind::Updated,
            note_id: Some(id),
        }
    }

    pub fn deleted(id: NoteId) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            note_id: Some(id),
        }
    }
}

#[derive(Debug, Clone)]
struct Envelope {
    origin: u64,
    event: BroadcastEvent,
}

/// Registry of named channels shared by all sessions of one process
#[derive(Clone, Default)]
pub struct BroadcastHub {
    senders: Rc<RefCell<HashMap<String, broadcast::Sender<Envelope>>>>,
    next_id: Rc<Cell<u64>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel endpoint for one session
    pub fn channel(&self, name: &str) -> BroadcastChannel {
        let sender = self
            .senders
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone();

        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        BroadcastChannel {
            id,
            name: name.to_string(),
            sender,
        }
    }
}

/// One session's endpoint on a named channel
pub struct BroadcastChannel {
    id: u64,
    name: String,
    sender: broadcast::Sender<Envelope>,
}

impl BroadcastChannel {
    /// Channel name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send an event to every other endpoint on this channel
    pub fn publish(&self, event: BroadcastEvent) {
        debug!("Broadcast on {}: {:?}", self.name, event);
        let envelope = Envelope {
            origin: self.id,
            event,
        };
        if self.sender.send(envelope).is_err() {
            trace!("No subscribers on {}", self.name);
        }
    }

    /// Call `handler` for every event published by other endpoints
    ///
    /// Delivery stops when the returned [`Subscription`] is dropped or
    /// unsubscribed.
    #[must_use = "dropping the subscription stops delivery"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(BroadcastEvent) + 'static,
    {
        let mut rx = self.sender.subscribe();
        let origin = self.id;
        let name = self.name.clone();

        let task = tokio::task::spawn_local(async move {
            loop {
                match rx.recv().await {
                    Ok(envelope) if envelope.origin == origin => {}
                    Ok(envelope) => handler(envelope.event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Subscriber on {} missed {} events", name, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Subscription { task: Some(task) }
    }
}

/// Handle that keeps a subscription alive
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop delivery
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
