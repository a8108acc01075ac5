//! Correlation channel registry.
//!
//! Maps an integer correlation ID to the output channel of one in-flight
//! engine call. The producer side pushes chunks under the ID; whichever
//! handler opened the channel drains it. IDs are monotonically issued and
//! never reused for the lifetime of the process, so a late push from a
//! finished call can never land in a newly opened channel.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;

/// Correlation ID for one in-flight engine call. Always positive; 0 is
/// never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Raw integer value, as handed to the engine.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One event on a correlation channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A partial-result fragment produced by the engine.
    Chunk(String),
    /// An error frame; streaming framings other than NDJSON abort on it.
    Error(String),
}

/// Receiving half of a correlation channel.
pub type StreamReceiver = mpsc::UnboundedReceiver<StreamEvent>;

struct Inner {
    next_id: u64,
    channels: HashMap<u64, mpsc::UnboundedSender<StreamEvent>>,
}

/// Registry of open correlation channels.
///
/// Constructed explicitly and injected — there is no ambient singleton, so
/// tests can instantiate isolated registries. One mutex guards allocation,
/// push lookup and teardown; allocation and teardown happen at HTTP request
/// rate, only the lookup inside [`push`](Self::push) runs at token rate.
pub struct ChannelRegistry {
    inner: Mutex<Inner>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    /// Create an empty registry. IDs start at 1.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 0,
                channels: HashMap::new(),
            }),
        }
    }

    /// Allocate the next correlation ID and register a fresh channel.
    ///
    /// Returns `None` only if the freshly allocated ID is somehow already
    /// registered; IDs are never recycled, so this cannot happen in correct
    /// usage.
    pub fn open(&self) -> Option<(ChannelId, StreamReceiver)> {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        inner.next_id += 1;
        let id = inner.next_id;
        if inner.channels.contains_key(&id) {
            tracing::error!(id, "correlation id already registered");
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        inner.channels.insert(id, tx);
        Some((ChannelId(id), rx))
    }

    /// Push an event into the channel registered under `id`.
    ///
    /// Best-effort: if the channel was already closed or the receiver is
    /// gone, the event is silently dropped. Producers may race with
    /// teardown; that is not an error.
    pub fn push(&self, id: ChannelId, event: StreamEvent) {
        let sender = {
            let inner = self.inner.lock().expect("registry mutex poisoned");
            inner.channels.get(&id.0).cloned()
        };
        if let Some(sender) = sender {
            // Receiver may have been dropped by a disconnected client.
            let _ = sender.send(event);
        }
    }

    /// Close the channel registered under `id` and remove it.
    ///
    /// Dropping the sender ends the receiver's drain loop; the ID is never
    /// issued again. Closing an unknown ID is a no-op.
    pub fn close(&self, id: ChannelId) {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        inner.channels.remove(&id.0);
    }

    /// Number of currently open channels.
    pub fn open_count(&self) -> usize {
        self.inner.lock().expect("registry mutex poisoned").channels.len()
    }
}
