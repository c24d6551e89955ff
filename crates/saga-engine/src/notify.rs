//! "World changed" notifications.
//!
//! Every subscriber gets its own bounded channel. Publishing never blocks:
//! a subscriber whose channel is full misses that notification, and one whose
//! receiver was dropped is removed.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use saga_sim::CalendarDate;

/// Why the world changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// Time was advanced
    Advanced,
    /// The world was reset to defaults
    Reset,
    /// A driver mutated the world directly and committed it
    Committed,
}

/// Notification published after the world is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldChanged {
    /// What caused the change
    pub reason: ChangeReason,
    /// Date after the change
    pub date: CalendarDate,
    /// Hour after the change
    pub hour: u32,
    /// Save time recorded in the document (unix seconds)
    pub last_updated: u64,
}

/// Fan-out of [`WorldChanged`] notifications.
#[derive(Debug)]
pub struct ChangeFeed {
    subscribers: Vec<Sender<WorldChanged>>,
    capacity: usize,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ChangeFeed {
    /// Creates a feed whose subscribers each buffer up to `capacity` notifications.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&mut self) -> Receiver<WorldChanged> {
        let (sender, receiver) = bounded(self.capacity);
        self.subscribers.push(sender);
        receiver
    }

    /// Sends `change` to every subscriber. Returns how many received it.
    pub fn publish(&mut self, change: WorldChanged) -> usize {
        let mut delivered = 0;
        self.subscribers
            .retain(|sender| match sender.try_send(change) {
                Ok(()) => {
                    delivered += 1;
                    true
                },
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Change subscriber is full, skipping");
                    true
                },
                Err(TrySendError::Disconnected(_)) => false,
            });
        delivered
    }

    /// Returns the number of live subscribers (as of the last publish).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns the per-subscriber capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
