//! Thread-safe handle to a [`WorldEngine`].
//!
//! One advance runs at a time: every call takes the engine lock for its
//! whole duration.

use crossbeam_channel::Receiver;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use saga_common::SagaResult;
use saga_world::KeyValueStore;

use crate::controller::{TickReport, TimeDelta, WorldEngine};
use crate::notify::WorldChanged;

/// Cloneable, lockable engine handle.
pub struct SharedEngine<S> {
    inner: Arc<Mutex<WorldEngine<S>>>,
}

impl<S> Clone for SharedEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore> SharedEngine<S> {
    /// Wraps an engine.
    #[must_use]
    pub fn new(engine: WorldEngine<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// See [`WorldEngine::advance`].
    pub fn advance(&self, delta: TimeDelta) -> SagaResult<TickReport> {
        self.inner.lock().advance(delta)
    }

    /// See [`WorldEngine::world_context`].
    #[must_use]
    pub fn world_context(&self) -> String {
        self.inner.lock().world_context()
    }

    /// See [`WorldEngine::reset_state`].
    pub fn reset_state(&self) -> SagaResult<()> {
        self.inner.lock().reset_state()
    }

    /// See [`WorldEngine::subscribe`].
    pub fn subscribe(&self) -> Receiver<WorldChanged> {
        self.inner.lock().subscribe()
    }

    /// Locks the engine for direct access.
    pub fn lock(&self) -> MutexGuard<'_, WorldEngine<S>> {
        self.inner.lock()
    }
}
