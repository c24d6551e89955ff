//! # Saga World
//!
//! World persistence for Project Saga.
//!
//! This crate handles:
//! - Durable key-value stores (in-memory and file-backed)
//! - Schema-reconciling deep merge of saved documents over defaults
//! - Loading, saving and resetting the persisted world document

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod merge;
pub mod persistence;
pub mod store;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::merge::*;
    pub use crate::persistence::*;
    pub use crate::store::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use saga_sim::WorldState;

    #[test]
    fn test_memory_store_backs_persistence() {
        let store = MemoryStore::new();
        let mut persistence: Persistence<WorldState, _> = Persistence::open(store.clone(), "world");
        persistence.state_mut().time.year = 3;
        persistence.save().expect("save");

        let reopened: Persistence<WorldState, _> = Persistence::open(store, "world");
        assert_eq!(reopened.state().time.year, 3);
    }
}
