//! # Saga Common
//!
//! Common types, utilities, and shared abstractions for Project Saga.
//!
//! This crate provides foundational types used across all Saga subsystems:
//! - The injectable random source and weighted draws
//! - Version information for the persisted world schema
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod rng;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::rng::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_is_a_random_source() {
        let mut rng: Box<dyn RandomSource> = Box::new(ScriptedRandom::new(vec![0.25]));
        assert!((rng.next_f64() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = SchemaVersion::new(1, 0, 0);
        let v2 = SchemaVersion::new(1, 1, 0);
        let v3 = SchemaVersion::new(2, 0, 0);

        // v2 can read v1 data (newer version reading older data)
        assert!(v2.is_compatible_with(&v1));
        // Different major versions are incompatible
        assert!(!v1.is_compatible_with(&v3));
    }
}
