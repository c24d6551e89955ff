//! # Saga Engine
//!
//! Drives the simulated world forward for Project Saga.
//!
//! This crate ties together all subsystems:
//! - Sim: calendar, weather and the domain slices
//! - World: persistence and schema reconciliation
//! - Engine: tick scheduling, signal routing, change notifications and the
//!   world context handed to a text generator

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod context;
pub mod controller;
pub mod notify;
pub mod schedule;
pub mod shared;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::context::*;
    pub use crate::controller::*;
    pub use crate::notify::*;
    pub use crate::shared::*;
}

pub use prelude::*;
