//! Compact textual summary of the world for a text generator.

use saga_sim::{SubsystemKey, WorldState};

/// Builds the bracket-tagged world context, one line per slice.
///
/// The first line is `[Date] ...`, followed by every other slice in document
/// order (`[Weather] ...`, `[Factions] ...`, ...). Never mutates the world.
#[must_use]
pub fn world_context(world: &WorldState) -> String {
    SubsystemKey::ALL
        .into_iter()
        .map(|key| format!("[{}] {}", key.tag(), world.subsystem(key).summary()))
        .collect::<Vec<_>>()
        .join("\n")
}
