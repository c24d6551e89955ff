//! Fixed tick order per cadence.
//!
//! A subsystem later in a list sees the effects of the ones before it on the
//! same date, so the order is part of the simulation's behavior.

use saga_sim::{Cadence, CalendarDate, SubsystemKey};

/// Daily cascade, run for every date entered.
pub const DAILY_ORDER: [SubsystemKey; 7] = [
    SubsystemKey::Events,
    SubsystemKey::Economy,
    SubsystemKey::Weather,
    SubsystemKey::Catastrophes,
    SubsystemKey::Rumors,
    SubsystemKey::Civilians,
    SubsystemKey::Npcs,
];

/// Weekly cascade, run when the day entered is a multiple of seven.
pub const WEEKLY_ORDER: [SubsystemKey; 7] = [
    SubsystemKey::Events,
    SubsystemKey::Factions,
    SubsystemKey::Tensions,
    SubsystemKey::Wars,
    SubsystemKey::Crime,
    SubsystemKey::Catastrophes,
    SubsystemKey::Reputation,
];

/// Monthly cascade, run when the day entered is the first of a month.
pub const MONTHLY_ORDER: [SubsystemKey; 5] = [
    SubsystemKey::Dungeons,
    SubsystemKey::Dynasties,
    SubsystemKey::Settlements,
    SubsystemKey::Divine,
    SubsystemKey::Prophecies,
];

/// Subsystems ticked for `cadence`, in order.
#[must_use]
pub fn order(cadence: Cadence) -> &'static [SubsystemKey] {
    match cadence {
        Cadence::Daily => &DAILY_ORDER,
        Cadence::Weekly => &WEEKLY_ORDER,
        Cadence::Monthly => &MONTHLY_ORDER,
    }
}

/// Cadences that fire on entering `date`, daily first.
#[must_use]
pub fn cadences_for(date: CalendarDate) -> Vec<Cadence> {
    let mut cadences = vec![Cadence::Daily];
    if date.is_week_boundary() {
        cadences.push(Cadence::Weekly);
    }
    if date.is_month_start() {
        cadences.push(Cadence::Monthly);
    }
    cadences
}
