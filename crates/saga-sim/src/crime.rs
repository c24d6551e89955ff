//! Crime rates and the incident log.
//!
//! Each settlement has a rate (0-100). The weekly tick drifts every rate and
//! rolls for incidents. Crossing [`CRIME_WAVE`] raises a crime-wave signal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::calendar::CalendarDate;
use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Rate at which a settlement is in the grip of a crime wave.
pub const CRIME_WAVE: i32 = 75;
/// Highest rate.
pub const MAX_RATE: i32 = 100;
/// Oldest incidents are dropped past this count.
pub const MAX_INCIDENTS: usize = 30;
/// Rate of a settlement seen for the first time.
const DEFAULT_RATE: i32 = 20;
/// Rate increase per reported crime.
const REPORT_BUMP: i32 = 5;
/// Weekly drift, upper bound exclusive.
const WEEKLY_DRIFT: (i64, i64) = (-2, 4);

const CRIMES: [&str; 5] = ["pickpocketing", "burglary", "smuggling", "arson", "murder"];

/// A reported crime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Where it happened
    pub settlement: String,
    /// What happened
    pub crime: String,
    /// When it happened
    pub date: CalendarDate,
}

/// Crime by settlement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrimeState {
    /// Rate by settlement name
    pub rates: BTreeMap<String, i32>,
    /// Recent incidents, oldest first
    pub incidents: Vec<Incident>,
}

impl CrimeState {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Crime rate in a settlement.
    #[must_use]
    pub fn rate(&self, settlement: &str) -> i32 {
        self.rates.get(settlement).copied().unwrap_or(DEFAULT_RATE)
    }

    fn rate_mut(&mut self, settlement: &str) -> &mut i32 {
        self.rates
            .entry(settlement.to_string())
            .or_insert(DEFAULT_RATE)
    }

    /// Logs a crime and nudges the local rate up.
    pub fn report_crime(&mut self, settlement: &str, crime: &str, date: CalendarDate) {
        let rate = self.rate_mut(settlement);
        *rate = rate.saturating_add(REPORT_BUMP).clamp(0, MAX_RATE);
        self.log(Incident {
            settlement: settlement.to_string(),
            crime: crime.to_string(),
            date,
        });
    }

    /// The watch cracks down. Returns the new rate.
    pub fn crackdown(&mut self, settlement: &str, strength: i32) -> i32 {
        let rate = self.rate_mut(settlement);
        *rate = rate.saturating_sub(strength.max(0)).clamp(0, MAX_RATE);
        *rate
    }

    fn log(&mut self, incident: Incident) {
        self.incidents.push(incident);
        if self.incidents.len() > MAX_INCIDENTS {
            let excess = self.incidents.len() - MAX_INCIDENTS;
            self.incidents.drain(..excess);
        }
    }

    /// Weekly drift and incident rolls. Returns settlements that entered a
    /// crime wave this week.
    pub fn weekly_update(&mut self, date: CalendarDate, rng: &mut dyn RandomSource) -> Vec<String> {
        let mut waves = Vec::new();
        let mut new_incidents = Vec::new();
        for (settlement, rate) in &mut self.rates {
            let before = *rate;
            let drift = rng.range_i64(WEEKLY_DRIFT.0, WEEKLY_DRIFT.1) as i32;
            *rate = rate.saturating_add(drift).clamp(0, MAX_RATE);
            if rng.chance(f64::from(*rate) / 200.0) {
                new_incidents.push(Incident {
                    settlement: settlement.clone(),
                    crime: CRIMES[rng.index(CRIMES.len())].to_string(),
                    date,
                });
            }
            if before < CRIME_WAVE && *rate >= CRIME_WAVE {
                waves.push(settlement.clone());
            }
        }
        for incident in new_incidents {
            self.log(incident);
        }
        waves
    }
}

impl Subsystem for CrimeState {
    fn name(&self) -> &'static str {
        "crime"
    }

    fn init(&mut self, _rng: &mut dyn RandomSource) {
        for rate in self.rates.values_mut() {
            *rate = (*rate).clamp(0, MAX_RATE);
        }
        if self.incidents.len() > MAX_INCIDENTS {
            let excess = self.incidents.len() - MAX_INCIDENTS;
            self.incidents.drain(..excess);
        }
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence != Cadence::Weekly {
            return Vec::new();
        }
        for location in ctx.locations {
            self.rate_mut(location);
        }
        self.weekly_update(ctx.date, ctx.rng)
            .into_iter()
            .map(|settlement| WorldSignal::CrimeWave { settlement })
            .collect()
    }

    fn summary(&self) -> String {
        if self.rates.is_empty() {
            return "The streets are quiet".to_string();
        }
        let rates = self
            .rates
            .iter()
            .map(|(name, rate)| format!("{name} {rate}"))
            .collect::<Vec<_>>()
            .join(", ");
        match self.incidents.last() {
            Some(latest) => format!(
                "Crime: {rates}. Latest: {} in {}",
                latest.crime, latest.settlement
            ),
            None => format!("Crime: {rates}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_common::ScriptedRandom;

    #[test]
    fn test_report_and_crackdown() {
        let mut crime = CrimeState::new();
        crime.report_crime("Ashford", "burglary", CalendarDate::default());
        assert_eq!(crime.rate("Ashford"), 25);
        assert_eq!(crime.crackdown("Ashford", 100), 0);
        assert_eq!(crime.crackdown("Ashford", -5), 0);
        assert_eq!(crime.incidents.len(), 1);
    }

    #[test]
    fn test_incident_log_is_bounded() {
        let mut crime = CrimeState::new();
        for _ in 0..(MAX_INCIDENTS + 3) {
            crime.report_crime("Ashford", "pickpocketing", CalendarDate::default());
        }
        assert_eq!(crime.incidents.len(), MAX_INCIDENTS);
        assert_eq!(crime.rate("Ashford"), MAX_RATE);
    }

    #[test]
    fn test_crime_wave_on_crossing() {
        let mut crime = CrimeState::new();
        crime.rates.insert("Ashford".to_string(), 73);
        // drift +3, no incident
        let mut rng = ScriptedRandom::new(vec![0.999_999, 0.99]);
        assert_eq!(
            crime.weekly_update(CalendarDate::new(1, 1, 7), &mut rng),
            vec!["Ashford".to_string()]
        );
        // already in a wave: no new signal
        assert!(crime
            .weekly_update(CalendarDate::new(1, 1, 14), &mut rng)
            .is_empty());
    }

    #[test]
    fn test_loaded_rates_are_clamped() {
        let mut crime = CrimeState::new();
        crime.rates.insert("Ashford".to_string(), i32::MAX);
        crime.rates.insert("Millbrook".to_string(), -40);
        crime.init(&mut ScriptedRandom::default());
        assert_eq!(crime.rate("Ashford"), MAX_RATE);
        assert_eq!(crime.rate("Millbrook"), 0);

        crime.rates.insert("Ashford".to_string(), i32::MAX);
        crime.weekly_update(CalendarDate::new(1, 1, 7), &mut ScriptedRandom::constant(0.99));
        assert_eq!(crime.rate("Ashford"), MAX_RATE);
    }

    #[test]
    fn test_weekly_incident_roll() {
        let mut crime = CrimeState::new();
        crime.rates.insert("Ashford".to_string(), 40);
        // drift -2, incident roll passes, crime pick
        let mut rng = ScriptedRandom::new(vec![0.0, 0.0, 0.5]);
        crime.weekly_update(CalendarDate::new(1, 1, 7), &mut rng);
        assert_eq!(crime.rate("Ashford"), 38);
        assert_eq!(crime.incidents[0].crime, "smuggling");
        assert_eq!(crime.summary(), "Crime: Ashford 38. Latest: smuggling in Ashford");
    }
}
