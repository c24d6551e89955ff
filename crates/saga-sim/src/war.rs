//! Wars, battles and sieges.
//!
//! A war grinds both sides down. Every battle and siege adds exhaustion; at
//! [`EXHAUSTION_LIMIT`] the war ends and moves to `concluded`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use saga_common::RandomSource;

use crate::calendar::CalendarDate;
use crate::signal::WorldSignal;
use crate::subsystem::{Cadence, Subsystem, TickContext};

/// Exhaustion at which a war ends.
pub const EXHAUSTION_LIMIT: u32 = 100;
/// Siege progress at which a settlement falls.
pub const SIEGE_COMPLETE: u32 = 100;
/// Exhaustion added per battle.
const BATTLE_EXHAUSTION: u32 = 5;
/// Exhaustion added per siege assault.
const SIEGE_EXHAUSTION: u32 = 3;
/// Troops lost per side per battle, upper bound exclusive.
const BATTLE_LOSSES: (i64, i64) = (20, 70);
/// Siege progress per assault, upper bound exclusive.
const SIEGE_PROGRESS: (i64, i64) = (10, 30);
/// Defender troops lost per assault, upper bound exclusive.
const SIEGE_LOSSES: (i64, i64) = (5, 15);

/// A field army.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Army {
    /// Troops by unit category
    pub troops: BTreeMap<String, u32>,
    /// Fighting spirit (0-100)
    pub morale: u32,
}

impl Default for Army {
    fn default() -> Self {
        Self {
            troops: BTreeMap::from([
                ("archers".to_string(), 150),
                ("cavalry".to_string(), 100),
                ("infantry".to_string(), 300),
            ]),
            morale: 80,
        }
    }
}

impl Army {
    /// Total troops across all categories.
    #[must_use]
    pub fn strength(&self) -> u32 {
        self.troops.values().fold(0u32, |total, n| total.saturating_add(*n))
    }

    /// Removes up to `losses` troops from the largest category and drops
    /// morale in proportion to the share of the army lost. Returns the
    /// troops actually lost.
    pub fn take_losses(&mut self, losses: u32) -> u32 {
        let total = self.strength();
        let Some((_, largest)) = self
            .troops
            .iter_mut()
            .max_by(|(a_name, a), (b_name, b)| a.cmp(b).then(b_name.cmp(a_name)))
        else {
            return 0;
        };
        let lost = losses.min(*largest);
        *largest -= lost;
        if total > 0 {
            let morale_loss = u64::from(lost) * 100 / u64::from(total);
            self.morale = self
                .morale
                .saturating_sub(u32::try_from(morale_loss).unwrap_or(u32::MAX));
        }
        lost
    }
}

/// A war between two factions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct War {
    /// Unique id within this world
    pub id: u64,
    /// Faction that declared
    pub attacker: String,
    /// Faction attacked
    pub defender: String,
    /// Attacker's field army
    pub attacker_army: Army,
    /// Defender's field army
    pub defender_army: Army,
    /// War weariness (0-100)
    pub exhaustion: u32,
    /// Cleared when the war ends
    pub active: bool,
    /// Battles fought
    pub battles: u32,
    /// Siege progress by settlement
    pub sieges: BTreeMap<String, u32>,
    /// Settlements taken by the attacker
    pub captured: Vec<String>,
    /// Date war was declared
    pub started: CalendarDate,
}

impl War {
    /// Whether this war is between `a` and `b`, in either direction.
    #[must_use]
    pub fn involves(&self, a: &str, b: &str) -> bool {
        (self.attacker == a && self.defender == b) || (self.attacker == b && self.defender == a)
    }
}

/// Result of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleOutcome {
    /// Attacker troops lost
    pub attacker_losses: u32,
    /// Defender troops lost
    pub defender_losses: u32,
    /// The battle ended the war
    pub war_ended: bool,
}

/// Result of a siege assault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiegeOutcome {
    /// Progress after the assault (0-100)
    pub progress: u32,
    /// Defender troops lost
    pub defender_losses: u32,
    /// The settlement fell
    pub captured: bool,
    /// The assault ended the war
    pub war_ended: bool,
}

/// Ongoing and finished wars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarState {
    /// Wars being fought
    pub active: Vec<War>,
    /// Wars that have ended
    pub concluded: Vec<War>,
    /// Next id to hand out
    pub next_id: u64,
}

impl WarState {
    /// Creates an empty war record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a war. An existing war between the two is returned instead.
    pub fn declare_war(&mut self, attacker: &str, defender: &str, date: CalendarDate) -> u64 {
        if let Some(war) = self.active.iter().find(|w| w.involves(attacker, defender)) {
            return war.id;
        }
        self.next_id = self.next_id.saturating_add(1);
        tracing::info!("{attacker} declares war on {defender}");
        self.active.push(War {
            id: self.next_id,
            attacker: attacker.to_string(),
            defender: defender.to_string(),
            attacker_army: Army::default(),
            defender_army: Army::default(),
            exhaustion: 0,
            active: true,
            battles: 0,
            sieges: BTreeMap::new(),
            captured: Vec::new(),
            started: date,
        });
        self.next_id
    }

    /// Whether `a` and `b` are currently at war.
    #[must_use]
    pub fn at_war(&self, a: &str, b: &str) -> bool {
        self.active.iter().any(|w| w.involves(a, b))
    }

    /// Looks up an active war.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&War> {
        self.active.iter().find(|w| w.id == id)
    }

    /// Opens a siege of `settlement`. Returns `false` for an unknown war.
    pub fn begin_siege(&mut self, id: u64, settlement: &str) -> bool {
        let Some(war) = self.active.iter_mut().find(|w| w.id == id) else {
            return false;
        };
        war.sieges.entry(settlement.to_string()).or_insert(0);
        true
    }

    /// Fights one battle. `None` for an unknown or concluded war.
    pub fn simulate_battle(&mut self, id: u64, rng: &mut dyn RandomSource) -> Option<BattleOutcome> {
        let war = self.active.iter_mut().find(|w| w.id == id)?;
        let attacker_roll = rng.range_i64(BATTLE_LOSSES.0, BATTLE_LOSSES.1) as u32;
        let defender_roll = rng.range_i64(BATTLE_LOSSES.0, BATTLE_LOSSES.1) as u32;
        let attacker_losses = war.attacker_army.take_losses(attacker_roll);
        let defender_losses = war.defender_army.take_losses(defender_roll);
        war.exhaustion = war.exhaustion.saturating_add(BATTLE_EXHAUSTION);
        war.battles = war.battles.saturating_add(1);
        let war_ended = self.resolve(id);
        Some(BattleOutcome {
            attacker_losses,
            defender_losses,
            war_ended,
        })
    }

    /// Assaults a besieged settlement, opening the siege if needed.
    pub fn simulate_siege(
        &mut self,
        id: u64,
        settlement: &str,
        rng: &mut dyn RandomSource,
    ) -> Option<SiegeOutcome> {
        let war = self.active.iter_mut().find(|w| w.id == id)?;
        let gain = rng.range_i64(SIEGE_PROGRESS.0, SIEGE_PROGRESS.1) as u32;
        let losses = rng.range_i64(SIEGE_LOSSES.0, SIEGE_LOSSES.1) as u32;

        let progress = war.sieges.entry(settlement.to_string()).or_insert(0);
        *progress = progress.saturating_add(gain).min(SIEGE_COMPLETE);
        let progress = *progress;

        let defender_losses = war.defender_army.take_losses(losses);
        war.exhaustion = war.exhaustion.saturating_add(SIEGE_EXHAUSTION);

        let captured = progress >= SIEGE_COMPLETE;
        if captured {
            war.sieges.remove(settlement);
            war.captured.push(settlement.to_string());
        }
        let war_ended = self.resolve(id);
        Some(SiegeOutcome {
            progress,
            defender_losses,
            captured,
            war_ended,
        })
    }

    /// Ends the war if it is exhausted. Returns whether it ended.
    fn resolve(&mut self, id: u64) -> bool {
        let Some(pos) = self
            .active
            .iter()
            .position(|w| w.id == id && w.exhaustion >= EXHAUSTION_LIMIT)
        else {
            return false;
        };
        let mut war = self.active.remove(pos);
        war.active = false;
        tracing::info!("War between {} and {} has ended", war.attacker, war.defender);
        self.concluded.push(war);
        true
    }
}

impl Subsystem for WarState {
    fn name(&self) -> &'static str {
        "wars"
    }

    fn tick(&mut self, cadence: Cadence, ctx: &mut TickContext<'_>) -> Vec<WorldSignal> {
        if cadence != Cadence::Weekly {
            return Vec::new();
        }
        let mut signals = Vec::new();
        let fronts: Vec<(u64, String, String)> = self
            .active
            .iter()
            .map(|w| (w.id, w.attacker.clone(), w.defender.clone()))
            .collect();

        for (id, attacker, defender) in fronts {
            let Some(battle) = self.simulate_battle(id, ctx.rng) else {
                continue;
            };
            signals.push(WorldSignal::BattleFought {
                war_id: id,
                attacker: attacker.clone(),
                defender: defender.clone(),
            });
            if battle.war_ended {
                signals.push(WorldSignal::WarEnded { attacker, defender });
                continue;
            }

            let sieges: Vec<String> = self
                .get(id)
                .map(|w| w.sieges.keys().cloned().collect())
                .unwrap_or_default();
            for settlement in sieges {
                let Some(siege) = self.simulate_siege(id, &settlement, ctx.rng) else {
                    break;
                };
                if siege.captured {
                    signals.push(WorldSignal::SettlementCaptured {
                        settlement,
                        captor: attacker.clone(),
                    });
                }
                if siege.war_ended {
                    signals.push(WorldSignal::WarEnded {
                        attacker: attacker.clone(),
                        defender: defender.clone(),
                    });
                    break;
                }
            }
        }
        signals
    }

    fn summary(&self) -> String {
        if self.active.is_empty() {
            return "The realms are at peace".to_string();
        }
        self.active
            .iter()
            .map(|w| {
                let mut line = format!(
                    "{} vs {} (exhaustion {}, {} battles)",
                    w.attacker, w.defender, w.exhaustion, w.battles
                );
                for (settlement, progress) in &w.sieges {
                    line.push_str(&format!(", besieging {settlement} {progress}%"));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_common::ScriptedRandom;

    fn war() -> (WarState, u64) {
        let mut wars = WarState::new();
        let id = wars.declare_war("Iron Pact", "Kingdom of Valmere", CalendarDate::default());
        (wars, id)
    }

    #[test]
    fn test_declare_war_is_idempotent_per_pair() {
        let (mut wars, id) = war();
        assert_eq!(
            wars.declare_war("Kingdom of Valmere", "Iron Pact", CalendarDate::default()),
            id
        );
        assert_eq!(wars.active.len(), 1);
        assert!(wars.at_war("Kingdom of Valmere", "Iron Pact"));
    }

    #[test]
    fn test_battle_hits_largest_category() {
        let (mut wars, id) = war();
        // Both sides lose 20 (range floor)
        let outcome = wars
            .simulate_battle(id, &mut ScriptedRandom::constant(0.0))
            .expect("battle");
        assert_eq!(outcome.attacker_losses, 20);
        assert_eq!(outcome.defender_losses, 20);
        assert!(!outcome.war_ended);

        let war = wars.get(id).expect("war");
        assert_eq!(war.attacker_army.troops["infantry"], 280);
        assert_eq!(war.attacker_army.troops["cavalry"], 100);
        // 20 of 550 troops: 3 morale
        assert_eq!(war.attacker_army.morale, 77);
        assert_eq!(war.exhaustion, 5);
    }

    #[test]
    fn test_battle_losses_upper_bound() {
        let (mut wars, id) = war();
        let outcome = wars
            .simulate_battle(id, &mut ScriptedRandom::constant(0.999_999))
            .expect("battle");
        assert_eq!(outcome.attacker_losses, 69);
    }

    #[test]
    fn test_war_resolves_at_exhaustion() {
        let (mut wars, id) = war();
        let mut rng = ScriptedRandom::constant(0.5);
        for _ in 0..19 {
            assert!(!wars.simulate_battle(id, &mut rng).expect("battle").war_ended);
        }
        assert!(wars.simulate_battle(id, &mut rng).expect("battle").war_ended);
        assert!(wars.active.is_empty());
        assert_eq!(wars.concluded.len(), 1);
        assert!(!wars.concluded[0].active);
        assert!(wars.simulate_battle(id, &mut rng).is_none());
    }

    #[test]
    fn test_siege_captures_at_full_progress() {
        let (mut wars, id) = war();
        // progress +29 per assault at the top of the range
        let mut rng = ScriptedRandom::constant(0.999_999);
        for expected in [29, 58, 87] {
            let siege = wars
                .simulate_siege(id, "Ashford", &mut rng)
                .expect("siege");
            assert_eq!(siege.progress, expected);
            assert!(!siege.captured);
        }
        let siege = wars.simulate_siege(id, "Ashford", &mut rng).expect("siege");
        assert_eq!(siege.progress, 100);
        assert!(siege.captured);
        assert_eq!(siege.defender_losses, 14);

        let war = wars.get(id).expect("war");
        assert_eq!(war.exhaustion, 12);
        assert!(war.sieges.is_empty());
        assert_eq!(war.captured, vec!["Ashford".to_string()]);
    }

    #[test]
    fn test_losses_never_underflow() {
        let mut army = Army {
            troops: BTreeMap::from([("militia".to_string(), 10)]),
            morale: 5,
        };
        assert_eq!(army.take_losses(50), 10);
        assert_eq!(army.strength(), 0);
        assert_eq!(army.morale, 0);
        assert_eq!(army.take_losses(50), 0);
    }

    #[test]
    fn test_weekly_tick_fights_and_signals() {
        use crate::weather::{ClimateZone, WeatherKind};

        let (mut wars, id) = war();
        wars.begin_siege(id, "Ashford");
        let mut rng = ScriptedRandom::constant(0.0);
        let mut ctx = TickContext {
            date: CalendarDate::new(1, 1, 7),
            climate: ClimateZone::Temperate,
            weather: WeatherKind::Clear,
            locations: &[],
            rng: &mut rng,
        };
        let signals = wars.tick(Cadence::Weekly, &mut ctx);
        assert_eq!(signals.len(), 1);
        assert!(matches!(signals[0], WorldSignal::BattleFought { war_id, .. } if war_id == id));
        assert_eq!(wars.get(id).expect("war").sieges["Ashford"], 10);
    }
}
