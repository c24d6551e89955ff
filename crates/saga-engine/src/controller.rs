//! The world engine: advances time and runs the tick cascades.
//!
//! For every date entered by an advance the engine runs the daily cascade,
//! then the weekly one on days divisible by seven, then the monthly one on
//! the first of a month (see [`crate::schedule`]). Signals a subsystem emits
//! are routed into the receiving slices before the next subsystem ticks.
//! After the last cascade the world is saved and subscribers are notified.

use crossbeam_channel::Receiver;
use tracing::{debug, info};

use saga_common::{RandomSource, SagaResult};
use saga_sim::{Cadence, CalendarDate, TickContext, WorldSignal, WorldState};
use saga_world::{KeyValueStore, Persistence};

use crate::config::SagaConfig;
use crate::context;
use crate::notify::{ChangeFeed, ChangeReason, WorldChanged};
use crate::schedule;

/// Relation lost between two parties when their tension boils over.
const BOIL_OVER_RELATION_PENALTY: i32 = 20;
/// Relation lost between belligerents per battle.
const BATTLE_RELATION_PENALTY: i32 = 5;
/// Tension relieved when a war ends.
const WAR_END_TENSION_RELIEF: i32 = 50;
/// Settlement damage per point of catastrophe severity.
const CATASTROPHE_DAMAGE_PER_SEVERITY: u32 = 4;
/// Civilian mood lost per point of catastrophe severity.
const CATASTROPHE_MOOD_PER_SEVERITY: i32 = 5;
/// Favor a deity gains when a prophecy in their name comes true.
const PROPHECY_FAVOR: i32 = 15;

/// A signed span of game time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeDelta {
    /// Whole days
    pub days: i64,
    /// Hours
    pub hours: i64,
}

impl TimeDelta {
    /// Creates a delta.
    #[must_use]
    pub const fn new(days: i64, hours: i64) -> Self {
        Self { days, hours }
    }

    /// A delta of whole days.
    #[must_use]
    pub const fn days(days: i64) -> Self {
        Self::new(days, 0)
    }

    /// A delta of hours.
    #[must_use]
    pub const fn hours(hours: i64) -> Self {
        Self::new(0, hours)
    }

    /// Whether this delta moves time at all.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.days == 0 && self.hours == 0
    }
}

/// What an advance did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Daily cascades run
    pub days: u32,
    /// Weekly cascades run
    pub weeks: u32,
    /// Monthly cascades run
    pub months: u32,
    /// Every signal routed, in emission order
    pub signals: Vec<WorldSignal>,
}

impl TickReport {
    /// Number of signals routed.
    #[must_use]
    pub fn signals_routed(&self) -> usize {
        self.signals.len()
    }

    fn record(&mut self, cadence: Cadence) {
        match cadence {
            Cadence::Daily => self.days += 1,
            Cadence::Weekly => self.weeks += 1,
            Cadence::Monthly => self.months += 1,
        }
    }
}

/// Owns the world, its store, the random source and the change feed.
pub struct WorldEngine<S> {
    persistence: Persistence<WorldState, S>,
    rng: Box<dyn RandomSource + Send>,
    feed: ChangeFeed,
}

impl<S: KeyValueStore> WorldEngine<S> {
    /// Opens the world stored under `key`, seeding any empty slices.
    pub fn open(store: S, key: &str, rng: impl RandomSource + Send + 'static) -> Self {
        let mut engine = Self {
            persistence: Persistence::open(store, key),
            rng: Box::new(rng),
            feed: ChangeFeed::default(),
        };
        engine.seed_world();
        engine
    }

    /// Opens the world described by `config`.
    ///
    /// A world that has never been saved starts in the configured climate zone.
    pub fn from_config(
        store: S,
        config: &SagaConfig,
        rng: impl RandomSource + Send + 'static,
    ) -> Self {
        let mut engine = Self::open(store, &config.state_key, rng);
        engine.feed = ChangeFeed::new(config.channel_capacity);
        if engine.world().meta.last_updated == 0 {
            engine.world_mut().time.climate_zone = config.climate_zone;
        }
        engine
    }

    fn seed_world(&mut self) {
        self.persistence.state_mut().init_all(&mut *self.rng);
    }

    /// Moves time forward (or back) and runs every cascade crossed.
    ///
    /// A zero delta does nothing. A backward delta rewinds the calendar
    /// without ticking anything.
    pub fn advance(&mut self, delta: TimeDelta) -> SagaResult<TickReport> {
        let mut report = TickReport::default();
        if delta.is_zero() {
            return Ok(report);
        }

        let entered = self
            .persistence
            .state_mut()
            .time
            .advance(delta.days, delta.hours);

        let world = self.persistence.state_mut();
        let rng = &mut *self.rng;
        for date in entered {
            for cadence in schedule::cadences_for(date) {
                run_cascade(world, &mut *rng, cadence, date, &mut report);
            }
        }

        info!(
            "Advanced to {} ({} days, {} weeks, {} months, {} signals)",
            self.world().time.current_date(),
            report.days,
            report.weeks,
            report.months,
            report.signals_routed()
        );
        self.persist(ChangeReason::Advanced)?;
        Ok(report)
    }

    /// Bracket-tagged summary of the current world.
    #[must_use]
    pub fn world_context(&self) -> String {
        context::world_context(self.world())
    }

    /// Discards the stored world and starts over from seeded defaults.
    pub fn reset_state(&mut self) -> SagaResult<()> {
        self.persistence.reset()?;
        self.seed_world();
        self.persist(ChangeReason::Reset)
    }

    /// Gets the world.
    #[must_use]
    pub fn world(&self) -> &WorldState {
        self.persistence.state()
    }

    /// Gets the world for direct mutation. Call [`Self::commit`] afterwards.
    pub fn world_mut(&mut self) -> &mut WorldState {
        self.persistence.state_mut()
    }

    /// Saves direct mutations and notifies subscribers.
    pub fn commit(&mut self) -> SagaResult<()> {
        self.persist(ChangeReason::Committed)
    }

    /// Registers for change notifications.
    pub fn subscribe(&mut self) -> Receiver<WorldChanged> {
        self.feed.subscribe()
    }

    /// Gets the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    fn persist(&mut self, reason: ChangeReason) -> SagaResult<()> {
        self.persistence.save()?;
        let world = self.persistence.state();
        let delivered = self.feed.publish(WorldChanged {
            reason,
            date: world.time.date(),
            hour: world.time.hour,
            last_updated: world.meta.last_updated,
        });
        debug!("Notified {delivered} subscribers ({reason:?})");
        Ok(())
    }
}

impl<S: KeyValueStore> std::fmt::Debug for WorldEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldEngine")
            .field("date", &self.persistence.state().time.date())
            .field("feed", &self.feed)
            .finish_non_exhaustive()
    }
}

/// Ticks every subsystem registered for `cadence`, routing signals as they come.
fn run_cascade(
    world: &mut WorldState,
    rng: &mut dyn RandomSource,
    cadence: Cadence,
    date: CalendarDate,
    report: &mut TickReport,
) {
    report.record(cadence);
    for &key in schedule::order(cadence) {
        let locations = world.locations();
        let mut ctx = TickContext {
            date,
            climate: world.time.climate_zone,
            weather: world.weather.current,
            locations: &locations,
            rng: &mut *rng,
        };
        let signals = world.subsystem_mut(key).tick(cadence, &mut ctx);
        for signal in signals {
            route_signal(world, &signal, date, &mut *rng);
            report.signals.push(signal);
        }
    }
}

/// Applies a signal to the slices that react to it.
pub fn route_signal(
    world: &mut WorldState,
    signal: &WorldSignal,
    date: CalendarDate,
    rng: &mut dyn RandomSource,
) {
    debug!("Routing {signal:?}");
    match signal {
        WorldSignal::EventStarted(event) => {
            world.economy.apply_event_modifier(event);
            spread_news(world, signal, date, rng);
        },
        WorldSignal::TensionBoiledOver { a, b } => {
            world.wars.declare_war(a, b, date);
            world.factions.adjust_relation(a, b, -BOIL_OVER_RELATION_PENALTY);
            world.factions.adjust_relation(b, a, -BOIL_OVER_RELATION_PENALTY);
        },
        WorldSignal::BattleFought {
            attacker, defender, ..
        } => {
            world
                .factions
                .adjust_relation(attacker, defender, -BATTLE_RELATION_PENALTY);
            world
                .factions
                .adjust_relation(defender, attacker, -BATTLE_RELATION_PENALTY);
        },
        WorldSignal::WarEnded { attacker, defender } => {
            world.tensions.ease(attacker, defender, WAR_END_TENSION_RELIEF);
        },
        WorldSignal::SettlementCaptured { settlement, captor } => {
            world.settlements.set_owner(settlement, captor);
            spread_news(world, signal, date, rng);
        },
        WorldSignal::CatastropheStruck {
            kind,
            settlement,
            severity,
        } => {
            world
                .settlements
                .damage(settlement, u32::from(*severity) * CATASTROPHE_DAMAGE_PER_SEVERITY);
            world
                .economy
                .apply_shock(kind.price_impact_per_severity() * f64::from(*severity));
            world
                .civilians
                .adjust_mood(settlement, -i32::from(*severity) * CATASTROPHE_MOOD_PER_SEVERITY);
        },
        WorldSignal::DungeonEmerged { .. }
        | WorldSignal::Succession { .. }
        | WorldSignal::CrimeWave { .. } => spread_news(world, signal, date, rng),
        WorldSignal::ProphecyFulfilled { patron, .. } => {
            world.divine.adjust_favor(patron, PROPHECY_FAVOR);
        },
    }
}

/// Seeds a rumor about `signal` where it happened, or somewhere at random.
fn spread_news(
    world: &mut WorldState,
    signal: &WorldSignal,
    date: CalendarDate,
    rng: &mut dyn RandomSource,
) {
    let origin = match signal.origin() {
        Some(origin) => origin.to_string(),
        None => {
            let locations = world.locations();
            if locations.is_empty() {
                return;
            }
            locations[rng.index(locations.len())].clone()
        },
    };
    world.rumors.seed_rumor(signal.headline(), &origin, date);
}
