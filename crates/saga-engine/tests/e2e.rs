//! End-to-end tests for the Saga engine.
//!
//! These drive a full engine against an in-memory store with scripted
//! randomness, the way a host application would.

use saga_common::{FastRandom, ScriptedRandom};
use saga_engine::{ChangeReason, SagaConfig, TimeDelta, WorldEngine};
use saga_sim::{ClimateZone, TimeState, WorldSignal};
use saga_world::{FileStore, KeyValueStore, MemoryStore};

fn quiet_engine(store: MemoryStore) -> WorldEngine<MemoryStore> {
    // 0.5 keeps every low-probability roll from firing
    WorldEngine::open(store, "world", ScriptedRandom::constant(0.5))
}

/// Time advancing and cascade counts
mod advance_tests {
    use super::*;

    #[test]
    fn e2e_month_rollover_runs_three_days_and_one_month() {
        let mut engine = quiet_engine(MemoryStore::new());
        engine.world_mut().time = TimeState::at(1, 1, 28, 8);
        engine.commit().expect("commit");

        let report = engine.advance(TimeDelta::days(3)).expect("advance");

        let time = &engine.world().time;
        assert_eq!((time.month, time.day), (2, 1), "Should land on the 1st of month 2");
        assert_eq!(report.days, 3, "One daily cascade per day crossed");
        assert_eq!(report.weeks, 0, "No day divisible by seven was entered");
        assert_eq!(report.months, 1, "Entering the 1st runs the monthly cascade");
    }

    #[test]
    fn e2e_long_advance_counts_every_boundary() {
        let mut engine = WorldEngine::open(MemoryStore::new(), "world", FastRandom::with_seed(99));
        let report = engine.advance(TimeDelta::days(60)).expect("advance");

        assert_eq!(report.days, 60);
        // 7, 14, 21, 28 in each of two months
        assert_eq!(report.weeks, 8);
        assert_eq!(report.months, 2);
        assert_eq!(engine.world().time.date().month, 3);
    }

    #[test]
    fn e2e_backward_advance_rewinds_without_ticks() {
        let mut engine = quiet_engine(MemoryStore::new());
        engine.world_mut().time = TimeState::at(2, 5, 3, 12);
        let economy = engine.world().economy.clone();

        let report = engine.advance(TimeDelta::days(-5)).expect("advance");

        let time = &engine.world().time;
        assert_eq!((time.year, time.month, time.day), (2, 4, 28));
        assert_eq!(report.days, 0, "Rewinding must not tick anything");
        assert_eq!(engine.world().economy, economy);
    }

    #[test]
    fn e2e_zero_advance_saves_and_notifies_nothing() {
        let store = MemoryStore::new();
        let mut engine = quiet_engine(store.clone());
        let rx = engine.subscribe();

        engine.advance(TimeDelta::new(0, 0)).expect("advance");

        assert!(store.is_empty(), "A zero delta must not save");
        assert!(rx.try_recv().is_err(), "A zero delta must not notify");
    }

    #[test]
    fn e2e_advance_persists_and_notifies() {
        let store = MemoryStore::new();
        let mut engine = quiet_engine(store.clone());
        let rx = engine.subscribe();

        engine.advance(TimeDelta::days(2)).expect("advance");

        let change = rx.try_recv().expect("notified");
        assert_eq!(change.reason, ChangeReason::Advanced);
        assert_eq!(change.date.day, 3);

        let reopened = quiet_engine(store);
        assert_eq!(reopened.world().time.day, 3, "Advance should be durable");
    }
}

/// Cross-subsystem signal routing
mod routing_tests {
    use super::*;

    #[test]
    fn e2e_boiling_tension_starts_a_war() {
        // 0.99 pushes every drift to its top and keeps chance rolls quiet
        let mut engine =
            WorldEngine::open(MemoryStore::new(), "world", ScriptedRandom::constant(0.99));
        engine.world_mut().time = TimeState::at(1, 3, 6, 8);
        engine.world_mut().tensions.raise("Iron Pact", "Kingdom of Valmere", 29);
        let before = engine.world().factions.relation("Kingdom of Valmere", "Iron Pact");

        let report = engine.advance(TimeDelta::days(1)).expect("advance");

        assert!(report
            .signals
            .iter()
            .any(|s| matches!(s, WorldSignal::TensionBoiledOver { .. })));
        assert!(engine.world().wars.at_war("Iron Pact", "Kingdom of Valmere"));
        assert!(
            engine.world().factions.relation("Kingdom of Valmere", "Iron Pact") < before,
            "Boil-over and battle should sour relations"
        );
    }

    #[test]
    fn e2e_weekly_event_seeds_rumor() {
        let mut engine =
            WorldEngine::open(MemoryStore::new(), "world", ScriptedRandom::constant(0.99));
        engine.world_mut().time = TimeState::at(1, 3, 13, 8);
        let rumors_before = engine.world().rumors.rumors.len();

        let report = engine.advance(TimeDelta::days(1)).expect("advance");

        assert!(report
            .signals
            .iter()
            .any(|s| matches!(s, WorldSignal::EventStarted(_))));
        assert_eq!(engine.world().events.active.len(), 1);
        assert!(engine.world().rumors.rumors.len() > rumors_before);
    }

    #[test]
    fn e2e_siege_capture_hands_over_settlement() {
        // 0.99 gives the largest siege progress and keeps chance rolls quiet
        let mut engine =
            WorldEngine::open(MemoryStore::new(), "world", ScriptedRandom::constant(0.99));
        engine.world_mut().time = TimeState::at(1, 3, 6, 8);
        let date = engine.world().time.date();
        let wars = &mut engine.world_mut().wars;
        let id = wars.declare_war("Iron Pact", "Kingdom of Valmere", date);
        assert!(wars.begin_siege(id, "Ashford"));
        wars.active[0].sieges.insert("Ashford".to_string(), 90);

        let report = engine.advance(TimeDelta::days(1)).expect("advance");

        assert!(
            report.signals.iter().any(|s| matches!(
                s,
                WorldSignal::SettlementCaptured { settlement, captor }
                    if settlement == "Ashford" && captor == "Iron Pact"
            )),
            "Siege at 90 plus a weekly assault should take the town"
        );
        let world = engine.world();
        assert_eq!(
            world.settlements.get("Ashford").expect("Ashford").owner,
            "Iron Pact",
            "Captured settlement should change hands"
        );
        assert!(world.wars.active[0].captured.contains(&"Ashford".to_string()));
        assert!(
            world
                .rumors
                .rumors
                .iter()
                .any(|r| r.origin == "Ashford" && r.text == "Ashford has fallen to Iron Pact"),
            "The fall should be talked about where it happened"
        );
    }
}

/// Persistence through the engine
mod persistence_tests {
    use super::*;

    #[test]
    fn e2e_partial_save_merges_over_defaults() {
        let store = MemoryStore::new();
        store.set("world", r#"{"time":{"year":5}}"#).expect("set");

        let engine = quiet_engine(store);
        let world = engine.world();
        assert_eq!(world.time.year, 5);
        assert_eq!(world.time.month, 1);
        assert!(!world.settlements.settlements.is_empty(), "Empty slices are seeded");
    }

    #[test]
    fn e2e_reset_wipes_wars_and_time() {
        let store = MemoryStore::new();
        let mut engine = quiet_engine(store.clone());
        let rx = engine.subscribe();
        let date = engine.world().time.date();
        engine.world_mut().time.year = 12;
        engine.world_mut().wars.declare_war("Iron Pact", "Valmere", date);
        engine.commit().expect("commit");

        engine.reset_state().expect("reset");

        assert!(engine.world().wars.active.is_empty());
        assert_eq!(engine.world().time.year, 1);
        assert!(!engine.world().npcs.npcs.is_empty(), "Reset world is seeded again");

        let reasons: Vec<ChangeReason> = rx.try_iter().map(|c| c.reason).collect();
        assert_eq!(reasons, vec![ChangeReason::Committed, ChangeReason::Reset]);

        let reopened = quiet_engine(store);
        assert!(reopened.world().wars.active.is_empty());
        assert_eq!(reopened.world().time.year, 1);
    }

    #[test]
    fn e2e_direct_mutation_clamps_and_commits() {
        let store = MemoryStore::new();
        let mut engine = quiet_engine(store.clone());

        assert_eq!(engine.world_mut().factions.adjust_reputation("Valmere", 1000), 100);
        assert_eq!(engine.world_mut().factions.adjust_reputation("Drask", -1000), -100);
        engine.commit().expect("commit");

        let reopened = quiet_engine(store);
        assert_eq!(reopened.world().factions.reputation("Valmere"), 100);
        assert_eq!(reopened.world().factions.reputation("Drask"), -100);
    }

    #[test]
    fn e2e_file_store_survives_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SagaConfig {
            save_dir: dir.path().to_path_buf(),
            climate_zone: ClimateZone::Desert,
            ..SagaConfig::default()
        };

        let mut engine = WorldEngine::from_config(
            FileStore::new(&config.save_dir),
            &config,
            FastRandom::with_seed(5),
        );
        assert_eq!(engine.world().time.climate_zone, ClimateZone::Desert);
        engine.advance(TimeDelta::days(10)).expect("advance");
        let context = engine.world_context();

        let reopened = WorldEngine::from_config(
            FileStore::new(&config.save_dir),
            &SagaConfig {
                climate_zone: ClimateZone::Arctic,
                ..config.clone()
            },
            FastRandom::with_seed(5),
        );
        assert_eq!(
            reopened.world().time.climate_zone,
            ClimateZone::Desert,
            "A saved world keeps its own climate"
        );
        assert_eq!(reopened.world_context(), context);
    }
}

/// The context handed to a text generator
mod context_tests {
    use super::*;

    #[test]
    fn e2e_context_lists_every_slice() {
        let engine = quiet_engine(MemoryStore::new());
        let context = engine.world_context();
        for tag in ["[Date]", "[Weather]", "[Factions]", "[Tensions]", "[Events]", "[NPCs]"] {
            assert!(context.contains(tag), "Context should contain {tag}");
        }
    }

    #[test]
    fn e2e_context_follows_festival() {
        let mut engine = quiet_engine(MemoryStore::new());
        let (month, day, name) = first_festival();
        engine.world_mut().time = TimeState::at(1, month, day, 8);
        assert!(engine.world_context().contains(name));
    }

    fn first_festival() -> (u32, u32, &'static str) {
        for month in 1..=12 {
            for day in 1..=30 {
                if let Some(name) = saga_sim::festival(month, day) {
                    return (month, day, name);
                }
            }
        }
        panic!("calendar has no festivals");
    }
}
