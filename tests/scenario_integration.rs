//! Scenario files shipped under data/

use std::path::PathBuf;

use trolley_grid::core::SimulationConfig;
use trolley_grid::scenario::{random_scenario, Scenario};
use trolley_grid::simulation::{run_to_completion, EngineEventType, RunStatus};
use trolley_grid::world::{EntityCatalog, SocietalValue};

fn data_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(relative)
}

fn run(file: &str) -> (RunStatus, Vec<EngineEventType>) {
    let config = SimulationConfig::load(&data_path("config.toml")).unwrap();
    let catalog = EntityCatalog::load(&data_path("catalog.toml")).unwrap();
    let scenario = Scenario::load(&data_path(&format!("scenarios/{}", file))).unwrap();
    let mut sim = scenario.build(&config, catalog).unwrap();
    sim.start().unwrap();
    let status = run_to_completion(&mut sim, config.max_ticks);
    let events = sim.history().iter().map(|e| e.event_type.clone()).collect();
    (status, events)
}

#[test]
fn test_shipped_config_matches_defaults() {
    let config = SimulationConfig::load(&data_path("config.toml")).unwrap();
    assert_eq!(config, SimulationConfig::default());
}

#[test]
fn test_shipped_catalog_matches_builtin() {
    let loaded = EntityCatalog::load(&data_path("catalog.toml")).unwrap();
    let builtin = EntityCatalog::with_defaults();
    assert_eq!(loaded.len(), builtin.len());
    for entity in builtin.iter() {
        assert_eq!(loaded.get(&entity.id), Some(entity));
    }
    assert_eq!(
        loaded.get(&"building".into()).map(|t| t.societal_value),
        Some(SocietalValue::Unbounded)
    );
}

#[test]
fn test_lateral_approach_scenario() {
    let (status, events) = run("lateral_approach.toml");
    assert_eq!(status, RunStatus::Collided { position: 9 });
    let moves: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            EngineEventType::ActorMoved { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(moves, vec![(10, 11), (11, 9)]);
}

#[test]
fn test_convergence_scenario() {
    let (status, events) = run("convergence.toml");
    assert_eq!(status, RunStatus::Collided { position: 11 });
    assert!(matches!(
        events.last(),
        Some(EngineEventType::CollisionDetected { position: 11, .. })
    ));
}

#[test]
fn test_self_sacrifice_scenario() {
    let (status, events) = run("self_sacrifice.toml");
    assert_eq!(status, RunStatus::Succeeded);
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEventType::AgentSelfSacrificed { .. })));
}

#[test]
fn test_open_road_scenario() {
    let (status, events) = run("open_road.toml");
    assert_eq!(status, RunStatus::Succeeded);
    assert_eq!(events.last(), Some(&EngineEventType::RunSucceeded));
}

#[test]
fn test_random_scenarios_always_terminate() {
    let config = SimulationConfig::default();
    let catalog = EntityCatalog::with_defaults();
    for seed in 0..25 {
        let scenario = random_scenario(&config, &catalog, seed, 6);
        let mut sim = scenario.build(&config, catalog.clone()).unwrap();
        sim.start().unwrap();
        let status = run_to_completion(&mut sim, config.max_ticks);
        assert!(status.is_terminal(), "seed {} ended {:?}", seed, status);
    }
}
