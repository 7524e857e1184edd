//! Property tests for movement and the agent policy

use proptest::prelude::*;

use trolley_grid::core::{ActorId, SimulationConfig};
use trolley_grid::scenario::random_scenario;
use trolley_grid::simulation::{
    advance_generic, shared_cells, AgentDecision, EngineEventType, GenericStep, PolicyContext,
};
use trolley_grid::world::{EntityCatalog, Grid, PlacedActor, SocietalValue};

const BLOCKER_TYPES: [&str; 9] = [
    "pedestrian",
    "child",
    "elderly",
    "cyclist",
    "dog",
    "car",
    "tree",
    "barrier",
    "building",
];

fn placed(type_id: &str, position: u32, is_static: bool) -> PlacedActor {
    PlacedActor {
        id: ActorId::new(),
        type_id: type_id.into(),
        position,
        is_static,
        has_finished: false,
        sacrificed: false,
        last_move: None,
    }
}

/// Agent on row 4 of a 3x4 grid with a fully blocked static row ahead
fn blocked_row(agent_column: u32, blockers: [usize; 3]) -> Vec<PlacedActor> {
    let mut actors = vec![placed("autonomous-car", 9 + agent_column, false)];
    for (i, &b) in blockers.iter().enumerate() {
        actors.push(placed(BLOCKER_TYPES[b], 7 + i as u32, true));
    }
    actors
}

proptest! {
    #[test]
    fn prop_random_runs_stay_on_grid(seed in any::<u64>(), obstacles in 0usize..12) {
        let config = SimulationConfig::default();
        let catalog = EntityCatalog::with_defaults();
        let scenario = random_scenario(&config, &catalog, seed, obstacles);
        let mut sim = scenario.build(&config, catalog).unwrap();
        sim.start().unwrap();

        let grid = sim.grid();
        for _ in 0..400 {
            if !sim.is_running() {
                break;
            }
            sim.tick();
            for actor in sim.registry().iter() {
                prop_assert!(grid.contains(actor.position));
            }
            // Shared cells only ever appear as the run's final collision
            if sim.is_running() {
                prop_assert!(shared_cells(sim.registry().actors(), &grid).is_empty());
            }
        }
    }

    #[test]
    fn prop_generic_moves_one_row(columns in 3u32..8, rows in 2u32..12, pick in any::<u32>()) {
        let grid = Grid::new(columns, rows);
        let position = 1 + pick % grid.cell_count();
        let mut actor = placed("cyclist", position, false);
        match advance_generic(&mut actor, &grid, 0) {
            GenericStep::Moved { from, to } => {
                prop_assert_eq!(from - to, columns);
                prop_assert_eq!(actor.has_finished, grid.is_finish_line(to));
            }
            GenericStep::OffGrid { position: at } => {
                prop_assert!(grid.is_finish_line(at));
                prop_assert_eq!(actor.position, position);
            }
        }
    }

    #[test]
    fn prop_blocked_row_is_deterministic(column in 1u32..=3, blockers in [0usize..9, 0usize..9, 0usize..9]) {
        let grid = Grid::new(3, 4);
        let catalog = EntityCatalog::with_defaults();
        let first = blocked_row(column, blockers);
        // Fresh ids, same layout
        let second = blocked_row(column, blockers);
        let a = PolicyContext::new(&grid, &catalog, &first, 0).decide();
        let b = PolicyContext::new(&grid, &catalog, &second, 0).decide();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_sacrifice_only_below_own_value(column in 1u32..=3, blockers in [0usize..9, 0usize..9, 0usize..9]) {
        let grid = Grid::new(3, 4);
        let catalog = EntityCatalog::with_defaults();
        let actors = blocked_row(column, blockers);
        let own = catalog.get(&"autonomous-car".into()).unwrap().societal_value;
        let reachable: Vec<SocietalValue> = actors[1..]
            .iter()
            .filter(|a| grid.column(a.position).abs_diff(column) <= 1)
            .map(|a| catalog.get(&a.type_id).unwrap().societal_value)
            .collect();

        match PolicyContext::new(&grid, &catalog, &actors, 0).decide() {
            AgentDecision::SelfSacrifice { .. } => {
                prop_assert!(reachable.iter().all(|&v| v < own));
            }
            AgentDecision::Crash { into } => {
                let value = catalog
                    .get(&actors.iter().find(|a| a.position == into).unwrap().type_id)
                    .unwrap()
                    .societal_value;
                prop_assert!(value >= own);
                prop_assert!(grid.column(into).abs_diff(column) <= 1);
            }
            AgentDecision::Approach { to } => {
                prop_assert_eq!(grid.row(to), 4);
            }
            other => prop_assert!(false, "unexpected decision {:?}", other),
        }
    }

    #[test]
    fn prop_free_forward_cell_is_always_taken(column in 1u32..=3, side in [0usize..9, 0usize..9]) {
        let grid = Grid::new(3, 4);
        let catalog = EntityCatalog::with_defaults();
        let forward = 6 + column;
        let mut actors = vec![placed("autonomous-car", 9 + column, false)];
        let others = (7..=9).filter(|&c| c != forward);
        for (cell, &b) in others.zip(side.iter()) {
            actors.push(placed(BLOCKER_TYPES[b], cell, true));
        }
        let decision = PolicyContext::new(&grid, &catalog, &actors, 0).decide();
        prop_assert_eq!(decision, AgentDecision::Advance { to: forward });
    }
}

#[test]
fn test_collision_is_the_last_event() {
    // A run never keeps moving actors after a collision
    let config = SimulationConfig::default();
    let catalog = EntityCatalog::with_defaults();
    for seed in 0..40 {
        let scenario = random_scenario(&config, &catalog, seed, 10);
        let mut sim = scenario.build(&config, catalog.clone()).unwrap();
        sim.start().unwrap();
        while sim.is_running() {
            sim.tick();
        }
        let history = sim.history();
        if let Some(i) = history
            .iter()
            .position(|e| matches!(e.event_type, EngineEventType::CollisionDetected { .. }))
        {
            assert_eq!(i, history.len() - 1, "seed {}", seed);
        }
    }
}
