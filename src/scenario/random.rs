//! Seeded random scenarios
//!
//! Same seed, same scenario: the generator uses ChaCha8 so layouts can be
//! shared by seed alone.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::{EntityTypeId, Position};
use crate::scenario::{GridOverride, Scenario, ScenarioPlacement};
use crate::world::catalog::EntityCatalog;
use crate::world::grid::Grid;

/// Chance that a free starting-line cell gets a mobile actor
const TRAFFIC_DENSITY: f64 = 0.5;

/// Build a random scenario
///
/// The agent takes a random starting-line cell, the other starting-line
/// cells may get mobile actors, and up to `obstacles` static actors are
/// scattered over the rows between the lines.
pub fn random_scenario(
    config: &SimulationConfig,
    catalog: &EntityCatalog,
    seed: u64,
    obstacles: usize,
) -> Scenario {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let grid = Grid::new(config.columns, config.rows);
    let mut placements = Vec::new();

    let mobile: Vec<&EntityTypeId> = catalog
        .iter()
        .filter(|t| !t.is_agent && t.is_self_propelled())
        .map(|t| &t.id)
        .collect();
    let any_obstacle: Vec<&EntityTypeId> = catalog
        .iter()
        .filter(|t| !t.is_agent)
        .map(|t| &t.id)
        .collect();

    let start: Vec<Position> = (1..=grid.columns)
        .map(|c| grid.position_at(grid.rows, c))
        .collect();
    let agent_cell = start[rng.gen_range(0..start.len())];
    placements.push(ScenarioPlacement {
        entity: catalog.agent_type().clone(),
        position: agent_cell,
    });

    for &cell in start.iter().filter(|&&c| c != agent_cell) {
        if placements.len() >= config.max_actors {
            break;
        }
        if rng.gen_bool(TRAFFIC_DENSITY) {
            if let Some(entity) = mobile.choose(&mut rng) {
                placements.push(ScenarioPlacement {
                    entity: (*entity).clone(),
                    position: cell,
                });
            }
        }
    }

    // Rows strictly between the finish line and the starting line
    let middle: Vec<Position> = (grid.columns + 1..=grid.cell_count() - grid.columns).collect();
    let room = config.max_actors.saturating_sub(placements.len());
    let count = obstacles.min(room).min(middle.len());
    for &cell in middle.choose_multiple(&mut rng, count) {
        if let Some(entity) = any_obstacle.choose(&mut rng) {
            placements.push(ScenarioPlacement {
                entity: (*entity).clone(),
                position: cell,
            });
        }
    }

    tracing::debug!("Generated scenario from seed {} with {} placements", seed, placements.len());

    Scenario {
        name: Some(format!("random-{}", seed)),
        description: None,
        grid: Some(GridOverride {
            columns: config.columns,
            rows: config.rows,
        }),
        placements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_scenario() {
        let config = SimulationConfig::default();
        let catalog = EntityCatalog::with_defaults();
        let a = random_scenario(&config, &catalog, 42, 6);
        let b = random_scenario(&config, &catalog, 42, 6);
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_scenario_is_placeable() {
        let config = SimulationConfig::default();
        let catalog = EntityCatalog::with_defaults();
        for seed in 0..20 {
            let scenario = random_scenario(&config, &catalog, seed, 8);
            let sim = scenario.build(&config, catalog.clone()).unwrap();
            assert!(sim.registry().agent(sim.catalog()).is_some());
        }
    }

    #[test]
    fn test_obstacles_capped_by_actor_limit() {
        let config = SimulationConfig {
            max_actors: 4,
            ..SimulationConfig::default()
        };
        let catalog = EntityCatalog::with_defaults();
        let scenario = random_scenario(&config, &catalog, 7, 50);
        assert!(scenario.placements.len() <= 4);
    }
}
