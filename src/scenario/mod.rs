//! Scenario files
//!
//! A scenario is a starting placement, optionally with its own grid size:
//!
//! ```toml
//! name = "left lane squeeze"
//!
//! [grid]
//! columns = 3
//! rows = 6
//!
//! [[placement]]
//! entity = "autonomous-car"
//! position = 16
//! ```

pub mod random;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{ActorId, EntityTypeId, Position};
use crate::simulation::controller::Simulation;
use crate::world::catalog::EntityCatalog;

pub use random::random_scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOverride {
    pub columns: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPlacement {
    pub entity: EntityTypeId,
    pub position: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grid: Option<GridOverride>,
    #[serde(rename = "placement", default)]
    pub placements: Vec<ScenarioPlacement>,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The base config with this scenario's grid applied
    pub fn config(&self, base: &SimulationConfig) -> SimulationConfig {
        match self.grid {
            Some(grid) => SimulationConfig {
                columns: grid.columns,
                rows: grid.rows,
                ..base.clone()
            },
            None => base.clone(),
        }
    }

    /// Place every actor, stopping at the first rejection
    pub fn apply(&self, sim: &mut Simulation) -> Result<Vec<ActorId>> {
        self.placements
            .iter()
            .map(|p| sim.place(&p.entity, p.position))
            .collect()
    }

    /// A fresh simulation holding this scenario's placement
    pub fn build(&self, base: &SimulationConfig, catalog: EntityCatalog) -> Result<Simulation> {
        let mut sim = Simulation::new(self.config(base), catalog)?;
        self.apply(&mut sim)?;
        tracing::info!(
            "Loaded scenario {} with {} placements",
            self.name.as_deref().unwrap_or("(unnamed)"),
            self.placements.len()
        );
        Ok(sim)
    }
}
