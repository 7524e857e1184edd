//! Simulation controller
//!
//! Owns the registry and the engine, and is the only way in from outside:
//! placement while idle, start/stop/clear, backup and restore. During a run
//! the registry is mutated by the engine alone; callers get a read-only view.

use crate::core::config::SimulationConfig;
use crate::core::error::{ControlError, Result, SimError};
use crate::core::types::{ActorId, EntityTypeId, Position, Tick};
use crate::simulation::events::{EngineEvent, EngineEventType};
use crate::simulation::tick::{Engine, RunStatus, TickReport};
use crate::world::catalog::EntityCatalog;
use crate::world::grid::Grid;
use crate::world::registry::{PlacedActor, PlacementRegistry, RegistrySnapshot};

pub struct Simulation {
    config: SimulationConfig,
    catalog: EntityCatalog,
    registry: PlacementRegistry,
    engine: Engine,
    backup: Option<RegistrySnapshot>,
    status: RunStatus,
    /// Every event since the last start
    history: Vec<EngineEvent>,
}

impl Simulation {
    pub fn new(config: SimulationConfig, catalog: EntityCatalog) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.columns, config.rows);
        Ok(Self {
            registry: PlacementRegistry::new(grid, config.max_actors),
            engine: Engine::new(grid, config.tick_period),
            config,
            catalog,
            backup: None,
            status: RunStatus::Idle,
            history: Vec::new(),
        })
    }

    /// Default grid and the built-in catalog
    pub fn with_defaults() -> Self {
        let config = SimulationConfig::default();
        let grid = Grid::new(config.columns, config.rows);
        Self {
            registry: PlacementRegistry::new(grid, config.max_actors),
            engine: Engine::new(grid, config.tick_period),
            config,
            catalog: EntityCatalog::with_defaults(),
            backup: None,
            status: RunStatus::Idle,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn grid(&self) -> Grid {
        self.registry.grid()
    }

    /// Read-only view for rendering
    pub fn registry(&self) -> &PlacementRegistry {
        &self.registry
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    pub fn current_tick(&self) -> Tick {
        self.engine.current_tick()
    }

    pub fn history(&self) -> &[EngineEvent] {
        &self.history
    }

    pub fn backup(&self) -> Option<&RegistrySnapshot> {
        self.backup.as_ref()
    }

    pub fn is_allowed(&self, type_id: &EntityTypeId, position: Position) -> bool {
        self.registry.is_allowed(&self.catalog, type_id, position)
    }

    pub fn is_at_capacity(&self) -> bool {
        self.registry.is_at_capacity()
    }

    /// Place an actor; refused while a run is active
    pub fn place(&mut self, type_id: &EntityTypeId, position: Position) -> Result<ActorId> {
        if self.is_running() {
            return Err(ControlError::RunInProgress.into());
        }
        self.registry
            .place(&self.catalog, type_id, position)
            .map_err(|e| {
                tracing::debug!("Rejected {} at {}: {}", type_id, position, e);
                SimError::from(e)
            })
    }

    /// Remove the actor at a cell; refused while a run is active
    pub fn remove(&mut self, position: Position) -> std::result::Result<Option<PlacedActor>, ControlError> {
        if self.is_running() {
            return Err(ControlError::RunInProgress);
        }
        Ok(self.registry.remove(position))
    }

    /// Begin a run from the current placement
    ///
    /// The placement is backed up first so the run can be replayed.
    pub fn start(&mut self) -> std::result::Result<(), ControlError> {
        if self.is_running() {
            tracing::warn!("Start requested while a run is in progress");
            return Err(ControlError::RunInProgress);
        }
        if self.registry.is_empty() {
            tracing::warn!("Start requested with an empty grid");
            return Err(ControlError::EmptyRegistry);
        }
        if self.registry.agent(&self.catalog).is_none() {
            tracing::warn!("Start requested without an agent on the grid");
            return Err(ControlError::MissingAgent);
        }

        for actor in self.registry.actors_mut() {
            actor.last_move = None;
        }
        self.backup = Some(self.registry.snapshot());
        self.engine.reset();
        self.history.clear();
        self.status = RunStatus::Running;

        tracing::info!(
            "Run started: {} actors on a {}x{} grid",
            self.registry.len(),
            self.config.columns,
            self.config.rows
        );
        Ok(())
    }

    /// Halt the run between ticks, without a verdict
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.status = RunStatus::Stopped;
        self.history.push(EngineEvent {
            tick: self.engine.current_tick(),
            event_type: EngineEventType::RunStopped,
        });
        tracing::info!("Run stopped at tick {}", self.engine.current_tick());
    }

    /// Stop any run and remove every actor. The backup is kept.
    pub fn clear(&mut self) {
        self.stop();
        self.registry.clear();
        self.engine.reset();
        self.status = RunStatus::Idle;
        tracing::info!("Grid cleared");
    }

    /// Put the grid back the way it was when the last run started
    pub fn restore_from_backup(&mut self) -> std::result::Result<(), ControlError> {
        if self.backup.is_none() {
            tracing::warn!("Restore requested but no backup exists");
            return Err(ControlError::NoBackupAvailable);
        }
        self.stop();
        if let Some(backup) = &self.backup {
            self.registry.restore(backup);
        }
        self.engine.reset();
        self.status = RunStatus::Idle;
        tracing::info!("Restored {} actors from backup", self.registry.len());
        Ok(())
    }

    /// Replay the last run from its starting placement
    pub fn restart(&mut self) -> std::result::Result<(), ControlError> {
        self.restore_from_backup()?;
        self.start()
    }

    /// Advance the run by one tick; a no-op unless a run is active
    pub fn tick(&mut self) -> TickReport {
        if !self.is_running() {
            return TickReport::idle(self.engine.current_tick(), self.status);
        }

        let mut report = self.engine.tick(&mut self.registry, &self.catalog);
        self.status = report.status;

        if self.status.is_running() && self.engine.current_tick() >= self.config.max_ticks {
            tracing::warn!("Run hit the {} tick limit", self.config.max_ticks);
            report.events.push(EngineEvent {
                tick: report.tick,
                event_type: EngineEventType::RunStopped,
            });
            self.status = RunStatus::Stopped;
            report.status = RunStatus::Stopped;
        }

        self.history.extend(report.events.iter().cloned());
        match self.status {
            RunStatus::Succeeded => {
                tracing::info!("Run succeeded after {} ticks", report.tick + 1)
            }
            RunStatus::Collided { position } => {
                tracing::info!("Run failed: collision at cell {} on tick {}", position, report.tick)
            }
            _ => {}
        }
        report
    }
}
