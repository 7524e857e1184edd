//! Movement and collision engine
//!
//! One call to [`Engine::tick`] is one full pass over the registry. Actors
//! whose cooldown has elapsed move once; every other actor goes first and
//! the agent is evaluated last, so it plans against positions already
//! updated this tick. A collision ends the pass immediately.

use serde::{Deserialize, Serialize};

use crate::core::types::{Position, Tick, Time};
use crate::simulation::collision::find_collision;
use crate::simulation::events::{EngineEvent, EngineEventLog, EngineEventType};
use crate::simulation::movement::{advance_generic, is_due, GenericStep};
use crate::simulation::policy::{AgentDecision, PolicyContext};
use crate::world::catalog::EntityCatalog;
use crate::world::grid::Grid;
use crate::world::registry::PlacementRegistry;

/// Where a run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    /// Every actor is static or done
    Succeeded,
    /// Two actors met off the finish line, or an actor ran off the grid
    Collided { position: Position },
    /// Stopped on request, no verdict
    Stopped,
}

impl RunStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, RunStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Collided { .. } | RunStatus::Stopped
        )
    }
}

/// What happened during one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: Tick,
    pub events: Vec<EngineEvent>,
    pub status: RunStatus,
}

impl TickReport {
    pub fn idle(tick: Tick, status: RunStatus) -> Self {
        Self {
            tick,
            events: Vec::new(),
            status,
        }
    }
}

/// Tick-driven engine over a placement registry
///
/// Time is logical: tick `n` happens at `n * tick_period`, so runs are
/// fully deterministic no matter how the ticks are driven.
#[derive(Debug, Clone)]
pub struct Engine {
    grid: Grid,
    tick_period: Time,
    current_tick: Tick,
}

impl Engine {
    pub fn new(grid: Grid, tick_period: Time) -> Self {
        Self {
            grid,
            tick_period,
            current_tick: 0,
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Logical time of the current tick
    pub fn now(&self) -> Time {
        self.current_tick * self.tick_period
    }

    /// Rewind the clock for a new run
    pub fn reset(&mut self) {
        self.current_tick = 0;
    }

    /// Registry indices in evaluation order: everyone else first, in
    /// registry order, then the agent
    pub fn evaluation_order(registry: &PlacementRegistry, catalog: &EntityCatalog) -> Vec<usize> {
        let agent = registry.agent_index(catalog);
        let mut order: Vec<usize> = (0..registry.len()).filter(|i| Some(*i) != agent).collect();
        order.extend(agent);
        order
    }

    /// Whether every actor is static or done
    pub fn all_settled(registry: &PlacementRegistry) -> bool {
        registry.iter().all(|a| a.is_static || a.is_done())
    }

    /// Run one pass over all due actors
    pub fn tick(&mut self, registry: &mut PlacementRegistry, catalog: &EntityCatalog) -> TickReport {
        let tick = self.current_tick;
        let now = self.now();
        let mut log = EngineEventLog::new();

        let status = match self.run_pass(registry, catalog, now, tick, &mut log) {
            Some(position) => RunStatus::Collided { position },
            None if Self::all_settled(registry) => {
                log.push(EngineEventType::RunSucceeded, tick);
                RunStatus::Succeeded
            }
            None => RunStatus::Running,
        };

        self.current_tick += 1;
        TickReport {
            tick,
            events: log.events,
            status,
        }
    }

    /// Evaluate every due actor once. Returns the cell of a collision, which
    /// cuts the pass short.
    fn run_pass(
        &self,
        registry: &mut PlacementRegistry,
        catalog: &EntityCatalog,
        now: Time,
        tick: Tick,
        log: &mut EngineEventLog,
    ) -> Option<Position> {
        let grid = self.grid;

        for index in Self::evaluation_order(registry, catalog) {
            let actor = &registry.actors()[index];
            if !actor.is_active() {
                continue;
            }
            let Some(entity) = catalog.get(&actor.type_id) else {
                tracing::warn!("Actor {} has unknown type {}, skipping", actor.id, actor.type_id);
                continue;
            };
            if !entity.is_self_propelled() || !is_due(actor, entity.movement_cooldown, now) {
                continue;
            }

            if entity.is_agent {
                if let Some(position) = self.agent_turn(registry, catalog, index, now, tick, log) {
                    return Some(position);
                }
                continue;
            }

            let actors = registry.actors_mut();
            let id = actors[index].id;
            match advance_generic(&mut actors[index], &grid, now) {
                GenericStep::OffGrid { position } => {
                    tracing::info!("Actor {} ran off the grid at {}", id, position);
                    log.push(EngineEventType::CollisionDetected { position, actor_id: id }, tick);
                    return Some(position);
                }
                GenericStep::Moved { from, to } => {
                    log.push(EngineEventType::ActorMoved { id, from, to }, tick);
                    if let Some(position) = self.check_collision(registry, index, tick, log) {
                        return Some(position);
                    }
                    if registry.actors()[index].has_finished {
                        log.push(EngineEventType::ActorFinished { id, position: to }, tick);
                    }
                }
            }
        }

        None
    }

    /// Decide and apply the agent's move
    fn agent_turn(
        &self,
        registry: &mut PlacementRegistry,
        catalog: &EntityCatalog,
        index: usize,
        now: Time,
        tick: Tick,
        log: &mut EngineEventLog,
    ) -> Option<Position> {
        let grid = self.grid;
        let decision = PolicyContext::new(&grid, catalog, registry.actors(), index).decide();

        let actors = registry.actors_mut();
        let agent = &mut actors[index];
        let id = agent.id;
        let from = agent.position;
        tracing::debug!("Agent {} at {}: {:?}", id, from, decision);

        match decision {
            AgentDecision::Wait { .. } => {
                log.push(EngineEventType::RunBlockedWaiting { position: from }, tick);
                None
            }
            AgentDecision::SelfSacrifice { wall } => {
                agent.sacrificed = true;
                tracing::info!("Agent {} steered into the {} wall from {}", id, wall, from);
                log.push(EngineEventType::AgentSelfSacrificed { wall }, tick);
                None
            }
            AgentDecision::Crash { into } => {
                agent.relocate(into, now);
                tracing::info!("Agent {} crashed into the blocker at {}", id, into);
                log.push(EngineEventType::ActorMoved { id, from, to: into }, tick);
                // A deliberate impact counts even on the finish line
                log.push(
                    EngineEventType::CollisionDetected {
                        position: into,
                        actor_id: id,
                    },
                    tick,
                );
                Some(into)
            }
            AgentDecision::Advance { to }
            | AgentDecision::Reroute { to }
            | AgentDecision::Approach { to } => {
                agent.relocate(to, now);
                if grid.is_finish_line(to) {
                    agent.has_finished = true;
                }
                let finished = agent.has_finished;
                log.push(EngineEventType::ActorMoved { id, from, to }, tick);
                if let Some(position) = self.check_collision(registry, index, tick, log) {
                    return Some(position);
                }
                if finished {
                    tracing::info!("Agent {} reached the finish line at {}", id, to);
                    log.push(EngineEventType::ActorFinished { id, position: to }, tick);
                }
                None
            }
        }
    }

    fn check_collision(
        &self,
        registry: &PlacementRegistry,
        mover: usize,
        tick: Tick,
        log: &mut EngineEventLog,
    ) -> Option<Position> {
        find_collision(registry.actors(), mover, &self.grid)?;
        let actor = &registry.actors()[mover];
        tracing::info!("Collision at {} involving {}", actor.position, actor.id);
        log.push(
            EngineEventType::CollisionDetected {
                position: actor.position,
                actor_id: actor.id,
            },
            tick,
        );
        Some(actor.position)
    }
}
