//! Placement registry - the actors currently on the grid
//!
//! Actors are kept in insertion order. The registry enforces placement
//! invariants (one actor per cell, a single agent that starts on the
//! starting line, immobile types kept off the starting line, a placement
//! cap); movement itself is the engine's business.

use serde::{Deserialize, Serialize};

use crate::core::error::PlacementError;
use crate::core::types::{ActorId, EntityTypeId, Position, Time};
use crate::world::catalog::EntityCatalog;
use crate::world::grid::Grid;

/// An actor bound to a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedActor {
    pub id: ActorId,
    pub type_id: EntityTypeId,
    pub position: Position,
    /// Placed off the starting line; never moves under its own power
    pub is_static: bool,
    /// Reached the finish line. Never reverts.
    pub has_finished: bool,
    /// Agent crashed itself into a wall and takes no further turns
    pub sacrificed: bool,
    /// Logical time of the last relocation, `None` until the first move
    pub last_move: Option<Time>,
}

impl PlacedActor {
    /// Whether the actor takes no further turns this run
    pub fn is_done(&self) -> bool {
        self.has_finished || self.sacrificed
    }

    /// Whether the actor may still move this run
    pub fn is_active(&self) -> bool {
        !self.is_static && !self.is_done()
    }

    /// Record a successful relocation
    pub fn relocate(&mut self, to: Position, now: Time) {
        self.position = to;
        self.last_move = Some(now);
    }
}

/// Deep copy of the registry's actors
///
/// Holds its own `PlacedActor` values; later mutation of the live registry
/// never shows through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    actors: Vec<PlacedActor>,
}

impl RegistrySnapshot {
    pub fn actors(&self) -> &[PlacedActor] {
        &self.actors
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

/// The set of actors on the grid
#[derive(Debug, Clone)]
pub struct PlacementRegistry {
    grid: Grid,
    max_actors: usize,
    actors: Vec<PlacedActor>,
}

impl PlacementRegistry {
    pub fn new(grid: Grid, max_actors: usize) -> Self {
        Self {
            grid,
            max_actors,
            actors: Vec::new(),
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Check the type-specific placement rules for a cell
    ///
    /// The agent may only be placed once, and only on the starting line.
    /// Types that cannot move may not sit on the starting line. Anything
    /// else is allowed here, subject to the occupancy check in `place`.
    pub fn is_allowed(&self, catalog: &EntityCatalog, type_id: &EntityTypeId, position: Position) -> bool {
        self.check_allowed(catalog, type_id, position).is_ok()
    }

    fn check_allowed(
        &self,
        catalog: &EntityCatalog,
        type_id: &EntityTypeId,
        position: Position,
    ) -> Result<(), PlacementError> {
        if !self.grid.contains(position) {
            return Err(PlacementError::OutOfBounds(position));
        }

        let Some(entity) = catalog.get(type_id) else {
            return Err(PlacementError::UnknownType(type_id.clone()));
        };

        let on_start = self.grid.is_starting_line(position);

        if entity.is_agent {
            if self.agent_index(catalog).is_some() {
                return Err(PlacementError::AgentAlreadyPlaced);
            }
            if !on_start {
                return Err(PlacementError::AgentOffStartingLine(position));
            }
        } else if on_start && !entity.is_self_propelled() {
            return Err(PlacementError::ImmobileOnStartingLine(type_id.clone()));
        }

        Ok(())
    }

    pub fn is_at_capacity(&self) -> bool {
        self.actors.len() >= self.max_actors
    }

    /// Place an actor of the given type
    ///
    /// On rejection the registry is left untouched.
    pub fn place(
        &mut self,
        catalog: &EntityCatalog,
        type_id: &EntityTypeId,
        position: Position,
    ) -> Result<ActorId, PlacementError> {
        if self.grid.contains(position) && self.is_occupied(position) {
            return Err(PlacementError::Occupied(position));
        }
        if self.is_at_capacity() {
            return Err(PlacementError::AtCapacity(self.max_actors));
        }
        self.check_allowed(catalog, type_id, position)?;

        let id = ActorId::new();
        self.actors.push(PlacedActor {
            id,
            type_id: type_id.clone(),
            position,
            is_static: !self.grid.is_starting_line(position),
            has_finished: false,
            sacrificed: false,
            last_move: None,
        });
        tracing::debug!("Placed {} {} at cell {}", type_id, id, position);
        Ok(id)
    }

    /// Remove the actor at a cell, returning it if there was one
    pub fn remove(&mut self, position: Position) -> Option<PlacedActor> {
        let index = self.index_at(position)?;
        Some(self.actors.remove(index))
    }

    pub fn clear(&mut self) {
        self.actors.clear();
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            actors: self.actors.clone(),
        }
    }

    /// Replace every actor with an independent copy of the snapshot's
    pub fn restore(&mut self, snapshot: &RegistrySnapshot) {
        self.actors = snapshot.actors.clone();
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.actors.iter().any(|a| a.position == position)
    }

    pub fn actor_at(&self, position: Position) -> Option<&PlacedActor> {
        self.actors.iter().find(|a| a.position == position)
    }

    pub fn index_at(&self, position: Position) -> Option<usize> {
        self.actors.iter().position(|a| a.position == position)
    }

    pub fn agent_index(&self, catalog: &EntityCatalog) -> Option<usize> {
        self.actors.iter().position(|a| catalog.is_agent(&a.type_id))
    }

    pub fn agent(&self, catalog: &EntityCatalog) -> Option<&PlacedActor> {
        self.agent_index(catalog).map(|i| &self.actors[i])
    }

    pub fn actors(&self) -> &[PlacedActor] {
        &self.actors
    }

    /// Mutable access for the engine
    pub(crate) fn actors_mut(&mut self) -> &mut [PlacedActor] {
        &mut self.actors
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedActor> {
        self.actors.iter()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
