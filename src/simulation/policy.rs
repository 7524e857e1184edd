//! Agent decision policy
//!
//! Evaluated once per tick while the agent is due, in order:
//!
//! 1. Forward check: take the cell ahead if it is free.
//! 2. Row-block check: look at the three forward cells. Any free cell means
//!    the row is only partially blocked (stage 4), otherwise stage 3.
//! 3. Blocked row: wait for mobile blockers; with only fixed blockers, crash
//!    into the highest-valued reachable one, edge toward an unreachable one,
//!    or steer into the nearest wall when every target ranks below the agent.
//! 4. Reroute: diagonal step biased by lane, else a lateral step, unless
//!    traffic is coming up the destination column from behind.
//!
//! The policy only reads state. It returns an [`AgentDecision`] that the
//! engine applies.

use crate::core::types::Position;
use crate::world::catalog::{EntityCatalog, SocietalValue};
use crate::world::grid::{Grid, Lane, Wall};
use crate::world::registry::PlacedActor;

/// Why the agent held its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    /// A blocker in the forward row may still clear the path
    MobileBlocker,
    /// An actor is approaching the destination column from behind
    CrossTraffic,
    /// No free cell to step into
    BoxedIn,
}

/// What the agent does this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentDecision {
    /// The cell ahead is free
    Advance { to: Position },
    /// Step around a partially blocked row
    Reroute { to: Position },
    /// Lateral step toward a highest-valued blocker that is out of reach
    Approach { to: Position },
    /// Deliberate impact with a fixed blocker
    Crash { into: Position },
    /// Steer into a side wall instead of hitting anyone
    SelfSacrifice { wall: Wall },
    Wait { reason: WaitReason },
}

impl AgentDecision {
    /// Destination cell, for decisions that relocate the agent
    pub fn destination(&self) -> Option<Position> {
        match *self {
            AgentDecision::Advance { to }
            | AgentDecision::Reroute { to }
            | AgentDecision::Approach { to } => Some(to),
            AgentDecision::Crash { into } => Some(into),
            AgentDecision::SelfSacrifice { .. } | AgentDecision::Wait { .. } => None,
        }
    }
}

/// Read-only view of the grid the agent plans against
pub struct PolicyContext<'a> {
    grid: &'a Grid,
    catalog: &'a EntityCatalog,
    actors: &'a [PlacedActor],
    agent: usize,
}

impl<'a> PolicyContext<'a> {
    pub fn new(
        grid: &'a Grid,
        catalog: &'a EntityCatalog,
        actors: &'a [PlacedActor],
        agent: usize,
    ) -> Self {
        Self {
            grid,
            catalog,
            actors,
            agent,
        }
    }

    fn agent(&self) -> &PlacedActor {
        &self.actors[self.agent]
    }

    /// Actor standing in a cell, ignoring actors that already crossed the
    /// finish line
    pub fn occupant(&self, position: Position) -> Option<&PlacedActor> {
        self.actors
            .iter()
            .enumerate()
            .find(|(i, a)| *i != self.agent && a.position == position && !a.has_finished)
            .map(|(_, a)| a)
    }

    pub fn is_free(&self, position: Position) -> bool {
        self.occupant(position).is_none()
    }

    /// Types missing from the catalog count as permanent obstacles
    fn value_of(&self, actor: &PlacedActor) -> SocietalValue {
        self.catalog
            .get(&actor.type_id)
            .map(|t| t.societal_value)
            .unwrap_or(SocietalValue::Unbounded)
    }

    fn is_self_propelled(&self, actor: &PlacedActor) -> bool {
        self.catalog
            .get(&actor.type_id)
            .is_some_and(|t| t.is_self_propelled())
    }

    /// Whether a mobile actor is coming up the target's column from a row
    /// behind it
    pub fn traffic_behind(&self, target: Position) -> bool {
        let column = self.grid.column(target);
        let row = self.grid.row(target);
        self.actors.iter().enumerate().any(|(i, a)| {
            i != self.agent
                && a.is_active()
                && self.is_self_propelled(a)
                && self.grid.column(a.position) == column
                && self.grid.row(a.position) > row
        })
    }

    /// Decide the agent's move for this tick
    pub fn decide(&self) -> AgentDecision {
        let position = self.agent().position;

        let Some(forward) = self.grid.forward(position) else {
            return AgentDecision::Wait {
                reason: WaitReason::BoxedIn,
            };
        };
        if self.is_free(forward) {
            return AgentDecision::Advance { to: forward };
        }

        let Some(window) = self.grid.forward_window(position) else {
            return AgentDecision::Wait {
                reason: WaitReason::BoxedIn,
            };
        };
        if window.iter().any(|&cell| self.is_free(cell)) {
            self.reroute(position, forward)
        } else {
            self.resolve_blocked_row(position, window)
        }
    }

    /// All three forward cells are occupied
    fn resolve_blocked_row(&self, position: Position, window: [Position; 3]) -> AgentDecision {
        let blockers: Vec<&PlacedActor> =
            window.iter().filter_map(|&cell| self.occupant(cell)).collect();

        // Something in the row may still clear the path
        if blockers.iter().any(|b| !b.is_static) {
            return AgentDecision::Wait {
                reason: WaitReason::MobileBlocker,
            };
        }

        // Cells the agent can reach from its lane
        let lane = self.grid.lane(position);
        let reachable: &[Position] = match lane {
            Lane::Left => &window[..2],
            Lane::Middle => &window[..],
            Lane::Right => &window[1..],
        };

        // The maximum is taken over every blocker, reachable or not
        let Some(max_value) = blockers.iter().map(|b| self.value_of(b)).max() else {
            return AgentDecision::Wait {
                reason: WaitReason::BoxedIn,
            };
        };
        let target = reachable.iter().copied().find(|&cell| {
            self.occupant(cell)
                .is_some_and(|b| self.value_of(b) == max_value)
        });

        let own_value = self.value_of(self.agent());
        match target {
            Some(into) if max_value >= own_value => AgentDecision::Crash { into },
            Some(_) => AgentDecision::SelfSacrifice {
                wall: self.grid.nearest_wall(position),
            },
            None => self.approach(position, lane),
        }
    }

    /// One lateral probe toward the out-of-reach target
    fn approach(&self, position: Position, lane: Lane) -> AgentDecision {
        let probes = match lane {
            Lane::Left => [self.grid.right_of(position), None],
            Lane::Right => [self.grid.left_of(position), None],
            Lane::Middle => [self.grid.left_of(position), self.grid.right_of(position)],
        };
        match probes.into_iter().flatten().find(|&cell| self.is_free(cell)) {
            Some(to) => AgentDecision::Approach { to },
            None => AgentDecision::Wait {
                reason: WaitReason::BoxedIn,
            },
        }
    }

    /// The forward row is only partially blocked
    fn reroute(&self, position: Position, forward: Position) -> AgentDecision {
        let (diagonals, laterals) = match self.grid.lane(position) {
            Lane::Left => (
                [self.grid.right_of(forward), None],
                [self.grid.right_of(position), None],
            ),
            Lane::Right => (
                [self.grid.left_of(forward), None],
                [self.grid.left_of(position), None],
            ),
            Lane::Middle => (
                [self.grid.left_of(forward), self.grid.right_of(forward)],
                [self.grid.left_of(position), self.grid.right_of(position)],
            ),
        };

        let step = diagonals
            .into_iter()
            .flatten()
            .find(|&cell| self.is_free(cell))
            .or_else(|| laterals.into_iter().flatten().find(|&cell| self.is_free(cell)));

        match step {
            Some(to) if self.traffic_behind(to) => AgentDecision::Wait {
                reason: WaitReason::CrossTraffic,
            },
            Some(to) => AgentDecision::Reroute { to },
            None => AgentDecision::Wait {
                reason: WaitReason::BoxedIn,
            },
        }
    }
}
