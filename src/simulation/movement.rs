//! Generic forward movement
//!
//! Every mobile actor other than the agent follows one rule: one row toward
//! the finish line whenever its cooldown allows.

use crate::core::types::{Position, Time};
use crate::world::grid::Grid;
use crate::world::registry::PlacedActor;

/// Result of applying the generic rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericStep {
    Moved { from: Position, to: Position },
    /// There is no row ahead; counts as a boundary collision
    OffGrid { position: Position },
}

/// Whether the actor's cooldown has elapsed
///
/// An actor that has never moved is always due.
pub fn is_due(actor: &PlacedActor, cooldown: Time, now: Time) -> bool {
    match actor.last_move {
        None => true,
        Some(last) => now.saturating_sub(last) >= cooldown,
    }
}

/// Move the actor one row forward, marking it finished on the finish line
pub fn advance_generic(actor: &mut PlacedActor, grid: &Grid, now: Time) -> GenericStep {
    let from = actor.position;
    let Some(to) = grid.forward(from) else {
        return GenericStep::OffGrid { position: from };
    };

    actor.relocate(to, now);
    if grid.is_finish_line(to) {
        actor.has_finished = true;
    }
    GenericStep::Moved { from, to }
}
