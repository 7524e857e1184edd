//! Engine event stream
//!
//! Events are what the engine tells the outside world: the controller uses
//! them to decide when a run is over, front ends use them for the log.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, Position, Tick};
use crate::world::grid::Wall;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEventType {
    ActorMoved {
        id: ActorId,
        from: Position,
        to: Position,
    },
    ActorFinished {
        id: ActorId,
        position: Position,
    },
    /// Terminal: the run failed
    CollisionDetected {
        position: Position,
        actor_id: ActorId,
    },
    /// The agent held its position this tick
    RunBlockedWaiting {
        position: Position,
    },
    AgentSelfSacrificed {
        wall: Wall,
    },
    /// Terminal: every actor is static or done
    RunSucceeded,
    /// Terminal: stop requested, no verdict
    RunStopped,
}

impl EngineEventType {
    /// Whether this event ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngineEventType::CollisionDetected { .. }
                | EngineEventType::RunSucceeded
                | EngineEventType::RunStopped
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub tick: Tick,
    #[serde(flatten)]
    pub event_type: EngineEventType,
}

impl std::fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[tick {:>4}] ", self.tick)?;
        match &self.event_type {
            EngineEventType::ActorMoved { id, from, to } => {
                write!(f, "{} moved {} -> {}", id, from, to)
            }
            EngineEventType::ActorFinished { id, position } => {
                write!(f, "{} crossed the finish line at {}", id, position)
            }
            EngineEventType::CollisionDetected { position, actor_id } => {
                write!(f, "COLLISION at {} involving {}", position, actor_id)
            }
            EngineEventType::RunBlockedWaiting { position } => {
                write!(f, "agent waiting at {}", position)
            }
            EngineEventType::AgentSelfSacrificed { wall } => {
                write!(f, "agent steered into the {} wall", wall)
            }
            EngineEventType::RunSucceeded => f.write_str("run succeeded"),
            EngineEventType::RunStopped => f.write_str("run stopped"),
        }
    }
}

/// Events from a single tick
#[derive(Debug, Clone, Default)]
pub struct EngineEventLog {
    pub events: Vec<EngineEvent>,
}

impl EngineEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: EngineEventType, tick: Tick) {
        self.events.push(EngineEvent { tick, event_type });
    }
}
