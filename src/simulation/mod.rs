//! Tick-driven movement and collision resolution

pub mod collision;
pub mod controller;
pub mod events;
pub mod movement;
pub mod policy;
pub mod scheduler;
pub mod tick;

pub use collision::{find_collision, shared_cells};
pub use controller::Simulation;
pub use events::{EngineEvent, EngineEventLog, EngineEventType};
pub use movement::{advance_generic, is_due, GenericStep};
pub use policy::{AgentDecision, PolicyContext, WaitReason};
pub use scheduler::{run_paced, run_to_completion, Scheduler};
pub use tick::{Engine, RunStatus, TickReport};
