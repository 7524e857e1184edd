pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{CatalogError, ControlError, PlacementError, Result, SimError};
pub use types::{ActorId, EntityTypeId, Position, Tick, Time};
