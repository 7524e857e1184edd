//! The static side of the simulation: grid geometry, the entity catalog,
//! and the registry of placed actors

pub mod catalog;
pub mod grid;
pub mod registry;

pub use catalog::{EntityCatalog, EntityType, SocietalValue};
pub use grid::{Grid, Lane, Wall};
pub use registry::{PlacedActor, PlacementRegistry, RegistrySnapshot};
