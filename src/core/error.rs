use thiserror::Error;

use crate::core::types::{EntityTypeId, Position};

/// Why a placement request was refused. The registry is never modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("Position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("Unknown entity type: {0}")]
    UnknownType(EntityTypeId),

    #[error("Cell {0} is already occupied")]
    Occupied(Position),

    #[error("Placement limit of {0} actors reached")]
    AtCapacity(usize),

    #[error("An agent is already on the grid")]
    AgentAlreadyPlaced,

    #[error("The agent must start on the starting line (cell {0} is not)")]
    AgentOffStartingLine(Position),

    #[error("{0} cannot move and may not block the starting line")]
    ImmobileOnStartingLine(EntityTypeId),
}

/// Why the controller refused a start/restore/edit request
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    #[error("Nothing has been placed on the grid")]
    EmptyRegistry,

    #[error("No agent has been placed on the grid")]
    MissingAgent,

    #[error("No backup is available to restore")]
    NoBackupAvailable,

    #[error("A run is in progress")]
    RunInProgress,
}

/// Problems with a catalog definition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate entity type: {0}")]
    DuplicateType(EntityTypeId),

    #[error("Catalog must define exactly one agent type, found {0}")]
    AgentCount(usize),

    #[error("Agent type {0} must be able to move")]
    ImmobileAgent(EntityTypeId),
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Placement rejected: {0}")]
    Placement(#[from] PlacementError),

    #[error("Control request rejected: {0}")]
    Control(#[from] ControlError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
