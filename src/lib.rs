//! Trolley Grid - autonomous agent dilemmas on a lane grid

pub mod core;
pub mod scenario;
pub mod simulation;
pub mod world;
