//! Simulation configuration with documented constants
//!
//! Values can be loaded from a TOML document; every field falls back to
//! its default when omitted.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, SimError};
use crate::core::types::Time;

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === GRID ===
    /// Number of columns (lanes). The blocked-row window is three cells
    /// wide, so at least 3 are required.
    pub columns: u32,

    /// Number of rows. Row 1 is the finish line, the last row is the
    /// starting line.
    pub rows: u32,

    // === TIMING ===
    /// Length of one tick in logical time units
    ///
    /// Movement cooldowns in the catalog use the same unit, so a type with
    /// a cooldown of 150 moves at most every third tick at the default 50.
    pub tick_period: Time,

    /// Safety cap for headless runs; a run still going after this many
    /// ticks is stopped without a verdict.
    pub max_ticks: u64,

    // === PLACEMENT ===
    /// Maximum number of actors on the grid at once
    pub max_actors: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            rows: 10,
            tick_period: 50,
            max_ticks: 2000,
            max_actors: 20,
        }
    }
}

/// On-disk layout: `[grid]` and `[run]` tables
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    grid: GridSection,
    #[serde(default)]
    run: RunSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GridSection {
    columns: u32,
    rows: u32,
    max_actors: usize,
}

impl Default for GridSection {
    fn default() -> Self {
        let d = SimulationConfig::default();
        Self {
            columns: d.columns,
            rows: d.rows,
            max_actors: d.max_actors,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RunSection {
    tick_period: Time,
    max_ticks: u64,
}

impl Default for RunSection {
    fn default() -> Self {
        let d = SimulationConfig::default();
        Self {
            tick_period: d.tick_period,
            max_ticks: d.max_ticks,
        }
    }
}

impl SimulationConfig {
    /// Default config with a different grid size
    pub fn with_grid(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML config document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let config = Self {
            columns: file.grid.columns,
            rows: file.grid.rows,
            max_actors: file.grid.max_actors,
            tick_period: file.run.tick_period,
            max_ticks: file.run.max_ticks,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.columns < 3 {
            return Err(SimError::InvalidConfig(format!(
                "columns ({}) must be at least 3",
                self.columns
            )));
        }

        // Starting line and finish line must be different rows
        if self.rows < 2 {
            return Err(SimError::InvalidConfig(format!(
                "rows ({}) must be at least 2",
                self.rows
            )));
        }

        // Cells are numbered with u32
        if self.columns.checked_mul(self.rows).is_none() {
            return Err(SimError::InvalidConfig(format!(
                "a {}x{} grid has too many cells",
                self.columns, self.rows
            )));
        }

        if self.tick_period == 0 {
            return Err(SimError::InvalidConfig("tick_period must be positive".into()));
        }

        if self.max_actors == 0 {
            return Err(SimError::InvalidConfig("max_actors must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_narrow_grid_rejected() {
        let config = SimulationConfig::with_grid(2, 10);
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_single_row_rejected() {
        let config = SimulationConfig::with_grid(3, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let config = SimulationConfig::with_grid(70_000, 70_000);
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        // Largest grid whose cells still fit
        let config = SimulationConfig::with_grid(65_536, 65_535);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [grid]
            rows = 6
            "#,
        )
        .unwrap();
        assert_eq!(config.rows, 6);
        assert_eq!(config.columns, 3);
        assert_eq!(config.tick_period, 50);
    }

    #[test]
    fn test_full_toml() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [grid]
            columns = 5
            rows = 8
            max_actors = 12

            [run]
            tick_period = 100
            max_ticks = 500
            "#,
        )
        .unwrap();
        assert_eq!((config.columns, config.rows), (5, 8));
        assert_eq!(config.max_actors, 12);
        assert_eq!(config.tick_period, 100);
        assert_eq!(config.max_ticks, 500);
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let result = SimulationConfig::from_toml_str("[run]\ntick_period = 0\n");
        assert!(result.is_err());
    }
}
