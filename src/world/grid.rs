//! Grid dimensions and cell arithmetic
//!
//! Cells are numbered from 1 in row-major order. Row 1 is the finish line
//! and the last row is the starting line, so "forward" means one row up:
//! `position - columns`.

use serde::{Deserialize, Serialize};

use crate::core::types::Position;

/// Which lane of the grid a column belongs to, as seen by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    Left,
    Middle,
    Right,
}

/// Side boundary of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wall {
    Left,
    Right,
}

impl std::fmt::Display for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Wall::Left => f.write_str("left"),
            Wall::Right => f.write_str("right"),
        }
    }
}

/// Immutable grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub columns: u32,
    pub rows: u32,
}

impl Grid {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub fn cell_count(&self) -> u32 {
        self.columns * self.rows
    }

    pub fn contains(&self, position: Position) -> bool {
        position >= 1 && position <= self.cell_count()
    }

    /// 1-based row: ⌈position / columns⌉
    pub fn row(&self, position: Position) -> u32 {
        (position - 1) / self.columns + 1
    }

    /// 1-based column
    pub fn column(&self, position: Position) -> u32 {
        (position - 1) % self.columns + 1
    }

    /// Cell at a 1-based (row, column)
    pub fn position_at(&self, row: u32, column: u32) -> Position {
        (row - 1) * self.columns + column
    }

    pub fn is_starting_line(&self, position: Position) -> bool {
        self.row(position) == self.rows
    }

    pub fn is_finish_line(&self, position: Position) -> bool {
        self.row(position) == 1
    }

    /// One row toward the finish line, if there is such a row
    pub fn forward(&self, position: Position) -> Option<Position> {
        position.checked_sub(self.columns).filter(|p| *p >= 1)
    }

    /// Same row, one column left
    pub fn left_of(&self, position: Position) -> Option<Position> {
        (self.column(position) > 1).then(|| position - 1)
    }

    /// Same row, one column right
    pub fn right_of(&self, position: Position) -> Option<Position> {
        (self.column(position) < self.columns).then(|| position + 1)
    }

    pub fn lane(&self, position: Position) -> Lane {
        match self.column(position) {
            1 => Lane::Left,
            c if c == self.columns => Lane::Right,
            _ => Lane::Middle,
        }
    }

    /// The three forward cells the agent inspects for a blocked row.
    ///
    /// The window is centered on the agent's column and clamped to the grid
    /// edge, so a Left-lane agent sees its forward cell and the two to its
    /// right, and a Right-lane agent the forward cell and the two to its left.
    /// On a three-column grid this is simply the whole forward row.
    pub fn forward_window(&self, position: Position) -> Option<[Position; 3]> {
        let forward = self.forward(position)?;
        let start = match self.lane(position) {
            Lane::Left => forward,
            Lane::Middle => forward - 1,
            Lane::Right => forward - 2,
        };
        Some([start, start + 1, start + 2])
    }

    /// Side boundary nearest to the column; ties go to the left wall
    pub fn nearest_wall(&self, position: Position) -> Wall {
        let column = self.column(position);
        if column - 1 <= self.columns - column {
            Wall::Left
        } else {
            Wall::Right
        }
    }
}
