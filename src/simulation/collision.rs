//! Collision detection
//!
//! Two actors in the same cell collide, unless the cell is on the finish
//! line, where actors merge out of the road safely.

use crate::core::types::Position;
use crate::world::grid::Grid;
use crate::world::registry::PlacedActor;

/// Find another actor sharing the mover's cell
///
/// Returns the index of the first other occupant, or `None` when the cell
/// is shared with nobody or lies on the finish line.
pub fn find_collision(actors: &[PlacedActor], mover: usize, grid: &Grid) -> Option<usize> {
    let position = actors.get(mover)?.position;
    if grid.is_finish_line(position) {
        return None;
    }
    actors
        .iter()
        .enumerate()
        .find(|(i, a)| *i != mover && a.position == position)
        .map(|(i, _)| i)
}

/// Every cell that holds more than one actor off the finish line
pub fn shared_cells(actors: &[PlacedActor], grid: &Grid) -> Vec<Position> {
    let mut cells: Vec<Position> = (0..actors.len())
        .filter(|&i| find_collision(actors, i, grid).is_some())
        .map(|i| actors[i].position)
        .collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ActorId;

    fn actor(position: Position) -> PlacedActor {
        PlacedActor {
            id: ActorId::new(),
            type_id: "pedestrian".into(),
            position,
            is_static: false,
            has_finished: false,
            sacrificed: false,
            last_move: None,
        }
    }

    #[test]
    fn test_shared_cell_is_symmetric() {
        let grid = Grid::new(3, 4);
        let actors = vec![actor(5), actor(8), actor(5)];
        assert_eq!(find_collision(&actors, 0, &grid), Some(2));
        assert_eq!(find_collision(&actors, 2, &grid), Some(0));
        assert_eq!(find_collision(&actors, 1, &grid), None);
    }

    #[test]
    fn test_lone_actor_never_collides_with_itself() {
        let grid = Grid::new(3, 4);
        let actors = vec![actor(5)];
        assert_eq!(find_collision(&actors, 0, &grid), None);
    }

    #[test]
    fn test_finish_line_is_exempt() {
        let grid = Grid::new(3, 4);
        let actors = vec![actor(2), actor(2)];
        assert_eq!(find_collision(&actors, 0, &grid), None);
        assert!(shared_cells(&actors, &grid).is_empty());
    }

    #[test]
    fn test_shared_cells_deduplicated() {
        let grid = Grid::new(3, 4);
        let actors = vec![actor(7), actor(7), actor(9), actor(9), actor(10)];
        assert_eq!(shared_cells(&actors, &grid), vec![7, 9]);
    }
}
