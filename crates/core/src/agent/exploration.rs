//! Visited-tile bookkeeping and nearest-unexplored target selection.

use std::collections::BTreeSet;

use super::pathfinding::manhattan;
use crate::grid::CollisionGrid;
use crate::types::Tile;

/// Records `y * width + x` as visited. Coordinates outside the `width` x `height` grid
/// are ignored.
pub fn mark_visited(visited: &mut BTreeSet<usize>, x: i32, y: i32, width: usize, height: usize) {
    if x < 0 || y < 0 || (x as usize) >= width || (y as usize) >= height {
        return;
    }
    visited.insert((y as usize) * width + (x as usize));
}

/// Traversable tiles whose index has not been visited, in raster order.
pub fn unexplored_tiles(visited: &BTreeSet<usize>, grid: &CollisionGrid) -> Vec<Tile> {
    grid.cells()
        .iter()
        .enumerate()
        .filter(|(idx, blocked)| !**blocked && !visited.contains(idx))
        .map(|(idx, _)| grid.tile_at(idx))
        .collect()
}

/// Nearest candidate by Manhattan distance; ties go to the lowest `(y, x)`.
pub fn pick_exploration_target(candidates: &[Tile], from: Tile) -> Option<Tile> {
    candidates.iter().copied().min_by_key(|tile| (manhattan(from, *tile), tile.y, tile.x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexplored_excludes_blocked_and_visited_tiles() {
        let grid = CollisionGrid::from_ascii(&["#...", "#.#."]);
        let mut visited = BTreeSet::new();
        let (width, height) = (grid.width(), grid.height());
        mark_visited(&mut visited, 1, 0, width, height);
        mark_visited(&mut visited, -1, 0, width, height);
        mark_visited(&mut visited, 9, 0, width, height);
        mark_visited(&mut visited, 1, 5, width, height);
        assert_eq!(visited.len(), 1, "only the in-bounds tile is recorded");

        let tiles = unexplored_tiles(&visited, &grid);
        assert_eq!(tiles, vec![Tile::new(2, 0), Tile::new(3, 0), Tile::new(1, 1), Tile::new(3, 1)]);
    }

    #[test]
    fn nearest_target_prefers_lowest_row_then_column_on_ties() {
        let from = Tile::new(4, 4);
        let candidates = [Tile::new(4, 6), Tile::new(6, 4), Tile::new(2, 4), Tile::new(4, 2)];
        assert_eq!(pick_exploration_target(&candidates, from), Some(Tile::new(4, 2)));

        let candidates = [Tile::new(5, 5), Tile::new(3, 5), Tile::new(9, 9)];
        assert_eq!(pick_exploration_target(&candidates, from), Some(Tile::new(3, 5)));
    }

    #[test]
    fn no_candidates_means_exploration_is_complete() {
        assert_eq!(pick_exploration_target(&[], Tile::new(0, 0)), None);
    }
}
