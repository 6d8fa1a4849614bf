//! Grid planning for every goal that moves the agent: shortest paths, single-step
//! movement intents and reachability. Target selection lives with the callers.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::grid::CollisionGrid;
use crate::types::{Path, Tile};
use crate::world::{World, WorldError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

/// Why a single path step could not be issued. Callers replan; none of these is fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepFailure {
    EndOfPath,
    Blocked(Tile),
    World(WorldError),
}

/// Shortest 4-directional path from `start` to `goal`, both inclusive.
///
/// Returns `[start]` when `start == goal` and an empty path when the goal cannot be
/// reached. Expansion is bounded by the number of grid cells.
pub fn find_path(grid: &CollisionGrid, start: Tile, goal: Tile) -> Path {
    if !grid.in_bounds(start) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }
    if grid.is_blocked(goal) {
        return Vec::new();
    }

    let max_expansions = grid.width() * grid.height();
    let mut expansions = 0usize;
    let mut open_set = BTreeSet::new();
    let mut closed = BTreeSet::new();
    let mut g_score = BTreeMap::new();
    let mut came_from = BTreeMap::new();
    let h = manhattan(start, goal);
    open_set.insert(OpenNode { f: h, h, y: start.y, x: start.x });
    g_score.insert(start, 0u32);

    while let Some(curr) = open_set.pop_first() {
        let p = Tile { y: curr.y, x: curr.x };
        if !closed.insert(p) {
            continue;
        }
        if p == goal {
            return reconstruct_path(&came_from, start, goal);
        }
        expansions += 1;
        if expansions > max_expansions {
            break;
        }
        let cur_g = g_score.get(&p).copied().unwrap_or(0);
        for n in neighbors(p) {
            if grid.is_blocked(n) || closed.contains(&n) {
                continue;
            }
            let tg = cur_g + 1;
            if tg < g_score.get(&n).copied().unwrap_or(u32::MAX) {
                came_from.insert(n, p);
                g_score.insert(n, tg);
                let h = manhattan(n, goal);
                open_set.insert(OpenNode { f: tg + h, h, y: n.y, x: n.x });
            }
        }
    }
    Vec::new()
}

/// Issues one movement intent toward `path[index + 1]` and returns the new index.
pub fn move_along_path<W: World>(
    world: &mut W,
    grid: &CollisionGrid,
    path: &[Tile],
    index: usize,
) -> Result<usize, StepFailure> {
    let Some(next) = path.get(index + 1).copied() else {
        return Err(StepFailure::EndOfPath);
    };
    if grid.is_blocked(next) || world.is_tile_occupied(next) {
        return Err(StepFailure::Blocked(next));
    }
    world.set_move_target(next).map_err(StepFailure::World)?;
    Ok(index + 1)
}

/// Every traversable tile connected to `start`, in raster order.
pub fn reachable_tiles(grid: &CollisionGrid, start: Tile) -> BTreeSet<Tile> {
    let mut visited = BTreeSet::new();
    if !grid.in_bounds(start) {
        return visited;
    }

    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for neighbor in neighbors(current) {
            if grid.is_traversable(neighbor) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    visited
}

fn reconstruct_path(came: &BTreeMap<Tile, Tile>, start: Tile, goal: Tile) -> Path {
    let mut p = goal;
    let mut result = vec![p];
    while p != start {
        let Some(prev) = came.get(&p).copied() else {
            return Vec::new();
        };
        p = prev;
        result.push(p);
    }
    result.reverse();
    result
}

/// Expansion order is up, right, down, left.
pub fn neighbors(p: Tile) -> [Tile; 4] {
    [
        Tile { y: p.y - 1, x: p.x },
        Tile { y: p.y, x: p.x + 1 },
        Tile { y: p.y + 1, x: p.x },
        Tile { y: p.y, x: p.x - 1 },
    ]
}

pub fn manhattan(a: Tile, b: Tile) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::*;

    #[test]
    fn start_equal_to_goal_yields_single_tile_path() {
        let grid = open_room(6, 6);
        let start = Tile::new(2, 2);
        assert_eq!(find_path(&grid, start, start), vec![start]);
    }

    #[test]
    fn path_walks_around_wall_with_shortest_length() {
        let grid = CollisionGrid::from_ascii(&[
            "#######",
            "#.....#",
            "#.###.#",
            "#.....#",
            "#######",
        ]);
        let path = find_path(&grid, Tile::new(1, 1), Tile::new(5, 3));
        assert_eq!(path.len(), 7, "six steps around the inner wall");
        assert_eq!(path.first(), Some(&Tile::new(1, 1)));
        assert_eq!(path.last(), Some(&Tile::new(5, 3)));
        for pair in path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1, "steps must be orthogonal neighbours");
            assert!(grid.is_traversable(pair[1]));
        }
    }

    #[test]
    fn unreachable_or_blocked_goal_yields_empty_path() {
        let grid = CollisionGrid::from_ascii(&[
            "#######",
            "#..#..#",
            "#..#..#",
            "#######",
        ]);
        assert!(find_path(&grid, Tile::new(1, 1), Tile::new(5, 2)).is_empty());
        assert!(find_path(&grid, Tile::new(1, 1), Tile::new(3, 1)).is_empty());
        assert!(find_path(&grid, Tile::new(-1, 1), Tile::new(2, 1)).is_empty());
    }

    #[test]
    fn equal_length_routes_resolve_identically_every_time() {
        let grid = open_room(9, 9);
        let first = find_path(&grid, Tile::new(1, 1), Tile::new(6, 6));
        for _ in 0..5 {
            assert_eq!(find_path(&grid, Tile::new(1, 1), Tile::new(6, 6)), first);
        }
        assert_eq!(first.len(), 11);
    }

    #[test]
    fn move_along_path_reports_dynamic_obstacle() {
        let grid = open_room(6, 6);
        let mut world = world_at(Tile::new(1, 1));
        let path = find_path(&grid, Tile::new(1, 1), Tile::new(4, 1));
        world.set_occupied(Tile::new(2, 1), true);

        assert_eq!(
            move_along_path(&mut world, &grid, &path, 0),
            Err(StepFailure::Blocked(Tile::new(2, 1)))
        );

        world.set_occupied(Tile::new(2, 1), false);
        assert_eq!(move_along_path(&mut world, &grid, &path, 0), Ok(1));
        assert_eq!(world.move_target(), Some(Tile::new(2, 1)));
        assert_eq!(
            move_along_path(&mut world, &grid, &path, path.len() - 1),
            Err(StepFailure::EndOfPath)
        );
    }

    #[test]
    fn reachable_tiles_stay_inside_enclosure() {
        let grid = CollisionGrid::from_ascii(&[
            "######",
            "#..#.#",
            "#..#.#",
            "######",
        ]);
        let reachable = reachable_tiles(&grid, Tile::new(1, 1));
        assert_eq!(reachable.len(), 4);
        assert!(!reachable.contains(&Tile::new(4, 1)));
    }
}
