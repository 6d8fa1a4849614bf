//! Static collision grid shared read-only by the agent and its collaborators.

use std::iter;

use crate::types::Tile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionGrid {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl CollisionGrid {
    /// Height is derived as `blocked.len() / width`; a trailing partial row is ignored.
    pub fn new(blocked: Vec<bool>, width: usize) -> Self {
        let height = if width == 0 { 0 } else { blocked.len() / width };
        let mut blocked = blocked;
        blocked.truncate(width * height);
        Self { width, height, blocked }
    }

    pub fn open(width: usize, height: usize) -> Self {
        Self { width, height, blocked: vec![false; width * height] }
    }

    /// Builds a grid from ASCII rows where `#` is blocked and anything else is open.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.first().map_or(0, |row| row.chars().count());
        let blocked = rows
            .iter()
            .flat_map(|row| row.chars().chain(iter::repeat('#')).take(width))
            .map(|c| c == '#')
            .collect();
        Self::new(blocked, width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[bool] {
        &self.blocked
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x >= 0
            && tile.y >= 0
            && (tile.x as usize) < self.width
            && (tile.y as usize) < self.height
    }

    /// Out-of-bounds tiles count as blocked.
    pub fn is_blocked(&self, tile: Tile) -> bool {
        match self.index_of(tile) {
            Some(idx) => self.blocked[idx],
            None => true,
        }
    }

    pub fn is_traversable(&self, tile: Tile) -> bool {
        !self.is_blocked(tile)
    }

    pub fn set_blocked(&mut self, tile: Tile, blocked: bool) {
        if let Some(idx) = self.index_of(tile) {
            self.blocked[idx] = blocked;
        }
    }

    pub fn index_of(&self, tile: Tile) -> Option<usize> {
        if !self.in_bounds(tile) {
            return None;
        }
        Some((tile.y as usize) * self.width + (tile.x as usize))
    }

    pub fn tile_at(&self, idx: usize) -> Tile {
        Tile::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    pub fn traversable_count(&self) -> usize {
        self.blocked.iter().filter(|b| !**b).count()
    }
}
