//! 2D bounded grid of cell contents.

use foodgrid_core::{Entity, Error, Position, Result, OBJECT_EMPTY};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Arena of cell contents indexed by coordinate. `None` is an empty floor cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<Entity>>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let size = width.max(0) as usize * height.max(0) as usize;
        Self {
            width,
            height,
            cells: vec![None; size],
        }
    }

    /// True when the cell storage covers exactly `width * height` cells
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.cells.len() as i64 == self.width as i64 * self.height as i64
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Contents of a cell. Out-of-bounds cells read as empty.
    pub fn get(&self, pos: Position) -> Option<&Entity> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.pos_to_index(pos)].as_ref()
    }

    pub fn set(&mut self, pos: Position, entity: Option<Entity>) {
        let index = self.pos_to_index(pos);
        self.cells[index] = entity;
    }

    /// Remove and return whatever occupies the cell
    pub fn take(&mut self, pos: Position) -> Option<Entity> {
        if !self.in_bounds(pos) {
            return None;
        }
        let index = self.pos_to_index(pos);
        self.cells[index].take()
    }

    pub fn horz_wall(&mut self, x: i32, y: i32, length: i32) {
        for i in 0..length {
            self.set(Position::new(x + i, y), Some(Entity::Wall));
        }
    }

    pub fn vert_wall(&mut self, x: i32, y: i32, length: i32) {
        for i in 0..length {
            self.set(Position::new(x, y + i), Some(Entity::Wall));
        }
    }

    /// Stamp the outline of a `w` x `h` rectangle with walls
    pub fn wall_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.horz_wall(x, y, w);
        self.horz_wall(x, y + h - 1, w);
        self.vert_wall(x, y, h);
        self.vert_wall(x + w - 1, y, h);
    }

    /// Empty cells, excluding `exclude`
    pub fn free_cells(&self, exclude: Option<Position>) -> Vec<Position> {
        self.iter()
            .filter(|(pos, cell)| cell.is_none() && Some(*pos) != exclude)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Pick a uniformly random empty cell other than `exclude`
    pub fn random_free_cell<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        exclude: Option<Position>,
    ) -> Result<Position> {
        self.free_cells(exclude).choose(rng).copied().ok_or_else(|| {
            Error::Placement(format!(
                "no free cell left on a {}x{} grid",
                self.width, self.height
            ))
        })
    }

    /// Positions holding food
    pub fn food_positions(&self) -> Vec<Position> {
        self.iter()
            .filter(|(_, cell)| cell.map_or(false, |entity| entity.as_food().is_some()))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// `[object, color, state]` per cell in row-major order
    pub fn encode(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(self.cells.len() * 3);
        for cell in &self.cells {
            match cell {
                Some(entity) => image.extend_from_slice(&entity.encode()),
                None => image.extend_from_slice(&[OBJECT_EMPTY, 0, 0]),
            }
        }
        image
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, Option<&Entity>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_pos(i), cell.as_ref()))
    }
}
