use super::geometry::{Rect, TILE_SIZE};
use crate::sprite_keys;

/// Pipe bodies run this many rows past the requested length.
const PIPE_BODY_EXTRA_ROWS: i32 = 20;

/// Sprite reference stored on a tile. Only the key is kept here; the painter
/// decides how a key looks on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRef {
    key: String,
    redraw_background: bool,
}

impl SpriteRef {
    pub fn named(key: impl Into<String>) -> Self {
        let key = key.into();
        let redraw_background = sprite_keys::redraws_background(&key);
        Self {
            key,
            redraw_background,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn redraw_background(&self) -> bool {
        self.redraw_background
    }
}

/// One grid cell. A tile with `solid_bounds` blocks movement; a tile with
/// no sprite is invisible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tile {
    pub sprite: Option<SpriteRef>,
    pub solid_bounds: Option<Rect>,
}

impl Tile {
    pub fn sky() -> Self {
        Self {
            sprite: Some(SpriteRef::named(sprite_keys::SKY)),
            solid_bounds: None,
        }
    }

    pub fn ground(col: i32, row: i32) -> Self {
        Self::solid(sprite_keys::GROUND, col, row)
    }

    pub fn solid(key: impl Into<String>, col: i32, row: i32) -> Self {
        Self {
            sprite: Some(SpriteRef::named(key)),
            solid_bounds: Some(Rect::cell(col, row)),
        }
    }

    pub fn decoration(key: impl Into<String>) -> Self {
        Self {
            sprite: Some(SpriteRef::named(key)),
            solid_bounds: None,
        }
    }

    /// Invisible blocker under a box entity. Bounds sit one pixel above the
    /// cell so the box is bumpable from directly below.
    pub fn block_anchor(col: i32, row: i32) -> Self {
        Self {
            sprite: None,
            solid_bounds: Some(Rect::cell(col, row).translated(0, -1)),
        }
    }

    pub fn is_solid(&self) -> bool {
        self.solid_bounds.is_some()
    }
}

/// Rectangular grid of tiles indexed by `(col, row)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_height(&self) -> i32 {
        i32::try_from(self.height)
            .unwrap_or(i32::MAX)
            .saturating_mul(TILE_SIZE)
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn index_of(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    pub fn contains(&self, col: i32, row: i32) -> bool {
        self.index_of(col, row).is_some()
    }

    pub fn tile_at(&self, col: i32, row: i32) -> Option<&Tile> {
        self.index_of(col, row).and_then(|index| self.tiles.get(index))
    }

    /// Out-of-range cells are never solid.
    pub fn is_solid_at(&self, col: i32, row: i32) -> bool {
        self.tile_at(col, row).is_some_and(Tile::is_solid)
    }

    /// Writes `tile` into the cell. Returns false and leaves the grid
    /// untouched when the cell lies outside it.
    pub fn place_tile(&mut self, col: i32, row: i32, tile: Tile) -> bool {
        match self.index_of(col, row) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Three passable bush cells in a row.
    pub fn place_bush(&mut self, col: i32, row: i32) -> usize {
        (0..3)
            .filter(|offset| {
                self.place_tile(
                    col.saturating_add(*offset),
                    row,
                    Tile::decoration(sprite_keys::bush(offset + 1)),
                )
            })
            .count()
    }

    /// Three-wide, two-tall passable cloud.
    pub fn place_cloud(&mut self, col: i32, row: i32) -> usize {
        let mut placed = 0;
        for y_offset in 0..2 {
            for x_offset in 0..3 {
                let key = sprite_keys::cloud(y_offset + 1, x_offset + 1);
                let (cell_col, cell_row) = (col.saturating_add(x_offset), row.saturating_add(y_offset));
                if self.place_tile(cell_col, cell_row, Tile::decoration(key)) {
                    placed += 1;
                }
            }
        }
        placed
    }

    /// Two-wide solid pipe: a head at `row`, then a body running down past
    /// the bottom of the grid so the pipe always reaches the floor.
    pub fn place_pipe(&mut self, col: i32, row: i32, length: i32) -> usize {
        let mut placed = 0;
        for (offset, key) in [(0, sprite_keys::PIPE_HEAD_LEFT), (1, sprite_keys::PIPE_HEAD_RIGHT)] {
            let cell_col = col.saturating_add(offset);
            if self.place_tile(cell_col, row, Tile::solid(key, cell_col, row)) {
                placed += 1;
            }
        }
        let grid_rows = i32::try_from(self.height).unwrap_or(i32::MAX);
        let body_end = row
            .saturating_add(length)
            .saturating_add(PIPE_BODY_EXTRA_ROWS)
            .min(grid_rows);
        for body_row in row.saturating_add(1)..body_end {
            for (offset, key) in [(0, sprite_keys::PIPE_BODY_LEFT), (1, sprite_keys::PIPE_BODY_RIGHT)]
            {
                let cell_col = col.saturating_add(offset);
                if self.place_tile(cell_col, body_row, Tile::solid(key, cell_col, body_row)) {
                    placed += 1;
                }
            }
        }
        placed
    }
}
