use std::ops::Range;

/// Edge length of one grid cell in pixels.
pub const TILE_SIZE: i32 = 32;
/// Rows painted by `Level::draw_level`, counted from the top of the grid.
pub const VISIBLE_ROWS: i32 = 15;
/// Columns that fit the logical screen at camera offset zero.
pub const VISIBLE_COLUMNS: i32 = 20;

const CAMERA_FOLLOW_MARGIN_TILES: f32 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }
}

/// Axis-aligned rectangle in pixel space.
///
/// `right()` and `bottom()` are exclusive edges, so a 32x32 rect at the
/// origin covers pixels `0..32` on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Full cell rectangle of tile `(col, row)`.
    pub const fn cell(col: i32, row: i32) -> Self {
        Self::new(
            col.saturating_mul(TILE_SIZE),
            row.saturating_mul(TILE_SIZE),
            TILE_SIZE,
            TILE_SIZE,
        )
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x as f32 + self.width as f32 * 0.5,
            y: self.y as f32 + self.height as f32 * 0.5,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Strict overlap test; rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    pub fn inflated(&self, amount: i32) -> Self {
        Self::new(
            self.x.saturating_sub(amount),
            self.y.saturating_sub(amount),
            self.width.saturating_add(amount.saturating_mul(2)),
            self.height.saturating_add(amount.saturating_mul(2)),
        )
    }

    /// Inclusive range of grid cells holding at least one pixel of this rect.
    /// Negative pixel coordinates map to negative cells (floor division).
    pub fn covered_cells(&self) -> CellSpan {
        let last_x = self.right() - 1;
        let last_y = self.bottom() - 1;
        CellSpan {
            col_min: self.left().div_euclid(TILE_SIZE),
            col_max: last_x.max(self.left()).div_euclid(TILE_SIZE),
            row_min: self.top().div_euclid(TILE_SIZE),
            row_max: last_y.max(self.top()).div_euclid(TILE_SIZE),
        }
    }

    /// Tile holding the rect's top-left pixel.
    pub fn origin_cell(&self) -> (i32, i32) {
        (self.x.div_euclid(TILE_SIZE), self.y.div_euclid(TILE_SIZE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub col_min: i32,
    pub col_max: i32,
    pub row_min: i32,
    pub row_max: i32,
}

impl CellSpan {
    /// Cells in row-major order.
    pub fn iter(self) -> impl Iterator<Item = (i32, i32)> {
        (self.row_min..=self.row_max)
            .flat_map(move |row| (self.col_min..=self.col_max).map(move |col| (col, row)))
    }
}

/// Horizontal/vertical offset in tile units, added to world tile coordinates
/// to get screen tile coordinates. Scrolling right makes `pos.x` negative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub pos: Vec2,
}

impl Camera {
    pub fn x_px(&self) -> i32 {
        (self.pos.x * TILE_SIZE as f32) as i32
    }

    pub fn tile_to_screen_px(&self, col: i32, row: i32) -> (i32, i32) {
        (
            ((col as f32 + self.pos.x) * TILE_SIZE as f32) as i32,
            row * TILE_SIZE,
        )
    }

    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        rect.translated(self.x_px(), 0)
    }

    /// Tile under a logical screen position, shifted by the camera offset.
    pub fn screen_to_tile(&self, screen: Vec2) -> (i32, i32) {
        let col = (screen.x / TILE_SIZE as f32 - self.pos.x).floor() as i32;
        let row = (screen.y / TILE_SIZE as f32).floor() as i32;
        (col, row)
    }

    /// Columns the tile pass walks before clamping to the grid. The window
    /// is one column wider on each side than the screen so partially
    /// scrolled cells still get painted.
    pub fn column_window(&self) -> Range<i32> {
        let start = -((self.pos.x + 1.0) as i32);
        let end = VISIBLE_COLUMNS - ((self.pos.x - 1.0) as i32);
        start..end
    }

    /// Scrolls with `target` while its tile column lies strictly inside the
    /// level, keeping ten columns of margin at both ends.
    pub fn follow(&mut self, target: Rect, level_length: u32) {
        let column = target.x as f32 / TILE_SIZE as f32;
        let upper = level_length as f32 - CAMERA_FOLLOW_MARGIN_TILES;
        if column > CAMERA_FOLLOW_MARGIN_TILES && column < upper {
            self.pos = Vec2 {
                x: -column + CAMERA_FOLLOW_MARGIN_TILES,
                y: 0.0,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 32, 32);
        let b = Rect::new(32, 0, 32, 32);
        let c = Rect::new(31, 31, 4, 4);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(b.intersects(&c));
    }

    #[test]
    fn covered_cells_use_inclusive_pixel_extent() {
        let inside = Rect::new(8, 8, 16, 16).covered_cells();
        assert_eq!((inside.col_min, inside.col_max), (0, 0));
        assert_eq!((inside.row_min, inside.row_max), (0, 0));

        let straddling = Rect::new(24, 40, 16, 16).covered_cells();
        assert_eq!((straddling.col_min, straddling.col_max), (0, 1));
        assert_eq!((straddling.row_min, straddling.row_max), (1, 1));
    }

    #[test]
    fn covered_cells_floor_negative_coordinates() {
        let span = Rect::new(-10, -40, 16, 16).covered_cells();
        assert_eq!((span.col_min, span.col_max), (-1, 0));
        assert_eq!((span.row_min, span.row_max), (-2, -1));
    }

    #[test]
    fn cell_span_iterates_row_major() {
        let cells: Vec<_> = Rect::new(0, 0, 64, 64).covered_cells().iter().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn column_window_matches_scroll_offset() {
        let origin = Camera::default();
        assert_eq!(origin.column_window(), -1..21);

        let scrolled = Camera {
            pos: Vec2::new(-5.5, 0.0),
        };
        assert_eq!(scrolled.column_window(), 4..26);
    }

    #[test]
    fn screen_to_tile_subtracts_camera_offset() {
        let camera = Camera {
            pos: Vec2::new(-3.0, 0.0),
        };
        assert_eq!(camera.screen_to_tile(Vec2::new(0.0, 0.0)), (3, 0));
        assert_eq!(camera.screen_to_tile(Vec2::new(100.0, 140.0)), (6, 4));
    }

    #[test]
    fn follow_only_scrolls_inside_level_margins() {
        let mut camera = Camera::default();
        camera.follow(Rect::new(5 * TILE_SIZE, 0, 32, 32), 60);
        assert_eq!(camera.pos.x, 0.0);

        camera.follow(Rect::new(20 * TILE_SIZE, 0, 32, 32), 60);
        assert_eq!(camera.pos.x, -10.0);

        camera.follow(Rect::new(55 * TILE_SIZE, 0, 32, 32), 60);
        assert_eq!(camera.pos.x, -10.0);
    }

    #[test]
    fn far_away_cells_saturate_instead_of_overflowing() {
        let far = Rect::cell(100_000_000, -100_000_000);
        assert_eq!((far.x, far.y), (i32::MAX, i32::MIN));
        assert_eq!(far.right(), i32::MAX);
        assert!(!far.intersects(&Rect::cell(0, 0)));
        assert_eq!(far.translated(1, -1), far);
        assert_eq!(far.covered_cells().col_min, i32::MAX.div_euclid(TILE_SIZE));
    }
}
