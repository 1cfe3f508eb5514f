use super::geometry::Rect;
use super::tile::TileGrid;

/// Read-only collision queries against a tile grid.
#[derive(Debug, Clone, Copy)]
pub struct CollisionQuery<'a> {
    grid: &'a TileGrid,
}

impl<'a> CollisionQuery<'a> {
    pub fn new(grid: &'a TileGrid) -> Self {
        Self { grid }
    }

    /// First solid cell among those `rect` covers, in row-major order.
    /// Cells outside the grid are skipped.
    pub fn first_solid_cell(&self, rect: Rect) -> Option<(i32, i32)> {
        rect.covered_cells()
            .iter()
            .find(|&(col, row)| self.grid.is_solid_at(col, row))
    }

    pub fn overlaps_solid(&self, rect: Rect) -> bool {
        self.solid_contacts(rect).next().is_some()
    }

    /// Solid bounds that actually intersect `rect`. The scan reaches one
    /// pixel past the rect because lifted block bounds poke into the cell above.
    fn solid_contacts(&self, rect: Rect) -> impl Iterator<Item = ((i32, i32), Rect)> + '_ {
        rect.inflated(1)
            .covered_cells()
            .iter()
            .filter_map(move |(col, row)| {
                let bounds = self.grid.tile_at(col, row)?.solid_bounds?;
                bounds.intersects(&rect).then_some(((col, row), bounds))
            })
    }

    /// Moves `rect` by `dx` and pushes it back out of any solid it entered.
    /// Returns the blocking cell, if any.
    pub fn move_horizontal(&self, rect: &mut Rect, dx: i32) -> Option<(i32, i32)> {
        if dx == 0 {
            return None;
        }
        rect.x += dx;
        let mut contact: Option<((i32, i32), i32)> = None;
        for (cell, bounds) in self.solid_contacts(*rect) {
            let resolved = if dx > 0 {
                bounds.left() - rect.width
            } else {
                bounds.right()
            };
            let tighter = match contact {
                None => true,
                Some((_, current)) if dx > 0 => resolved < current,
                Some((_, current)) => resolved > current,
            };
            if tighter {
                contact = Some((cell, resolved));
            }
        }
        contact.map(|(cell, x)| {
            rect.x = x;
            cell
        })
    }

    /// Vertical counterpart of [`Self::move_horizontal`]. A contact while
    /// moving up is a head bump; while moving down it is a landing.
    pub fn move_vertical(&self, rect: &mut Rect, dy: i32) -> Option<(i32, i32)> {
        if dy == 0 {
            return None;
        }
        rect.y += dy;
        let mut contact: Option<((i32, i32), i32)> = None;
        for (cell, bounds) in self.solid_contacts(*rect) {
            let resolved = if dy > 0 {
                bounds.top() - rect.height
            } else {
                bounds.bottom()
            };
            let tighter = match contact {
                None => true,
                Some((_, current)) if dy > 0 => resolved < current,
                Some((_, current)) => resolved > current,
            };
            if tighter {
                contact = Some((cell, resolved));
            }
        }
        contact.map(|(cell, y)| {
            rect.y = y;
            cell
        })
    }

    /// True when something standing on `rect` has solid ground one pixel below.
    pub fn is_supported(&self, rect: Rect) -> bool {
        let below = Rect::new(rect.x, rect.bottom(), rect.width, 1);
        self.overlaps_solid(below)
    }

    /// Pushes `rect` up until it clears every solid, one cell at most.
    pub fn settle_upward(&self, rect: &mut Rect) {
        let contacts: Vec<Rect> = self.solid_contacts(*rect).map(|(_, bounds)| bounds).collect();
        if let Some(top) = contacts.iter().map(Rect::top).min() {
            rect.y = top - rect.height;
        }
    }

    /// Entity-vs-entity overlap, same strict rule as tile contacts.
    pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
        a.intersects(b)
    }
}
