use tracing::debug;

use super::collision::CollisionQuery;
use super::entity::{LevelCommand, Liveness, SweepContext, UpdateOutcome};
use super::geometry::{Rect, TILE_SIZE};

pub const GRAVITY: f32 = 0.75;
pub const TERMINAL_VELOCITY: f32 = 10.0;
const WALKER_SPEED: f32 = 1.0;
const ACTIVATION_MARGIN_COLUMNS: i32 = 2;
const BLOCK_BOUNCE_FRAMES: u32 = 8;

/// Pickup worth one coin, collected on overlap with the player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coin;

impl Coin {
    pub(crate) fn update(
        &self,
        rect: &Rect,
        liveness: Liveness,
        ctx: &mut SweepContext<'_>,
    ) -> UpdateOutcome {
        if liveness != Liveness::Alive {
            return UpdateOutcome::Continue;
        }
        match ctx.player {
            Some(player) if CollisionQuery::rects_overlap(rect, &player.rect) => {
                ctx.commands.push(LevelCommand::AwardCoins(1));
                UpdateOutcome::Remove
            }
            _ => UpdateOutcome::Continue,
        }
    }
}

/// Content released by a box when the player bumps it from below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxItem {
    Coin,
    RedMushroom,
}

impl BoxItem {
    /// Unknown item names fall back to a coin.
    pub fn from_name(name: &str) -> Self {
        match name {
            "RedMushroom" => Self::RedMushroom,
            _ => Self::Coin,
        }
    }
}

/// Box or brick anchored to a grid cell. Pays out once, then stays empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBlock {
    cell: (i32, i32),
    item: BoxItem,
    used: bool,
    bounce_frames: u32,
}

impl ItemBlock {
    pub fn new(col: i32, row: i32, item: BoxItem) -> Self {
        Self {
            cell: (col, row),
            item,
            used: false,
            bounce_frames: 0,
        }
    }

    pub fn cell(&self) -> (i32, i32) {
        self.cell
    }

    pub fn item(&self) -> BoxItem {
        self.item
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Vertical draw offset while the bump animation plays.
    pub fn bounce_offset_px(&self) -> i32 {
        if self.bounce_frames == 0 {
            return 0;
        }
        let half = BLOCK_BOUNCE_FRAMES / 2;
        let distance = if self.bounce_frames > half {
            BLOCK_BOUNCE_FRAMES - self.bounce_frames
        } else {
            self.bounce_frames
        };
        -(distance as i32)
    }

    /// Returns the payout the first time the block is bumped.
    pub(crate) fn bump(&mut self) -> Option<BoxItem> {
        if self.used {
            return None;
        }
        self.used = true;
        self.bounce_frames = BLOCK_BOUNCE_FRAMES;
        Some(self.item)
    }

    pub(crate) fn update(&mut self) {
        self.bounce_frames = self.bounce_frames.saturating_sub(1);
    }
}

/// Ground enemy or item that walks until blocked, then turns around.
#[derive(Debug, Clone, PartialEq)]
pub struct Walker {
    direction: i32,
    vertical_speed: f32,
    active: bool,
    squash_frames: u32,
}

impl Walker {
    /// Enemies set off toward the player (left); mushrooms head right.
    pub fn new(direction: i32) -> Self {
        Self {
            direction: direction.signum(),
            vertical_speed: 0.0,
            active: false,
            squash_frames: 0,
        }
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn start_squash(&mut self, frames: u32) {
        self.squash_frames = frames;
    }

    pub(crate) fn update(
        &mut self,
        rect: &mut Rect,
        liveness: Liveness,
        ctx: &mut SweepContext<'_>,
    ) -> UpdateOutcome {
        if liveness == Liveness::Dying {
            self.squash_frames = self.squash_frames.saturating_sub(1);
            return if self.squash_frames == 0 {
                UpdateOutcome::Remove
            } else {
                UpdateOutcome::Continue
            };
        }

        if !self.active {
            let (col, _) = rect.origin_cell();
            let window = ctx.camera.column_window();
            if col < window.start - ACTIVATION_MARGIN_COLUMNS
                || col >= window.end + ACTIVATION_MARGIN_COLUMNS
            {
                return UpdateOutcome::Continue;
            }
            self.active = true;
            debug!(col, "walker_activated");
        }

        let query = CollisionQuery::new(ctx.grid);
        let dx = (self.direction as f32 * WALKER_SPEED) as i32;
        if query.move_horizontal(rect, dx).is_some() || rect.x < 0 {
            rect.x = rect.x.max(0);
            self.direction = -self.direction;
        }

        self.vertical_speed = (self.vertical_speed + GRAVITY).min(TERMINAL_VELOCITY);
        if query
            .move_vertical(rect, self.vertical_speed as i32)
            .is_some()
        {
            self.vertical_speed = 0.0;
        }

        if rect.top() > ctx.grid.pixel_height() + TILE_SIZE {
            return UpdateOutcome::Remove;
        }
        UpdateOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::config::SimulationConfig;
    use crate::world::entity::{EntityId, PlayerView};
    use crate::world::geometry::Camera;
    use crate::world::tile::{Tile, TileGrid};

    fn floor(width: u32, height: u32) -> TileGrid {
        let mut grid = TileGrid::new(width, height);
        for col in 0..width as i32 {
            grid.place_tile(col, height as i32 - 1, Tile::ground(col, height as i32 - 1));
        }
        grid
    }

    #[test]
    fn unknown_box_item_falls_back_to_coin() {
        assert_eq!(BoxItem::from_name("RedMushroom"), BoxItem::RedMushroom);
        assert_eq!(BoxItem::from_name("coin"), BoxItem::Coin);
        assert_eq!(BoxItem::from_name("FireFlower"), BoxItem::Coin);
    }

    #[test]
    fn block_pays_out_once() {
        let mut block = ItemBlock::new(3, 4, BoxItem::RedMushroom);
        assert_eq!(block.bump(), Some(BoxItem::RedMushroom));
        assert_eq!(block.bump(), None);
        assert!(block.is_used());
        assert_eq!(block.bounce_offset_px(), 0);
        block.update();
        assert!(block.bounce_offset_px() < 0);
    }

    #[test]
    fn coin_is_collected_on_overlap() {
        let grid = TileGrid::new(4, 4);
        let camera = Camera::default();
        let config = SimulationConfig::default();
        let mut commands = Vec::new();
        let mut ctx = SweepContext {
            grid: &grid,
            camera: &camera,
            player: Some(PlayerView {
                id: EntityId(0),
                rect: Rect::new(16, 32, 32, 32),
            }),
            config: &config,
            commands: &mut commands,
        };
        let coin = Coin;
        assert_eq!(
            coin.update(&Rect::cell(2, 2), Liveness::Alive, &mut ctx),
            UpdateOutcome::Continue
        );
        assert_eq!(
            coin.update(&Rect::cell(1, 1), Liveness::Alive, &mut ctx),
            UpdateOutcome::Remove
        );
        assert_eq!(commands, vec![LevelCommand::AwardCoins(1)]);
    }

    #[test]
    fn walker_turns_around_at_wall() {
        let mut grid = floor(10, 6);
        grid.place_tile(1, 4, Tile::ground(1, 4));
        let camera = Camera::default();
        let config = SimulationConfig::default();
        let mut commands = Vec::new();
        let mut walker = Walker::new(-1);
        let mut rect = Rect::cell(2, 4);

        for _ in 0..3 {
            let mut ctx = SweepContext {
                grid: &grid,
                camera: &camera,
                player: None,
                config: &config,
                commands: &mut commands,
            };
            assert_eq!(
                walker.update(&mut rect, Liveness::Alive, &mut ctx),
                UpdateOutcome::Continue
            );
        }
        assert_eq!(walker.direction(), 1);
        assert_eq!(rect.y, 4 * 32);
        assert!(rect.x >= 64);
    }

    #[test]
    fn walker_waits_until_near_camera_window() {
        let grid = floor(80, 6);
        let camera = Camera::default();
        let config = SimulationConfig::default();
        let mut commands = Vec::new();
        let mut walker = Walker::new(-1);
        let mut rect = Rect::cell(60, 4);
        let mut ctx = SweepContext {
            grid: &grid,
            camera: &camera,
            player: None,
            config: &config,
            commands: &mut commands,
        };
        walker.update(&mut rect, Liveness::Alive, &mut ctx);
        assert!(!walker.is_active());
        assert_eq!(rect, Rect::cell(60, 4));
    }

    #[test]
    fn walker_falling_out_of_world_is_removed() {
        let grid = TileGrid::new(4, 2);
        let camera = Camera::default();
        let config = SimulationConfig::default();
        let mut commands = Vec::new();
        let mut walker = Walker::new(1);
        let mut rect = Rect::new(0, 90, 32, 32);
        let mut ctx = SweepContext {
            grid: &grid,
            camera: &camera,
            player: None,
            config: &config,
            commands: &mut commands,
        };
        let mut removed = false;
        for _ in 0..40 {
            if walker.update(&mut rect, Liveness::Alive, &mut ctx) == UpdateOutcome::Remove {
                removed = true;
                break;
            }
        }
        assert!(removed);
    }

    #[test]
    fn squashed_walker_is_removed_after_animation() {
        let grid = TileGrid::new(4, 4);
        let camera = Camera::default();
        let config = SimulationConfig::default();
        let mut commands = Vec::new();
        let mut walker = Walker::new(-1);
        walker.start_squash(2);
        let mut rect = Rect::cell(1, 1);
        let mut ctx = SweepContext {
            grid: &grid,
            camera: &camera,
            player: None,
            config: &config,
            commands: &mut commands,
        };
        assert_eq!(
            walker.update(&mut rect, Liveness::Dying, &mut ctx),
            UpdateOutcome::Continue
        );
        assert_eq!(
            walker.update(&mut rect, Liveness::Dying, &mut ctx),
            UpdateOutcome::Remove
        );
    }
}
