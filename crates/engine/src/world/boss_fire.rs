use tracing::debug;

use super::collision::CollisionQuery;
use super::entity::{EntityId, LevelCommand, SweepContext, UpdateOutcome};
use super::geometry::{Rect, Vec2};

/// Straight-flying projectile fired by the boss.
#[derive(Debug, Clone, PartialEq)]
pub struct BossFire {
    velocity: Vec2,
    age: u32,
    max_age: u32,
}

/// What ended (or didn't end) a projectile's flight this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightOutcome {
    InFlight,
    Expired,
    HitTile { col: i32, row: i32 },
    HitPlayer(EntityId),
}

impl BossFire {
    pub fn new(velocity: Vec2, max_age: u32) -> Self {
        Self {
            velocity,
            age: 0,
            max_age,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// One frame of flight: move by the truncated velocity, age, then test
    /// tiles before the player. The first terminal check wins.
    pub(crate) fn advance(&mut self, rect: &mut Rect, ctx: &SweepContext<'_>) -> FlightOutcome {
        *rect = rect.translated(self.velocity.x as i32, self.velocity.y as i32);

        self.age = self.age.saturating_add(1);
        if self.age > self.max_age {
            return FlightOutcome::Expired;
        }

        if let Some((col, row)) = CollisionQuery::new(ctx.grid).first_solid_cell(*rect) {
            return FlightOutcome::HitTile { col, row };
        }

        match ctx.player {
            Some(player) if CollisionQuery::rects_overlap(rect, &player.rect) => {
                FlightOutcome::HitPlayer(player.id)
            }
            _ => FlightOutcome::InFlight,
        }
    }

    pub(crate) fn update(
        &mut self,
        id: EntityId,
        rect: &mut Rect,
        ctx: &mut SweepContext<'_>,
    ) -> UpdateOutcome {
        match self.advance(rect, ctx) {
            FlightOutcome::InFlight => UpdateOutcome::Continue,
            FlightOutcome::Expired => {
                debug!(projectile = id.0, age = self.age, "boss_fire_expired");
                UpdateOutcome::Remove
            }
            FlightOutcome::HitTile { col, row } => {
                debug!(projectile = id.0, col, row, "boss_fire_hit_tile");
                UpdateOutcome::Remove
            }
            FlightOutcome::HitPlayer(target) => {
                debug!(projectile = id.0, player = target.0, "boss_fire_hit_player");
                ctx.commands.push(LevelCommand::GrantGracePeriod {
                    target,
                    frames: ctx.config.grace_period_frames,
                });
                UpdateOutcome::Remove
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::config::SimulationConfig;
    use crate::world::entity::PlayerView;
    use crate::world::geometry::Camera;
    use crate::world::tile::{Tile, TileGrid};

    struct Harness {
        grid: TileGrid,
        camera: Camera,
        config: SimulationConfig,
        commands: Vec<LevelCommand>,
    }

    impl Harness {
        fn new(grid: TileGrid) -> Self {
            Self {
                grid,
                camera: Camera::default(),
                config: SimulationConfig::default(),
                commands: Vec::new(),
            }
        }

        fn step(
            &mut self,
            fire: &mut BossFire,
            rect: &mut Rect,
            player: Option<PlayerView>,
        ) -> UpdateOutcome {
            let mut ctx = SweepContext {
                grid: &self.grid,
                camera: &self.camera,
                player,
                config: &self.config,
                commands: &mut self.commands,
            };
            fire.update(EntityId(9), rect, &mut ctx)
        }
    }

    #[test]
    fn moves_by_truncated_velocity() {
        let mut harness = Harness::new(TileGrid::new(20, 20));
        let mut fire = BossFire::new(Vec2::new(3.9, -2.5), 300);
        let mut rect = Rect::new(200, 200, 16, 16);
        assert_eq!(harness.step(&mut fire, &mut rect, None), UpdateOutcome::Continue);
        assert_eq!((rect.x, rect.y), (203, 198));
    }

    #[test]
    fn expires_on_the_frame_after_max_age() {
        let mut harness = Harness::new(TileGrid::new(4, 4));
        let mut fire = BossFire::new(Vec2::new(0.0, 0.0), 300);
        let mut rect = Rect::new(8, 8, 16, 16);
        for frame in 1..=300 {
            assert_eq!(
                harness.step(&mut fire, &mut rect, None),
                UpdateOutcome::Continue,
                "frame={frame}"
            );
        }
        assert_eq!(fire.age(), 300);
        assert_eq!(harness.step(&mut fire, &mut rect, None), UpdateOutcome::Remove);
    }

    #[test]
    fn dies_on_the_frame_it_enters_a_solid_cell() {
        let mut grid = TileGrid::new(10, 4);
        grid.place_tile(2, 0, Tile::ground(2, 0));
        let mut harness = Harness::new(grid);
        let mut fire = BossFire::new(Vec2::new(6.0, 0.0), 300);
        let mut rect = Rect::new(40, 8, 16, 16);

        assert_eq!(harness.step(&mut fire, &mut rect, None), UpdateOutcome::Continue);
        assert_eq!(rect.right(), 62);
        assert_eq!(harness.step(&mut fire, &mut rect, None), UpdateOutcome::Remove);
        assert!(harness.commands.is_empty());
    }

    #[test]
    fn cells_outside_grid_are_ignored() {
        let mut harness = Harness::new(TileGrid::new(2, 2));
        let mut fire = BossFire::new(Vec2::new(-6.0, -6.0), 300);
        let mut rect = Rect::new(0, 0, 16, 16);
        for _ in 0..10 {
            assert_eq!(harness.step(&mut fire, &mut rect, None), UpdateOutcome::Continue);
        }
        assert!(rect.x < 0 && rect.y < 0);
    }

    #[test]
    fn player_hit_grants_grace_period_and_removes_projectile() {
        let mut harness = Harness::new(TileGrid::new(10, 10));
        let mut fire = BossFire::new(Vec2::new(6.0, 0.0), 300);
        let mut rect = Rect::new(90, 8, 16, 16);
        let player = Some(PlayerView {
            id: EntityId(0),
            rect: Rect::cell(3, 0),
        });

        assert_eq!(harness.step(&mut fire, &mut rect, player), UpdateOutcome::Remove);
        assert_eq!(
            harness.commands,
            vec![LevelCommand::GrantGracePeriod {
                target: EntityId(0),
                frames: 60
            }]
        );
    }

    #[test]
    fn tile_hit_takes_priority_over_player_hit() {
        let mut grid = TileGrid::new(10, 10);
        grid.place_tile(3, 0, Tile::ground(3, 0));
        let mut harness = Harness::new(grid);
        let mut fire = BossFire::new(Vec2::new(6.0, 0.0), 300);
        let mut rect = Rect::new(90, 8, 16, 16);
        let player = Some(PlayerView {
            id: EntityId(0),
            rect: Rect::cell(3, 0),
        });

        assert_eq!(harness.step(&mut fire, &mut rect, player), UpdateOutcome::Remove);
        assert!(harness.commands.is_empty());
    }
}
