use tracing::{debug, info};

use super::boss_fire::BossFire;
use super::entity::{EntityBody, EntityId, LevelCommand, SweepContext};
use super::geometry::{Rect, Vec2, TILE_SIZE};

const PROJECTILE_SIZE_PX: i32 = 16;
const PROJECTILE_INSET_PX: i32 = 8;

/// Stationary enemy that fires at the player on a fixed cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    timer: u32,
    fire_cooldown: u32,
    health: u32,
    fire_speed: f32,
}

impl Boss {
    pub fn new(fire_cooldown: u32, health: u32, fire_speed: f32) -> Self {
        Self {
            timer: 0,
            fire_cooldown,
            health,
            fire_speed,
        }
    }

    pub fn timer(&self) -> u32 {
        self.timer
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    /// Counts one frame and fires once the cooldown is reached. The timer
    /// resets after every firing attempt, hit or miss.
    pub(crate) fn update(&mut self, id: EntityId, rect: &Rect, ctx: &mut SweepContext<'_>) {
        self.timer = self.timer.saturating_add(1);
        if self.timer >= self.fire_cooldown {
            self.fire_at_player(id, rect, ctx);
            self.timer = 0;
        }
    }

    fn fire_at_player(&self, id: EntityId, rect: &Rect, ctx: &mut SweepContext<'_>) {
        let Some(player) = ctx.player else {
            debug!(boss = id.0, "boss_fire_skipped_no_player");
            return;
        };
        let velocity = aim_velocity(rect.center(), player.rect.center(), self.fire_speed);
        let spawn = projectile_spawn_rect(rect);
        debug!(
            boss = id.0,
            vx = velocity.x,
            vy = velocity.y,
            x = spawn.x,
            y = spawn.y,
            "boss_fired"
        );
        ctx.commands.push(LevelCommand::Spawn {
            rect: spawn,
            body: EntityBody::BossFire(BossFire::new(velocity, ctx.config.boss_fire_max_age)),
        });
    }

    /// Removes one point of health. Returns true once the boss is defeated.
    pub(crate) fn take_hit(&mut self, id: EntityId) -> bool {
        self.health = self.health.saturating_sub(1);
        info!(boss = id.0, health = self.health, "boss_hit");
        self.health == 0
    }
}

/// Velocity of length `speed` pointing from `from` to `to`. Coincident
/// points aim straight right.
pub fn aim_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let delta = Vec2::new(to.x - from.x, to.y - from.y);
    let distance = delta.length();
    if distance == 0.0 {
        return Vec2::new(speed, 0.0);
    }
    Vec2::new(delta.x / distance * speed, delta.y / distance * speed)
}

/// Projectiles start centered in the tile holding the boss's top-left corner.
pub fn projectile_spawn_rect(boss_rect: &Rect) -> Rect {
    let (col, row) = boss_rect.origin_cell();
    Rect::new(
        col * TILE_SIZE + PROJECTILE_INSET_PX,
        row * TILE_SIZE + PROJECTILE_INSET_PX,
        PROJECTILE_SIZE_PX,
        PROJECTILE_SIZE_PX,
    )
}
