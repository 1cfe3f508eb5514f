//! Maps one tick of device input onto the player's traits and the level's
//! debug operations.

use tracing::{debug, info, warn};

use crate::app::{InputEvent, InputSnapshot, Key, KeyStates, MouseButton};
use crate::world::{
    Camera, Direction, DirectionalControl, Entity, JumpControl, Level, PlayerTraits,
    SimulationConfig, Vec2, TILE_SIZE,
};

const LEFT_KEYS: [Key; 2] = [Key::Left, Key::H];
const RIGHT_KEYS: [Key; 2] = [Key::Right, Key::L];
const JUMP_KEYS: [Key; 3] = [Key::Space, Key::Up, Key::K];
const BOOST_KEY: Key = Key::LeftShift;

/// Tile the debug teleports use when the level has no boss.
pub const FALLBACK_TELEPORT_TILE: (i32, i32) = (12, 10);
/// Debug teleports land this many pixels left of the boss.
const TELEPORT_OFFSET_X_PX: i32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    pub quit_requested: bool,
    pub pause_requested: bool,
    pub resume_requested: bool,
    pub spawned: usize,
    pub teleported: bool,
    pub level_reloaded: bool,
}

/// Where a debug teleport put the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportTarget {
    NearBoss { x: i32, y: i32 },
    Fallback { x: i32, y: i32 },
}

impl TeleportTarget {
    pub fn position(self) -> (i32, i32) {
        match self {
            Self::NearBoss { x, y } | Self::Fallback { x, y } => (x, y),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputRouter {
    boss_level: String,
    grace_period_frames: u32,
}

impl InputRouter {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            boss_level: config.boss_level.clone(),
            grace_period_frames: config.grace_period_frames,
        }
    }

    /// Runs once per unpaused frame: held keys first, then mouse releases,
    /// then quit, pause and debug keys from the event queue.
    pub fn route(&self, input: &InputSnapshot, camera: &Camera, level: &mut Level) -> RouteOutcome {
        let mut outcome = RouteOutcome::default();

        if let Some(player) = level.find_player_mut().and_then(Entity::as_player_mut) {
            apply_keyboard(input.keys(), player);
        }

        for event in input.events() {
            if let InputEvent::MouseButtonUp(button) = *event {
                outcome.spawned += spawn_at_cursor(button, input.cursor_position_px(), camera, level);
            }
        }

        for event in input.events() {
            match *event {
                InputEvent::Quit => {
                    info!("quit_requested");
                    outcome.quit_requested = true;
                }
                InputEvent::KeyDown(Key::Escape | Key::F5) => {
                    info!("pause_requested");
                    outcome.pause_requested = true;
                }
                InputEvent::KeyDown(Key::F2) => {
                    outcome.teleported |= teleport_near_boss(level).is_some();
                }
                InputEvent::KeyDown(Key::F3) => {
                    if self.reload_boss_level(level) {
                        outcome.level_reloaded = true;
                        outcome.teleported = true;
                    }
                }
                InputEvent::KeyDown(_) | InputEvent::MouseButtonUp(_) => {}
            }
        }
        outcome
    }

    /// While paused only quitting and the pause keys (which resume) count.
    pub fn route_paused(&self, input: &InputSnapshot) -> RouteOutcome {
        let mut outcome = RouteOutcome::default();
        for event in input.events() {
            match *event {
                InputEvent::Quit => outcome.quit_requested = true,
                InputEvent::KeyDown(Key::Escape | Key::F5) => outcome.resume_requested = true,
                _ => {}
            }
        }
        outcome
    }

    fn reload_boss_level(&self, level: &mut Level) -> bool {
        let previous = level.name().map(str::to_owned);
        if let Err(error) = level.load_level(&self.boss_level) {
            warn!(level = %self.boss_level, error = %error, "boss_level_load_failed");
            if let Some(previous) = previous {
                if let Err(error) = level.load_level(&previous) {
                    warn!(level = %previous, error = %error, "level_restore_failed");
                }
            }
            return false;
        }

        let player_height = level
            .find_player()
            .map_or(TILE_SIZE, |entity| entity.rect.height);
        let target = match level.find_boss() {
            Some(boss) => TeleportTarget::NearBoss {
                x: boss.rect.x - TELEPORT_OFFSET_X_PX,
                y: boss.rect.y - player_height - 1,
            },
            None => fallback_target(),
        };
        let (x, y) = target.position();
        level.teleport_player(x, y);
        level.settle_player();
        level.grant_player_grace_period(self.grace_period_frames);
        info!(level = %self.boss_level, ?target, "boss_level_teleport");
        true
    }
}

/// Direction, jump and boost from the held keys, written every frame.
pub fn apply_keyboard<T>(keys: &KeyStates, traits: &mut T)
where
    T: PlayerTraits + ?Sized,
{
    let direction = Direction::from_held(keys.any_down(&LEFT_KEYS), keys.any_down(&RIGHT_KEYS));
    traits.go_trait().set_direction(direction);
    traits.go_trait().set_boost(keys.is_down(BOOST_KEY));
    traits.jump_trait().jump(keys.any_down(&JUMP_KEYS));
}

/// Debug spawns at the tile under the cursor. Returns how many entities
/// were added.
pub fn spawn_at_cursor(
    button: MouseButton,
    cursor: Option<Vec2>,
    camera: &Camera,
    level: &mut Level,
) -> usize {
    let Some(cursor) = cursor else {
        debug!(?button, "spawn_skipped_no_cursor");
        return 0;
    };
    let (x, y) = camera.screen_to_tile(cursor);
    match button {
        MouseButton::Right => {
            level.add_koopa(x, y);
            level.add_goomba(x, y);
            level.add_red_mushroom(x, y);
            debug!(x, y, "debug_spawned_enemies");
            3
        }
        MouseButton::Left => {
            level.add_coin(x, y);
            debug!(x, y, "debug_spawned_coin");
            1
        }
        MouseButton::Middle => 0,
    }
}

fn fallback_target() -> TeleportTarget {
    let (col, row) = FALLBACK_TELEPORT_TILE;
    TeleportTarget::Fallback {
        x: col * TILE_SIZE - TELEPORT_OFFSET_X_PX,
        y: row * TILE_SIZE,
    }
}

/// Puts the player level with the boss, a little to its left. Returns
/// `None` when there is no player to move.
pub fn teleport_near_boss(level: &mut Level) -> Option<TeleportTarget> {
    let target = match level.find_boss() {
        Some(boss) => TeleportTarget::NearBoss {
            x: boss.rect.x - TELEPORT_OFFSET_X_PX,
            y: boss.rect.y,
        },
        None => {
            warn!("teleport_no_boss");
            fallback_target()
        }
    };
    let (x, y) = target.position();
    level.teleport_player(x, y).then_some(target)
}
