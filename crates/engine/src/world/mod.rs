mod boss;
mod boss_fire;
mod collision;
mod config;
mod description;
mod entity;
mod geometry;
mod level;
mod mobs;
mod player;
mod tile;

pub use boss::{aim_velocity, projectile_spawn_rect, Boss};
pub use boss_fire::{BossFire, FlightOutcome};
pub use collision::CollisionQuery;
pub use config::SimulationConfig;
pub use description::{
    validate_level_name, EntityPlacements, LayerSpan, Layers, LevelBody, LevelDescription,
    LevelDirectory, LevelLoadError, LevelSource, ObjectPlacements, RandomBoxEntry, TileSpan,
};
pub use entity::{Entity, EntityBody, EntityId, EntityKind, Liveness, PlayerView};
pub use geometry::{Camera, CellSpan, Rect, Vec2, TILE_SIZE, VISIBLE_COLUMNS, VISIBLE_ROWS};
pub use level::{Level, LevelPainter};
pub use mobs::{BoxItem, Coin, ItemBlock, Walker, GRAVITY, TERMINAL_VELOCITY};
pub use player::{
    Direction, DirectionalControl, GoTrait, JumpControl, JumpTrait, Player, PlayerStep,
    PlayerTraits,
};
pub use tile::{SpriteRef, Tile, TileGrid};
