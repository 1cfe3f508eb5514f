use tracing::{debug, info, warn};

use super::boss::Boss;
use super::collision::CollisionQuery;
use super::config::SimulationConfig;
use super::description::{LevelDescription, LevelLoadError, LevelSource, RandomBoxEntry};
use super::entity::{
    Entity, EntityBody, EntityId, EntityIdAllocator, EntityKind, LevelCommand, Liveness,
    PlayerView, SweepContext,
};
use super::geometry::{Camera, Rect, TILE_SIZE, VISIBLE_ROWS};
use super::mobs::{BoxItem, Coin, ItemBlock, Walker};
use super::player::{Player, PlayerStep};
use super::tile::{SpriteRef, Tile, TileGrid};

const SQUASH_FRAMES: u32 = 20;
/// Layer spans wider or taller than this are cut down when the grid is built.
const MAX_GRID_COLUMNS: usize = 4096;
const MAX_GRID_ROWS: usize = 256;
/// How far into an enemy's top edge a falling player may sink and still
/// count as a stomp.
const STOMP_TOLERANCE_PX: i32 = 16;

/// Drawing surface for one frame. Positions are screen pixels.
pub trait LevelPainter {
    fn paint_background(&mut self, x: i32, y: i32);
    fn paint_sprite(&mut self, sprite: &SpriteRef, x: i32, y: i32);
    fn paint_entity(&mut self, entity: &Entity, camera: &Camera);
}

/// Owns the tile grid and every entity of the running level.
pub struct Level {
    grid: TileGrid,
    entities: Vec<Entity>,
    allocator: EntityIdAllocator,
    length: u32,
    name: Option<String>,
    player_spawn: (i32, i32),
    coins: u32,
    config: SimulationConfig,
    source: Box<dyn LevelSource>,
}

impl Level {
    pub fn new(config: SimulationConfig, source: impl LevelSource + 'static) -> Self {
        Self {
            grid: TileGrid::default(),
            entities: Vec::new(),
            allocator: EntityIdAllocator::default(),
            length: 0,
            name: None,
            player_spawn: (0, 0),
            coins: 0,
            config,
            source: Box::new(source),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|entity| entity.kind() == kind).count()
    }

    pub fn projectile_count(&self) -> usize {
        self.count_of(EntityKind::BossFire)
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn find_player(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.kind() == EntityKind::Player)
    }

    pub fn find_player_mut(&mut self) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|entity| entity.kind() == EntityKind::Player)
    }

    /// First boss still taking part in the level.
    pub fn find_boss(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.kind() == EntityKind::Boss && !entity.is_dead())
    }

    // Grid passthroughs. Coordinates outside the grid are tolerated everywhere.

    pub fn tile_at(&self, col: i32, row: i32) -> Option<&Tile> {
        self.grid.tile_at(col, row)
    }

    pub fn is_solid_at(&self, col: i32, row: i32) -> bool {
        self.grid.is_solid_at(col, row)
    }

    pub fn place_tile(&mut self, col: i32, row: i32, tile: Tile) -> bool {
        self.grid.place_tile(col, row, tile)
    }

    pub fn add_bush(&mut self, col: i32, row: i32) {
        self.grid.place_bush(col, row);
    }

    pub fn add_cloud(&mut self, col: i32, row: i32) {
        self.grid.place_cloud(col, row);
    }

    pub fn add_pipe(&mut self, col: i32, row: i32, length: i32) {
        self.grid.place_pipe(col, row, length);
    }

    // Entity factories. Each appends one entity anchored at tile (x, y).

    fn spawn(&mut self, rect: Rect, body: EntityBody) -> EntityId {
        let id = self.allocator.allocate();
        debug!(
            entity = id.0,
            kind = body.kind().name(),
            x = rect.x,
            y = rect.y,
            "entity_spawned"
        );
        self.entities.push(Entity {
            id,
            rect,
            liveness: Liveness::Alive,
            body,
        });
        id
    }

    fn anchor_block(&mut self, x: i32, y: i32) {
        if !self.grid.place_tile(x, y, Tile::block_anchor(x, y)) {
            warn!(x, y, "block_outside_grid");
        }
    }

    pub fn add_coin(&mut self, x: i32, y: i32) -> EntityId {
        self.spawn(Rect::cell(x, y), EntityBody::Coin(Coin::default()))
    }

    pub fn add_coin_box(&mut self, x: i32, y: i32) -> EntityId {
        self.anchor_block(x, y);
        self.spawn(
            Rect::cell(x, y),
            EntityBody::CoinBox(ItemBlock::new(x, y, BoxItem::Coin)),
        )
    }

    pub fn add_coin_brick(&mut self, x: i32, y: i32) -> EntityId {
        self.anchor_block(x, y);
        self.spawn(
            Rect::cell(x, y),
            EntityBody::CoinBrick(ItemBlock::new(x, y, BoxItem::Coin)),
        )
    }

    pub fn add_random_box(&mut self, x: i32, y: i32, item: BoxItem) -> EntityId {
        self.anchor_block(x, y);
        self.spawn(
            Rect::cell(x, y),
            EntityBody::RandomBox(ItemBlock::new(x, y, item)),
        )
    }

    pub fn add_goomba(&mut self, x: i32, y: i32) -> EntityId {
        self.spawn(Rect::cell(x, y), EntityBody::Goomba(Walker::new(-1)))
    }

    pub fn add_koopa(&mut self, x: i32, y: i32) -> EntityId {
        self.spawn(Rect::cell(x, y), EntityBody::Koopa(Walker::new(-1)))
    }

    pub fn add_red_mushroom(&mut self, x: i32, y: i32) -> EntityId {
        self.spawn(Rect::cell(x, y), EntityBody::RedMushroom(Walker::new(1)))
    }

    pub fn add_boss(&mut self, x: i32, y: i32) -> EntityId {
        let boss = Boss::new(
            self.config.boss_fire_cooldown,
            self.config.boss_health,
            self.config.boss_fire_speed,
        );
        self.spawn(Rect::cell(x, y), EntityBody::Boss(boss))
    }

    /// Places the player at tile (x, y), replacing any existing player.
    pub fn spawn_player(&mut self, x: i32, y: i32) -> EntityId {
        self.entities
            .retain(|entity| entity.kind() != EntityKind::Player);
        self.spawn(Rect::cell(x, y), EntityBody::Player(Player::default()))
    }

    /// Moves the player to a pixel position and stops it. Returns false when
    /// the level has no player.
    pub fn teleport_player(&mut self, x: i32, y: i32) -> bool {
        let Some(entity) = self.find_player_mut() else {
            return false;
        };
        entity.rect.x = x;
        entity.rect.y = y;
        if let Some(player) = entity.as_player_mut() {
            player.stop();
        }
        info!(x, y, "player_teleported");
        true
    }

    /// Pushes the player up out of any solid it was placed into.
    pub fn settle_player(&mut self) {
        let query = CollisionQuery::new(&self.grid);
        if let Some(entity) = self
            .entities
            .iter_mut()
            .find(|entity| entity.kind() == EntityKind::Player)
        {
            query.settle_upward(&mut entity.rect);
        }
    }

    pub fn grant_player_grace_period(&mut self, frames: u32) {
        if let Some(player) = self.find_player_mut().and_then(Entity::as_player_mut) {
            player.grant_grace_period(frames);
        }
    }

    /// Damages an entity from outside the sweep. Bosses lose one health
    /// point and die at zero; walkers die outright. Returns false when the
    /// id is unknown or the entity is already gone.
    pub fn hit_entity(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.find_entity_mut(id) else {
            return false;
        };
        if entity.is_dead() {
            return false;
        }
        let defeated = match &mut entity.body {
            EntityBody::Boss(boss) => boss.take_hit(id),
            EntityBody::Player(_) => return false,
            _ => true,
        };
        if defeated {
            entity.liveness = Liveness::Dead;
            if entity.kind() == EntityKind::Boss {
                info!(boss = id.0, "boss_defeated");
            }
        }
        true
    }

    fn player_view(&self) -> Option<PlayerView> {
        self.find_player()
            .filter(|entity| !entity.is_dead())
            .map(|entity| PlayerView {
                id: entity.id,
                rect: entity.rect,
            })
    }

    /// Moves the player one frame, scrolls the camera after it and resolves
    /// box bumps and enemy contact. No-op without a player.
    pub fn update_player(&mut self, camera: &mut Camera) -> Option<PlayerStep> {
        let entity = self
            .entities
            .iter_mut()
            .find(|entity| entity.kind() == EntityKind::Player)?;
        let EntityBody::Player(player) = &mut entity.body else {
            return None;
        };
        let step = player.integrate(&mut entity.rect, &self.grid);
        let rect = entity.rect;
        let id = entity.id;

        if rect.top() > self.grid.pixel_height() {
            let (x, y) = self.player_spawn;
            info!(player = id.0, x, y, "player_fell");
            self.teleport_player(x * TILE_SIZE, y * TILE_SIZE);
            *camera = Camera::default();
            return Some(step);
        }

        camera.follow(rect, self.length);
        if let Some((col, row)) = step.head_bump {
            self.bump_block(col, row);
        }
        self.resolve_player_contacts(id);
        Some(step)
    }

    fn bump_block(&mut self, col: i32, row: i32) {
        let payout = self
            .entities
            .iter_mut()
            .filter(|entity| entity.is_alive())
            .find_map(|entity| match &mut entity.body {
                EntityBody::CoinBox(block)
                | EntityBody::CoinBrick(block)
                | EntityBody::RandomBox(block)
                    if block.cell() == (col, row) =>
                {
                    Some(block.bump())
                }
                _ => None,
            })
            .flatten();

        match payout {
            Some(BoxItem::Coin) => {
                self.coins = self.coins.saturating_add(1);
                debug!(col, row, coins = self.coins, "block_paid_coin");
            }
            Some(BoxItem::RedMushroom) => {
                debug!(col, row, "block_released_mushroom");
                self.add_red_mushroom(col, row - 1);
            }
            None => {}
        }
    }

    fn resolve_player_contacts(&mut self, player_id: EntityId) {
        let Some((player_rect, falling, invincible)) = self.find_entity(player_id).and_then(|entity| {
            entity
                .as_player()
                .map(|player| (entity.rect, player.is_falling(), player.is_invincible()))
        }) else {
            return;
        };

        let mut stomped = false;
        let mut hurt = false;
        for entity in &mut self.entities {
            if !entity.is_alive() || !entity.rect.intersects(&player_rect) {
                continue;
            }
            match &mut entity.body {
                EntityBody::Goomba(walker) | EntityBody::Koopa(walker) => {
                    let from_above = player_rect.bottom() - entity.rect.top() <= STOMP_TOLERANCE_PX;
                    if falling && from_above {
                        walker.start_squash(SQUASH_FRAMES);
                        entity.liveness = Liveness::Dying;
                        stomped = true;
                        debug!(entity = entity.id.0, "enemy_stomped");
                    } else if !invincible {
                        hurt = true;
                    }
                }
                EntityBody::RedMushroom(_) => {
                    entity.liveness = Liveness::Dead;
                    info!(entity = entity.id.0, "mushroom_collected");
                }
                _ => {}
            }
        }

        if stomped {
            if let Some(player) = self.find_player_mut().and_then(Entity::as_player_mut) {
                player.bounce();
            }
        } else if hurt {
            info!(player = player_id.0, "player_hurt");
            self.grant_player_grace_period(self.config.grace_period_frames);
        }
    }

    /// One sweep over every non-player entity. Entities removed during the
    /// sweep leave afterwards; entities spawned during it join afterwards and
    /// are first updated next frame.
    pub fn update_entities(&mut self, camera: &Camera) {
        let player = self.player_view();
        let mut commands = Vec::new();
        {
            let mut ctx = SweepContext {
                grid: &self.grid,
                camera,
                player,
                config: &self.config,
                commands: &mut commands,
            };
            for entity in &mut self.entities {
                if entity.kind() == EntityKind::Player {
                    continue;
                }
                entity.update(&mut ctx);
            }
        }

        let before = self.entities.len();
        self.entities.retain(|entity| !entity.is_dead());
        let removed = before - self.entities.len();
        if removed > 0 {
            debug!(removed, remaining = self.entities.len(), "entities_removed");
        }

        for command in commands {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: LevelCommand) {
        match command {
            LevelCommand::Spawn { rect, body } => {
                self.spawn(rect, body);
            }
            LevelCommand::GrantGracePeriod { target, frames } => {
                match self.find_entity_mut(target).and_then(Entity::as_player_mut) {
                    Some(player) => player.grant_grace_period(frames),
                    None => debug!(target = target.0, "grace_period_target_missing"),
                }
            }
            LevelCommand::AwardCoins(amount) => {
                self.coins = self.coins.saturating_add(amount);
            }
        }
    }

    /// Paints the visible tile window, runs one entity sweep, then paints
    /// every entity. The window is clamped to the grid, so any camera
    /// offset is safe.
    pub fn draw_level<P>(&mut self, camera: &Camera, painter: &mut P)
    where
        P: LevelPainter + ?Sized,
    {
        let rows = 0..VISIBLE_ROWS.min(self.grid.height() as i32);
        let window = camera.column_window();
        let columns = window.start.max(0)..window.end.min(self.grid.width() as i32);
        for row in rows {
            for col in columns.clone() {
                let Some(sprite) = self
                    .grid
                    .tile_at(col, row)
                    .and_then(|tile| tile.sprite.as_ref())
                else {
                    continue;
                };
                let (x, y) = camera.tile_to_screen_px(col, row);
                if sprite.redraw_background() {
                    painter.paint_background(x, y);
                }
                painter.paint_sprite(sprite, x, y);
            }
        }

        self.update_entities(camera);

        for entity in &self.entities {
            painter.paint_entity(entity, camera);
        }
    }

    /// Drops every tile and entity. Counters that outlive a level (coins)
    /// are kept.
    pub fn reset(&mut self) {
        self.grid = TileGrid::default();
        self.entities.clear();
        self.length = 0;
        self.name = None;
        self.player_spawn = (0, 0);
    }

    /// Replaces the current level with `name` read from the level source.
    /// On error the level is left empty.
    pub fn load_level(&mut self, name: &str) -> Result<(), LevelLoadError> {
        info!(level = name, "level_load_started");
        self.reset();
        let raw = self.source.read_level(name)?;
        let description = LevelDescription::from_json(name, &raw)?;
        self.load_description(name, &description)
    }

    pub fn load_description(
        &mut self,
        name: &str,
        description: &LevelDescription,
    ) -> Result<(), LevelLoadError> {
        self.reset();
        let length = description
            .length
            .ok_or_else(|| LevelLoadError::MissingLength {
                name: name.to_string(),
            })?;

        self.grid = build_layers(description);
        self.load_objects(description);
        self.load_entities(description);

        self.player_spawn = description.player_spawn.unwrap_or((0, 0));
        let (spawn_x, spawn_y) = self.player_spawn;
        self.spawn_player(spawn_x, spawn_y);
        self.length = length;
        self.name = Some(name.to_string());

        info!(
            level = name,
            length,
            width = self.grid.width(),
            height = self.grid.height(),
            entity_count = self.entities.len(),
            "level_loaded"
        );
        Ok(())
    }

    fn load_objects(&mut self, description: &LevelDescription) {
        let objects = &description.level.objects;
        for &(x, y) in &objects.bush {
            self.grid.place_bush(x, y);
        }
        for &(x, y) in &objects.cloud {
            self.grid.place_cloud(x, y);
        }
        for &(x, y, length) in &objects.pipe {
            self.grid.place_pipe(x, y, length);
        }
        for &(x, y) in &objects.sky {
            self.grid.place_tile(x, y, Tile::sky());
        }
        for &(x, y) in &objects.ground {
            self.grid.place_tile(x, y, Tile::ground(x, y));
        }
    }

    fn load_entities(&mut self, description: &LevelDescription) {
        let entities = &description.level.entities;
        for &(x, y) in &entities.coin_box {
            self.add_coin_box(x, y);
        }
        for &(x, y) in &entities.goomba {
            self.add_goomba(x, y);
        }
        for &(x, y) in &entities.koopa {
            self.add_koopa(x, y);
        }
        for &(x, y) in &entities.coin {
            self.add_coin(x, y);
        }
        for &(x, y) in &entities.coin_brick {
            self.add_coin_brick(x, y);
        }
        for entry in &entities.random_box {
            match entry {
                RandomBoxEntry::Complete(x, y, item) => {
                    let parsed = BoxItem::from_name(item);
                    if parsed == BoxItem::Coin && item != "Coin" {
                        warn!(x, y, item = %item, "random_box_unknown_item");
                    }
                    self.add_random_box(*x, *y, parsed);
                }
                RandomBoxEntry::Incomplete(values) => {
                    warn!(len = values.len(), "random_box_entry_skipped");
                }
            }
        }
        for &(x, y) in &description.level.objects.boss_spawn {
            info!(x, y, "boss_spawn");
            self.add_boss(x, y);
        }
    }
}

/// Sky cells on top of ground cells, column by column.
fn build_layers(description: &LevelDescription) -> TileGrid {
    let layers = &description.level.layers;
    let wanted_width = layers.sky.x.len();
    let wanted_height = layers.sky.y.len().saturating_add(layers.ground.y.len());
    let width = wanted_width.min(MAX_GRID_COLUMNS);
    let height = wanted_height.min(MAX_GRID_ROWS);
    if (width, height) != (wanted_width, wanted_height) {
        warn!(wanted_width, wanted_height, width, height, "level_layers_clamped");
    }
    let sky_rows = layers.sky.y.len();

    let mut grid = TileGrid::new(width as u32, height as u32);
    for col in 0..width as i32 {
        for row in 0..height as i32 {
            let tile = if (row as usize) < sky_rows {
                Tile::sky()
            } else {
                Tile::ground(col, row)
            };
            grid.place_tile(col, row, tile);
        }
    }
    grid
}
