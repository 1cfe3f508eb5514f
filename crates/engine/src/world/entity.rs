use super::boss::Boss;
use super::boss_fire::BossFire;
use super::config::SimulationConfig;
use super::geometry::{Camera, Rect};
use super::mobs::{Coin, ItemBlock, Walker};
use super::player::Player;
use super::tile::TileGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub(crate) struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Removal is two-step: an entity stops being updated the moment it is
/// marked `Dead` and leaves the level at the end of that sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    /// Still updated and drawn (squash or fall animation) but no longer
    /// interacts with the player.
    Dying,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Coin,
    CoinBox,
    CoinBrick,
    RandomBox,
    Goomba,
    Koopa,
    RedMushroom,
    Boss,
    BossFire,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Coin => "coin",
            Self::CoinBox => "coin_box",
            Self::CoinBrick => "coin_brick",
            Self::RandomBox => "random_box",
            Self::Goomba => "goomba",
            Self::Koopa => "koopa",
            Self::RedMushroom => "red_mushroom",
            Self::Boss => "boss",
            Self::BossFire => "boss_fire",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityBody {
    Player(Player),
    Coin(Coin),
    CoinBox(ItemBlock),
    CoinBrick(ItemBlock),
    RandomBox(ItemBlock),
    Goomba(Walker),
    Koopa(Walker),
    RedMushroom(Walker),
    Boss(Boss),
    BossFire(BossFire),
}

impl EntityBody {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Player(_) => EntityKind::Player,
            Self::Coin(_) => EntityKind::Coin,
            Self::CoinBox(_) => EntityKind::CoinBox,
            Self::CoinBrick(_) => EntityKind::CoinBrick,
            Self::RandomBox(_) => EntityKind::RandomBox,
            Self::Goomba(_) => EntityKind::Goomba,
            Self::Koopa(_) => EntityKind::Koopa,
            Self::RedMushroom(_) => EntityKind::RedMushroom,
            Self::Boss(_) => EntityKind::Boss,
            Self::BossFire(_) => EntityKind::BossFire,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub rect: Rect,
    pub liveness: Liveness,
    pub body: EntityBody,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    pub fn is_alive(&self) -> bool {
        self.liveness == Liveness::Alive
    }

    pub fn is_dead(&self) -> bool {
        self.liveness == Liveness::Dead
    }

    pub fn mark_dead(&mut self) {
        self.liveness = Liveness::Dead;
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.body {
            EntityBody::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.body {
            EntityBody::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_boss(&self) -> Option<&Boss> {
        match &self.body {
            EntityBody::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    pub fn as_boss_fire(&self) -> Option<&BossFire> {
        match &self.body {
            EntityBody::BossFire(fire) => Some(fire),
            _ => None,
        }
    }

    /// Per-frame update inside the level sweep. The player is driven by
    /// `Level::update_player` and never reaches this.
    pub(crate) fn update(&mut self, ctx: &mut SweepContext<'_>) {
        if self.is_dead() {
            return;
        }
        let id = self.id;
        let outcome = match &mut self.body {
            EntityBody::Player(_) => UpdateOutcome::Continue,
            EntityBody::Coin(coin) => coin.update(&self.rect, self.liveness, ctx),
            EntityBody::CoinBox(block) | EntityBody::CoinBrick(block) | EntityBody::RandomBox(block) => {
                block.update();
                UpdateOutcome::Continue
            }
            EntityBody::Goomba(walker) | EntityBody::Koopa(walker) | EntityBody::RedMushroom(walker) => {
                walker.update(&mut self.rect, self.liveness, ctx)
            }
            EntityBody::Boss(boss) => {
                if self.liveness == Liveness::Alive {
                    boss.update(id, &self.rect, ctx);
                }
                UpdateOutcome::Continue
            }
            EntityBody::BossFire(fire) => fire.update(id, &mut self.rect, ctx),
        };
        if outcome == UpdateOutcome::Remove {
            self.mark_dead();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpdateOutcome {
    Continue,
    Remove,
}

/// Position of the player at the start of the sweep. Entities read this
/// instead of the live player so the sweep never aliases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerView {
    pub id: EntityId,
    pub rect: Rect,
}

/// Effects an entity asks the level to apply once the sweep finishes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LevelCommand {
    Spawn { rect: Rect, body: EntityBody },
    GrantGracePeriod { target: EntityId, frames: u32 },
    AwardCoins(u32),
}

pub(crate) struct SweepContext<'a> {
    pub(crate) grid: &'a TileGrid,
    pub(crate) camera: &'a Camera,
    pub(crate) player: Option<PlayerView>,
    pub(crate) config: &'a SimulationConfig,
    pub(crate) commands: &'a mut Vec<LevelCommand>,
}
