use super::collision::CollisionQuery;
use super::geometry::{Rect, Vec2};
use super::mobs::{GRAVITY, TERMINAL_VELOCITY};
use super::tile::TileGrid;

const ACCELERATION: f32 = 0.4;
const DECELERATION: f32 = 0.25;
const MAX_WALK_SPEED: f32 = 3.0;
const MAX_BOOST_SPEED: f32 = 5.0;
const JUMP_IMPULSE: f32 = -12.0;
/// Upward speed kept when the jump button is released mid-ascent.
const JUMP_CUT_SPEED: f32 = -3.0;
const STOMP_BOUNCE: f32 = -6.0;

/// Horizontal intent: -1 left, 0 neutral, +1 right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    Left,
    #[default]
    Neutral,
    Right,
}

impl Direction {
    /// Exclusive combination of two held keys; both held cancels out.
    pub fn from_held(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => Self::Left,
            (false, true) => Self::Right,
            _ => Self::Neutral,
        }
    }

    pub fn sign(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Neutral => 0,
            Self::Right => 1,
        }
    }
}

pub trait DirectionalControl {
    fn set_direction(&mut self, direction: Direction);
    fn set_boost(&mut self, boost: bool);
}

pub trait JumpControl {
    /// Called every frame with the current held state of the jump button.
    fn jump(&mut self, pressed: bool);
}

/// The two control surfaces input routing drives on the player.
pub trait PlayerTraits {
    fn go_trait(&mut self) -> &mut dyn DirectionalControl;
    fn jump_trait(&mut self) -> &mut dyn JumpControl;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoTrait {
    direction: Direction,
    boost: bool,
}

impl GoTrait {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn boost(&self) -> bool {
        self.boost
    }

    fn max_speed(&self) -> f32 {
        if self.boost {
            MAX_BOOST_SPEED
        } else {
            MAX_WALK_SPEED
        }
    }
}

impl DirectionalControl for GoTrait {
    fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    fn set_boost(&mut self, boost: bool) {
        self.boost = boost;
    }
}

/// Edge-triggered jump: a jump starts only on the frame the button goes down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JumpTrait {
    held: bool,
    requested: bool,
}

impl JumpTrait {
    pub fn is_held(&self) -> bool {
        self.held
    }

    fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

impl JumpControl for JumpTrait {
    fn jump(&mut self, pressed: bool) {
        if pressed && !self.held {
            self.requested = true;
        }
        self.held = pressed;
    }
}

/// Result of one movement step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStep {
    /// Solid cell hit from below while rising.
    pub head_bump: Option<(i32, i32)>,
    pub landed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    go: GoTrait,
    jump: JumpTrait,
    velocity: Vec2,
    on_ground: bool,
    invincibility_frames: u32,
}

impl PlayerTraits for Player {
    fn go_trait(&mut self) -> &mut dyn DirectionalControl {
        &mut self.go
    }

    fn jump_trait(&mut self) -> &mut dyn JumpControl {
        &mut self.jump
    }
}

impl Player {
    pub fn go(&self) -> &GoTrait {
        &self.go
    }

    pub fn jump_state(&self) -> &JumpTrait {
        &self.jump
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn invincibility_frames(&self) -> u32 {
        self.invincibility_frames
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_frames > 0
    }

    /// Overwrites any running grace period.
    pub fn grant_grace_period(&mut self, frames: u32) {
        self.invincibility_frames = frames;
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::default();
        self.on_ground = false;
    }

    pub fn is_falling(&self) -> bool {
        !self.on_ground && self.velocity.y > 0.0
    }

    /// Small hop after stomping an enemy.
    pub(crate) fn bounce(&mut self) {
        self.velocity.y = STOMP_BOUNCE;
        self.on_ground = false;
    }

    /// Applies intent, gravity and tile collision for one frame. Horizontal
    /// motion resolves before vertical.
    pub(crate) fn integrate(&mut self, rect: &mut Rect, grid: &TileGrid) -> PlayerStep {
        self.invincibility_frames = self.invincibility_frames.saturating_sub(1);
        let query = CollisionQuery::new(grid);

        let direction = self.go.direction.sign() as f32;
        let max_speed = self.go.max_speed();
        if direction != 0.0 {
            self.velocity.x = (self.velocity.x + ACCELERATION * direction).clamp(-max_speed, max_speed);
        } else if self.velocity.x.abs() <= DECELERATION {
            self.velocity.x = 0.0;
        } else {
            self.velocity.x -= DECELERATION * self.velocity.x.signum();
        }
        if query.move_horizontal(rect, self.velocity.x as i32).is_some() {
            self.velocity.x = 0.0;
        }
        if rect.x < 0 {
            rect.x = 0;
            self.velocity.x = 0.0;
        }

        if self.jump.take_request() && self.on_ground {
            self.velocity.y = JUMP_IMPULSE;
            self.on_ground = false;
        }
        if !self.jump.held && self.velocity.y < JUMP_CUT_SPEED {
            self.velocity.y = JUMP_CUT_SPEED;
        }
        self.velocity.y = (self.velocity.y + GRAVITY).min(TERMINAL_VELOCITY);

        let mut step = PlayerStep::default();
        let rising = self.velocity.y < 0.0;
        match query.move_vertical(rect, self.velocity.y as i32) {
            Some(cell) if rising => {
                step.head_bump = Some(cell);
                self.velocity.y = 0.0;
            }
            Some(_) => {
                step.landed = !self.on_ground;
                self.on_ground = true;
                self.velocity.y = 0.0;
            }
            None => {
                self.on_ground = query.is_supported(*rect);
            }
        }
        step
    }
}
