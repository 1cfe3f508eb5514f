use std::collections::HashSet;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::FramePainter;
use crate::sprite_keys;
use crate::world::{
    Camera, Entity, EntityBody, LevelPainter, Liveness, Rect, SpriteRef, Vec2, TILE_SIZE,
    VISIBLE_COLUMNS, VISIBLE_ROWS,
};

/// Size of the logical framebuffer; pixels scales it to the window surface.
pub const LOGICAL_WIDTH: u32 = (VISIBLE_COLUMNS * TILE_SIZE) as u32;
pub const LOGICAL_HEIGHT: u32 = (VISIBLE_ROWS * TILE_SIZE) as u32;

const SKY_COLOR: [u8; 4] = [104, 136, 252, 255];
const GROUND_COLOR: [u8; 4] = [160, 82, 45, 255];
const GROUND_EDGE_COLOR: [u8; 4] = [96, 48, 24, 255];
const PIPE_HEAD_COLOR: [u8; 4] = [56, 180, 56, 255];
const PIPE_BODY_COLOR: [u8; 4] = [32, 140, 32, 255];
const BUSH_COLOR: [u8; 4] = [72, 200, 72, 255];
const CLOUD_COLOR: [u8; 4] = [250, 250, 250, 255];
const UNKNOWN_SPRITE_COLOR: [u8; 4] = [255, 0, 255, 255];
const PLAYER_COLOR: [u8; 4] = [220, 40, 40, 255];
const COIN_COLOR: [u8; 4] = [250, 210, 40, 255];
const BOX_COLOR: [u8; 4] = [230, 160, 30, 255];
const BRICK_COLOR: [u8; 4] = [180, 90, 40, 255];
const USED_BLOCK_COLOR: [u8; 4] = [120, 90, 70, 255];
const GOOMBA_COLOR: [u8; 4] = [140, 80, 30, 255];
const KOOPA_COLOR: [u8; 4] = [40, 170, 60, 255];
const MUSHROOM_COLOR: [u8; 4] = [230, 30, 30, 255];
const BOSS_COLOR: [u8; 4] = [150, 0, 150, 255];
const BOSS_FIRE_OUTER_COLOR: [u8; 4] = [255, 180, 50, 255];
const BOSS_FIRE_INNER_COLOR: [u8; 4] = [255, 80, 0, 255];
const BOSS_FIRE_OUTER_RADIUS_PX: i32 = 10;
const BOSS_FIRE_INNER_RADIUS_PX: i32 = 5;
const OUTLINE_COLOR: [u8; 4] = [0, 0, 0, 255];
const BLUR_RADIUS_PX: i32 = 3;
/// Invincible players skip drawing on alternate runs of this many frames.
const BLINK_PERIOD_FRAMES: u32 = 4;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    warned_missing_sprite_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        let mut renderer = Self {
            window,
            pixels,
            warned_missing_sprite_keys: HashSet::new(),
        };
        renderer.canvas().clear();
        Ok(renderer)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let previous = self.pixels.frame().to_vec();
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.pixels.frame_mut().copy_from_slice(&previous);
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width.max(1), surface_height.max(1), window);
        Pixels::new(LOGICAL_WIDTH, LOGICAL_HEIGHT, surface)
    }

    /// Painter over the logical framebuffer. Whatever is painted stays in the
    /// buffer until painted over, so a paused scene keeps its last frame.
    pub fn canvas(&mut self) -> FrameCanvas<'_> {
        FrameCanvas {
            frame: self.pixels.frame_mut(),
            width: LOGICAL_WIDTH,
            height: LOGICAL_HEIGHT,
            warned_missing_sprite_keys: &mut self.warned_missing_sprite_keys,
        }
    }

    pub fn present(&mut self) -> Result<(), Error> {
        self.pixels.render()
    }

    /// Maps a physical window position into logical framebuffer pixels.
    /// `None` when the position falls in the letterbox around the buffer.
    pub fn cursor_to_logical(&self, x: f32, y: f32) -> Option<Vec2> {
        self.pixels
            .window_pos_to_pixel((x, y))
            .ok()
            .map(|(px, py)| Vec2::new(px as f32, py as f32))
    }
}

/// Flat-colour painter over an RGBA buffer.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    warned_missing_sprite_keys: &'a mut HashSet<String>,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(
        frame: &'a mut [u8],
        width: u32,
        height: u32,
        warned_missing_sprite_keys: &'a mut HashSet<String>,
    ) -> Self {
        Self {
            frame,
            width,
            height,
            warned_missing_sprite_keys,
        }
    }

    fn fill_tile(&mut self, x: i32, y: i32, color: [u8; 4]) {
        self.fill_rect(Rect::new(x, y, TILE_SIZE, TILE_SIZE), color);
    }

    fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        fill_rect_clipped(self.frame, self.width, self.height, rect, color);
    }

    fn sprite_color(&mut self, key: &str) -> [u8; 4] {
        match key {
            sprite_keys::SKY => SKY_COLOR,
            sprite_keys::GROUND => GROUND_COLOR,
            sprite_keys::PIPE_HEAD_LEFT | sprite_keys::PIPE_HEAD_RIGHT => PIPE_HEAD_COLOR,
            sprite_keys::PIPE_BODY_LEFT | sprite_keys::PIPE_BODY_RIGHT => PIPE_BODY_COLOR,
            key if key.starts_with("bush") => BUSH_COLOR,
            key if key.starts_with("cloud") => CLOUD_COLOR,
            key => {
                if self.warned_missing_sprite_keys.insert(key.to_string()) {
                    warn!(sprite_key = key, "sprite_key_unknown");
                }
                UNKNOWN_SPRITE_COLOR
            }
        }
    }
}

impl LevelPainter for FrameCanvas<'_> {
    fn paint_background(&mut self, x: i32, y: i32) {
        self.fill_tile(x, y, SKY_COLOR);
    }

    fn paint_sprite(&mut self, sprite: &SpriteRef, x: i32, y: i32) {
        let color = self.sprite_color(sprite.key());
        self.fill_tile(x, y, color);
        if sprite.key() == sprite_keys::GROUND {
            draw_rect_outline(
                self.frame,
                self.width,
                Rect::new(x, y, TILE_SIZE, TILE_SIZE),
                GROUND_EDGE_COLOR,
            );
        }
    }

    fn paint_entity(&mut self, entity: &Entity, camera: &Camera) {
        let screen = camera.rect_to_screen(entity.rect);
        match &entity.body {
            EntityBody::Player(player) => {
                let blink_off =
                    (player.invincibility_frames() / BLINK_PERIOD_FRAMES) % 2 == 1;
                if !blink_off {
                    self.fill_rect(screen, PLAYER_COLOR);
                }
            }
            EntityBody::Coin(_) => {
                let center = screen.center();
                draw_filled_circle(
                    self.frame,
                    self.width,
                    self.height,
                    center.x as i32,
                    center.y as i32,
                    TILE_SIZE / 4,
                    COIN_COLOR,
                );
            }
            EntityBody::CoinBox(block)
            | EntityBody::CoinBrick(block)
            | EntityBody::RandomBox(block) => {
                let color = if block.is_used() {
                    USED_BLOCK_COLOR
                } else if matches!(entity.body, EntityBody::CoinBrick(_)) {
                    BRICK_COLOR
                } else {
                    BOX_COLOR
                };
                let lifted = screen.translated(0, -block.bounce_offset_px());
                self.fill_rect(lifted, color);
                draw_rect_outline(self.frame, self.width, lifted, OUTLINE_COLOR);
            }
            EntityBody::Goomba(_) | EntityBody::Koopa(_) | EntityBody::RedMushroom(_) => {
                let color = match entity.body {
                    EntityBody::Goomba(_) => GOOMBA_COLOR,
                    EntityBody::Koopa(_) => KOOPA_COLOR,
                    _ => MUSHROOM_COLOR,
                };
                let body = if entity.liveness == Liveness::Dying {
                    let half = screen.height / 2;
                    Rect::new(screen.x, screen.y + half, screen.width, screen.height - half)
                } else {
                    screen
                };
                self.fill_rect(body, color);
            }
            EntityBody::Boss(_) => {
                self.fill_rect(screen, BOSS_COLOR);
                draw_rect_outline(self.frame, self.width, screen, OUTLINE_COLOR);
            }
            EntityBody::BossFire(_) => {
                let center = screen.center();
                let (cx, cy) = (center.x as i32, center.y as i32);
                draw_filled_circle(
                    self.frame,
                    self.width,
                    self.height,
                    cx,
                    cy,
                    BOSS_FIRE_OUTER_RADIUS_PX,
                    BOSS_FIRE_OUTER_COLOR,
                );
                draw_filled_circle(
                    self.frame,
                    self.width,
                    self.height,
                    cx,
                    cy,
                    BOSS_FIRE_INNER_RADIUS_PX,
                    BOSS_FIRE_INNER_COLOR,
                );
            }
        }
    }
}

impl FramePainter for FrameCanvas<'_> {
    fn clear(&mut self) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&SKY_COLOR);
        }
    }

    fn blur_background(&mut self) {
        box_blur(self.frame, self.width, self.height, BLUR_RADIUS_PX);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

fn fill_rect_clipped(frame: &mut [u8], width: u32, height: u32, rect: Rect, color: [u8; 4]) {
    let left = rect.left().max(0);
    let top = rect.top().max(0);
    let right = rect.right().min(width as i32);
    let bottom = rect.bottom().min(height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_rect_outline(frame: &mut [u8], width: u32, rect: Rect, color: [u8; 4]) {
    if rect.is_empty() {
        return;
    }
    let left = rect.left();
    let top = rect.top();
    let right = rect.right() - 1;
    let bottom = rect.bottom() - 1;

    for x in left..=right {
        write_pixel_rgba_clipped(frame, width as usize, x, top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, bottom, color);
    }
    for y in top..=bottom {
        write_pixel_rgba_clipped(frame, width as usize, left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, right, y, color);
    }
}

fn draw_filled_circle(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: i32,
    cy: i32,
    radius: i32,
    color: [u8; 4],
) {
    let radius_sq = radius * radius;
    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                continue;
            }
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= radius_sq {
                write_pixel_rgba_clipped(frame, width as usize, x, y, color);
            }
        }
    }
}

/// Separable box blur, horizontal pass then vertical. Edges clamp.
fn box_blur(frame: &mut [u8], width: u32, height: u32, radius: i32) {
    let (width, height) = (width as usize, height as usize);
    if radius <= 0 || width == 0 || height == 0 || frame.len() < width * height * 4 {
        return;
    }
    let mut scratch = frame.to_vec();
    blur_pass(frame, &mut scratch, width, height, radius, true);
    blur_pass(&scratch, frame, width, height, radius, false);
}

fn blur_pass(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    radius: i32,
    horizontal: bool,
) {
    let taps = (2 * radius + 1) as u32;
    for y in 0..height {
        for x in 0..width {
            let mut sum = [0u32; 4];
            for offset in -radius..=radius {
                let (sx, sy) = if horizontal {
                    ((x as i32 + offset).clamp(0, width as i32 - 1) as usize, y)
                } else {
                    (x, (y as i32 + offset).clamp(0, height as i32 - 1) as usize)
                };
                let index = (sy * width + sx) * 4;
                for (channel, total) in sum.iter_mut().enumerate() {
                    *total += src[index + channel] as u32;
                }
            }
            let index = (y * width + x) * 4;
            for (channel, total) in sum.iter().enumerate() {
                dst[index + channel] = (total / taps) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BossFire, EntityId, Player};

    const W: u32 = 64;
    const H: u32 = 64;

    fn pixel(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let index = ((y * W + x) * 4) as usize;
        [
            frame[index],
            frame[index + 1],
            frame[index + 2],
            frame[index + 3],
        ]
    }

    fn entity(rect: Rect, body: EntityBody) -> Entity {
        Entity {
            id: EntityId(1),
            rect,
            liveness: Liveness::Alive,
            body,
        }
    }

    #[test]
    fn clear_fills_with_sky() {
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let mut warned = HashSet::new();
        FrameCanvas::new(&mut frame, W, H, &mut warned).clear();
        assert_eq!(pixel(&frame, 0, 0), SKY_COLOR);
        assert_eq!(pixel(&frame, W - 1, H - 1), SKY_COLOR);
    }

    #[test]
    fn sprites_clip_at_frame_edges() {
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let mut warned = HashSet::new();
        let mut canvas = FrameCanvas::new(&mut frame, W, H, &mut warned);
        canvas.paint_sprite(&SpriteRef::named(sprite_keys::GROUND), -16, 48);
        canvas.paint_sprite(&SpriteRef::named(sprite_keys::GROUND), 1000, 1000);
        assert_eq!(pixel(&frame, 8, 56), GROUND_COLOR);
    }

    #[test]
    fn unknown_sprite_key_warns_once() {
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let mut warned = HashSet::new();
        let mut canvas = FrameCanvas::new(&mut frame, W, H, &mut warned);
        canvas.paint_sprite(&SpriteRef::named("mystery"), 0, 0);
        canvas.paint_sprite(&SpriteRef::named("mystery"), 32, 0);
        assert_eq!(warned.len(), 1);
        assert_eq!(pixel(&frame, 0, 0), UNKNOWN_SPRITE_COLOR);
    }

    #[test]
    fn boss_fire_paints_inner_circle_over_outer() {
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let mut warned = HashSet::new();
        let mut canvas = FrameCanvas::new(&mut frame, W, H, &mut warned);
        let fire = entity(
            Rect::new(24, 24, 16, 16),
            EntityBody::BossFire(BossFire::new(Vec2::new(1.0, 0.0), 300)),
        );
        canvas.paint_entity(&fire, &Camera::default());
        assert_eq!(pixel(&frame, 32, 32), BOSS_FIRE_INNER_COLOR);
        assert_eq!(pixel(&frame, 32 + 8, 32), BOSS_FIRE_OUTER_COLOR);
        assert_eq!(pixel(&frame, 32 + 12, 32), [0, 0, 0, 0]);
    }

    #[test]
    fn camera_offset_shifts_entities() {
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let mut warned = HashSet::new();
        let mut canvas = FrameCanvas::new(&mut frame, W, H, &mut warned);
        let player = entity(Rect::new(40, 0, 8, 8), EntityBody::Player(Player::default()));
        let camera = Camera {
            pos: Vec2::new(-1.0, 0.0),
        };
        canvas.paint_entity(&player, &camera);
        assert_eq!(pixel(&frame, 8, 0), PLAYER_COLOR);
        assert_eq!(pixel(&frame, 40, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn blur_softens_hard_edges() {
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let mut warned = HashSet::new();
        let mut canvas = FrameCanvas::new(&mut frame, W, H, &mut warned);
        canvas.fill_rect(Rect::new(0, 0, 32, 64), [255, 255, 255, 255]);
        canvas.blur_background();
        let edge = pixel(&frame, 32, 10);
        assert!(edge[0] > 0 && edge[0] < 255);
        assert_eq!(pixel(&frame, 0, 10)[0], 255);
        assert_eq!(pixel(&frame, 63, 10)[0], 0);
    }
}
