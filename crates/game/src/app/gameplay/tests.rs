use std::collections::HashMap;

use sidescroll_engine::world::SpriteRef;
use sidescroll_engine::{Entity, EntityKind, InputEvent, Key, LevelPainter, TILE_SIZE};

use super::*;

const START_LEVEL: &str = r#"{
    "length": 40,
    "level": {
        "layers": {"sky": {"x": [0, 40], "y": [0, 13]}, "ground": {"x": [0, 40], "y": [13, 15]}},
        "objects": {"boss_spawn": [[15, 11]]}
    }
}"#;

const BOSS_LEVEL: &str = r#"{
    "length": 40,
    "level": {
        "layers": {"sky": {"x": [0, 40], "y": [0, 13]}, "ground": {"x": [0, 40], "y": [13, 15]}},
        "objects": {"boss_spawn": [[20, 11]]}
    }
}"#;

struct MemoryLevels(HashMap<String, String>);

impl LevelSource for MemoryLevels {
    fn read_level(&self, name: &str) -> Result<String, LevelLoadError> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| LevelLoadError::NotFound {
                name: name.to_string(),
                path: name.into(),
            })
    }
}

#[derive(Default)]
struct CountingPainter {
    clears: usize,
    blurs: usize,
    sprites: usize,
    entities: usize,
}

impl LevelPainter for CountingPainter {
    fn paint_background(&mut self, _x: i32, _y: i32) {}

    fn paint_sprite(&mut self, _sprite: &SpriteRef, _x: i32, _y: i32) {
        self.sprites += 1;
    }

    fn paint_entity(&mut self, _entity: &Entity, _camera: &Camera) {
        self.entities += 1;
    }
}

impl FramePainter for CountingPainter {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn blur_background(&mut self) {
        self.blurs += 1;
    }
}

fn loaded_scene() -> GameplayScene {
    let levels = MemoryLevels(HashMap::from([
        ("Level1-1".to_string(), START_LEVEL.to_string()),
        ("Level1-boss".to_string(), BOSS_LEVEL.to_string()),
    ]));
    let mut scene = GameplayScene::new(SimulationConfig::default(), levels);
    scene.load().expect("start level loads");
    scene
}

fn tick(scene: &mut GameplayScene, painter: &mut CountingPainter, input: &InputSnapshot) -> SceneCommand {
    scene.update(input, painter)
}

fn idle_ticks(scene: &mut GameplayScene, painter: &mut CountingPainter, count: usize) {
    for _ in 0..count {
        tick(scene, painter, &InputSnapshot::empty());
    }
}

fn key_press(key: Key) -> InputSnapshot {
    InputSnapshot::empty().with_event(InputEvent::KeyDown(key))
}

#[test]
fn load_spawns_player_and_boss() {
    let scene = loaded_scene();
    assert_eq!(scene.level.count_of(EntityKind::Player), 1);
    assert_eq!(scene.level.count_of(EntityKind::Boss), 1);
    let title = scene.debug_title().expect("title");
    assert!(title.contains("Level1-1"));
    assert!(title.contains("projectiles 0"));
}

#[test]
fn missing_start_level_fails_load() {
    let mut scene = GameplayScene::new(SimulationConfig::default(), MemoryLevels(HashMap::new()));
    assert!(matches!(scene.load(), Err(LevelLoadError::NotFound { .. })));
}

#[test]
fn each_tick_clears_then_paints_level() {
    let mut scene = loaded_scene();
    let mut painter = CountingPainter::default();
    tick(&mut scene, &mut painter, &InputSnapshot::empty());
    assert_eq!(painter.clears, 1);
    assert!(painter.sprites > 0);
    assert_eq!(painter.entities, scene.level.entities().len());
}

#[test]
fn boss_fires_on_tenth_tick() {
    let mut scene = loaded_scene();
    let mut painter = CountingPainter::default();
    idle_ticks(&mut scene, &mut painter, 9);
    assert_eq!(scene.level.projectile_count(), 0);
    idle_ticks(&mut scene, &mut painter, 1);
    assert_eq!(scene.level.projectile_count(), 1);
}

#[test]
fn pause_freezes_simulation_and_resume_continues_timers() {
    let mut scene = loaded_scene();
    let mut painter = CountingPainter::default();
    idle_ticks(&mut scene, &mut painter, 4);

    tick(&mut scene, &mut painter, &key_press(Key::Escape));
    assert!(scene.paused);
    assert_eq!(painter.blurs, 1);

    let clears_when_paused = painter.clears;
    idle_ticks(&mut scene, &mut painter, 20);
    assert_eq!(painter.clears, clears_when_paused);
    assert_eq!(scene.level.projectile_count(), 0);
    assert!(scene.debug_title().expect("title").ends_with("paused"));

    tick(&mut scene, &mut painter, &key_press(Key::F5));
    assert!(!scene.paused);

    idle_ticks(&mut scene, &mut painter, 5);
    assert_eq!(scene.level.projectile_count(), 0);
    idle_ticks(&mut scene, &mut painter, 1);
    assert_eq!(scene.level.projectile_count(), 1);
}

#[test]
fn quit_is_honoured_while_paused() {
    let mut scene = loaded_scene();
    let mut painter = CountingPainter::default();
    tick(&mut scene, &mut painter, &key_press(Key::Escape));
    let quit = InputSnapshot::empty().with_event(InputEvent::Quit);
    assert_eq!(tick(&mut scene, &mut painter, &quit), SceneCommand::Quit);
}

#[test]
fn quit_event_ends_the_scene() {
    let mut scene = loaded_scene();
    let mut painter = CountingPainter::default();
    let quit = InputSnapshot::empty().with_event(InputEvent::Quit);
    assert_eq!(tick(&mut scene, &mut painter, &quit), SceneCommand::Quit);
}

#[test]
fn boss_level_key_loads_level_and_places_player_left_of_boss() {
    let mut scene = loaded_scene();
    let mut painter = CountingPainter::default();
    tick(&mut scene, &mut painter, &key_press(Key::F3));

    assert_eq!(scene.level.name(), Some("Level1-boss"));
    let player = scene.level.find_player().expect("player");
    assert_eq!(player.rect.x, 20 * TILE_SIZE - 100);
    let invincible = player.as_player().expect("player body").is_invincible();
    assert!(invincible);
}

#[test]
fn unload_clears_the_level() {
    let mut scene = loaded_scene();
    scene.unload();
    assert!(scene.level.entities().is_empty());
}
