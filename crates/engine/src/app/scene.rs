use tracing::info;

use crate::world::{LevelLoadError, LevelPainter};

use super::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Painter handed to a scene each tick. Level painting comes from
/// [`LevelPainter`]; the extra hooks cover whole-frame effects.
pub trait FramePainter: LevelPainter {
    fn clear(&mut self);
    /// Softens whatever is currently in the frame. Used as the pause backdrop.
    fn blur_background(&mut self);
}

pub trait Scene {
    fn load(&mut self) -> Result<(), LevelLoadError>;
    /// One fixed simulation tick. Painting happens here so the frame always
    /// reflects the last simulated state.
    fn update(&mut self, input: &InputSnapshot, painter: &mut dyn FramePainter) -> SceneCommand;
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
    fn entity_count(&self) -> usize {
        0
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) -> Result<(), LevelLoadError> {
        if self.is_loaded {
            return Ok(());
        }
        self.scene.load()?;
        self.is_loaded = true;
        info!(entity_count = self.scene.entity_count(), "scene_loaded");
        Ok(())
    }

    pub(crate) fn update(
        &mut self,
        input: &InputSnapshot,
        painter: &mut dyn FramePainter,
    ) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(input, painter)
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn entity_count(&self) -> usize {
        self.scene.entity_count()
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::world::{Camera, Entity, SpriteRef};

    #[derive(Default)]
    struct Calls {
        loads: u32,
        updates: u32,
        unloads: u32,
    }

    struct CountingScene {
        calls: Rc<RefCell<Calls>>,
    }

    impl Scene for CountingScene {
        fn load(&mut self) -> Result<(), LevelLoadError> {
            self.calls.borrow_mut().loads += 1;
            Ok(())
        }

        fn update(
            &mut self,
            input: &InputSnapshot,
            _painter: &mut dyn FramePainter,
        ) -> SceneCommand {
            self.calls.borrow_mut().updates += 1;
            if input.quit_requested() {
                SceneCommand::Quit
            } else {
                SceneCommand::None
            }
        }

        fn unload(&mut self) {
            self.calls.borrow_mut().unloads += 1;
        }
    }

    struct NullPainter;

    impl LevelPainter for NullPainter {
        fn paint_background(&mut self, _x: i32, _y: i32) {}
        fn paint_sprite(&mut self, _sprite: &SpriteRef, _x: i32, _y: i32) {}
        fn paint_entity(&mut self, _entity: &Entity, _camera: &Camera) {}
    }

    impl FramePainter for NullPainter {
        fn clear(&mut self) {}
        fn blur_background(&mut self) {}
    }

    #[test]
    fn runtime_loads_once_and_unloads_on_shutdown() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut runtime = SceneRuntime::new(Box::new(CountingScene {
            calls: Rc::clone(&calls),
        }));

        assert_eq!(
            runtime.update(&InputSnapshot::empty(), &mut NullPainter),
            SceneCommand::None
        );
        assert_eq!(calls.borrow().updates, 0);

        runtime.load().expect("load");
        runtime.load().expect("second load is a no-op");
        runtime.update(&InputSnapshot::empty(), &mut NullPainter);
        runtime.shutdown();
        runtime.shutdown();

        let calls = calls.borrow();
        assert_eq!(calls.loads, 1);
        assert_eq!(calls.updates, 1);
        assert_eq!(calls.unloads, 1);
    }

    #[test]
    fn quit_event_becomes_quit_command() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut runtime = SceneRuntime::new(Box::new(CountingScene { calls }));
        runtime.load().expect("load");
        let input = InputSnapshot::empty().with_event(super::super::InputEvent::Quit);
        assert_eq!(runtime.update(&input, &mut NullPainter), SceneCommand::Quit);
    }
}
