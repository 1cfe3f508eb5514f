use sidescroll_engine::{
    Camera, FramePainter, InputRouter, InputSnapshot, Level, LevelLoadError, LevelSource, Scene,
    SceneCommand, SimulationConfig,
};
use tracing::info;

/// The playable level: routes input, moves the player, then sweeps and
/// paints the level once per tick. Pausing freezes all of it.
pub(crate) struct GameplayScene {
    level: Level,
    camera: Camera,
    router: InputRouter,
    start_level: String,
    paused: bool,
}

impl GameplayScene {
    pub(crate) fn new(config: SimulationConfig, source: impl LevelSource + 'static) -> Self {
        let router = InputRouter::new(&config);
        let start_level = config.start_level.clone();
        Self {
            level: Level::new(config, source),
            camera: Camera::default(),
            router,
            start_level,
            paused: false,
        }
    }

    fn update_paused(&mut self, input: &InputSnapshot) -> SceneCommand {
        let outcome = self.router.route_paused(input);
        if outcome.quit_requested {
            return SceneCommand::Quit;
        }
        if outcome.resume_requested {
            self.paused = false;
            info!("resumed");
        }
        SceneCommand::None
    }
}

impl Scene for GameplayScene {
    fn load(&mut self) -> Result<(), LevelLoadError> {
        self.level.load_level(&self.start_level)?;
        self.camera = Camera::default();
        self.paused = false;
        Ok(())
    }

    fn update(&mut self, input: &InputSnapshot, painter: &mut dyn FramePainter) -> SceneCommand {
        if self.paused {
            return self.update_paused(input);
        }

        let outcome = self.router.route(input, &self.camera, &mut self.level);
        if outcome.quit_requested {
            return SceneCommand::Quit;
        }
        if outcome.level_reloaded {
            self.camera = Camera::default();
        }
        if outcome.pause_requested {
            self.paused = true;
            painter.blur_background();
            return SceneCommand::None;
        }

        self.level.update_player(&mut self.camera);
        painter.clear();
        self.level.draw_level(&self.camera, painter);
        SceneCommand::None
    }

    fn unload(&mut self) {
        info!(
            level = self.level.name().unwrap_or("<none>"),
            coins = self.level.coins(),
            "level_unloaded"
        );
        self.level.reset();
    }

    fn debug_title(&self) -> Option<String> {
        let level = self.level.name().unwrap_or("<none>");
        let paused = if self.paused { " | paused" } else { "" };
        Some(format!(
            "Sidescroll | {level} | coins {} | projectiles {}{paused}",
            self.level.coins(),
            self.level.projectile_count(),
        ))
    }

    fn entity_count(&self) -> usize {
        self.level.entities().len()
    }
}

#[cfg(test)]
mod tests;
