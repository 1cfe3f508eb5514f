use std::env;

use sidescroll_engine::world::validate_level_name;
use sidescroll_engine::{
    resolve_app_paths, AppError, LevelDirectory, LoopConfig, Scene, SimulationConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::GameplayScene;

const START_LEVEL_ENV_VAR: &str = "SIDESCROLL_LEVEL";
const BOSS_COOLDOWN_ENV_VAR: &str = "SIDESCROLL_BOSS_COOLDOWN";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Sidescroll Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        levels_dir = %app_paths.levels_dir.display(),
        "startup"
    );

    let simulation = simulation_config_from(
        env::var(START_LEVEL_ENV_VAR).ok(),
        env::var(BOSS_COOLDOWN_ENV_VAR).ok(),
    );
    info!(
        start_level = %simulation.start_level,
        boss_level = %simulation.boss_level,
        boss_fire_cooldown = simulation.boss_fire_cooldown,
        "simulation_config"
    );

    let scene = GameplayScene::new(simulation, LevelDirectory::new(app_paths.levels_dir));
    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(scene),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Applies environment overrides on top of the defaults. Unusable values
/// are logged and ignored.
fn simulation_config_from(
    start_level: Option<String>,
    boss_cooldown: Option<String>,
) -> SimulationConfig {
    let mut config = SimulationConfig::default();

    if let Some(raw) = start_level {
        let name = raw.trim();
        match validate_level_name(name) {
            Ok(()) => config.start_level = name.to_string(),
            Err(err) => warn!(
                env_var = START_LEVEL_ENV_VAR,
                value = raw.as_str(),
                error = %err,
                "invalid start level; falling back to default"
            ),
        }
    }

    if let Some(raw) = boss_cooldown {
        match raw.trim().parse::<u32>() {
            Ok(frames) if frames > 0 => config.boss_fire_cooldown = frames,
            _ => warn!(
                env_var = BOSS_COOLDOWN_ENV_VAR,
                value = raw.as_str(),
                "invalid boss cooldown; falling back to default"
            ),
        }
    }

    config
}
