use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod control;
mod sprite_keys;
pub mod world;

pub use app::{
    run_app, AppError, FrameCanvas, FramePainter, InputEvent, InputSnapshot, Key, KeyStates,
    LoopConfig, LoopMetricsSnapshot, MouseButton, Renderer, Scene, SceneCommand, LOGICAL_HEIGHT,
    LOGICAL_WIDTH,
};
pub use control::{InputRouter, RouteOutcome, TeleportTarget};
pub use world::{
    Camera, Entity, EntityBody, EntityId, EntityKind, Level, LevelDirectory, LevelLoadError,
    LevelPainter, LevelSource, Rect, SimulationConfig, SpriteRef, Vec2, TILE_SIZE,
};

pub const ROOT_ENV_VAR: &str = "SIDESCROLL_ROOT";
const LEVELS_DIR_NAME: &str = "levels";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub levels_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "SIDESCROLL_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or levels/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or levels/.\n\
Set {env_var} explicitly, for example:\n\
export {env_var}=\"/path/to/sidescroll\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Locates the repository root and the level directory under it.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    Ok(paths_under(root))
}

fn paths_under(root: PathBuf) -> AppPaths {
    let levels_dir = root.join(LEVELS_DIR_NAME);
    AppPaths { root, levels_dir }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => root_from_env_value(&value),
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_above(&exe_dir)
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn root_from_env_value(value: &str) -> Result<PathBuf, StartupError> {
    let normalized = normalize_path(Path::new(value));
    if is_repo_marker(&normalized) {
        Ok(normalized)
    } else {
        Err(StartupError::InvalidEnvRoot { path: normalized })
    }
}

fn find_root_above(start_dir: &Path) -> Result<PathBuf, StartupError> {
    start_dir
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
        .ok_or_else(|| StartupError::RootNotFound {
            start_dir: normalize_path(start_dir),
            env_var: ROOT_ENV_VAR,
        })
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_levels = path.join(LEVELS_DIR_NAME).is_dir();

    cargo_toml && (has_crates || has_levels)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("write manifest");
        fs::create_dir(dir.path().join(LEVELS_DIR_NAME)).expect("create levels");
        dir
    }

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("crates")).expect("create crates");
        assert!(!is_repo_marker(dir.path()));

        fs::write(dir.path().join("Cargo.toml"), "").expect("write manifest");
        assert!(is_repo_marker(dir.path()));
    }

    #[test]
    fn root_is_found_from_nested_directory() {
        let root = fake_root();
        let nested = root.path().join("target").join("debug");
        fs::create_dir_all(&nested).expect("create nested");

        let found = find_root_above(&nested).expect("root");
        assert_eq!(found, normalize_path(root.path()));
        assert_eq!(paths_under(found.clone()).levels_dir, found.join("levels"));
    }

    #[test]
    fn env_root_must_be_a_marker() {
        let root = fake_root();
        let value = root.path().to_string_lossy().into_owned();
        assert!(root_from_env_value(&value).is_ok());

        let bogus = root.path().join("levels").to_string_lossy().into_owned();
        assert!(matches!(
            root_from_env_value(&bogus),
            Err(StartupError::InvalidEnvRoot { .. })
        ));
    }
}
