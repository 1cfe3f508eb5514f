use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("invalid level name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("level '{name}' not found at {path}")]
    NotFound { name: String, path: PathBuf },
    #[error("failed to read level '{name}' from {path}: {source}")]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse level '{name}' at {path}: {message}")]
    Parse {
        name: String,
        path: String,
        message: String,
    },
    #[error("level '{name}' has no length")]
    MissingLength { name: String },
}

/// Half-open tile range written as `[start, end]` in level files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "[i32; 2]")]
pub struct TileSpan {
    pub start: i32,
    pub end: i32,
}

impl From<[i32; 2]> for TileSpan {
    fn from([start, end]: [i32; 2]) -> Self {
        Self { start, end }
    }
}

impl TileSpan {
    pub fn len(&self) -> usize {
        usize::try_from(self.end.saturating_sub(self.start)).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LayerSpan {
    #[serde(default)]
    pub x: TileSpan,
    #[serde(default)]
    pub y: TileSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Layers {
    #[serde(default)]
    pub sky: LayerSpan,
    #[serde(default)]
    pub ground: LayerSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectPlacements {
    #[serde(default)]
    pub bush: Vec<(i32, i32)>,
    #[serde(default)]
    pub cloud: Vec<(i32, i32)>,
    /// `(x, y, length)`
    #[serde(default)]
    pub pipe: Vec<(i32, i32, i32)>,
    #[serde(default)]
    pub sky: Vec<(i32, i32)>,
    #[serde(default)]
    pub ground: Vec<(i32, i32)>,
    #[serde(default)]
    pub boss_spawn: Vec<(i32, i32)>,
}

/// `[x, y, item, ...]`. Elements past the third are ignored. Shorter
/// entries, or ones whose first three elements have the wrong types, are
/// kept as `Incomplete` and skipped by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<serde_json::Value>")]
pub enum RandomBoxEntry {
    Complete(i32, i32, String),
    Incomplete(Vec<serde_json::Value>),
}

impl From<Vec<serde_json::Value>> for RandomBoxEntry {
    fn from(values: Vec<serde_json::Value>) -> Self {
        let coordinate = |value: &serde_json::Value| {
            value.as_i64().and_then(|raw| i32::try_from(raw).ok())
        };
        let complete = match values.as_slice() {
            [x, y, item, ..] => coordinate(x)
                .zip(coordinate(y))
                .zip(item.as_str())
                .map(|((x, y), item)| Self::Complete(x, y, item.to_string())),
            _ => None,
        };
        complete.unwrap_or(Self::Incomplete(values))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntityPlacements {
    #[serde(default, rename = "CoinBox")]
    pub coin_box: Vec<(i32, i32)>,
    #[serde(default, rename = "Goomba")]
    pub goomba: Vec<(i32, i32)>,
    #[serde(default, rename = "Koopa")]
    pub koopa: Vec<(i32, i32)>,
    #[serde(default)]
    pub coin: Vec<(i32, i32)>,
    #[serde(default, rename = "coinBrick")]
    pub coin_brick: Vec<(i32, i32)>,
    #[serde(default, rename = "RandomBox")]
    pub random_box: Vec<RandomBoxEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LevelBody {
    #[serde(default)]
    pub layers: Layers,
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: ObjectPlacements,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: EntityPlacements,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LevelDescription {
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub level: LevelBody,
    /// Tile the player starts on. Defaults to the top-left cell.
    #[serde(default)]
    pub player_spawn: Option<(i32, i32)>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl LevelDescription {
    pub fn from_json(name: &str, raw: &str) -> Result<Self, LevelLoadError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, Self>(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            LevelLoadError::Parse {
                name: name.to_string(),
                path,
                message: error.into_inner().to_string(),
            }
        })
    }
}

/// Where level files come from. The level owns one and reads through it on
/// every load.
pub trait LevelSource {
    fn read_level(&self, name: &str) -> Result<String, LevelLoadError>;
}

/// Reads `<root>/<name>.json`.
#[derive(Debug, Clone)]
pub struct LevelDirectory {
    root: PathBuf,
}

impl LevelDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, LevelLoadError> {
        validate_level_name(name)?;
        Ok(self.root.join(format!("{name}.json")))
    }
}

impl LevelSource for LevelDirectory {
    fn read_level(&self, name: &str) -> Result<String, LevelLoadError> {
        let path = self.path_for(name)?;
        fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LevelLoadError::NotFound {
                    name: name.to_string(),
                    path,
                }
            } else {
                LevelLoadError::Read {
                    name: name.to_string(),
                    path,
                    source,
                }
            }
        })
    }
}

/// Level names are bare file stems; anything that could escape the level
/// directory is rejected.
pub fn validate_level_name(name: &str) -> Result<(), LevelLoadError> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.contains("..") {
        Some("must not contain '..'")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if !name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
    {
        Some("may only contain ASCII letters, digits, '-' and '_'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(LevelLoadError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
