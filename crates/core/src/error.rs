//! Error taxonomy for the agent and its scenario loader.
//!
//! Neither error type ever halts the tick loop; the agent turns them into
//! strings on the tick's telemetry record.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use toml::de::Error as TomlError;

pub use crate::world::WorldError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("collaborator error: {0}")]
    Collaborator(#[from] WorldError),

    #[error("no player entity in world")]
    NoPlayerEntity,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse scenario")]
    Parse(#[from] TomlError),

    #[error("invalid map: {0}")]
    InvalidMap(String),

    #[error("quest {quest} depends on undeclared quest {dependency}")]
    UnknownDependency { quest: String, dependency: String },

    #[error("quest {quest} objective ({x},{y}) lies outside the map")]
    ObjectiveOutOfBounds { quest: String, x: i32, y: i32 },
}
