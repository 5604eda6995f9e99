use thiserror::Error;

use crate::core::types::{CityId, InstanceId, Location, TemplateId};

/// Unrecoverable engine errors
///
/// Anything that reaches this type ends the current match. Recoverable
/// outcomes (illegal turns, invalid choices, capacity limits, pool
/// exhaustion) are reported as values instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Entity pool for {0} is already initialized")]
    Reinitialization(&'static str),

    #[error("Instance not found: {0}")]
    UnknownInstance(InstanceId),

    #[error("Template not found: {0}")]
    UnknownTemplate(TemplateId),

    #[error("City not found: {0}")]
    UnknownCity(CityId),

    #[error("{kind} instances cannot be placed at {location}")]
    InvalidLocation { kind: &'static str, location: Location },

    #[error("Pool desync: {0}")]
    PoolDesync(String),

    #[error("Corrupt engine state: {0}")]
    CorruptState(String),

    #[error("Match aborted: {0}")]
    MatchAborted(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Invalid data file: {0}")]
    DataFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
