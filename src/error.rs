use crate::call::FloorNumber;
use crate::elevator::UnitId;
use thiserror::Error;

/// Invalid construction-time parameters. Nothing is built when one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("there is currently no {role} of type `{name}`")]
    UnknownPolicy { role: &'static str, name: String },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter { name, reason: reason.into() }
    }
}

/// A request the core refused to act on. The request is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("floor {floor} does not exist, valid floors are 1..={floors}")]
    FloorOutOfRange { floor: FloorNumber, floors: FloorNumber },

    #[error("no elevator with id {0}")]
    UnknownUnit(UnitId),

    #[error("trip from floor {0} to itself")]
    SameFloor(FloorNumber),
}

/// A passenger exchange was started between a unit and a floor that cannot meet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error("no floor {0} to exchange passengers with")]
    UnknownFloor(FloorNumber),

    #[error("elevator {unit} is at floor {unit_floor}, cannot exchange passengers with floor {floor}")]
    FloorMismatch {
        unit: UnitId,
        unit_floor: FloorNumber,
        floor: FloorNumber,
    },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("request error: {0}")]
    Request(#[from] RequestError),

    #[error("handshake error: {0}")]
    Handshake(#[from] HandshakeError),
}

pub type SimResult<T> = Result<T, SimError>;
