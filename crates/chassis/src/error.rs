use control::ConfigError;
use thiserror::Error;

/// Errors surfaced by drivetrain construction and motion commands
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("invalid controller configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("invalid motion request: {0}")]
    InvalidRequest(String),

    #[error("cannot reset encoders while a motion is in flight")]
    MotionInFlight,

    #[error("this drivetrain has no center wheel group")]
    MissingCenterGroup,

    #[error("failed to spawn motion task: {0}")]
    Spawn(#[from] std::io::Error),
}
