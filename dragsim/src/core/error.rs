use thiserror::Error;

/// RaceError is returned if the inserted race parameters do not fulfill the posed requirements.
/// It is raised while a race is set up, never while it is animated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RaceError {
    #[error("Invalid performance figures for vehicle '{label}': {reason}")]
    InvalidProfile { label: String, reason: String },

    #[error("Race distance must be positive and finite, but is {0}")]
    InvalidDistance(f64),

    #[error("Could not parse color '{color}' of vehicle '{label}'")]
    InvalidColor { label: String, color: String },
}
