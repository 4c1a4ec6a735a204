use thiserror::Error;

/// Fatal conditions that abort the current maneuver or descent attempt.
///
/// Nothing here is retried: the engine stops, releases its controls and hands
/// the error back to the mission sequencer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GuidanceError {
    /// Effective specific impulse is zero: no engine is ignited.
    #[error("no ignited engine: effective specific impulse is zero")]
    NoIgnitedEngines,

    /// Available thrust is zero and no stage is left to bring any online.
    #[error("no thrust available and no stage left to activate")]
    ThrustUnavailable,

    /// Thrust cannot overcome local gravity, so the vessel cannot stop.
    #[error("insufficient deceleration: max {max_deceleration:.3} m/s^2")]
    InsufficientDeceleration { max_deceleration: f64 },

    /// A transfer was requested with no target selected.
    #[error("no target body selected")]
    NoTarget,

    /// The orbit is unbound; apsides and period are undefined.
    #[error("orbit is unbound (eccentricity {eccentricity:.4})")]
    EscapeTrajectory { eccentricity: f64 },
}

pub type Result<T> = std::result::Result<T, GuidanceError>;
