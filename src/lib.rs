//! Autonomous guidance for a single vessel: maneuver planning by
//! derivative-free search, burn execution and powered descent.

pub mod config;
pub mod error;
pub mod gnc;
pub mod maneuver;
pub mod orbital;
pub mod physics;
pub mod search;
pub mod sim;
pub mod vehicle;
pub mod vessel;

pub use config::GuidanceConfig;
pub use error::{GuidanceError, Result};
