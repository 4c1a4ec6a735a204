//! Derivative-free searches used to pick maneuver parameters.

pub mod objective;
pub mod pattern;
pub mod ternary;

pub use objective::{Objective, StalenessGuard, Timed, STALE_SCORE};
pub use pattern::{Optimum, PatternSearch};
pub use ternary::minimize;
