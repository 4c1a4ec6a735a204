pub mod elements;
pub mod maneuvers;
pub mod propagator;

pub use elements::{KeplerianElements, OrbitSummary};
pub use maneuvers::{hohmann, maneuver_to_inertial, HohmannTransfer};
pub use propagator::{rk4_step, OrbitalState, ThrustInput};
