//! Simulated vessel environment: a point-mass vessel around a spherical body
//! with terrain and an optional target on a Keplerian orbit.

pub mod event;
pub mod target;
pub mod terrain;
pub mod vessel;

pub use event::{EventKind, EventLog, SimEvent};
pub use target::SimTarget;
pub use terrain::Terrain;
pub use vessel::SimVessel;
