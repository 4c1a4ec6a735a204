//! Closed-loop guidance: powered descent and terrain alignment.

pub mod descent;
pub mod terrain;

pub use descent::{braking_solution, BrakingSolution, DescentController, DescentReport, DescentState, DescentStep};
pub use terrain::terrain_normal;
