use nalgebra::Vector3;

use crate::orbital::KeplerianElements;
use crate::physics::Body;

/// A body on a fixed Keplerian orbit around the simulation's reference body.
#[derive(Debug, Clone)]
pub struct SimTarget {
    pub body: Body,
    pub orbit: KeplerianElements,
    /// Mission time at which `orbit.true_anom` holds, s.
    pub epoch: f64,
}

impl SimTarget {
    pub fn new(body: Body, orbit: KeplerianElements, epoch: f64) -> Self {
        Self { body, orbit, epoch }
    }

    /// Position and velocity at mission time `t` around a parent of `mu`.
    pub fn state_at(&self, t: f64, mu: f64) -> (Vector3<f64>, Vector3<f64>) {
        self.orbit.propagate(t - self.epoch, mu).to_state_vector(mu)
    }

    pub fn position_at(&self, t: f64, mu: f64) -> Vector3<f64> {
        self.state_at(t, mu).0
    }
}
