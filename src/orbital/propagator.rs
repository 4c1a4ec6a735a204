use nalgebra::Vector3;

use crate::physics::gravity::gravity_pointmass;

/// Point-mass state in a body-centred, non-rotating frame.
#[derive(Debug, Clone)]
pub struct OrbitalState {
    pub time: f64,
    pub pos: Vector3<f64>, // m
    pub vel: Vector3<f64>, // m/s
    pub mass: f64,         // kg
}

impl OrbitalState {
    /// Height above a sphere of `radius`.
    pub fn altitude(&self, radius: f64) -> f64 {
        self.pos.norm() - radius
    }

    pub fn speed(&self) -> f64 {
        self.vel.norm()
    }
}

/// Engine output held constant across one integration step.
#[derive(Debug, Clone, Copy)]
pub struct ThrustInput {
    pub force: Vector3<f64>, // N, inertial
    pub mass_flow: f64,      // kg/s, positive while burning
}

impl ThrustInput {
    pub fn coast() -> Self {
        Self { force: Vector3::zeros(), mass_flow: 0.0 }
    }
}

/// Single RK4 step under point-mass gravity plus constant thrust.
pub fn rk4_step(state: &OrbitalState, dt: f64, mu: f64, thrust: &ThrustInput) -> OrbitalState {
    let deriv = |pos: &Vector3<f64>, vel: &Vector3<f64>, mass: f64| -> (Vector3<f64>, Vector3<f64>) {
        let a_thrust = if mass > 0.0 { thrust.force / mass } else { Vector3::zeros() };
        (*vel, gravity_pointmass(pos, mu) + a_thrust)
    };
    let m = |t: f64| (state.mass - thrust.mass_flow * t).max(1e-9);

    let (k1_dr, k1_dv) = deriv(&state.pos, &state.vel, m(0.0));
    let (k2_dr, k2_dv) = deriv(
        &(state.pos + k1_dr * dt * 0.5),
        &(state.vel + k1_dv * dt * 0.5),
        m(dt * 0.5),
    );
    let (k3_dr, k3_dv) = deriv(
        &(state.pos + k2_dr * dt * 0.5),
        &(state.vel + k2_dv * dt * 0.5),
        m(dt * 0.5),
    );
    let (k4_dr, k4_dv) = deriv(
        &(state.pos + k3_dr * dt),
        &(state.vel + k3_dv * dt),
        m(dt),
    );

    OrbitalState {
        time: state.time + dt,
        pos: state.pos + (k1_dr + 2.0 * k2_dr + 2.0 * k3_dr + k4_dr) * (dt / 6.0),
        vel: state.vel + (k1_dv + 2.0 * k2_dv + 2.0 * k3_dv + k4_dv) * (dt / 6.0),
        mass: (state.mass - thrust.mass_flow * dt).max(0.0),
    }
}
