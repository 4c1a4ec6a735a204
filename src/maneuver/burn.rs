use nalgebra::Vector3;

use crate::error::{GuidanceError, Result};
use crate::physics::gravity::G0;
use crate::vehicle::Engine;
use crate::vessel::{FlightPlan, NodeId, Telemetry};

/// When and how long to burn for one registered node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnSchedule {
    pub ignition_epoch: f64, // s, mission time
    pub burn_duration: f64,  // s
    pub burn_vector: Vector3<f64>,
}

impl BurnSchedule {
    /// Centre the burn on the node epoch: half of it elapses before.
    pub fn for_node<V>(vessel: &V, node: NodeId, epoch: f64) -> Result<Self>
    where
        V: Telemetry + FlightPlan + ?Sized,
    {
        let thrust = vessel.available_thrust();
        let isp = effective_isp(&vessel.engines(), thrust)?;
        let burn_vector = vessel.burn_vector(node);
        let burn_duration = burn_duration(vessel.mass(), thrust, isp, burn_vector.norm())?;
        Ok(Self {
            ignition_epoch: epoch - 0.5 * burn_duration,
            burn_duration,
            burn_vector,
        })
    }
}

/// Specific impulse of the running engines, weighted by each engine's share
/// of the available thrust.
pub fn effective_isp(engines: &[Engine], available_thrust: f64) -> Result<f64> {
    if !engines.iter().any(Engine::is_producing) {
        return Err(GuidanceError::NoIgnitedEngines);
    }
    if !(available_thrust > 0.0) {
        return Err(GuidanceError::ThrustUnavailable);
    }
    let isp: f64 = engines
        .iter()
        .filter(|e| e.is_producing())
        .map(|e| e.isp * e.thrust / available_thrust)
        .sum();
    if isp > 0.0 && isp.is_finite() {
        Ok(isp)
    } else {
        Err(GuidanceError::NoIgnitedEngines)
    }
}

/// Time to deliver `delta_v` at full `thrust` from the rocket equation.
///
/// ```text
/// ve   = isp * g0
/// mf   = m / exp(dv / ve)
/// mdot = F / ve
/// t    = (m - mf) / mdot
/// ```
pub fn burn_duration(mass: f64, thrust: f64, isp: f64, delta_v: f64) -> Result<f64> {
    if !(isp > 0.0) {
        return Err(GuidanceError::NoIgnitedEngines);
    }
    if !(thrust > 0.0) {
        return Err(GuidanceError::ThrustUnavailable);
    }
    let exhaust_velocity = isp * G0;
    let final_mass = mass / (delta_v / exhaust_velocity).exp();
    let fuel_flow = thrust / exhaust_velocity;
    Ok((mass - final_mass) / fuel_flow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(thrust: f64, isp: f64) -> Engine {
        Engine { ignited: true, ..Engine::new("E", thrust, isp) }
    }

    #[test]
    fn burn_duration_matches_rocket_equation() {
        let t = burn_duration(10_000.0, 200_000.0, 300.0, 500.0).unwrap();

        let ve: f64 = 300.0 * 9.80665;
        let mf = 10_000.0 * (-500.0 / ve).exp();
        let fuel_flow = 200_000.0 / ve;
        let expected = (10_000.0 - mf) / fuel_flow;
        assert!((t - expected).abs() < 1e-9);
        assert!((t - 22.99).abs() < 0.01, "got {}", t);
    }

    #[test]
    fn burn_is_shorter_than_constant_mass_estimate() {
        let t = burn_duration(10_000.0, 200_000.0, 300.0, 500.0).unwrap();
        assert!(t < 10_000.0 * 500.0 / 200_000.0);
    }

    #[test]
    fn zero_isp_is_fatal() {
        assert_eq!(
            burn_duration(1000.0, 1000.0, 0.0, 10.0),
            Err(GuidanceError::NoIgnitedEngines)
        );
    }

    #[test]
    fn zero_thrust_is_fatal() {
        assert_eq!(
            burn_duration(1000.0, 0.0, 300.0, 10.0),
            Err(GuidanceError::ThrustUnavailable)
        );
    }

    #[test]
    fn isp_weighted_by_thrust_share() {
        let engines = vec![running(150_000.0, 300.0), running(50_000.0, 200.0)];
        let isp = effective_isp(&engines, 200_000.0).unwrap();
        assert!((isp - 275.0).abs() < 1e-9);
    }

    #[test]
    fn idle_and_flamed_out_engines_are_ignored() {
        let engines = vec![
            running(100_000.0, 320.0),
            Engine::new("Idle", 100_000.0, 250.0),
            Engine { flameout: true, ..running(100_000.0, 200.0) },
        ];
        let isp = effective_isp(&engines, 100_000.0).unwrap();
        assert!((isp - 320.0).abs() < 1e-9);
    }

    #[test]
    fn no_ignited_engine_is_degenerate() {
        let engines = vec![Engine::new("Idle", 100_000.0, 250.0)];
        assert_eq!(effective_isp(&engines, 0.0), Err(GuidanceError::NoIgnitedEngines));
        assert_eq!(effective_isp(&[], 0.0), Err(GuidanceError::NoIgnitedEngines));
    }
}
