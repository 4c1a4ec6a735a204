//! Maneuver planning and execution.

pub mod burn;
pub mod executor;
pub mod planner;

pub use burn::{burn_duration, effective_isp, BurnSchedule};
pub use executor::{BurnCompletion, BurnPhase, BurnReport, ManeuverExecutor};
pub use planner::{alignment_angle, Apsis, InterceptObjective, ManeuverPlanner, TransferPlan};

/// A maneuver node: epoch plus delta-v in the orbital frame at that epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverPlan {
    pub epoch: f64,    // s, mission time
    pub radial: f64,   // m/s, away from the body
    pub normal: f64,   // m/s, along orbital angular momentum
    pub prograde: f64, // m/s, along velocity
}

impl ManeuverPlan {
    pub fn new(epoch: f64, radial: f64, normal: f64, prograde: f64) -> Self {
        Self { epoch, radial, normal, prograde }
    }

    /// Build from a `[epoch, radial, normal, prograde]` search vector.
    /// Missing trailing components are zero.
    pub fn from_params(params: &[f64]) -> Self {
        let at = |i: usize| params.get(i).copied().unwrap_or(0.0);
        Self::new(at(0), at(1), at(2), at(3))
    }

    pub fn to_params(&self) -> Vec<f64> {
        vec![self.epoch, self.radial, self.normal, self.prograde]
    }

    pub fn delta_v(&self) -> f64 {
        (self.radial * self.radial + self.normal * self.normal + self.prograde * self.prograde).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_roundtrip_and_magnitude() {
        let plan = ManeuverPlan::new(1200.0, 3.0, 0.0, 4.0);
        assert_eq!(ManeuverPlan::from_params(&plan.to_params()), plan);
        assert_eq!(plan.delta_v(), 5.0);
    }

    #[test]
    fn short_params_are_zero_filled() {
        let plan = ManeuverPlan::from_params(&[50.0]);
        assert_eq!(plan, ManeuverPlan::new(50.0, 0.0, 0.0, 0.0));
    }
}
