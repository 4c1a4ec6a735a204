use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::config::DescentConfig;
use crate::error::{GuidanceError, Result};
use crate::vessel::{ControlLease, Orientation, Vessel};
use super::terrain::terrain_normal;

/// Phase of a powered landing, driven by telemetry thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescentState {
    /// Falling; stopping distance is still shorter than the distance to ground.
    Approaching,
    /// Throttle follows stopping distance over distance to ground.
    Braking,
    /// Braking with the landing gear down.
    GearDeployed,
    /// Down; holding attitude along the terrain normal.
    Aligning,
    /// Steering and throttle handed back.
    Released,
}

/// Suicide-burn kinematics for one control step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrakingSolution {
    /// Net upward deceleration at full thrust, m/s^2.
    pub max_deceleration: f64,
    /// Distance needed to null the vertical speed at full thrust, m.
    pub stopping_distance: f64,
    /// Height of the landing plane below the vessel, m.
    pub distance_to_ground: f64,
    /// Stopping distance over distance to ground. Infinite at or below the
    /// landing plane.
    pub throttle_ratio: f64,
}

/// Compute the braking solution for a vessel falling at `vertical_speed`.
pub fn braking_solution(
    vertical_speed: f64,
    thrust: f64,
    mass: f64,
    gravity: f64,
    distance_to_ground: f64,
) -> Result<BrakingSolution> {
    if !(thrust > 0.0) {
        return Err(GuidanceError::ThrustUnavailable);
    }
    let max_deceleration = thrust / mass - gravity;
    if !(max_deceleration > 0.0) {
        return Err(GuidanceError::InsufficientDeceleration { max_deceleration });
    }
    let stopping_distance = vertical_speed * vertical_speed / (2.0 * max_deceleration);
    let throttle_ratio = if distance_to_ground > 0.0 {
        stopping_distance / distance_to_ground
    } else {
        f64::INFINITY
    };
    Ok(BrakingSolution {
        max_deceleration,
        stopping_distance,
        distance_to_ground,
        throttle_ratio,
    })
}

/// What one control step decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescentStep {
    pub state: DescentState,
    /// Throttle commanded this step, possibly above 1 when unclamped.
    pub throttle: f64,
    /// `None` once the descent has been arrested.
    pub solution: Option<BrakingSolution>,
}

/// Summary of a completed landing.
#[derive(Debug, Clone, PartialEq)]
pub struct DescentReport {
    pub braking_start: Option<f64>,
    pub gear_time: Option<f64>,
    pub touchdown_time: f64,
    /// Vertical speed when the throttle was cut, m/s.
    pub final_vertical_speed: f64,
    pub max_throttle: f64,
    pub terrain_normal: Vector3<f64>,
}

/// Closed-loop powered landing.
///
/// Holds surface retrograde and commands the throttle as the ratio of the
/// full-thrust stopping distance to the distance left above the landing plane,
/// starting the first time that ratio exceeds one. Once the descent has been
/// arrested the vessel is aligned with the local terrain, held, and released.
#[derive(Debug, Clone)]
pub struct DescentController {
    config: DescentConfig,
    state: DescentState,
    braking_start: Option<f64>,
    gear_time: Option<f64>,
    max_throttle: f64,
}

impl DescentController {
    pub fn new(config: DescentConfig) -> Self {
        Self {
            config,
            state: DescentState::Approaching,
            braking_start: None,
            gear_time: None,
            max_throttle: 0.0,
        }
    }

    /// Forget the previous landing.
    fn reset(&mut self) {
        self.state = DescentState::Approaching;
        self.braking_start = None;
        self.gear_time = None;
        self.max_throttle = 0.0;
    }

    pub fn state(&self) -> DescentState {
        self.state
    }

    pub fn gear_deployed(&self) -> bool {
        self.gear_time.is_some()
    }

    /// Evaluate the braking law once and command throttle and gear.
    ///
    /// Does not wait; the caller advances time between steps.
    pub fn step<V>(&mut self, vessel: &mut V) -> Result<DescentStep>
    where
        V: Vessel + ?Sized,
    {
        if matches!(self.state, DescentState::Aligning | DescentState::Released) {
            return Ok(DescentStep { state: self.state, throttle: 0.0, solution: None });
        }

        let altitude = vessel.altitude();
        let position = vessel.position();
        let gravity = vessel.body().gravity_at(altitude);
        let distance = altitude - vessel.terrain_height(&position) - self.config.ground_clearance;
        let vertical_speed = vessel.vertical_speed();

        let solution = braking_solution(
            vertical_speed,
            vessel.available_thrust(),
            vessel.mass(),
            gravity,
            distance,
        )?;

        if self.gear_time.is_none() && distance < self.config.gear_altitude {
            vessel.deploy_gear();
            self.gear_time = Some(vessel.time());
            info!(distance, t = vessel.time(), "gear deployed");
        }

        if self.braking_start.is_none() && solution.throttle_ratio > 1.0 {
            self.braking_start = Some(vessel.time());
            info!(
                distance,
                vertical_speed,
                stopping_distance = solution.stopping_distance,
                "braking"
            );
        }

        let braking = self.braking_start.is_some();
        if vertical_speed >= 0.0 && (braking || distance <= 0.0) {
            vessel.set_throttle(0.0);
            self.state = DescentState::Aligning;
            info!(t = vessel.time(), distance, "descent arrested");
            return Ok(DescentStep { state: self.state, throttle: 0.0, solution: Some(solution) });
        }

        let throttle = if !braking {
            0.0
        } else if solution.throttle_ratio.is_finite() {
            solution.throttle_ratio
        } else {
            1.0
        };
        let throttle = if self.config.clamp_throttle { throttle.min(1.0) } else { throttle };
        vessel.set_throttle(throttle);
        self.max_throttle = self.max_throttle.max(throttle);

        self.state = match (braking, self.gear_time.is_some()) {
            (false, _) => DescentState::Approaching,
            (true, false) => DescentState::Braking,
            (true, true) => DescentState::GearDeployed,
        };
        debug!(state = ?self.state, throttle, distance, vertical_speed, "descent step");

        Ok(DescentStep { state: self.state, throttle, solution: Some(solution) })
    }

    /// Fly the whole descent, from the current state to release on the ground.
    pub fn land<V>(&mut self, vessel: &mut V) -> Result<DescentReport>
    where
        V: Vessel + ?Sized,
    {
        self.reset();
        let result = self.fly(vessel);
        if let Err(err) = &result {
            warn!(%err, state = ?self.state, "descent aborted");
        }
        result
    }

    fn fly<V>(&mut self, vessel: &mut V) -> Result<DescentReport>
    where
        V: Vessel + ?Sized,
    {
        let mut lease = ControlLease::acquire(vessel);
        lease.steer(Orientation::SurfaceRetrograde);

        let final_vertical_speed = loop {
            let step = self.step(&mut *lease)?;
            if matches!(step.state, DescentState::Aligning | DescentState::Released) {
                break lease.vertical_speed();
            }
            lease.wait(self.config.control_step);
        };
        let touchdown_time = lease.time();

        let position = lease.position();
        let normal = terrain_normal(&*lease, &position, self.config.terrain_sample_radius);
        lease.steer(Orientation::Vector(normal));
        lease.wait(self.config.settle_time);

        drop(lease);
        self.state = DescentState::Released;
        info!(t = touchdown_time, "steering released");

        Ok(DescentReport {
            braking_start: self.braking_start,
            gear_time: self.gear_time,
            touchdown_time,
            final_vertical_speed,
            max_throttle: self.max_throttle,
            terrain_normal: normal,
        })
    }
}

impl Default for DescentController {
    fn default() -> Self {
        Self::new(DescentConfig::default())
    }
}
