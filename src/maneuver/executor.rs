use std::f64::consts::FRAC_PI_2;

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::config::ExecutorConfig;
use crate::error::{GuidanceError, Result};
use crate::vessel::{AutoStageState, ControlLease, NodeGuard, Orientation, Vessel};
use super::burn::BurnSchedule;
use super::ManeuverPlan;

/// Ignition is reached once the clock is this close to the scheduled epoch, s.
const IGNITION_TOLERANCE: f64 = 1e-6;

/// Where the executor is in the lifecycle of one burn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnPhase {
    Idle,
    Registered,
    AwaitingIgnition,
    Steering,
    Burning,
    Complete,
}

/// Detects the end of a burn from the remaining burn vector.
///
/// The vector is recorded at ignition. Once the live vector has swung more
/// than 90 degrees away from it, the requested delta-v has been delivered (any
/// further thrust would be wasted against the new residual).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BurnCompletion {
    start: Option<Vector3<f64>>,
}

impl BurnCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, burn_vector: Vector3<f64>) {
        self.start = Some(burn_vector);
    }

    pub fn is_armed(&self) -> bool {
        self.start.is_some()
    }

    pub fn is_complete(&self, current: &Vector3<f64>) -> bool {
        let Some(start) = self.start else {
            return false;
        };
        if current.norm() == 0.0 || start.norm() == 0.0 {
            return true;
        }
        start.angle(current) > FRAC_PI_2
    }
}

/// Outcome of a completed burn.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnReport {
    pub schedule: BurnSchedule,
    pub ignition_time: f64,
    pub cutoff_time: f64,
    /// Stages activated by auto-staging during the burn.
    pub stages_used: usize,
    /// Delta-v left on the node at cutoff, m/s.
    pub residual_dv: f64,
}

/// Flies a [`ManeuverPlan`]: registers it, waits for ignition, burns until the
/// node is satisfied and hands the vessel back with controls released and the
/// node removed, on success and on failure alike.
#[derive(Debug, Clone)]
pub struct ManeuverExecutor {
    config: ExecutorConfig,
    phase: BurnPhase,
}

impl ManeuverExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config, phase: BurnPhase::Idle }
    }

    pub fn phase(&self) -> BurnPhase {
        self.phase
    }

    pub fn execute<V>(
        &mut self,
        vessel: &mut V,
        plan: &ManeuverPlan,
        stager: &mut AutoStageState,
    ) -> Result<BurnReport>
    where
        V: Vessel + ?Sized,
    {
        let result = self.fly(vessel, plan, stager);
        match &result {
            Ok(report) => {
                self.phase = BurnPhase::Complete;
                info!(
                    cutoff = report.cutoff_time,
                    residual_dv = report.residual_dv,
                    stages = report.stages_used,
                    "burn complete"
                );
            }
            Err(err) => {
                self.phase = BurnPhase::Idle;
                warn!(%err, "burn aborted");
            }
        }
        result
    }

    fn fly<V>(
        &mut self,
        vessel: &mut V,
        plan: &ManeuverPlan,
        stager: &mut AutoStageState,
    ) -> Result<BurnReport>
    where
        V: Vessel + ?Sized,
    {
        let step = self.config.control_step;

        let mut node = NodeGuard::register(vessel, plan);
        let id = node.id();
        self.phase = BurnPhase::Registered;

        let schedule = BurnSchedule::for_node(&*node, id, plan.epoch)?;
        info!(
            epoch = plan.epoch,
            dv = schedule.burn_vector.norm(),
            duration = schedule.burn_duration,
            ignition = schedule.ignition_epoch,
            "node registered"
        );

        node.wait_until(schedule.ignition_epoch - self.config.warmup);
        self.phase = BurnPhase::AwaitingIgnition;

        let mut lease = ControlLease::acquire(&mut *node);
        let burn_vector = lease.burn_vector(id);
        lease.steer(Orientation::Vector(burn_vector));
        self.phase = BurnPhase::Steering;
        debug!(t = lease.time(), "steering locked to burn vector");

        while schedule.ignition_epoch - lease.time() > IGNITION_TOLERANCE {
            let dt = (schedule.ignition_epoch - lease.time()).min(step);
            lease.wait(dt);
            let burn_vector = lease.burn_vector(id);
            lease.steer(Orientation::Vector(burn_vector));
        }
        lease.wait_until(schedule.ignition_epoch);

        let mut completion = BurnCompletion::new();
        completion.arm(lease.burn_vector(id));
        let ignition_time = lease.time();
        lease.set_throttle(1.0);
        self.phase = BurnPhase::Burning;
        info!(t = ignition_time, "ignition");

        let mut stages_used = 0;
        loop {
            lease.wait(step);
            if stager.update(&mut *lease) {
                stages_used += 1;
            }
            if lease.available_thrust() <= 0.0 && !lease.has_next_stage() {
                return Err(GuidanceError::ThrustUnavailable);
            }

            let remaining = lease.burn_vector(id);
            if completion.is_complete(&remaining) {
                break;
            }
            lease.steer(Orientation::Vector(remaining));
        }

        let cutoff_time = lease.time();
        let residual_dv = lease.node_delta_v(id);
        drop(lease);
        drop(node);

        Ok(BurnReport {
            schedule,
            ignition_time,
            cutoff_time,
            stages_used,
            residual_dv,
        })
    }
}

impl Default for ManeuverExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}
