use tracing::info;

use crate::config::ExecutorConfig;
use super::{Actuators, Clock, Telemetry};

/// Thrust history used to detect burnout and advance to the next stage.
///
/// Owned by the mission sequencer and passed into every burn, so staging
/// decisions carry over between maneuvers.
#[derive(Debug, Clone)]
pub struct AutoStageState {
    last_thrust: Option<f64>,
    thrust_drop: f64,
    settle: f64,
}

impl AutoStageState {
    pub fn new(thrust_drop: f64, settle: f64) -> Self {
        Self { last_thrust: None, thrust_drop, settle }
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(config.stage_thrust_drop, config.stage_settle)
    }

    /// Thrust seen after the last staging event, N.
    pub fn last_thrust(&self) -> Option<f64> {
        self.last_thrust
    }

    /// Stage if available thrust has dropped (or vanished) since last seen.
    ///
    /// Returns `true` when a stage was activated. Waits `settle` seconds after
    /// staging so the new engines are counted.
    pub fn update<V>(&mut self, vessel: &mut V) -> bool
    where
        V: Clock + Telemetry + Actuators + ?Sized,
    {
        let thrust = vessel.available_thrust();
        let last = *self.last_thrust.get_or_insert(thrust);

        let flamed_out = thrust < last - self.thrust_drop || thrust <= 0.0;
        if flamed_out && vessel.has_next_stage() {
            info!(thrust, last, t = vessel.time(), "thrust dropped, staging");
            vessel.stage();
            vessel.wait(self.settle);
            self.last_thrust = Some(vessel.available_thrust());
            return true;
        }

        if thrust > last {
            self.last_thrust = Some(thrust);
        }
        false
    }
}

impl Default for AutoStageState {
    fn default() -> Self {
        Self::from_config(&ExecutorConfig::default())
    }
}
