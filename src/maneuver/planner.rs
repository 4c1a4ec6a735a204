use std::f64::consts::PI;

use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::error::{GuidanceError, Result};
use crate::orbital::hohmann;
use crate::search::{minimize, Objective, Optimum, PatternSearch, StalenessGuard, Timed, STALE_SCORE};
use crate::vessel::{Ephemeris, NodeGuard, Tracked, Vessel};
use super::ManeuverPlan;

/// Which apsis a circularization burn is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Apsis {
    Apoapsis,
    Periapsis,
    /// Whichever comes first.
    #[default]
    Next,
}

/// A refined transfer plan together with how much the refinement gained.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub plan: ManeuverPlan,
    /// Score of the Hohmann starting guess.
    pub initial_score: f64,
    pub score: f64,
    pub evaluations: usize,
}

/// Builds scoring functions over candidate maneuvers and searches them.
///
/// Every candidate is registered as a node only while it is being scored, so
/// the flight plan is back to its original state when a planning call returns.
#[derive(Debug, Clone)]
pub struct ManeuverPlanner {
    config: SearchConfig,
    search: PatternSearch,
}

impl ManeuverPlanner {
    pub fn new(config: SearchConfig) -> Self {
        let search = PatternSearch::from_config(&config);
        Self { config, search }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Prograde-only burn at the chosen apsis that minimizes the eccentricity
    /// of the resulting orbit.
    pub fn circularize<V>(&self, vessel: &mut V, apsis: Apsis) -> Result<ManeuverPlan>
    where
        V: Vessel + ?Sized,
    {
        let orbit = vessel.orbit()?;
        let lead = match apsis {
            Apsis::Apoapsis => orbit.time_to_apoapsis,
            Apsis::Periapsis => orbit.time_to_periapsis,
            Apsis::Next => orbit.time_to_apoapsis.min(orbit.time_to_periapsis),
        };
        let epoch = vessel.time() + lead;

        let mut eccentricity = |params: &[f64]| {
            let plan = ManeuverPlan::new(epoch, 0.0, 0.0, params[0]);
            let node = NodeGuard::register(&mut *vessel, &plan);
            match node.node_orbit(node.id()) {
                Ok(after) => after.eccentricity,
                Err(GuidanceError::EscapeTrajectory { eccentricity }) => eccentricity,
                Err(_) => STALE_SCORE,
            }
        };
        let best = self.search.optimize(&[0.0], &mut eccentricity);

        info!(
            epoch,
            prograde = best.params[0],
            eccentricity = best.score,
            evaluations = best.evaluations,
            "circularization planned"
        );
        Ok(ManeuverPlan::new(epoch, 0.0, 0.0, best.params[0]))
    }

    /// Epoch within the next orbit at which the vessel and the target line up
    /// as seen from the reference body.
    pub fn transfer_window<V>(&self, vessel: &V) -> Result<f64>
    where
        V: Vessel + ?Sized,
    {
        if vessel.target().is_none() {
            return Err(GuidanceError::NoTarget);
        }
        let orbit = vessel.orbit()?;
        let left = vessel.time() + self.config.staleness_margin;
        let right = left + orbit.period;

        let epoch = minimize(
            |t| alignment_angle(vessel, t).unwrap_or(PI),
            left,
            right,
            self.config.time_tolerance,
        );
        debug!(epoch, left, right, "transfer window");
        Ok(epoch)
    }

    /// Prograde delta-v of a Hohmann transfer from the vessel's radius at
    /// `epoch` to the target's.
    pub fn transfer_guess<V>(&self, vessel: &V, epoch: f64) -> Result<ManeuverPlan>
    where
        V: Vessel + ?Sized,
    {
        let target = vessel.position_at(Tracked::Target, epoch).ok_or(GuidanceError::NoTarget)?;
        let here = vessel
            .position_at(Tracked::Vessel, epoch)
            .unwrap_or_else(|| vessel.position());

        let transfer = hohmann(here.norm(), target.norm(), vessel.body().mu());
        Ok(ManeuverPlan::new(epoch, 0.0, 0.0, transfer.dv1))
    }

    /// Four-dimensional pattern search over `[epoch, radial, normal, prograde]`
    /// from `initial`, scored by [`InterceptObjective`] behind a staleness guard.
    pub fn refine_transfer<V>(&self, vessel: &mut V, initial: &ManeuverPlan) -> Result<TransferPlan>
    where
        V: Vessel + ?Sized,
    {
        if vessel.target().is_none() {
            return Err(GuidanceError::NoTarget);
        }
        let intercept = InterceptObjective::new(vessel, self.config.time_tolerance);
        let mut objective = StalenessGuard::new(intercept, self.config.staleness_margin);

        let start = initial.to_params();
        let initial_score = objective.score(&start);
        let Optimum { params, score, evaluations } = self.search.optimize(&start, &mut objective);

        let plan = ManeuverPlan::from_params(&params);
        info!(
            epoch = plan.epoch,
            dv = plan.delta_v(),
            initial_score,
            score,
            evaluations,
            "transfer refined"
        );
        Ok(TransferPlan { plan, initial_score, score, evaluations: evaluations + 1 })
    }

    /// Window search, Hohmann seed and refinement in one call.
    pub fn plan_transfer<V>(&self, vessel: &mut V) -> Result<TransferPlan>
    where
        V: Vessel + ?Sized,
    {
        let epoch = self.transfer_window(&*vessel)?;
        let guess = self.transfer_guess(&*vessel, epoch)?;
        self.refine_transfer(vessel, &guess)
    }
}

impl Default for ManeuverPlanner {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// Angle between the vessel's and the target's predicted positions at `t`,
/// seen from the reference body, rad. `None` without a target.
pub fn alignment_angle<E>(ephemeris: &E, t: f64) -> Option<f64>
where
    E: Ephemeris + ?Sized,
{
    let vessel = ephemeris.position_at(Tracked::Vessel, t)?;
    let target = ephemeris.position_at(Tracked::Target, t)?;
    Some(vessel.angle(&target))
}

/// Scores a candidate transfer by how close it brings the vessel to the target.
///
/// If the node produces an encounter, the score is the periapsis of the
/// encounter. Otherwise it is the closest vessel-target distance found by a
/// ternary search within an eighth of an orbit either side of the post-node
/// apoapsis. The two branches are not in the same units of closeness; a
/// candidate that just reaches an encounter can score worse than a near miss.
/// Unbound post-node orbits with no encounter score [`STALE_SCORE`].
pub struct InterceptObjective<'a, V: Vessel + ?Sized> {
    vessel: &'a mut V,
    tolerance: f64,
}

impl<'a, V: Vessel + ?Sized> InterceptObjective<'a, V> {
    pub fn new(vessel: &'a mut V, tolerance: f64) -> Self {
        Self { vessel, tolerance }
    }
}

impl<V: Vessel + ?Sized> Objective for InterceptObjective<'_, V> {
    fn score(&mut self, params: &[f64]) -> f64 {
        let plan = ManeuverPlan::from_params(params);
        let node = NodeGuard::register(&mut *self.vessel, &plan);

        if let Some(patch) = node.next_patch(node.id()) {
            return patch.periapsis;
        }

        let orbit = match node.node_orbit(node.id()) {
            Ok(orbit) => orbit,
            Err(_) => return STALE_SCORE,
        };
        let apoapsis_time = plan.epoch + orbit.time_to_apoapsis;
        let half_width = orbit.period / 8.0;

        let separation = |t: f64| {
            match (
                node.position_at(Tracked::Vessel, t),
                node.position_at(Tracked::Target, t),
            ) {
                (Some(v), Some(target)) => (v - target).norm(),
                _ => STALE_SCORE,
            }
        };
        let closest = minimize(
            separation,
            apoapsis_time - half_width,
            apoapsis_time + half_width,
            self.tolerance,
        );
        separation(closest)
    }
}

impl<V: Vessel + ?Sized> Timed for InterceptObjective<'_, V> {
    fn now(&self) -> f64 {
        self.vessel.time()
    }
}
