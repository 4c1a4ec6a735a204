use std::f64::consts::PI;

use nalgebra::Vector3;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::maneuver::ManeuverPlan;
use crate::orbital::{maneuver_to_inertial, rk4_step, KeplerianElements, OrbitSummary, OrbitalState, ThrustInput};
use crate::physics::body::presets as bodies;
use crate::physics::Body;
use crate::vehicle::{presets as crafts, Craft, Engine};
use crate::vessel::{
    Actuators, Clock, Ephemeris, FlightPlan, NodeId, OrbitPatch, Orientation, Telemetry, Tracked,
};
use super::event::{EventKind, EventLog};
use super::target::SimTarget;
use super::terrain::Terrain;

/// Coasting arcs on unbound trajectories are integrated with this step, s.
const COAST_STEP: f64 = 1.0;

struct SimNode {
    id: NodeId,
    plan: ManeuverPlan,
    /// Inertial delta-v at the node epoch.
    delta_v: Vector3<f64>,
    /// Thrust delta-v already accumulated when the node was registered.
    applied_at_registration: Vector3<f64>,
    /// Orbit right after the node, true anomaly at the node epoch.
    after: KeplerianElements,
}

/// A point-mass vessel around a spherical body, driven through the same
/// traits as a real one.
///
/// Gravity comes from the reference body only. Thrust acts along the current
/// facing, which snaps to the commanded orientation. Once on the ground the
/// vessel stays there.
pub struct SimVessel {
    time: f64,
    body: Body,
    terrain: Terrain,
    target: Option<SimTarget>,
    craft: Craft,

    position: Vector3<f64>,
    velocity: Vector3<f64>,
    throttle: f64,
    facing: Vector3<f64>,
    steering: Option<Orientation>,
    gear_deployed: bool,
    landed: bool,
    touchdown_speed: Option<f64>,
    /// Sum of thrust accelerations integrated over time.
    applied_dv: Vector3<f64>,

    nodes: Vec<SimNode>,
    next_node: u64,
    log: EventLog,

    substep: f64,
    ground_clearance: f64,
    encounter_samples: usize,
}

impl SimVessel {
    /// Place `craft` at a body-centred state. The first stage is ignited.
    pub fn new(body: Body, mut craft: Craft, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        if let Some(first) = craft.stages.first_mut() {
            first.engines.iter_mut().for_each(|e| e.ignited = true);
        }
        let facing = if velocity.norm() > 0.0 { velocity.normalize() } else { position.normalize() };
        Self {
            time: 0.0,
            body,
            terrain: Terrain::default(),
            target: None,
            craft,
            position,
            velocity,
            throttle: 0.0,
            facing,
            steering: None,
            gear_deployed: false,
            landed: false,
            touchdown_speed: None,
            applied_dv: Vector3::zeros(),
            nodes: Vec::new(),
            next_node: 0,
            log: EventLog::default(),
            substep: 0.05,
            ground_clearance: 5.0,
            encounter_samples: 256,
        }
    }

    pub fn in_orbit(body: Body, craft: Craft, orbit: &KeplerianElements) -> Self {
        let (position, velocity) = orbit.to_state_vector(body.mu());
        Self::new(body, craft, position, velocity)
    }

    /// The orbiter in an equatorial Kerbin orbit, starting at periapsis on
    /// the +x axis. Altitudes in metres.
    pub fn kerbin_orbit(periapsis: f64, apoapsis: f64) -> Self {
        Self::kerbin_orbit_with(crafts::orbiter(), periapsis, apoapsis)
    }

    pub fn kerbin_orbit_with(craft: Craft, periapsis: f64, apoapsis: f64) -> Self {
        let body = bodies::kerbin();
        let rp = body.radius + periapsis.min(apoapsis);
        let ra = body.radius + periapsis.max(apoapsis);
        let orbit = KeplerianElements {
            sma: 0.5 * (rp + ra),
            ecc: (ra - rp) / (ra + rp),
            inc: 0.0,
            raan: 0.0,
            argp: 0.0,
            true_anom: 0.0,
        };
        Self::in_orbit(body, craft, &orbit)
    }

    /// The lander falling straight down at `vertical_speed` from `altitude`
    /// above the Mun's mean radius, over the +x axis.
    pub fn mun_descent(altitude: f64, vertical_speed: f64) -> Self {
        let body = bodies::mun();
        let up = Vector3::x();
        let position = up * (body.radius + altitude);
        let mut vessel = Self::new(body, crafts::lander(), position, up * vertical_speed);
        vessel.facing = up;
        vessel
    }

    /// Select the Mun, on a circular 12 000 km orbit, directly opposite the
    /// vessel as seen from Kerbin.
    pub fn with_mun_target(self) -> Self {
        let phase = self.position.y.atan2(self.position.x) + PI;
        let orbit = KeplerianElements::circular(12_000_000.0, 0.0, phase);
        let time = self.time;
        self.with_target(SimTarget::new(bodies::mun(), orbit, time))
    }

    pub fn with_target(mut self, target: SimTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_terrain(mut self, terrain: Terrain) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn with_encounter_samples(mut self, samples: usize) -> Self {
        self.encounter_samples = samples.max(1);
        self
    }

    // -- Inspection ---------------------------------------------------------

    /// Last commanded throttle, unsaturated.
    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn steering(&self) -> Option<Orientation> {
        self.steering
    }

    pub fn facing(&self) -> Vector3<f64> {
        self.facing
    }

    pub fn gear_deployed(&self) -> bool {
        self.gear_deployed
    }

    pub fn is_landed(&self) -> bool {
        self.landed
    }

    /// Speed at ground contact, m/s.
    pub fn touchdown_speed(&self) -> Option<f64> {
        self.touchdown_speed
    }

    pub fn craft(&self) -> &Craft {
        &self.craft
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    pub fn nodes_added(&self) -> usize {
        self.log.count(|k| matches!(k, EventKind::NodeAdded(_)))
    }

    pub fn nodes_removed(&self) -> usize {
        self.log.count(|k| matches!(k, EventKind::NodeRemoved(_)))
    }

    pub fn orphan_removals(&self) -> usize {
        self.log.count(|k| matches!(k, EventKind::OrphanRemoval(_)))
    }

    pub fn elements(&self) -> KeplerianElements {
        KeplerianElements::from_state_vector(&self.position, &self.velocity, self.body.mu())
    }

    // -- Propagation --------------------------------------------------------

    /// Unpowered state `dt` seconds after (`pos`, `vel`).
    fn coast(&self, pos: &Vector3<f64>, vel: &Vector3<f64>, dt: f64) -> (Vector3<f64>, Vector3<f64>) {
        let mu = self.body.mu();
        let orbit = KeplerianElements::from_state_vector(pos, vel, mu);
        if orbit.is_bound() {
            return orbit.propagate(dt, mu).to_state_vector(mu);
        }

        let steps = (dt.abs() / COAST_STEP).ceil().max(1.0);
        let h = dt / steps;
        let mut state = OrbitalState { time: 0.0, pos: *pos, vel: *vel, mass: 1.0 };
        for _ in 0..steps as usize {
            state = rk4_step(&state, h, mu, &ThrustInput::coast());
        }
        (state.pos, state.vel)
    }

    /// Predicted state at `t`, applying every registered node before it.
    fn trajectory_at(&self, t: f64) -> (Vector3<f64>, Vector3<f64>) {
        let mu = self.body.mu();
        let mut upcoming: Vec<&SimNode> = self
            .nodes
            .iter()
            .filter(|n| n.plan.epoch > self.time && n.plan.epoch <= t)
            .collect();
        upcoming.sort_by(|a, b| a.plan.epoch.total_cmp(&b.plan.epoch));

        match upcoming.last() {
            Some(node) if node.after.is_bound() => {
                node.after.propagate(t - node.plan.epoch, mu).to_state_vector(mu)
            }
            Some(node) => {
                let (pos, vel) = node.after.to_state_vector(mu);
                self.coast(&pos, &vel, t - node.plan.epoch)
            }
            None => self.coast(&self.position, &self.velocity, t - self.time),
        }
    }

    fn node(&self, id: NodeId) -> Option<&SimNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn active_engines(&self) -> &[Engine] {
        self.craft.stages.first().map(|s| s.engines.as_slice()).unwrap_or(&[])
    }

    fn orientation_vector(&self, orientation: Orientation) -> Option<Vector3<f64>> {
        let direction = match orientation {
            Orientation::Vector(v) => v,
            Orientation::Prograde => self.velocity,
            Orientation::Retrograde | Orientation::SurfaceRetrograde => -self.velocity,
        };
        (direction.norm() > 1e-9).then(|| direction.normalize())
    }

    fn update_facing(&mut self) {
        let target = self.steering.and_then(|o| self.orientation_vector(o));
        if let Some(target) = target {
            self.facing = target;
        }
    }

    /// Integrate one sub-step of powered or coasting flight.
    fn integrate(&mut self, dt: f64) {
        self.update_facing();
        let mu = self.body.mu();
        let mass = self.craft.total_mass();

        let throttle = self.throttle.clamp(0.0, 1.0);
        let producing: Vec<&Engine> = self.active_engines().iter().filter(|e| e.is_producing()).collect();
        let thrust: f64 = producing.iter().map(|e| e.thrust).sum::<f64>() * throttle;
        let mass_flow: f64 = producing.iter().map(|e| e.mass_flow()).sum::<f64>() * throttle;

        let propellant = self.craft.stages.first().map(|s| s.propellant_mass).unwrap_or(0.0);
        let burn = if thrust > 0.0 && mass_flow > 0.0 { dt.min(propellant / mass_flow) } else { 0.0 };

        let mut state = OrbitalState { time: self.time, pos: self.position, vel: self.velocity, mass };
        if burn > 0.0 {
            let input = ThrustInput { force: self.facing * thrust, mass_flow };
            state = rk4_step(&state, burn, mu, &input);
            let exhaust_velocity = thrust / mass_flow;
            self.applied_dv += self.facing * exhaust_velocity * (mass / state.mass).ln();
            if let Some(stage) = self.craft.stages.first_mut() {
                stage.propellant_mass = if burn < dt {
                    0.0
                } else {
                    (stage.propellant_mass - mass_flow * burn).max(0.0)
                };
            }
        }
        if dt - burn > 0.0 {
            state = rk4_step(&state, dt - burn, mu, &ThrustInput::coast());
        }
        self.position = state.pos;
        self.velocity = state.vel;
        self.time += dt;

        self.check_flameout();
        self.check_ground();
    }

    fn check_flameout(&mut self) {
        let time = self.time;
        let Some(stage) = self.craft.stages.first_mut() else {
            return;
        };
        if stage.propellant_mass > 0.0 || stage.engines.iter().all(|e| e.flameout || !e.ignited) {
            return;
        }
        for engine in stage.engines.iter_mut().filter(|e| e.ignited) {
            engine.flameout = true;
        }
        info!(stage = %stage.name, t = time, "flameout");
        let kind = EventKind::Flameout { stage: stage.name.clone() };
        self.log.push(time, kind);
    }

    fn check_ground(&mut self) {
        let height = self.altitude() - self.terrain_height(&self.position);
        if height > self.ground_clearance || self.vertical_speed() > 0.0 {
            return;
        }
        let speed = self.velocity.norm();
        let up = self.position.normalize();
        let surface = self.body.radius + self.terrain_height(&self.position);
        self.position = up * (surface + self.ground_clearance);
        self.velocity = Vector3::zeros();
        self.landed = true;
        self.touchdown_speed = Some(speed);
        info!(speed, t = self.time, "touchdown");
        self.log.push(self.time, EventKind::Touchdown { speed });
    }
}

impl Clock for SimVessel {
    fn time(&self) -> f64 {
        self.time
    }

    fn wait(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }
        if self.landed {
            self.update_facing();
            self.time += dt;
            return;
        }
        let end = self.time + dt;
        while end - self.time > 1e-9 && !self.landed {
            let h = self.substep.min(end - self.time);
            self.integrate(h);
        }
        // Sub-nanosecond remainders are not integrated but still elapse.
        self.time = end;
    }
}

impl Telemetry for SimVessel {
    fn mass(&self) -> f64 {
        self.craft.total_mass()
    }

    fn available_thrust(&self) -> f64 {
        self.active_engines().iter().filter(|e| e.is_producing()).map(|e| e.thrust).sum()
    }

    fn engines(&self) -> Vec<Engine> {
        self.active_engines().to_vec()
    }

    fn has_next_stage(&self) -> bool {
        self.craft.stages.len() > 1
    }

    fn position(&self) -> Vector3<f64> {
        self.position
    }

    fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    fn altitude(&self) -> f64 {
        self.position.norm() - self.body.radius
    }

    fn vertical_speed(&self) -> f64 {
        self.velocity.dot(&self.position.normalize())
    }

    fn orbit(&self) -> Result<OrbitSummary> {
        self.elements().summary(self.body.mu(), self.body.radius)
    }
}

impl Ephemeris for SimVessel {
    fn body(&self) -> &Body {
        &self.body
    }

    fn target(&self) -> Option<&Body> {
        self.target.as_ref().map(|t| &t.body)
    }

    fn position_at(&self, tracked: Tracked, t: f64) -> Option<Vector3<f64>> {
        match tracked {
            Tracked::Vessel => Some(self.trajectory_at(t).0),
            Tracked::Target => self.target.as_ref().map(|target| target.position_at(t, self.body.mu())),
        }
    }

    fn terrain_height(&self, position: &Vector3<f64>) -> f64 {
        self.terrain.height(self.body.radius, position)
    }
}

impl FlightPlan for SimVessel {
    fn add_node(&mut self, plan: &ManeuverPlan) -> NodeId {
        let (pos, vel) = self.trajectory_at(plan.epoch);
        let delta_v = maneuver_to_inertial(&pos, &vel, plan.radial, plan.normal, plan.prograde);
        let after = KeplerianElements::from_state_vector(&pos, &(vel + delta_v), self.body.mu());

        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.push(SimNode {
            id,
            plan: *plan,
            delta_v,
            applied_at_registration: self.applied_dv,
            after,
        });
        self.log.push(self.time, EventKind::NodeAdded(id));
        debug!(?id, epoch = plan.epoch, dv = plan.delta_v(), "node added");
        id
    }

    fn remove_node(&mut self, node: NodeId) {
        match self.nodes.iter().position(|n| n.id == node) {
            Some(index) => {
                self.nodes.remove(index);
                self.log.push(self.time, EventKind::NodeRemoved(node));
                debug!(?node, "node removed");
            }
            None => {
                warn!(?node, "removing a node that is not registered");
                self.log.push(self.time, EventKind::OrphanRemoval(node));
            }
        }
    }

    fn burn_vector(&self, node: NodeId) -> Vector3<f64> {
        match self.node(node) {
            Some(n) => n.delta_v - (self.applied_dv - n.applied_at_registration),
            None => Vector3::zeros(),
        }
    }

    fn time_to_node(&self, node: NodeId) -> f64 {
        self.node(node).map(|n| n.plan.epoch - self.time).unwrap_or(f64::NEG_INFINITY)
    }

    fn node_orbit(&self, node: NodeId) -> Result<OrbitSummary> {
        match self.node(node) {
            Some(n) => n.after.summary(self.body.mu(), self.body.radius),
            None => self.orbit(),
        }
    }

    fn next_patch(&self, node: NodeId) -> Option<OrbitPatch> {
        let n = self.node(node)?;
        let target = self.target.as_ref()?;
        if !n.after.is_bound() {
            return None;
        }

        let mu = self.body.mu();
        let period = n.after.period(mu);
        let samples = self.encounter_samples;
        (0..samples).find_map(|k| {
            let dt = period * k as f64 / samples as f64;
            let (pos, vel) = n.after.propagate(dt, mu).to_state_vector(mu);
            let (target_pos, target_vel) = target.state_at(n.plan.epoch + dt, mu);
            let relative = pos - target_pos;
            (relative.norm() < target.body.soi_radius)
                .then(|| encounter_patch(&target.body, &relative, &(vel - target_vel)))
        })
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Relative two-body orbit around `body` from a state inside its sphere of
/// influence.
fn encounter_patch(body: &Body, pos: &Vector3<f64>, vel: &Vector3<f64>) -> OrbitPatch {
    let mu = body.mu();
    let h = pos.cross(vel).norm();
    let r = pos.norm();
    let e_vec = ((vel.norm_squared() - mu / r) * pos - pos.dot(vel) * vel) / mu;
    let ecc = e_vec.norm();

    let periapsis_radius = h * h / (mu * (1.0 + ecc));
    let energy = 0.5 * vel.norm_squared() - mu / r;
    let period = (ecc < 1.0 && energy < 0.0).then(|| {
        let sma = -mu / (2.0 * energy);
        2.0 * PI * (sma.powi(3) / mu).sqrt()
    });
    OrbitPatch { periapsis: periapsis_radius - body.radius, period }
}

impl Actuators for SimVessel {
    fn set_throttle(&mut self, throttle: f64) {
        self.throttle = throttle;
    }

    fn steer(&mut self, orientation: Orientation) {
        self.steering = Some(orientation);
        self.update_facing();
    }

    fn release_steering(&mut self) {
        self.steering = None;
    }

    fn stage(&mut self) {
        if self.craft.stages.is_empty() {
            warn!("no stage left to activate");
            return;
        }
        let dropped = self.craft.stages.remove(0);
        if let Some(next) = self.craft.stages.first_mut() {
            next.engines.iter_mut().for_each(|e| e.ignited = true);
        }
        info!(dropped = %dropped.name, t = self.time, "staged");
        self.log.push(self.time, EventKind::Staging { dropped: dropped.name });
    }

    fn deploy_gear(&mut self) {
        if !self.gear_deployed {
            self.gear_deployed = true;
            self.log.push(self.time, EventKind::GearDeployed);
        }
    }
}
