//! Boundary between the guidance engine and the vehicle it flies.
//!
//! Everything the engine knows about the world comes through these traits,
//! so the same planner, executor and descent loop run against a live vehicle
//! or against [`crate::sim::SimVessel`].

pub mod guard;
pub mod staging;

use nalgebra::Vector3;

use crate::error::Result;
use crate::maneuver::ManeuverPlan;
use crate::orbital::OrbitSummary;
use crate::physics::Body;
use crate::vehicle::Engine;

pub use guard::{ControlLease, NodeGuard};
pub use staging::AutoStageState;

/// Handle to a maneuver node registered with the flight plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Orientation target for the attitude controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Orientation {
    /// Fixed inertial direction.
    Vector(Vector3<f64>),
    Prograde,
    Retrograde,
    /// Opposite to velocity relative to the surface.
    SurfaceRetrograde,
}

/// Something whose future position the ephemeris can predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracked {
    Vessel,
    Target,
}

/// The trajectory segment following an encounter with the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPatch {
    /// Closest-approach altitude above the target's surface, m.
    pub periapsis: f64,
    /// `None` for a flyby (hyperbolic relative orbit).
    pub period: Option<f64>,
}

/// Mission time and suspension.
pub trait Clock {
    /// Current mission time, s.
    fn time(&self) -> f64;

    /// Block while the world advances by `dt` seconds.
    fn wait(&mut self, dt: f64);

    /// Block until mission time reaches `t`. Returns at once if it already has.
    fn wait_until(&mut self, t: f64) {
        let dt = t - self.time();
        if dt > 0.0 {
            self.wait(dt);
        }
    }
}

/// Live vessel state.
pub trait Telemetry {
    /// Current total mass, kg.
    fn mass(&self) -> f64;

    /// Full-throttle thrust of every ignited, fed engine, N.
    fn available_thrust(&self) -> f64;

    fn engines(&self) -> Vec<Engine>;

    /// Whether another stage can still be activated.
    fn has_next_stage(&self) -> bool;

    /// Position relative to the reference body's centre, m.
    fn position(&self) -> Vector3<f64>;

    /// Velocity relative to the reference body, m/s.
    fn velocity(&self) -> Vector3<f64>;

    /// Altitude above the reference body's mean radius, m.
    fn altitude(&self) -> f64;

    /// Radial component of velocity, m/s; negative while descending.
    fn vertical_speed(&self) -> f64;

    /// Current orbit. Fails for unbound trajectories.
    fn orbit(&self) -> Result<OrbitSummary>;
}

/// Propagation oracle.
pub trait Ephemeris {
    /// The body the vessel is orbiting or landing on.
    fn body(&self) -> &Body;

    /// The selected transfer target, if any.
    fn target(&self) -> Option<&Body>;

    /// Predicted body-centred position at mission time `t`.
    ///
    /// The vessel's prediction follows the planned trajectory, registered
    /// maneuver nodes included. `None` when `Tracked::Target` is requested
    /// with no target selected.
    fn position_at(&self, tracked: Tracked, t: f64) -> Option<Vector3<f64>>;

    /// Terrain height above mean radius beneath a body-centred position, m.
    fn terrain_height(&self, position: &Vector3<f64>) -> f64;
}

/// Registration of planned maneuvers.
pub trait FlightPlan {
    fn add_node(&mut self, plan: &ManeuverPlan) -> NodeId;

    fn remove_node(&mut self, node: NodeId);

    /// Remaining delta-v of the node as an inertial vector, m/s.
    fn burn_vector(&self, node: NodeId) -> Vector3<f64>;

    /// Remaining delta-v magnitude, m/s.
    fn node_delta_v(&self, node: NodeId) -> f64 {
        self.burn_vector(node).norm()
    }

    /// Seconds until the node epoch; negative once it has passed.
    fn time_to_node(&self, node: NodeId) -> f64;

    /// Orbit after the node. Times to apsis are measured from the node epoch.
    fn node_orbit(&self, node: NodeId) -> Result<OrbitSummary>;

    /// The encounter the node leads to, if one is predicted.
    fn next_patch(&self, node: NodeId) -> Option<OrbitPatch>;

    /// Number of nodes currently registered.
    fn node_count(&self) -> usize;
}

/// Throttle, attitude, staging and gear.
pub trait Actuators {
    /// Commanded throttle fraction. Hardware saturates outside [0, 1].
    fn set_throttle(&mut self, throttle: f64);

    fn steer(&mut self, orientation: Orientation);

    fn release_steering(&mut self);

    /// Activate the next stage.
    fn stage(&mut self);

    /// Deploy the landing gear. Deploying twice is harmless.
    fn deploy_gear(&mut self);
}

/// Everything the guidance engine needs from a vehicle.
pub trait Vessel: Clock + Telemetry + Ephemeris + FlightPlan + Actuators {}

impl<T> Vessel for T where T: Clock + Telemetry + Ephemeris + FlightPlan + Actuators + ?Sized {}
