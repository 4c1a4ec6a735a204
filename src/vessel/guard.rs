use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::maneuver::ManeuverPlan;
use super::{Actuators, FlightPlan, NodeId};

// ---------------------------------------------------------------------------
// Scoped ownership of shared vessel resources
// ---------------------------------------------------------------------------

/// A registered maneuver node, removed from the flight plan when dropped.
///
/// The guard borrows the vessel for its whole lifetime and derefs to it, so
/// no second node can be registered through the same path while it lives.
pub struct NodeGuard<'a, V: FlightPlan + ?Sized> {
    vessel: &'a mut V,
    node: NodeId,
}

impl<'a, V: FlightPlan + ?Sized> NodeGuard<'a, V> {
    pub fn register(vessel: &'a mut V, plan: &ManeuverPlan) -> Self {
        let node = vessel.add_node(plan);
        Self { vessel, node }
    }

    pub fn id(&self) -> NodeId {
        self.node
    }
}

impl<V: FlightPlan + ?Sized> Deref for NodeGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.vessel
    }
}

impl<V: FlightPlan + ?Sized> DerefMut for NodeGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut *self.vessel
    }
}

impl<V: FlightPlan + ?Sized> Drop for NodeGuard<'_, V> {
    fn drop(&mut self) {
        self.vessel.remove_node(self.node);
    }
}

/// Throttle and steering held by one component; zeroed and released on drop.
pub struct ControlLease<'a, V: Actuators + ?Sized> {
    vessel: &'a mut V,
}

impl<'a, V: Actuators + ?Sized> ControlLease<'a, V> {
    pub fn acquire(vessel: &'a mut V) -> Self {
        Self { vessel }
    }
}

impl<V: Actuators + ?Sized> Deref for ControlLease<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.vessel
    }
}

impl<V: Actuators + ?Sized> DerefMut for ControlLease<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut *self.vessel
    }
}

impl<V: Actuators + ?Sized> Drop for ControlLease<'_, V> {
    fn drop(&mut self) {
        self.vessel.set_throttle(0.0);
        self.vessel.release_steering();
        debug!("controls released");
    }
}
