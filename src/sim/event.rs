use crate::vessel::NodeId;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of events the simulator records.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    /// `remove_node` was called for a node that is not registered.
    OrphanRemoval(NodeId),
    Flameout { stage: String },
    Staging { dropped: String },
    GearDeployed,
    Touchdown { speed: f64 },
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
}

/// Append-only record of everything that happened to a simulated vessel.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn push(&mut self, time: f64, kind: EventKind) {
        self.events.push(SimEvent { time, kind });
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn count(&self, pred: impl Fn(&EventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Time of the first event matching `pred`.
    pub fn first(&self, pred: impl Fn(&EventKind) -> bool) -> Option<f64> {
        self.events.iter().find(|e| pred(&e.kind)).map(|e| e.time)
    }
}
