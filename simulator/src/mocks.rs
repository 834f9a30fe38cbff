//! Scripted collaborators for tests.

use crate::{Clock, Coordinates, Failure, Mobility, NodeId, PacketLoss, Propagation, Speed};
use std::collections::{BTreeMap, VecDeque};

/// Never loses a packet.
pub struct Never;

impl PacketLoss for Never {
    fn packet_loss(&mut self) -> bool {
        false
    }
}

/// Always loses a packet.
pub struct Always;

impl PacketLoss for Always {
    fn packet_loss(&mut self) -> bool {
        true
    }
}

/// Replays a fixed sequence of decisions, then never loses.
pub struct Scripted(VecDeque<bool>);

impl Scripted {
    pub fn new(decisions: impl IntoIterator<Item = bool>) -> Self {
        Self(decisions.into_iter().collect())
    }
}

impl PacketLoss for Scripted {
    fn packet_loss(&mut self) -> bool {
        self.0.pop_front().unwrap_or(false)
    }
}

/// Fixed speed.
pub struct Still(pub f64);

impl Speed for Still {
    fn current(&self) -> f64 {
        self.0
    }

    fn next(&mut self) -> f64 {
        self.0
    }
}

/// Moves every node by a fixed offset along the x axis at every step.
pub struct Drift(pub f64);

impl Mobility for Drift {
    fn current_position(
        &mut self,
        _clock: &Clock,
        _node: NodeId,
        _speed: &mut dyn Speed,
        previous: Coordinates,
    ) -> Coordinates {
        Coordinates::new(previous.x + self.0, previous.y)
    }
}

/// Neighbors computed by a closure.
pub struct Topology<F>(pub F);

impl<F: FnMut(&[Coordinates]) -> Vec<Vec<NodeId>>> Propagation for Topology<F> {
    fn neighbors(&mut self, coordinates: &[Coordinates]) -> Vec<Vec<NodeId>> {
        (self.0)(coordinates)
    }
}

/// Every node hears every other node.
pub fn complete(coordinates: &[Coordinates]) -> Vec<Vec<NodeId>> {
    let n = coordinates.len();
    (0..n)
        .map(|node| (0..n).filter(|other| *other != node).collect())
        .collect()
}

/// Crashes the given nodes at the given steps.
#[derive(Default)]
pub struct Crashes(pub BTreeMap<i64, Vec<NodeId>>);

impl Failure for Crashes {
    fn node_failure(&mut self, clock: &Clock, failed: &mut [bool]) -> Vec<NodeId> {
        let crashed = self.0.remove(&clock.step()).unwrap_or_default();
        for node in &crashed {
            failed[*node] = true;
        }
        crashed
    }
}
