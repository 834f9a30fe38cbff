use crate::NodeId;
use std::collections::BTreeSet;

/// Receivers of an in-flight packet.
///
/// The set can only shrink once resolved: a node that leaves the sender's neighborhood during
/// the transmission window never re-enters it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Targets {
    /// Transmission has not begun yet, so receivers are not known.
    Unresolved,
    /// Nodes that can still receive the packet (never empty).
    Receivers(BTreeSet<NodeId>),
    /// No node can receive the packet.
    Unreachable,
}

impl Targets {
    /// Targets for a transmission that begins while `neighbors` are in range.
    pub fn resolve(neighbors: &[NodeId]) -> Self {
        if neighbors.is_empty() {
            return Self::Unreachable;
        }
        Self::Receivers(neighbors.iter().copied().collect())
    }

    /// Drop every receiver that is not in `neighbors`.
    ///
    /// Has no effect on unresolved or unreachable targets.
    pub fn retain(&mut self, neighbors: &BTreeSet<NodeId>) {
        let Self::Receivers(receivers) = self else {
            return;
        };
        receivers.retain(|receiver| neighbors.contains(receiver));
        if receivers.is_empty() {
            *self = Self::Unreachable;
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// A message in flight, owned by the sender's output side until delivered or dropped.
#[derive(Clone, Debug)]
pub struct Packet<M> {
    /// Unique among the packets of `sender`, increasing from 0.
    pub id: u64,
    pub sender: NodeId,
    pub window_start: f64,
    pub window_end: f64,
    pub payload: M,
    pub targets: Targets,
}

impl<M> Packet<M> {
    /// Returns true if the transmission window contains `time`.
    pub fn in_flight(&self, time: f64) -> bool {
        self.window_start <= time && time <= self.window_end
    }

    /// Returns true if the transmission has finished by `time`.
    pub fn finished(&self, time: f64) -> bool {
        self.window_end <= time
    }
}

/// A packet leaving an output side along with the nodes that receive it.
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery<M> {
    pub packet: u64,
    pub sender: NodeId,
    pub payload: M,
    /// Never empty.
    pub targets: BTreeSet<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_empty_is_unreachable() {
        assert_eq!(Targets::resolve(&[]), Targets::Unreachable);
        assert!(Targets::Unreachable.is_resolved());
        assert!(!Targets::Unresolved.is_resolved());
    }

    #[test]
    fn test_retain_shrinks() {
        let mut targets = Targets::resolve(&[3, 1, 2]);
        targets.retain(&BTreeSet::from([1, 2, 7]));
        assert_eq!(targets, Targets::Receivers(BTreeSet::from([1, 2])));

        // A receiver that comes back into range stays excluded
        targets.retain(&BTreeSet::from([2]));
        targets.retain(&BTreeSet::from([1, 2, 3]));
        assert_eq!(targets, Targets::Receivers(BTreeSet::from([2])));

        targets.retain(&BTreeSet::new());
        assert_eq!(targets, Targets::Unreachable);
        targets.retain(&BTreeSet::from([1, 2, 3]));
        assert_eq!(targets, Targets::Unreachable);
    }

    #[test]
    fn test_retain_unresolved_noop() {
        let mut targets = Targets::Unresolved;
        targets.retain(&BTreeSet::from([1]));
        assert_eq!(targets, Targets::Unresolved);
    }

    #[test]
    fn test_window() {
        let packet = Packet {
            id: 0,
            sender: 0,
            window_start: 0.25,
            window_end: 0.3,
            payload: (),
            targets: Targets::Unresolved,
        };
        assert!(!packet.in_flight(0.2));
        assert!(packet.in_flight(0.25));
        assert!(packet.in_flight(0.3));
        assert!(!packet.in_flight(0.5));
        assert!(!packet.finished(0.25));
        assert!(packet.finished(0.3));
    }
}
