//! Distributed applications executed by every node.

use crate::{Channel, Clock, NodeId, Payload, Tick};

/// Logic run by a single node.
///
/// Every node owns its own instance. All callbacks default to no-ops.
pub trait Application {
    /// Messages exchanged between instances.
    type Message: Payload;

    /// State visible to every instance (and to nothing else in the simulator).
    type Shared;

    /// Called once for every node before the first step.
    fn initialize(&mut self, _node: NodeId, _shared: &mut Self::Shared) {}

    /// Called at every step for every node that has not crashed.
    fn main(
        &mut self,
        _now: Tick,
        _communication: &mut Communication<'_, Self::Message>,
        _neighbors: &[NodeId],
        _shared: &mut Self::Shared,
    ) {
    }

    /// Called once, at the step the node crashes.
    fn failure(&mut self, _now: Tick, _shared: &mut Self::Shared) {}

    /// Called once for every node (crashed or not) after the last step.
    fn finalize(&mut self, _shared: &mut Self::Shared) {}
}

/// Sending and receiving surface of a node, handed to [Application::main].
pub struct Communication<'a, M> {
    node: NodeId,
    clock: &'a Clock,
    neighbors: &'a [NodeId],
    channel: &'a mut Channel<M>,
}

impl<'a, M: Payload> Communication<'a, M> {
    pub(crate) fn new(
        node: NodeId,
        clock: &'a Clock,
        neighbors: &'a [NodeId],
        channel: &'a mut Channel<M>,
    ) -> Self {
        Self {
            node,
            clock,
            neighbors,
            channel,
        }
    }

    /// Identifier of the node this surface belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Send a copy of `message` to the current neighbors.
    ///
    /// Empty messages are discarded. Returns the identifier of the packet carrying the
    /// message, if any.
    pub fn send(&mut self, message: &M) -> Option<u64> {
        self.channel
            .output
            .send(self.clock, message.clone(), self.neighbors)
    }

    /// Take the oldest received message and its sender, if any.
    ///
    /// Call repeatedly to drain every message delivered at this step.
    pub fn receive(&mut self) -> Option<(NodeId, M)> {
        self.channel.input.receive()
    }
}
