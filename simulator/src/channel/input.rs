//! Incoming side of a node's channel.

use crate::{metrics::Metrics, NodeId};
use std::collections::VecDeque;
use tracing::debug;

/// FIFO mailbox of messages delivered to a node.
pub struct Input<M> {
    node: NodeId,
    metrics: Metrics,
    mailbox: VecDeque<(NodeId, M)>,
}

impl<M> Input<M> {
    pub(crate) fn new(node: NodeId, metrics: Metrics) -> Self {
        Self {
            node,
            metrics,
            mailbox: VecDeque::new(),
        }
    }

    /// Place a message delivered by `sender` in the mailbox.
    pub fn capture(&mut self, packet: u64, sender: NodeId, payload: M) {
        debug!(node = self.node, packet, sender, "captured packet");
        self.metrics.messages_captured.inc();
        self.mailbox.push_back((sender, payload));
    }

    /// Remove and return the oldest message in the mailbox.
    pub fn receive(&mut self) -> Option<(NodeId, M)> {
        self.mailbox.pop_front()
    }

    pub fn len(&self) -> usize {
        self.mailbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailbox.is_empty()
    }
}
