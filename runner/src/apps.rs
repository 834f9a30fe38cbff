//! Built-in applications.

use adhoc_simulator::{Application, Communication, NodeId, Tick};
use bytes::Bytes;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Node 0 greets its neighbors at step 1. Every node logs what it receives, when it
/// crashes, and when the simulation ends.
#[derive(Default)]
pub struct Hello {
    node: NodeId,
    received: Vec<(NodeId, String)>,
    crashed: Option<i64>,
}

impl Hello {
    pub const GREETING: &'static str = "Hello World!";

    /// Messages received so far, with their senders.
    pub fn received(&self) -> &[(NodeId, String)] {
        &self.received
    }

    /// Step at which the node crashed, if it did.
    pub fn crashed(&self) -> Option<i64> {
        self.crashed
    }
}

impl Application for Hello {
    type Message = String;
    type Shared = ();

    fn initialize(&mut self, node: NodeId, _: &mut ()) {
        self.node = node;
        info!(node, "initialized");
    }

    fn main(
        &mut self,
        now: Tick,
        communication: &mut Communication<'_, String>,
        _: &[NodeId],
        _: &mut (),
    ) {
        if self.node == 0 && now.step == 1 {
            communication.send(&Self::GREETING.to_string());
        }
        while let Some((sender, message)) = communication.receive() {
            info!(node = self.node, sender, payload = %message, "received message");
            self.received.push((sender, message));
        }
    }

    fn failure(&mut self, now: Tick, _: &mut ()) {
        info!(node = self.node, step = now.step, time = now.time, "crashed");
        self.crashed = Some(now.step);
    }

    fn finalize(&mut self, _: &mut ()) {
        info!(
            node = self.node,
            received = self.received.len(),
            crashed = ?self.crashed,
            "finalized"
        );
    }
}

/// Outcome of a [Flood], shared by all nodes.
#[derive(Debug, Default)]
pub struct FloodReport {
    /// Step at which every reached node first heard the message.
    pub reached: BTreeMap<NodeId, i64>,
}

/// Node 0 originates a message at step 1 and every node relays it the first time it hears
/// it.
#[derive(Default)]
pub struct Flood {
    node: NodeId,
    heard: Option<i64>,
}

impl Flood {
    pub const PAYLOAD: Bytes = Bytes::from_static(b"flood");
}

impl Application for Flood {
    type Message = Bytes;
    type Shared = FloodReport;

    fn initialize(&mut self, node: NodeId, _: &mut FloodReport) {
        self.node = node;
    }

    fn main(
        &mut self,
        now: Tick,
        communication: &mut Communication<'_, Bytes>,
        neighbors: &[NodeId],
        _: &mut FloodReport,
    ) {
        if self.node == 0 && now.step == 1 && self.heard.is_none() {
            self.heard = Some(now.step);
            communication.send(&Self::PAYLOAD);
        }
        while let Some((sender, message)) = communication.receive() {
            if self.heard.is_some() {
                continue;
            }
            debug!(node = self.node, sender, ?neighbors, "relaying message");
            self.heard = Some(now.step);
            communication.send(&message);
        }
    }

    fn failure(&mut self, now: Tick, _: &mut FloodReport) {
        debug!(node = self.node, step = now.step, heard = ?self.heard, "crashed");
    }

    fn finalize(&mut self, report: &mut FloodReport) {
        if let Some(step) = self.heard {
            report.reached.insert(self.node, step);
        }
    }
}
