//! Outgoing side of a node's channel.

use super::packet::{Delivery, Packet, Targets};
use crate::{metrics::Metrics, Clock, NodeId, PacketLoss, Payload};
use rand::{rngs::StdRng, Rng};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, trace, warn};

/// Serializes the messages of a single node into timed packets.
///
/// A node transmits one packet at a time: every packet starts no earlier than the end of
/// the previous one (and no earlier than the current time), so the queue of in-flight
/// packets is ordered by window end.
pub struct Output<M> {
    node: NodeId,
    max_transmission_time: f64,
    loss: Box<dyn PacketLoss>,
    rng: StdRng,
    metrics: Metrics,

    next_packet: u64,
    next_transmission_time: f64,
    packets: VecDeque<Packet<M>>,
}

impl<M: Payload> Output<M> {
    pub(crate) fn new(
        node: NodeId,
        max_transmission_time: f64,
        loss: Box<dyn PacketLoss>,
        rng: StdRng,
        metrics: Metrics,
    ) -> Self {
        Self {
            node,
            max_transmission_time,
            loss,
            rng,
            metrics,
            next_packet: 0,
            next_transmission_time: -1.0,
            packets: VecDeque::new(),
        }
    }

    /// Queue `payload` for transmission to the sender's neighbors.
    ///
    /// Returns the identifier of the new packet or `None` if the payload was empty (and
    /// discarded).
    pub fn send(&mut self, clock: &Clock, payload: M, neighbors: &[NodeId]) -> Option<u64> {
        if payload.is_empty() {
            warn!(node = self.node, "discarding empty message");
            self.metrics.empty_messages.inc();
            return None;
        }

        // Draw from (0, max]
        let duration = loop {
            let duration = self.rng.gen_range(0.0..=self.max_transmission_time);
            if duration > 0.0 {
                break duration;
            }
        };
        let start = self.next_transmission_time.max(clock.time());
        let id = self.next_packet;
        self.next_packet += 1;
        let targets = self.resolve(clock, id, start, neighbors);
        trace!(
            node = self.node,
            packet = id,
            start,
            end = start + duration,
            "queued packet"
        );
        self.packets.push_back(Packet {
            id,
            sender: self.node,
            window_start: start,
            window_end: start + duration,
            payload,
            targets,
        });
        self.next_transmission_time = start + duration;
        self.metrics.packets_sent.inc();
        Some(id)
    }

    /// Resolve the receivers of a packet starting at `start`.
    ///
    /// Receivers are only known once the transmission begins within the upcoming tick.
    fn resolve(&self, clock: &Clock, packet: u64, start: f64, neighbors: &[NodeId]) -> Targets {
        if start > clock.time() + clock.period() {
            return Targets::Unresolved;
        }
        debug!(node = self.node, packet, "transmitting packet");
        Targets::resolve(neighbors)
    }

    /// Update in-flight packets with the neighbors of the sender at the current step.
    pub fn transmit(&mut self, clock: &Clock, neighbors: &[NodeId]) {
        let now = clock.time();
        let current: BTreeSet<NodeId> = neighbors.iter().copied().collect();
        for index in 0..self.packets.len() {
            let packet = &self.packets[index];
            if !packet.targets.is_resolved() {
                let targets = self.resolve(clock, packet.id, packet.window_start, neighbors);
                self.packets[index].targets = targets;
            }
            let packet = &mut self.packets[index];
            if packet.in_flight(now) {
                packet.targets.retain(&current);
            }
        }
    }

    /// Pop the next packet whose transmission has finished and that survived the loss model.
    ///
    /// Returns `None` once the oldest in-flight packet has not finished yet. Call repeatedly
    /// (or use [Output::drain]) to deliver every packet that finished by the current time.
    pub fn deliver(&mut self, clock: &Clock) -> Option<Delivery<M>> {
        let now = clock.time();
        loop {
            if !self.packets.front()?.finished(now) {
                return None;
            }
            let packet = self.packets.pop_front()?;
            let mut receivers = match packet.targets {
                Targets::Receivers(receivers) => receivers,
                Targets::Unreachable | Targets::Unresolved => BTreeSet::new(),
            };

            // Each receiver is subject to an independent loss decision
            let mut lost = Vec::new();
            receivers.retain(|receiver| {
                if self.loss.packet_loss() {
                    lost.push(*receiver);
                    return false;
                }
                true
            });
            if !lost.is_empty() {
                debug!(node = self.node, packet = packet.id, ?lost, "packet lost");
                self.metrics.packet_losses.inc_by(lost.len() as u64);
            }
            if receivers.is_empty() {
                debug!(
                    node = self.node,
                    packet = packet.id,
                    "no neighboring node is able to receive packet"
                );
                self.metrics.packets_dropped.inc();
                continue;
            }

            self.metrics.packets_delivered.inc();
            return Some(Delivery {
                packet: packet.id,
                sender: packet.sender,
                payload: packet.payload,
                targets: receivers,
            });
        }
    }

    /// Deliver every packet that finished by the current time, oldest first.
    pub fn drain<'a>(&'a mut self, clock: &'a Clock) -> impl Iterator<Item = Delivery<M>> + 'a {
        std::iter::from_fn(move || self.deliver(clock))
    }

    /// Packets that have not been delivered or dropped yet.
    pub fn in_flight(&self) -> impl Iterator<Item = &Packet<M>> {
        self.packets.iter()
    }

    /// Earliest time the next packet may start.
    pub fn next_transmission_time(&self) -> f64 {
        self.next_transmission_time
    }
}
