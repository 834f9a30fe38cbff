//! Counters describing the traffic and failures of a simulation.

use prometheus_client::{metrics::counter::Counter, registry::Registry};

/// Shared handles to simulation counters.
///
/// Cloning a [Metrics] clones the handles, so every clone updates the same counters.
#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub packets_sent: Counter,
    pub packets_delivered: Counter,
    pub packets_dropped: Counter,
    pub packet_losses: Counter,
    pub messages_captured: Counter,
    pub empty_messages: Counter,
    pub node_failures: Counter,
}

impl Metrics {
    /// Create counters and register them with `registry`.
    pub fn init(registry: &mut Registry) -> Self {
        let metrics = Self::default();
        registry.register(
            "packets_sent",
            "Number of packets created by output channels",
            metrics.packets_sent.clone(),
        );
        registry.register(
            "packets_delivered",
            "Number of packets that reached at least one receiver",
            metrics.packets_delivered.clone(),
        );
        registry.register(
            "packets_dropped",
            "Number of packets that reached no receiver",
            metrics.packets_dropped.clone(),
        );
        registry.register(
            "packet_losses",
            "Number of (packet, receiver) pairs lost according to the packet loss model",
            metrics.packet_losses.clone(),
        );
        registry.register(
            "messages_captured",
            "Number of messages placed in input mailboxes",
            metrics.messages_captured.clone(),
        );
        registry.register(
            "empty_messages",
            "Number of empty messages discarded before transmission",
            metrics.empty_messages.clone(),
        );
        registry.register(
            "node_failures",
            "Number of nodes that crashed",
            metrics.node_failures.clone(),
        );
        metrics
    }
}
