//! Step a mobile ad hoc network of nodes over a lossy, topology-changing wireless channel.
//!
//! A fixed population of nodes runs a user-supplied [Application] while the [Network]
//! independently drives node mobility, neighbor computation, process crashes, and the
//! transport of application messages as timed, lossy packets between neighboring nodes.
//!
//! Each call to [Network::step] performs, in order: failure injection, movement, neighbor
//! recomputation, packet transmission and delivery, and application execution. The [Clock]
//! is advanced once all phases complete.
//!
//! Concrete strategies for movement, propagation, packet loss, and crashes are supplied by
//! the caller through the [Mobility], [Propagation], [PacketLoss], [Failure], and [Speed]
//! traits.
//!
//! # Status
//!
//! `adhoc-simulator` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

use bytes::Bytes;
use thiserror::Error;

pub mod application;
pub use application::{Application, Communication};
pub mod channel;
pub use channel::Channel;
pub mod clock;
pub use clock::{Clock, Tick};
pub mod metrics;
pub mod network;
pub use network::{Builder, Network};
#[cfg(test)]
pub(crate) mod mocks;

/// Identifier of a node (also its index in every per-node collection).
pub type NodeId = usize;

/// Position of a node in the simulation area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

impl Coordinates {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Errors that can occur when setting up a simulation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid simulation frequency (must be greater than 0): {0}")]
    InvalidFrequency(u32),
    #[error("invalid maximum transmission time (must be finite and greater than 0): {0}")]
    InvalidTransmissionTime(f64),
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
    #[error("{name}: expected {expected} entries (one per node) but {given} given")]
    NodeCountMismatch {
        name: &'static str,
        expected: usize,
        given: usize,
    },
    #[error("network must contain at least one node")]
    EmptyNetwork,
    #[error("clock already ticked (step {0})")]
    ClockStarted(i64),
}

/// An application message that can be carried by a packet.
///
/// Payloads are cloned at send time, so the implementation of [Clone] must produce a value
/// the sending application cannot mutate afterwards.
pub trait Payload: Clone {
    /// Returns true if the payload carries nothing worth sending.
    ///
    /// Empty payloads are discarded by the channel before a packet is created.
    fn is_empty(&self) -> bool;
}

impl Payload for Bytes {
    fn is_empty(&self) -> bool {
        Bytes::is_empty(self)
    }
}

impl Payload for String {
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

impl Payload for &'static str {
    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl<T: Clone> Payload for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T: Payload> Payload for Option<T> {
    fn is_empty(&self) -> bool {
        self.as_ref().map_or(true, Payload::is_empty)
    }
}

/// Speed of a single node.
pub trait Speed {
    /// Current speed.
    fn current(&self) -> f64;

    /// Draw a new speed, make it the current one, and return it.
    fn next(&mut self) -> f64;

    /// Mean of the underlying distribution.
    fn mean(&self) -> f64 {
        self.current()
    }
}

/// Computes node positions at every step.
pub trait Mobility {
    /// Returns the position of `node` at the current step, given its position at the
    /// previous step.
    ///
    /// Called once per node per step (including crashed nodes).
    fn current_position(
        &mut self,
        clock: &Clock,
        node: NodeId,
        speed: &mut dyn Speed,
        previous: Coordinates,
    ) -> Coordinates;
}

impl<T: Mobility + ?Sized> Mobility for Box<T> {
    fn current_position(
        &mut self,
        clock: &Clock,
        node: NodeId,
        speed: &mut dyn Speed,
        previous: Coordinates,
    ) -> Coordinates {
        (**self).current_position(clock, node, speed, previous)
    }
}

/// Determines which nodes can hear each other.
pub trait Propagation {
    /// Returns, for every node (by index), the identifiers of its neighbors.
    fn neighbors(&mut self, coordinates: &[Coordinates]) -> Vec<Vec<NodeId>>;
}

impl<T: Propagation + ?Sized> Propagation for Box<T> {
    fn neighbors(&mut self, coordinates: &[Coordinates]) -> Vec<Vec<NodeId>> {
        (**self).neighbors(coordinates)
    }
}

/// Decides whether a single packet is lost on its way to a single receiver.
pub trait PacketLoss {
    /// Returns true if the packet is lost.
    fn packet_loss(&mut self) -> bool;
}

/// Injects process failures.
pub trait Failure {
    /// Marks newly crashed nodes in `failed` and returns their identifiers.
    ///
    /// Implementations must never clear a flag that is already set.
    fn node_failure(&mut self, clock: &Clock, failed: &mut [bool]) -> Vec<NodeId>;
}

impl<T: Failure + ?Sized> Failure for Box<T> {
    fn node_failure(&mut self, clock: &Clock, failed: &mut [bool]) -> Vec<NodeId> {
        (**self).node_failure(clock, failed)
    }
}
