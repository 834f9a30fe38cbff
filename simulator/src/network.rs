//! The simulated mobile ad hoc network.
//!
//! Every call to [Network::step] advances the simulation by one step in a fixed order:
//!
//! 1. _Failure_: the failure model marks newly crashed nodes, whose applications are notified.
//! 2. _Move_: every node (crashed or not) moves according to the mobility model.
//! 3. _Neighborhood_: neighbors are recomputed by the propagation model and crashed nodes are
//!    removed from every other node's neighbors.
//! 4. _Communication_: every channel transmits with the new neighbors, then every finished
//!    packet is delivered to its receivers.
//! 5. _Application_: every node that has not crashed runs its application.
//!
//! The clock ticks after the last phase, so the reading observed during a step is the one
//! produced at the end of the previous step (or at construction, for the first step).

use crate::{
    application::Communication, metrics::Metrics, Application, Channel, Clock, Coordinates, Error,
    Failure, Mobility, NodeId, PacketLoss, Propagation, Speed,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, debug_span, info};

/// Per-node state owned by the network.
struct Node<A: Application> {
    speed: Box<dyn Speed>,
    channel: Channel<A::Message>,
    application: A,
}

/// Collects the collaborators of a [Network].
///
/// Every collaborator is required: [Builder::build] fails if one is missing.
pub struct Builder<A: Application> {
    clock: Clock,
    max_transmission_time: f64,
    shared: A::Shared,
    seed: u64,
    metrics: Metrics,

    coordinates: Option<Vec<Coordinates>>,
    speeds: Option<Vec<Box<dyn Speed>>>,
    packet_loss: Option<Vec<Box<dyn PacketLoss>>>,
    applications: Option<Vec<A>>,
    mobility: Option<Box<dyn Mobility>>,
    propagation: Option<Box<dyn Propagation>>,
    failure: Option<Box<dyn Failure>>,
}

impl<A: Application> Builder<A> {
    /// Seed for the transmission durations drawn by every channel.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Counters updated by the network (unregistered by default).
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Initial position of every node. The number of entries determines the number of nodes.
    pub fn with_coordinates(mut self, coordinates: Vec<Coordinates>) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Speed of every node.
    pub fn with_speeds(mut self, speeds: Vec<Box<dyn Speed>>) -> Self {
        self.speeds = Some(speeds);
        self
    }

    /// Packet loss model of every node's output channel.
    pub fn with_packet_loss(mut self, packet_loss: Vec<Box<dyn PacketLoss>>) -> Self {
        self.packet_loss = Some(packet_loss);
        self
    }

    /// Application instance of every node.
    pub fn with_applications(mut self, applications: Vec<A>) -> Self {
        self.applications = Some(applications);
        self
    }

    pub fn with_mobility(mut self, mobility: impl Mobility + 'static) -> Self {
        self.mobility = Some(Box::new(mobility));
        self
    }

    pub fn with_propagation(mut self, propagation: impl Propagation + 'static) -> Self {
        self.propagation = Some(Box::new(propagation));
        self
    }

    pub fn with_failure(mut self, failure: impl Failure + 'static) -> Self {
        self.failure = Some(Box::new(failure));
        self
    }

    /// Create the network, initialize every application, and tick the clock to step 0.
    pub fn build(self) -> Result<Network<A>, Error> {
        if self.clock.step() != -1 {
            return Err(Error::ClockStarted(self.clock.step()));
        }
        let coordinates = self
            .coordinates
            .ok_or(Error::MissingCollaborator("initial coordinates"))?;
        let speeds = self.speeds.ok_or(Error::MissingCollaborator("speed"))?;
        let packet_loss = self
            .packet_loss
            .ok_or(Error::MissingCollaborator("packet loss"))?;
        let applications = self
            .applications
            .ok_or(Error::MissingCollaborator("application"))?;
        let mobility = self.mobility.ok_or(Error::MissingCollaborator("mobility"))?;
        let mut propagation = self
            .propagation
            .ok_or(Error::MissingCollaborator("propagation"))?;
        let failure = self.failure.ok_or(Error::MissingCollaborator("failure"))?;

        // Ensure there is exactly one of everything per node
        let n = coordinates.len();
        if n == 0 {
            return Err(Error::EmptyNetwork);
        }
        for (name, given) in [
            ("speed", speeds.len()),
            ("packet loss", packet_loss.len()),
            ("application", applications.len()),
        ] {
            if given != n {
                return Err(Error::NodeCountMismatch {
                    name,
                    expected: n,
                    given,
                });
            }
        }

        // Create nodes
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut nodes = Vec::with_capacity(n);
        for (id, ((speed, loss), application)) in speeds
            .into_iter()
            .zip(packet_loss)
            .zip(applications)
            .enumerate()
        {
            let channel = Channel::new(
                id,
                self.max_transmission_time,
                loss,
                StdRng::seed_from_u64(rng.gen()),
                self.metrics.clone(),
            )?;
            nodes.push(Node {
                speed,
                channel,
                application,
            });
        }
        let neighbors = propagation.neighbors(&coordinates);
        if neighbors.len() != n {
            return Err(Error::NodeCountMismatch {
                name: "propagation",
                expected: n,
                given: neighbors.len(),
            });
        }

        let mut network = Network {
            clock: self.clock,
            mobility,
            propagation,
            failure,
            metrics: self.metrics,
            nodes,
            coordinates,
            neighbors,
            failed: vec![false; n],
            shared: self.shared,
        };
        debug!(nodes = n, "initializing applications");
        for (id, node) in network.nodes.iter_mut().enumerate() {
            node.application.initialize(id, &mut network.shared);
        }
        network.clock.tick();
        Ok(network)
    }
}

/// A population of mobile nodes running an [Application] over lossy channels.
pub struct Network<A: Application> {
    clock: Clock,
    mobility: Box<dyn Mobility>,
    propagation: Box<dyn Propagation>,
    failure: Box<dyn Failure>,
    metrics: Metrics,

    nodes: Vec<Node<A>>,
    coordinates: Vec<Coordinates>,
    neighbors: Vec<Vec<NodeId>>,
    failed: Vec<bool>,
    shared: A::Shared,
}

impl<A: Application> Network<A> {
    /// Start describing a network driven by `clock`.
    ///
    /// The clock must not have ticked yet: [Builder::build] fails with [Error::ClockStarted]
    /// otherwise.
    ///
    /// Packets take at most `max_transmission_time` simulation time units to transmit.
    pub fn builder(clock: Clock, max_transmission_time: f64, shared: A::Shared) -> Builder<A> {
        Builder {
            clock,
            max_transmission_time,
            shared,
            seed: 0,
            metrics: Metrics::default(),
            coordinates: None,
            speeds: None,
            packet_loss: None,
            applications: None,
            mobility: None,
            propagation: None,
            failure: None,
        }
    }

    /// Advance the simulation by one step.
    pub fn step(&mut self) {
        let now = self.clock.now();
        let span = debug_span!("step", step = now.step, time = now.time);
        let _guard = span.enter();

        self.fail();
        self.movement();
        self.neighborhood();
        self.communication();
        self.execute();
        self.clock.tick();
    }

    /// Advance the simulation by `steps` steps.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Let every application (including crashed ones) wrap up.
    pub fn finalize(&mut self) {
        for node in self.nodes.iter_mut() {
            node.application.finalize(&mut self.shared);
        }
    }

    fn fail(&mut self) {
        let previous = self.failed.clone();
        let crashed = self.failure.node_failure(&self.clock, &mut self.failed);
        assert!(
            previous
                .iter()
                .zip(&self.failed)
                .all(|(before, after)| !before || *after),
            "failure model revived a crashed node"
        );

        let now = self.clock.now();
        for node in crashed {
            info!(node, "node crashed");
            self.metrics.node_failures.inc();
            self.nodes[node]
                .application
                .failure(now, &mut self.shared);
        }
    }

    fn movement(&mut self) {
        for (id, node) in self.nodes.iter_mut().enumerate() {
            self.coordinates[id] = self.mobility.current_position(
                &self.clock,
                id,
                node.speed.as_mut(),
                self.coordinates[id],
            );
        }
    }

    fn neighborhood(&mut self) {
        let mut neighbors = self.propagation.neighbors(&self.coordinates);
        assert_eq!(
            neighbors.len(),
            self.nodes.len(),
            "propagation returned wrong node count"
        );

        // A crashed node cannot be communicated with (but still hears its own neighbors)
        for list in neighbors.iter_mut() {
            list.retain(|neighbor| !self.failed[*neighbor]);
        }
        self.neighbors = neighbors;
    }

    fn communication(&mut self) {
        // Every sender sees the same topology snapshot before anything is delivered
        for (id, node) in self.nodes.iter_mut().enumerate() {
            node.channel.output.transmit(&self.clock, &self.neighbors[id]);
        }
        for sender in 0..self.nodes.len() {
            let deliveries: Vec<_> = self.nodes[sender]
                .channel
                .output
                .drain(&self.clock)
                .collect();
            for delivery in deliveries {
                for receiver in &delivery.targets {
                    self.nodes[*receiver].channel.input.capture(
                        delivery.packet,
                        delivery.sender,
                        delivery.payload.clone(),
                    );
                }
            }
        }
    }

    fn execute(&mut self) {
        let now = self.clock.now();
        for (id, node) in self.nodes.iter_mut().enumerate() {
            if self.failed[id] {
                continue;
            }
            let neighbors = &self.neighbors[id];
            let mut communication = Communication::new(id, &self.clock, neighbors, &mut node.channel);
            node.application
                .main(now, &mut communication, neighbors, &mut self.shared);
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current position of every node.
    pub fn coordinates(&self) -> &[Coordinates] {
        &self.coordinates
    }

    /// Current neighbors of every node (crashed neighbors excluded).
    pub fn neighbors(&self) -> &[Vec<NodeId>] {
        &self.neighbors
    }

    /// Crash flag of every node.
    pub fn failed(&self) -> &[bool] {
        &self.failed
    }

    pub fn shared(&self) -> &A::Shared {
        &self.shared
    }

    pub fn application(&self, node: NodeId) -> &A {
        &self.nodes[node].application
    }

    pub fn channel(&self, node: NodeId) -> &Channel<A::Message> {
        &self.nodes[node].channel
    }
}
