//! Configure and run mobile ad hoc network simulations.
//!
//! A [Simulation] assembles an [adhoc_simulator::Network] from a [config::Config]: it builds
//! the clock, places the nodes, instantiates every model from `adhoc-models` (each with its
//! own generator derived from a single master seed), and registers the network's metrics.
//!
//! # Status
//!
//! `adhoc-runner` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

use adhoc_models::{
    failure::Crash,
    mobility::{GaussMarkov, GaussMarkovConfig, NomadicCommunity, RandomDirection, RandomWaypoint},
    packet_loss::GilbertElliott,
    placement::{Grid, Uniform},
    propagation::PathLoss,
    speed, Area, Placement,
};
use adhoc_simulator::{
    metrics::Metrics, Application, Clock, Coordinates, Failure, Mobility, Network, NodeId,
    PacketLoss, Speed,
};
use prometheus_client::{encoding::text::encode, registry::Registry};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;
use tracing::info;

pub mod apps;
use apps::{Flood, FloodReport, Hello};
pub mod config;
use config::{
    AreaConfig, Config, FailureConfig, MobilityConfig, PacketLossConfig, PlacementConfig,
    PropagationConfig, SpeedConfig,
};

/// Errors that can occur when configuring or running a simulation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("simulator: {0}")]
    Simulator(#[from] adhoc_simulator::Error),
    #[error("model: {0}")]
    Model(#[from] adhoc_models::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown application: {0}")]
    UnknownApplication(String),
    #[error("metrics encoding failed")]
    Encode(#[from] std::fmt::Error),
}

/// Names of the built-in applications accepted by [simulate].
pub const APPLICATIONS: &[&str] = &["hello", "flood"];

/// A configured network ready to run.
pub struct Simulation<A: Application> {
    network: Network<A>,
    total_simulation_steps: u64,
    seed: u64,
    registry: Registry,
}

impl<A: Application> Simulation<A> {
    /// Build every collaborator described by `config` and the network running one instance of
    /// `application(node)` per node.
    pub fn new(
        config: &Config,
        shared: A::Shared,
        application: impl FnMut(NodeId) -> A,
    ) -> Result<Self, Error> {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);
        let mut fork = move || StdRng::seed_from_u64(rng.gen());
        let nodes = config.nodes_number;

        let clock = Clock::new(config.simulation_frequency)?;
        let area = match config.area {
            AreaConfig::Square { side } => Area::square(side)?,
            AreaConfig::Rectangle { width, height } => Area::rectangle(width, height)?,
        };
        let mut placement: Box<dyn Placement> = match config.placement {
            PlacementConfig::Grid => Box::new(Grid::new(area, nodes, config.transmission_range)?),
            PlacementConfig::Uniform => Box::new(Uniform::new(area, nodes, fork())?),
        };
        let coordinates = placement.placement();

        let speeds = (0..nodes)
            .map(|_| speed_model(&config.speed, fork()))
            .collect::<Result<Vec<_>, _>>()?;
        let packet_loss = (0..nodes)
            .map(|_| packet_loss_model(&config.packet_loss, fork()))
            .collect::<Result<Vec<_>, _>>()?;
        let mobility = mobility_model(&config.mobility, area, &coordinates, fork())?;
        let propagation = match config.propagation {
            PropagationConfig::PathLoss => PathLoss::new(config.transmission_range)?,
        };
        let failure = failure_model(
            &config.failure,
            nodes,
            config.total_simulation_steps,
            fork(),
        )?;

        let mut registry = Registry::with_prefix("adhoc");
        let metrics = Metrics::init(&mut registry);
        let network = Network::builder(clock, config.maximum_transmission_time, shared)
            .with_seed(fork().gen())
            .with_metrics(metrics)
            .with_coordinates(coordinates)
            .with_speeds(speeds)
            .with_packet_loss(packet_loss)
            .with_applications((0..nodes).map(application).collect())
            .with_mobility(mobility)
            .with_propagation(propagation)
            .with_failure(failure)
            .build()?;
        info!(seed, nodes, %area, "configured simulation");
        Ok(Self {
            network,
            total_simulation_steps: config.total_simulation_steps,
            seed,
            registry,
        })
    }

    /// Run every configured step and finalize all applications.
    pub fn run(&mut self) {
        info!(steps = self.total_simulation_steps, "starting simulation");
        self.network.run(self.total_simulation_steps);
        self.network.finalize();
        let crashed = self.network.failed().iter().filter(|f| **f).count();
        info!(
            step = self.network.clock().step(),
            time = self.network.clock().time(),
            crashed,
            "finished simulation"
        );
    }

    pub fn network(&self) -> &Network<A> {
        &self.network
    }

    /// Master seed every generator was derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// OpenMetrics encoding of the network's counters.
    pub fn encode(&self) -> Result<String, Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

fn speed_model(config: &SpeedConfig, rng: StdRng) -> Result<Box<dyn Speed>, Error> {
    let speed: Box<dyn Speed> = match *config {
        SpeedConfig::Constant { speed } => Box::new(speed::Constant::new(speed)?),
        SpeedConfig::Normal {
            mean,
            standard_deviation,
        } => Box::new(speed::Normal::new(mean, standard_deviation, rng)?),
        SpeedConfig::Uniform { minimum, maximum } => {
            Box::new(speed::Uniform::new(minimum, maximum, rng)?)
        }
    };
    Ok(speed)
}

fn packet_loss_model(config: &PacketLossConfig, rng: StdRng) -> Result<Box<dyn PacketLoss>, Error> {
    let PacketLossConfig::GilbertElliott { p, r, h, k } = *config;
    Ok(Box::new(GilbertElliott::new(p, r, h, k, rng)?))
}

fn mobility_model(
    config: &MobilityConfig,
    area: Area,
    initial: &[Coordinates],
    rng: StdRng,
) -> Result<Box<dyn Mobility>, Error> {
    let mobility: Box<dyn Mobility> = match *config {
        MobilityConfig::RandomWaypoint { pause_time } => {
            Box::new(RandomWaypoint::new(area, initial, pause_time, rng)?)
        }
        MobilityConfig::RandomDirection { pause_time } => {
            Box::new(RandomDirection::new(area, initial, pause_time, rng)?)
        }
        MobilityConfig::NomadicCommunity {
            pause_time,
            area_factor,
        } => Box::new(NomadicCommunity::new(
            area,
            initial,
            pause_time,
            area_factor,
            rng,
        )?),
        MobilityConfig::GaussMarkov {
            initial_speed,
            alpha,
            direction_deviation,
            direction_margin,
            direction_mean,
            recalculation_interval,
        } => {
            let config = GaussMarkovConfig {
                initial_speed,
                alpha,
                direction_deviation,
                direction_margin,
                direction_mean,
                recalculation_interval,
            };
            Box::new(GaussMarkov::new(area, initial.len(), config, rng)?)
        }
    };
    Ok(mobility)
}

fn failure_model(
    config: &FailureConfig,
    nodes: usize,
    total_simulation_steps: u64,
    rng: StdRng,
) -> Result<Box<dyn Failure>, Error> {
    let FailureConfig::Crash {
        crash_probability,
        maximum_crash_number,
        transient_steps,
    } = *config;
    Ok(Box::new(Crash::new(
        nodes,
        crash_probability,
        maximum_crash_number,
        total_simulation_steps,
        transient_steps,
        rng,
    )?))
}

/// Run the built-in application named `application` and return the encoded metrics.
pub fn simulate(application: &str, config: &Config) -> Result<String, Error> {
    match application {
        "hello" => {
            let mut simulation = Simulation::new(config, (), |_| Hello::default())?;
            simulation.run();
            simulation.encode()
        }
        "flood" => {
            let mut simulation =
                Simulation::new(config, FloodReport::default(), |_| Flood::default())?;
            simulation.run();
            let reached = simulation.network().shared().reached.len();
            info!(reached, nodes = config.nodes_number, "flood reach");
            simulation.encode()
        }
        other => Err(Error::UnknownApplication(other.to_string())),
    }
}
