use crate::{check, Area, Error};
use adhoc_simulator::{Clock, Coordinates, Mobility, NodeId, Speed};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};
use tracing::{debug, trace};

/// Configuration for [GaussMarkov].
#[derive(Clone, Debug)]
pub struct Config {
    /// Speed of every node until the first recalculation.
    pub initial_speed: f64,

    /// Memory of the process in `[0, 1]` (`0` is memoryless, `1` keeps the initial
    /// velocity forever).
    pub alpha: f64,

    /// Standard deviation of the random direction.
    pub direction_deviation: f64,

    /// Width of the band along every border (as a fraction of the area's dimensions) in
    /// which nodes are steered back toward the centre.
    pub direction_margin: f64,

    /// Mean of the random direction (in radians).
    pub direction_mean: f64,

    /// Steps between velocity recalculations (the simulation frequency if not set).
    pub recalculation_interval: Option<u64>,
}

impl Config {
    pub fn new(initial_speed: f64) -> Self {
        Self {
            initial_speed,
            alpha: 0.75,
            direction_deviation: FRAC_PI_2,
            direction_margin: 0.15,
            direction_mean: PI / 0.6,
            recalculation_interval: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Velocity {
    speed: f64,
    direction: f64,
}

/// The Gauss-Markov mobility model.
///
/// Every node keeps a speed and a direction. Every `recalculation_interval` steps both are
/// recomputed as a weighted sum of their previous value, a mean, and a random sample. The mean
/// direction points away from any border the node is close to. Nodes bounce off the borders
/// of the area and do not move at step 0.
pub struct GaussMarkov {
    area: Area,
    alpha: f64,
    memoryless: f64,
    randomness: f64,
    direction: Normal<f64>,
    direction_mean: f64,
    recalculation_interval: Option<u64>,
    margins: Edges,
    rng: StdRng,

    velocities: Vec<Velocity>,
}

/// Inner bounds of the border bands.
#[derive(Clone, Copy, Debug)]
struct Edges {
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

impl GaussMarkov {
    pub fn new(area: Area, nodes: usize, config: Config, mut rng: StdRng) -> Result<Self, Error> {
        check("initial speed", "finite", config.initial_speed, f64::is_finite)?;
        check("alpha", "in [0, 1]", config.alpha, |v| (0.0..=1.0).contains(&v))?;
        check("direction margin", "in [0, 1]", config.direction_margin, |v| {
            (0.0..=1.0).contains(&v)
        })?;
        check("direction mean", "finite", config.direction_mean, f64::is_finite)?;
        check(
            "direction deviation",
            "finite and >= 0",
            config.direction_deviation,
            |v| v.is_finite() && v >= 0.0,
        )?;
        if let Some(interval) = config.recalculation_interval {
            check("recalculation interval", "> 0", interval as f64, |v| v > 0.0)?;
        }
        let direction = Normal::new(config.direction_mean, config.direction_deviation).map_err(
            |_| Error::InvalidParameter {
                name: "direction deviation",
                expected: "finite and >= 0",
                given: config.direction_deviation,
            },
        )?;

        let velocities = (0..nodes)
            .map(|_| Velocity {
                speed: config.initial_speed,
                direction: direction.sample(&mut rng).abs(),
            })
            .collect();
        let horizontal = area.width() * config.direction_margin;
        let vertical = area.height() * config.direction_margin;
        debug!(nodes, "initialized velocities");
        Ok(Self {
            area,
            alpha: config.alpha,
            memoryless: 1.0 - config.alpha,
            randomness: (1.0 - config.alpha * config.alpha).sqrt(),
            direction,
            direction_mean: config.direction_mean,
            recalculation_interval: config.recalculation_interval,
            margins: Edges {
                left: horizontal,
                right: area.width() - horizontal,
                bottom: vertical,
                top: area.height() - vertical,
            },
            rng,
            velocities,
        })
    }

    /// Mean direction for a node at `position`: toward the centre near a border.
    fn mean_direction(&self, position: Coordinates) -> f64 {
        let Edges {
            left,
            right,
            bottom,
            top,
        } = self.margins;
        if position.y >= top {
            if position.x <= left {
                7.0 * FRAC_PI_4
            } else if position.x >= right {
                5.0 * FRAC_PI_4
            } else {
                3.0 * FRAC_PI_2
            }
        } else if position.y <= bottom {
            if position.x <= left {
                FRAC_PI_4
            } else if position.x >= right {
                3.0 * FRAC_PI_4
            } else {
                FRAC_PI_2
            }
        } else if position.x <= left {
            0.0
        } else if position.x >= right {
            PI
        } else {
            self.direction_mean
        }
    }

    fn recalculate(&mut self, node: NodeId, speed: &mut dyn Speed, position: Coordinates) {
        let random_speed = speed.next();
        let mean = self.mean_direction(position);
        let random_direction = self.direction.sample(&mut self.rng).abs();

        let velocity = &mut self.velocities[node];
        velocity.speed = (self.alpha * velocity.speed
            + self.memoryless * speed.mean()
            + self.randomness * random_speed)
            .abs();
        velocity.direction = (self.alpha * velocity.direction
            + self.memoryless * mean
            + self.randomness * random_direction)
            .rem_euclid(TAU);
        debug!(
            node,
            speed = velocity.speed,
            direction = velocity.direction,
            "recalculated velocity"
        );
    }

    /// Move by one period, reflecting off the borders.
    fn step_move(&mut self, node: NodeId, period: f64, previous: Coordinates) -> Coordinates {
        let (width, height) = (self.area.width(), self.area.height());
        let velocity = &mut self.velocities[node];

        let mut x = previous.x + velocity.speed * velocity.direction.cos() * period;
        if x < 0.0 {
            x = -x;
            velocity.direction = PI - velocity.direction;
        } else if x > width {
            x = 2.0 * width - x;
            velocity.direction = PI - velocity.direction;
        }
        let mut y = previous.y + velocity.speed * velocity.direction.sin() * period;
        if y < 0.0 {
            y = -y;
            velocity.direction = -velocity.direction;
        } else if y > height {
            y = 2.0 * height - y;
            velocity.direction = -velocity.direction;
        }
        velocity.direction = velocity.direction.rem_euclid(TAU);

        // A step longer than the area itself can bounce past the opposite border
        Coordinates::new(x.clamp(0.0, width), y.clamp(0.0, height))
    }
}

impl Mobility for GaussMarkov {
    fn current_position(
        &mut self,
        clock: &Clock,
        node: NodeId,
        speed: &mut dyn Speed,
        previous: Coordinates,
    ) -> Coordinates {
        if clock.step() == 0 {
            return previous;
        }
        let position = self.step_move(node, clock.period(), previous);
        trace!(node, x = position.x, y = position.y, "moved");

        let interval = self
            .recalculation_interval
            .unwrap_or_else(|| u64::from(clock.frequency()));
        if clock.step() as u64 % interval == 0 {
            self.recalculate(node, speed, previous);
        }
        position
    }
}
