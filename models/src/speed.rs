//! Speed distributions of nodes.

use crate::{check, Error};
use adhoc_simulator::Speed;
use rand::{rngs::StdRng, Rng};
use rand_distr::Distribution;

/// A speed that never changes.
#[derive(Clone, Debug)]
pub struct Constant {
    speed: f64,
}

impl Constant {
    /// The absolute value of `speed` is used.
    pub fn new(speed: f64) -> Result<Self, Error> {
        check("speed", "finite", speed, f64::is_finite)?;
        Ok(Self { speed: speed.abs() })
    }
}

impl Speed for Constant {
    fn current(&self) -> f64 {
        self.speed
    }

    fn next(&mut self) -> f64 {
        self.speed
    }
}

/// Speeds drawn from a normal distribution (by default with mean 0 and standard deviation
/// 0.2).
///
/// Drawn speeds may be negative: mobility models use their absolute value.
pub struct Normal {
    mean: f64,
    distribution: rand_distr::Normal<f64>,
    rng: StdRng,
    current: f64,
}

impl Normal {
    pub const DEFAULT_MEAN: f64 = 0.0;
    pub const DEFAULT_STANDARD_DEVIATION: f64 = 0.2;

    pub fn new(mean: f64, standard_deviation: f64, mut rng: StdRng) -> Result<Self, Error> {
        check("mean speed", "finite", mean, f64::is_finite)?;
        check(
            "speed standard deviation",
            "finite and >= 0",
            standard_deviation,
            |v| v.is_finite() && v >= 0.0,
        )?;
        let distribution = rand_distr::Normal::new(mean, standard_deviation).map_err(|_| {
            Error::InvalidParameter {
                name: "speed standard deviation",
                expected: "finite and >= 0",
                given: standard_deviation,
            }
        })?;
        let current = distribution.sample(&mut rng);
        Ok(Self {
            mean,
            distribution,
            rng,
            current,
        })
    }
}

impl Speed for Normal {
    fn current(&self) -> f64 {
        self.current
    }

    fn next(&mut self) -> f64 {
        self.current = self.distribution.sample(&mut self.rng);
        self.current
    }

    fn mean(&self) -> f64 {
        self.mean
    }
}

/// Speeds drawn uniformly from `[minimum, maximum]`.
pub struct Uniform {
    minimum: f64,
    maximum: f64,
    rng: StdRng,
    current: f64,
}

impl Uniform {
    pub fn new(minimum: f64, maximum: f64, mut rng: StdRng) -> Result<Self, Error> {
        check("minimum speed", "finite", minimum, f64::is_finite)?;
        check("maximum speed", "finite and >= minimum speed", maximum, |v| {
            v.is_finite() && v >= minimum
        })?;
        let current = rng.gen_range(minimum..=maximum);
        Ok(Self {
            minimum,
            maximum,
            rng,
            current,
        })
    }
}

impl Speed for Uniform {
    fn current(&self) -> f64 {
        self.current
    }

    fn next(&mut self) -> f64 {
        self.current = self.rng.gen_range(self.minimum..=self.maximum);
        self.current
    }

    fn mean(&self) -> f64 {
        0.5 * (self.minimum + self.maximum)
    }
}
