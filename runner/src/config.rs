//! YAML simulation configuration.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Commented configuration written by `adhoc --init`.
pub const TEMPLATE: &str = include_str!("../configuration.yaml");

/// Name of the file written by [init].
pub const TEMPLATE_NAME: &str = "configuration.yaml";

/// Maximum level of emitted log events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum AreaConfig {
    Square { side: f64 },
    Rectangle { width: f64, height: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PlacementConfig {
    Grid,
    Uniform,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum SpeedConfig {
    Constant {
        speed: f64,
    },
    Normal {
        #[serde(default = "defaults::normal_mean")]
        mean: f64,
        #[serde(default = "defaults::normal_standard_deviation")]
        standard_deviation: f64,
    },
    Uniform {
        minimum: f64,
        maximum: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MobilityConfig {
    RandomWaypoint {
        #[serde(default)]
        pause_time: f64,
    },
    RandomDirection {
        #[serde(default)]
        pause_time: f64,
    },
    NomadicCommunity {
        #[serde(default)]
        pause_time: f64,
        #[serde(default = "defaults::area_factor")]
        area_factor: f64,
    },
    GaussMarkov {
        initial_speed: f64,
        #[serde(default = "defaults::alpha")]
        alpha: f64,
        #[serde(default = "defaults::direction_deviation")]
        direction_deviation: f64,
        #[serde(default = "defaults::direction_margin")]
        direction_margin: f64,
        #[serde(default = "defaults::direction_mean")]
        direction_mean: f64,
        #[serde(default)]
        recalculation_interval: Option<u64>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PropagationConfig {
    /// Neighbors are the nodes within `transmission_range`.
    PathLoss,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum PacketLossConfig {
    GilbertElliott {
        #[serde(default = "defaults::p")]
        p: f64,
        #[serde(default = "defaults::r")]
        r: f64,
        #[serde(default = "defaults::h")]
        h: f64,
        #[serde(default = "defaults::k")]
        k: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum FailureConfig {
    Crash {
        crash_probability: f64,
        maximum_crash_number: usize,
        #[serde(default)]
        transient_steps: u64,
    },
}

/// A complete simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub seed: Option<u64>,

    pub simulation_frequency: u32,
    pub total_simulation_steps: u64,
    pub nodes_number: usize,
    pub transmission_range: f64,
    pub maximum_transmission_time: f64,

    pub area: AreaConfig,
    pub placement: PlacementConfig,
    pub speed: SpeedConfig,
    pub mobility: MobilityConfig,
    pub propagation: PropagationConfig,
    pub packet_loss: PacketLossConfig,
    pub failure: FailureConfig,
}

impl Config {
    pub fn parse(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = fs::File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }
}

/// Write [TEMPLATE] to `directory` (which must exist), replacing any existing file.
pub fn init(directory: &Path) -> Result<(), Error> {
    fs::write(directory.join(TEMPLATE_NAME), TEMPLATE)?;
    Ok(())
}

mod defaults {
    use adhoc_models::{
        mobility::{GaussMarkovConfig, NomadicCommunity},
        packet_loss::GilbertElliott,
        speed::Normal,
    };

    pub fn normal_mean() -> f64 {
        Normal::DEFAULT_MEAN
    }

    pub fn normal_standard_deviation() -> f64 {
        Normal::DEFAULT_STANDARD_DEVIATION
    }

    pub fn area_factor() -> f64 {
        NomadicCommunity::DEFAULT_AREA_FACTOR
    }

    pub fn alpha() -> f64 {
        GaussMarkovConfig::new(0.0).alpha
    }

    pub fn direction_deviation() -> f64 {
        GaussMarkovConfig::new(0.0).direction_deviation
    }

    pub fn direction_margin() -> f64 {
        GaussMarkovConfig::new(0.0).direction_margin
    }

    pub fn direction_mean() -> f64 {
        GaussMarkovConfig::new(0.0).direction_mean
    }

    pub fn p() -> f64 {
        GilbertElliott::DEFAULT_P
    }

    pub fn r() -> f64 {
        GilbertElliott::DEFAULT_R
    }

    pub fn h() -> f64 {
        GilbertElliott::DEFAULT_H
    }

    pub fn k() -> f64 {
        GilbertElliott::DEFAULT_K
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template() {
        let config = Config::parse(TEMPLATE).unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.seed, None);
        assert_eq!(config.simulation_frequency, 4);
        assert_eq!(config.total_simulation_steps, 40);
        assert_eq!(config.nodes_number, 2);
        assert_eq!(config.transmission_range, 50.0);
        assert_eq!(config.maximum_transmission_time, 0.125);
        assert_eq!(config.area, AreaConfig::Square { side: 100.0 });
        assert_eq!(config.placement, PlacementConfig::Grid);
        assert_eq!(config.speed, SpeedConfig::Constant { speed: 1.0 });
        assert_eq!(
            config.mobility,
            MobilityConfig::RandomWaypoint { pause_time: 0.0 }
        );
        assert_eq!(config.propagation, PropagationConfig::PathLoss);
        assert_eq!(
            config.packet_loss,
            PacketLossConfig::GilbertElliott {
                p: 0.00001333,
                r: 0.00601795,
                h: 0.554949,
                k: 0.999999,
            }
        );
        assert_eq!(
            config.failure,
            FailureConfig::Crash {
                crash_probability: 0.1,
                maximum_crash_number: 0,
                transient_steps: 0,
            }
        );
    }

    #[test]
    fn test_strategies() {
        let yaml = r#"
log_level: debug
seed: 7
simulation_frequency: 10
total_simulation_steps: 100
nodes_number: 9
transmission_range: 20
maximum_transmission_time: 0.05
area:
  model: rectangle
  width: 300
  height: 200
placement:
  model: uniform
speed:
  model: normal
  standard_deviation: 2.0
mobility:
  model: gauss_markov
  initial_speed: 1.5
  recalculation_interval: 5
propagation:
  model: path_loss
packet_loss:
  model: gilbert_elliott
  p: 0.5
failure:
  model: crash
  crash_probability: 1.0
  maximum_crash_number: 2
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.transmission_range, 20.0);
        assert_eq!(
            config.area,
            AreaConfig::Rectangle {
                width: 300.0,
                height: 200.0
            }
        );
        assert_eq!(
            config.speed,
            SpeedConfig::Normal {
                mean: 0.0,
                standard_deviation: 2.0
            }
        );
        let MobilityConfig::GaussMarkov {
            initial_speed,
            alpha,
            recalculation_interval,
            ..
        } = config.mobility
        else {
            panic!("unexpected mobility: {:?}", config.mobility);
        };
        assert_eq!(initial_speed, 1.5);
        assert_eq!(alpha, 0.75);
        assert_eq!(recalculation_interval, Some(5));
        let PacketLossConfig::GilbertElliott { p, r, .. } = config.packet_loss;
        assert_eq!((p, r), (0.5, 0.00601795));
        let FailureConfig::Crash {
            transient_steps, ..
        } = config.failure;
        assert_eq!(transient_steps, 0);
        assert_eq!(tracing::Level::from(config.log_level), tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid() {
        // Unknown model
        let yaml = TEMPLATE.replace("model: grid", "model: hexagon");
        assert!(matches!(Config::parse(&yaml), Err(Error::Yaml(_))));

        // Unknown field
        let yaml = format!("{TEMPLATE}\nfrequency: 4\n");
        assert!(matches!(Config::parse(&yaml), Err(Error::Yaml(_))));

        // Missing field
        let yaml = TEMPLATE.replace("nodes_number: 2", "");
        assert!(matches!(Config::parse(&yaml), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Path::new("/nonexistent/adhoc/configuration.yaml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
