//! Mobility models.
//!
//! [RandomWaypoint], [RandomDirection], and [NomadicCommunity] move every node in a straight
//! line toward a destination at `|speed| * period` per step and optionally pause on
//! arrival; they differ only in how destinations are chosen. [GaussMarkov] instead lets the
//! speed and direction of every node drift over time.

mod gauss_markov;
pub use gauss_markov::{Config as GaussMarkovConfig, GaussMarkov};
mod nomadic_community;
pub use nomadic_community::NomadicCommunity;
mod random_direction;
pub use random_direction::RandomDirection;
mod random_waypoint;
pub use random_waypoint::RandomWaypoint;
mod waypoints;

use crate::{check, Error};

fn check_pause_time(pause_time: f64) -> Result<(), Error> {
    check("pause time", "finite and >= 0", pause_time, |v| {
        v.is_finite() && v >= 0.0
    })
}
