use super::{check_pause_time, waypoints::Waypoints};
use crate::{Area, Error};
use adhoc_simulator::{Clock, Coordinates, Mobility, NodeId, Speed};
use rand::{rngs::StdRng, Rng};

/// The random waypoint mobility model.
///
/// Every node moves toward a destination drawn uniformly in the area. On arrival it pauses
/// for a duration drawn uniformly from `[0, pause_time]` (in simulation time units), then
/// draws a new destination and a new speed.
pub struct RandomWaypoint {
    area: Area,
    waypoints: Waypoints,
    rng: StdRng,
}

impl RandomWaypoint {
    pub fn new(
        area: Area,
        initial: &[Coordinates],
        pause_time: f64,
        rng: StdRng,
    ) -> Result<Self, Error> {
        check_pause_time(pause_time)?;
        Ok(Self {
            area,
            waypoints: Waypoints::new(area, pause_time, initial),
            rng,
        })
    }
}

/// A point drawn uniformly in `area`.
pub(super) fn uniform_point(area: &Area, rng: &mut StdRng) -> Coordinates {
    Coordinates::new(
        rng.gen_range(0.0..=area.width()),
        rng.gen_range(0.0..=area.height()),
    )
}

impl Mobility for RandomWaypoint {
    fn current_position(
        &mut self,
        clock: &Clock,
        node: NodeId,
        speed: &mut dyn Speed,
        previous: Coordinates,
    ) -> Coordinates {
        let area = self.area;
        self.waypoints
            .advance(clock, node, speed, previous, &mut self.rng, |rng| {
                uniform_point(&area, rng)
            })
            .position()
    }
}
