use super::{check_pause_time, random_waypoint::uniform_point, waypoints::Waypoints};
use crate::{Area, Error};
use adhoc_simulator::{Clock, Coordinates, Mobility, NodeId, Speed};
use rand::{rngs::StdRng, Rng};

/// The random direction mobility model.
///
/// Like [super::RandomWaypoint], except that destinations lie on a border of the area
/// (chosen uniformly), so nodes cross the whole area before pausing.
pub struct RandomDirection {
    area: Area,
    waypoints: Waypoints,
    rng: StdRng,
}

impl RandomDirection {
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

fn border_point(area: &Area, rng: &mut StdRng) -> Coordinates {
    let point = uniform_point(area, rng);
    match rng.gen_range(0..4) {
        0 => Coordinates::new(point.x, 0.0),
        1 => Coordinates::new(area.width(), point.y),
        2 => Coordinates::new(point.x, area.height()),
        _ => Coordinates::new(0.0, point.y),
    }
}

impl Mobility for RandomDirection {
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
                border_point(&area, rng)
            })
            .position()
    }
}
