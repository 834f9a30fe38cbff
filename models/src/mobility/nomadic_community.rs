use super::{
    check_pause_time,
    waypoints::{Movement, Waypoints},
};
use crate::{check, Area, Error};
use adhoc_simulator::{Clock, Coordinates, Mobility, NodeId, Speed};
use rand::{rngs::StdRng, Rng};
use tracing::{debug, warn};

/// Bounds of the delay before the reference point relocates.
const RELOCATION_TIME: (f64, f64) = (100.0, 200.0);

/// Bounds of the factor applied to the pause time and added to the relocation delay.
const RELOCATION_PAUSE_FACTOR: (f64, f64) = (1.0, 10.0);

/// Attempts at finding a free roam area disjoint from the current one.
const RELOCATION_ATTEMPTS: usize = 1_000;

/// Edges of a free roam area.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Edges {
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
}

impl Edges {
    fn contains(&self, point: Coordinates) -> bool {
        (self.left..=self.right).contains(&point.x) && (self.bottom..=self.top).contains(&point.y)
    }

    fn overlaps(&self, other: &Self) -> bool {
        !(other.bottom > self.top
            || other.left > self.right
            || other.top < self.bottom
            || other.right < self.left)
    }
}

/// The nomadic community mobility model.
///
/// All nodes roam (as in [super::RandomWaypoint]) within a free roam area centred on a
/// shared reference point. The free roam area spans `area_factor` of each dimension of the
/// simulation area. Once every node has reached a destination within the free roam area, the
/// reference point relocates after a delay of `U[100, 200] + U[1, 10] * pause_time` to a new
/// position whose free roam area does not overlap the current one.
pub struct NomadicCommunity {
    area: Area,
    area_factor: f64,
    waypoints: Waypoints,
    rng: StdRng,

    reference: Coordinates,
    relocation: Option<f64>,
    on_site: Vec<bool>,
}

impl NomadicCommunity {
    pub const DEFAULT_AREA_FACTOR: f64 = 0.25;

    pub fn new(
        area: Area,
        initial: &[Coordinates],
        pause_time: f64,
        area_factor: f64,
        mut rng: StdRng,
    ) -> Result<Self, Error> {
        check_pause_time(pause_time)?;
        check("area factor", "in [0, 1]", area_factor, |v| {
            (0.0..=1.0).contains(&v)
        })?;
        let reference = Coordinates::new(
            rng.gen_range(0.0..=area.width()),
            rng.gen_range(0.0..=area.height()),
        );
        debug!(x = reference.x, y = reference.y, "selected reference point");
        Ok(Self {
            area,
            area_factor,
            waypoints: Waypoints::new(area, pause_time, initial),
            rng,
            reference,
            relocation: None,
            on_site: vec![false; initial.len()],
        })
    }

    fn edges(&self, reference: Coordinates) -> Edges {
        let horizontal = 0.5 * self.area.width() * self.area_factor;
        let vertical = 0.5 * self.area.height() * self.area_factor;
        Edges {
            left: (reference.x - horizontal).max(0.0),
            right: (reference.x + horizontal).min(self.area.width()),
            bottom: (reference.y - vertical).max(0.0),
            top: (reference.y + vertical).min(self.area.height()),
        }
    }

    fn relocate(&mut self, clock: &Clock, pause_time: f64) {
        let Some(relocation) = self.relocation else {
            if self.on_site.iter().all(|on_site| *on_site) {
                let delay = self.rng.gen_range(RELOCATION_TIME.0..=RELOCATION_TIME.1)
                    + self
                        .rng
                        .gen_range(RELOCATION_PAUSE_FACTOR.0..=RELOCATION_PAUSE_FACTOR.1)
                        * pause_time;
                debug!(delay, "scheduled reference point relocation");
                self.relocation = Some(clock.time() + delay);
            }
            return;
        };
        if relocation > clock.time() {
            return;
        }

        let current = self.edges(self.reference);
        let mut reference = self.reference;
        for attempt in 1..=RELOCATION_ATTEMPTS {
            reference = Coordinates::new(
                self.rng.gen_range(0.0..=self.area.width()),
                self.rng.gen_range(0.0..=self.area.height()),
            );
            if !current.overlaps(&self.edges(reference)) {
                break;
            }
            if attempt == RELOCATION_ATTEMPTS {
                warn!(
                    area_factor = self.area_factor,
                    "no disjoint free roam area found"
                );
            }
        }
        debug!(x = reference.x, y = reference.y, "relocated reference point");
        self.reference = reference;
        self.relocation = None;
        self.on_site.iter_mut().for_each(|on_site| *on_site = false);
    }
}

impl Mobility for NomadicCommunity {
    fn current_position(
        &mut self,
        clock: &Clock,
        node: NodeId,
        speed: &mut dyn Speed,
        previous: Coordinates,
    ) -> Coordinates {
        let pause_time = self.waypoints.pause_time();
        self.relocate(clock, pause_time);

        let edges = self.edges(self.reference);
        let movement = self
            .waypoints
            .advance(clock, node, speed, previous, &mut self.rng, |rng| {
                Coordinates::new(
                    rng.gen_range(edges.left..=edges.right),
                    rng.gen_range(edges.bottom..=edges.top),
                )
            });
        if let Movement::Arrived(position) = movement {
            if !self.on_site[node] && edges.contains(position) {
                debug!(node, "arrived on site");
                self.on_site[node] = true;
            }
        }
        movement.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speed::Constant;
    use rand::SeedableRng;

    #[test]
    fn test_invalid_parameters() {
        let area = Area::square(100.0).unwrap();
        let rng = || StdRng::seed_from_u64(0);
        assert!(NomadicCommunity::new(area, &[], -1.0, 0.25, rng()).is_err());
        assert!(NomadicCommunity::new(area, &[], 0.0, 1.5, rng()).is_err());
        assert!(NomadicCommunity::new(area, &[], 0.0, -0.1, rng()).is_err());
    }

    #[test]
    fn test_edges_clamped() {
        let area = Area::rectangle(100.0, 40.0).unwrap();
        let mobility = NomadicCommunity::new(area, &[], 0.0, 0.5, StdRng::seed_from_u64(0))
            .unwrap();
        let edges = mobility.edges(Coordinates::new(10.0, 35.0));
        assert_eq!(
            edges,
            Edges {
                left: 0.0,
                right: 35.0,
                bottom: 25.0,
                top: 40.0
            }
        );
        assert!(edges.contains(Coordinates::new(0.0, 40.0)));
        assert!(!edges.contains(Coordinates::new(36.0, 30.0)));
    }

    #[test]
    fn test_community_relocates() {
        let area = Area::square(1_000.0).unwrap();
        let initial = [
            Coordinates::new(0.0, 0.0),
            Coordinates::new(500.0, 500.0),
            Coordinates::new(1_000.0, 1_000.0),
        ];
        let mut mobility = NomadicCommunity::new(
            area,
            &initial,
            0.0,
            NomadicCommunity::DEFAULT_AREA_FACTOR,
            StdRng::seed_from_u64(9),
        )
        .unwrap();
        let mut speeds: Vec<_> = (0..3).map(|_| Constant::new(50.0).unwrap()).collect();
        let mut clock = Clock::new(1).unwrap();
        let mut positions = initial.to_vec();

        let first = mobility.reference;
        let mut scheduled = None;
        let mut relocated = false;
        for _ in 0..1_000 {
            clock.tick();
            for (node, speed) in speeds.iter_mut().enumerate() {
                positions[node] =
                    mobility.current_position(&clock, node, speed, positions[node]);
                assert!(area.within(positions[node]));
            }
            if scheduled.is_none() {
                if let Some(relocation) = mobility.relocation {
                    // Everyone gathered around the first reference point
                    let edges = mobility.edges(first);
                    assert!(positions.iter().all(|position| edges.contains(*position)));
                    let delay = relocation - clock.time();
                    assert!((RELOCATION_TIME.0..=RELOCATION_TIME.1).contains(&delay));
                    scheduled = Some(relocation);
                }
            }
            if mobility.reference != first {
                let relocation = scheduled.expect("relocated before all nodes were on site");
                assert!(clock.time() >= relocation);
                assert!(!mobility.edges(first).overlaps(&mobility.edges(mobility.reference)));
                relocated = true;
                break;
            }
        }
        assert!(relocated);
    }
}
