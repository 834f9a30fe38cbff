//! Per-node trips shared by the destination-based mobility models.

use crate::Area;
use adhoc_simulator::{Clock, Coordinates, NodeId, Speed};
use rand::{rngs::StdRng, Rng};
use tracing::{debug, trace};

/// Where a node is heading.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Trip {
    Heading(Coordinates),
    /// Waiting at the last destination for the remaining time.
    Paused(f64),
}

/// Outcome of moving a node for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Movement {
    Paused(Coordinates),
    Moving(Coordinates),
    Arrived(Coordinates),
}

impl Movement {
    pub(crate) fn position(&self) -> Coordinates {
        match self {
            Self::Paused(position) | Self::Moving(position) | Self::Arrived(position) => *position,
        }
    }
}

/// Moves every node toward its destination, pausing on arrival.
pub(crate) struct Waypoints {
    area: Area,
    pause_time: f64,
    trips: Vec<Trip>,
}

impl Waypoints {
    /// Every node starts by "arriving" at its initial position at the first step.
    pub(crate) fn new(area: Area, pause_time: f64, initial: &[Coordinates]) -> Self {
        debug!(nodes = initial.len(), "initialized destinations");
        Self {
            area,
            pause_time,
            trips: initial.iter().copied().map(Trip::Heading).collect(),
        }
    }

    pub(crate) fn pause_time(&self) -> f64 {
        self.pause_time
    }

    /// Advance `node` by one step, drawing a new destination with `destination` when needed.
    pub(crate) fn advance(
        &mut self,
        clock: &Clock,
        node: NodeId,
        speed: &mut dyn Speed,
        previous: Coordinates,
        rng: &mut StdRng,
        destination: impl FnOnce(&mut StdRng) -> Coordinates,
    ) -> Movement {
        let trip = self.trips[node];
        let target = match trip {
            Trip::Paused(remaining) => {
                let remaining = remaining - clock.period();
                if remaining <= 0.0 {
                    self.depart(node, speed, rng, destination);
                } else {
                    trace!(node, remaining, "still paused");
                    self.trips[node] = Trip::Paused(remaining);
                }
                return Movement::Paused(previous);
            }
            Trip::Heading(target) => target,
        };

        // Rounding may place an interpolated point a hair outside the area
        let position = self.area.clamp(step_toward(
            previous,
            target,
            speed.current().abs() * clock.period(),
        ));
        if position != target {
            trace!(node, x = position.x, y = position.y, "moved");
            return Movement::Moving(position);
        }

        if self.pause_time > 0.0 {
            let pause = rng.gen_range(0.0..=self.pause_time);
            debug!(node, x = position.x, y = position.y, pause, "reached destination");
            self.trips[node] = Trip::Paused(pause);
        } else {
            debug!(node, x = position.x, y = position.y, "reached destination");
            self.depart(node, speed, rng, destination);
        }
        Movement::Arrived(position)
    }

    fn depart(
        &mut self,
        node: NodeId,
        speed: &mut dyn Speed,
        rng: &mut StdRng,
        destination: impl FnOnce(&mut StdRng) -> Coordinates,
    ) {
        let target = destination(rng);
        let speed = speed.next().abs();
        debug!(node, x = target.x, y = target.y, speed, "selected destination");
        self.trips[node] = Trip::Heading(target);
    }
}

/// Move from `from` toward `to` by at most `distance`.
pub(crate) fn step_toward(from: Coordinates, to: Coordinates, distance: f64) -> Coordinates {
    let remaining = from.distance(&to);
    if distance >= remaining {
        return to;
    }
    let ratio = distance / remaining;
    Coordinates::new(
        from.x + (to.x - from.x) * ratio,
        from.y + (to.y - from.y) * ratio,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use adhoc_simulator::Speed;
    use rand::SeedableRng;

    struct Fixed(f64);

    impl Speed for Fixed {
        fn current(&self) -> f64 {
            self.0
        }

        fn next(&mut self) -> f64 {
            self.0
        }
    }

    fn clock(frequency: u32) -> Clock {
        let mut clock = Clock::new(frequency).unwrap();
        clock.tick();
        clock
    }

    #[test]
    fn test_step_toward() {
        let from = Coordinates::new(0.0, 0.0);
        let to = Coordinates::new(3.0, 4.0);
        assert_eq!(step_toward(from, to, 5.0), to);
        assert_eq!(step_toward(from, to, 10.0), to);
        let half = step_toward(from, to, 2.5);
        assert!((half.x - 1.5).abs() < 1e-12 && (half.y - 2.0).abs() < 1e-12);

        // Axis-parallel moves stay on the axis
        let along = step_toward(from, Coordinates::new(0.0, 10.0), 1.0);
        assert_eq!(along, Coordinates::new(0.0, 1.0));
        assert_eq!(step_toward(to, to, 0.0), to);
    }

    #[test]
    fn test_arrive_then_depart() {
        let area = Area::square(100.0).unwrap();
        let start = Coordinates::new(10.0, 10.0);
        let mut waypoints = Waypoints::new(area, 0.0, &[start]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut speed = Fixed(-5.0);
        let clock = clock(1);

        // The initial position is the first destination
        let movement =
            waypoints.advance(&clock, 0, &mut speed, start, &mut rng, |_| {
                Coordinates::new(10.0, 20.0)
            });
        assert_eq!(movement, Movement::Arrived(start));

        // |speed| * period per step
        let movement = waypoints.advance(&clock, 0, &mut speed, start, &mut rng, |_| {
            unreachable!()
        });
        assert_eq!(movement, Movement::Moving(Coordinates::new(10.0, 15.0)));
        let movement = waypoints.advance(
            &clock,
            0,
            &mut speed,
            movement.position(),
            &mut rng,
            |_| Coordinates::new(50.0, 50.0),
        );
        assert_eq!(movement, Movement::Arrived(Coordinates::new(10.0, 20.0)));
    }

    #[test]
    fn test_pause() {
        let area = Area::square(100.0).unwrap();
        let start = Coordinates::new(10.0, 10.0);
        let mut waypoints = Waypoints::new(area, 2.0, &[start]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut speed = Fixed(1.0);
        let clock = clock(4);

        let movement = waypoints.advance(&clock, 0, &mut speed, start, &mut rng, |_| {
            unreachable!()
        });
        assert_eq!(movement, Movement::Arrived(start));
        let Trip::Paused(pause) = waypoints.trips[0] else {
            panic!("node should be paused");
        };
        assert!((0.0..=2.0).contains(&pause));

        // Stays put until the pause elapses, then heads to a new destination
        let mut paused = 0;
        loop {
            let movement = waypoints.advance(&clock, 0, &mut speed, start, &mut rng, |_| {
                Coordinates::new(90.0, 90.0)
            });
            assert_eq!(movement, Movement::Paused(start));
            paused += 1;
            if waypoints.trips[0] == Trip::Heading(Coordinates::new(90.0, 90.0)) {
                break;
            }
        }
        assert_eq!(paused, ((pause / 0.25).ceil() as usize).max(1));
    }
}
