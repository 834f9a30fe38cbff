//! Discrete simulation time.
//!
//! The clock counts *simulation steps* and derives the *simulation time* from the
//! *simulation frequency* `f`: after every tick, `time = step / f`. The *simulation period*
//! is `1 / f`.

use crate::Error;
use std::fmt;
use tracing::trace;

/// A reading of the clock: the current step and the time derived from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub step: i64,
    pub time: f64,
}

/// Tracks simulation steps and time for a given simulation frequency.
#[derive(Clone, Debug)]
pub struct Clock {
    step: i64,
    time: f64,
    frequency: u32,
    period: f64,
}

impl Clock {
    /// Create a clock that has not ticked yet (step `-1`, time `-1.0`).
    ///
    /// The first call to [Clock::tick] returns step `0` at time `0.0`.
    pub fn new(frequency: u32) -> Result<Self, Error> {
        if frequency == 0 {
            return Err(Error::InvalidFrequency(frequency));
        }
        let period = 1.0 / f64::from(frequency);
        trace!(frequency, period, "initialized clock");
        Ok(Self {
            step: -1,
            time: -1.0,
            frequency,
            period,
        })
    }

    /// Advance the clock by one step and return the new reading.
    pub fn tick(&mut self) -> Tick {
        self.step += 1;
        self.time = self.step as f64 / f64::from(self.frequency);
        trace!(step = self.step, time = self.time, "tick");
        self.now()
    }

    /// Current reading.
    pub fn now(&self) -> Tick {
        Tick {
            step: self.step,
            time: self.time,
        }
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn period(&self) -> f64 {
        self.period
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step < 0 {
            return write!(f, "0 0.000");
        }
        write!(f, "{} {:.3}", self.step, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_frequency_rejected() {
        assert!(matches!(Clock::new(0), Err(Error::InvalidFrequency(0))));
    }

    #[test]
    fn test_first_tick() {
        for frequency in [1, 3, 4, 1000] {
            let mut clock = Clock::new(frequency).unwrap();
            assert_eq!(clock.step(), -1);
            assert_eq!(clock.time(), -1.0);
            assert_eq!(clock.tick(), Tick { step: 0, time: 0.0 });
        }
    }

    #[test]
    fn test_nth_tick() {
        let mut clock = Clock::new(4).unwrap();
        let expected = [0.0, 0.25, 0.5, 0.75, 1.0, 1.25];
        for (step, time) in expected.into_iter().enumerate() {
            let tick = clock.tick();
            assert_eq!(tick.step, step as i64);
            assert_eq!(tick.time, time);
            assert_eq!(clock.now(), tick);
        }
        assert_eq!(clock.period(), 0.25);
        assert_eq!(clock.frequency(), 4);
    }

    #[test]
    fn test_time_matches_step() {
        let mut clock = Clock::new(3).unwrap();
        for _ in 0..100 {
            let tick = clock.tick();
            assert_eq!(tick.time, tick.step as f64 / 3.0);
        }
    }

    #[test]
    fn test_display() {
        let mut clock = Clock::new(2).unwrap();
        assert_eq!(clock.to_string(), "0 0.000");
        clock.tick();
        clock.tick();
        clock.tick();
        assert_eq!(clock.to_string(), "2 1.000");
    }
}
