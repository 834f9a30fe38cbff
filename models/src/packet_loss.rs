//! Packet loss models.

use crate::{check, Error};
use adhoc_simulator::PacketLoss;
use rand::{rngs::StdRng, Rng};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Good,
    Bad,
}

/// The Gilbert-Elliott burst loss model.
///
/// A two-state Markov chain where every call first moves from the good state to the bad one
/// with probability `p` (or back with probability `r`) and then loses the packet with
/// probability `1 - k` (good state) or `1 - h` (bad state). The chain starts in the good state.
pub struct GilbertElliott {
    p: f64,
    r: f64,
    loss_good: f64,
    loss_bad: f64,
    state: State,
    rng: StdRng,
}

impl GilbertElliott {
    pub const DEFAULT_P: f64 = 0.00001333;
    pub const DEFAULT_R: f64 = 0.00601795;
    pub const DEFAULT_H: f64 = 0.55494900;
    pub const DEFAULT_K: f64 = 0.99999900;

    pub fn new(p: f64, r: f64, h: f64, k: f64, rng: StdRng) -> Result<Self, Error> {
        for (name, value) in [("p", p), ("r", r), ("h", h), ("k", k)] {
            check(name, "in [0, 1]", value, |v| (0.0..=1.0).contains(&v))?;
        }
        Ok(Self {
            p,
            r,
            loss_good: 1.0 - k,
            loss_bad: 1.0 - h,
            state: State::Good,
            rng,
        })
    }

    /// A channel with the default parameters.
    pub fn with_defaults(rng: StdRng) -> Self {
        Self {
            p: Self::DEFAULT_P,
            r: Self::DEFAULT_R,
            loss_good: 1.0 - Self::DEFAULT_K,
            loss_bad: 1.0 - Self::DEFAULT_H,
            state: State::Good,
            rng,
        }
    }
}

impl PacketLoss for GilbertElliott {
    fn packet_loss(&mut self) -> bool {
        let transition = match self.state {
            State::Good => self.p,
            State::Bad => self.r,
        };
        if self.rng.gen::<f64>() < transition {
            self.state = match self.state {
                State::Good => State::Bad,
                State::Bad => State::Good,
            };
            trace!(state = ?self.state, "changed channel state");
        }
        let loss = match self.state {
            State::Good => self.loss_good,
            State::Bad => self.loss_bad,
        };
        self.rng.gen::<f64>() < loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn channel(p: f64, r: f64, h: f64, k: f64) -> GilbertElliott {
        GilbertElliott::new(p, r, h, k, StdRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn test_invalid_parameters() {
        let rng = || StdRng::seed_from_u64(0);
        assert!(GilbertElliott::new(1.1, 0.0, 0.0, 0.0, rng()).is_err());
        assert!(GilbertElliott::new(0.0, -0.1, 0.0, 0.0, rng()).is_err());
        assert!(GilbertElliott::new(0.0, 0.0, f64::NAN, 0.0, rng()).is_err());
    }

    #[test]
    fn test_good_state_only() {
        // Never leaves the good state where nothing is lost
        let mut loss = channel(0.0, 1.0, 0.0, 1.0);
        assert!((0..10_000).all(|_| !loss.packet_loss()));
        assert_eq!(loss.state, State::Good);
    }

    #[test]
    fn test_transition_before_loss() {
        // Moves to the bad state (where everything is lost) on the very first call
        let mut loss = channel(1.0, 0.0, 0.0, 1.0);
        assert!(loss.packet_loss());
        assert_eq!(loss.state, State::Bad);
        assert!((0..1_000).all(|_| loss.packet_loss()));
    }

    #[test]
    fn test_alternating() {
        // Switches state at every call: bad, good, bad, ...
        let mut loss = channel(1.0, 1.0, 0.0, 1.0);
        for i in 0..100 {
            assert_eq!(loss.packet_loss(), i % 2 == 0);
        }
    }

    #[test]
    fn test_defaults_rarely_lose() {
        let mut loss = GilbertElliott::with_defaults(StdRng::seed_from_u64(0));
        let lost = (0..10_000).filter(|_| loss.packet_loss()).count();
        assert!(lost < 1_000, "{lost}");
    }
}
