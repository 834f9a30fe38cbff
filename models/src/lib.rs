//! Concrete collaborators for [adhoc_simulator].
//!
//! Every model validates its parameters at construction and draws randomness from its own
//! [rand::rngs::StdRng] (supplied by the caller), so a simulation is reproducible from the
//! seeds it hands out.
//!
//! # Status
//!
//! `adhoc-models` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

use adhoc_simulator::Coordinates;
use thiserror::Error;

pub mod area;
pub use area::Area;
pub mod failure;
pub mod mobility;
pub mod packet_loss;
pub mod placement;
pub mod propagation;
pub mod speed;

/// Errors that can occur when constructing a model.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {name} (expected {expected}): {given}")]
    InvalidParameter {
        name: &'static str,
        expected: &'static str,
        given: f64,
    },
}

/// Fail with [Error::InvalidParameter] unless `valid` holds for `given`.
pub(crate) fn check(
    name: &'static str,
    expected: &'static str,
    given: f64,
    valid: impl FnOnce(f64) -> bool,
) -> Result<(), Error> {
    if given.is_nan() || !valid(given) {
        return Err(Error::InvalidParameter {
            name,
            expected,
            given,
        });
    }
    Ok(())
}

/// Computes the initial positions of nodes.
pub trait Placement {
    fn placement(&mut self) -> Vec<Coordinates>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        assert!(check("range", "> 0", 1.0, |v| v > 0.0).is_ok());
        assert!(check("range", "> 0", 0.0, |v| v > 0.0).is_err());
        assert!(check("range", "any", f64::NAN, |_| true).is_err());

        let err = check("alpha", "in [0, 1]", 2.0, |v| (0.0..=1.0).contains(&v)).unwrap_err();
        assert_eq!(err.to_string(), "invalid alpha (expected in [0, 1]): 2");
    }
}
