//! Radio propagation models.

use crate::{check, Error};
use adhoc_simulator::{Coordinates, NodeId, Propagation};
use tracing::trace;

/// Free-space path loss: two nodes are neighbors iff they are within the transmission range
/// of each other.
#[derive(Clone, Debug)]
pub struct PathLoss {
    transmission_range: f64,
}

impl PathLoss {
    pub fn new(transmission_range: f64) -> Result<Self, Error> {
        check("transmission range", "finite and > 0", transmission_range, |v| {
            v.is_finite() && v > 0.0
        })?;
        Ok(Self { transmission_range })
    }
}

impl Propagation for PathLoss {
    fn neighbors(&mut self, coordinates: &[Coordinates]) -> Vec<Vec<NodeId>> {
        let mut neighbors = vec![Vec::new(); coordinates.len()];
        for (source, from) in coordinates.iter().enumerate() {
            for (destination, to) in coordinates.iter().enumerate().skip(source + 1) {
                if from.distance(to) <= self.transmission_range {
                    neighbors[source].push(destination);
                    neighbors[destination].push(source);
                }
            }
        }
        trace!(nodes = coordinates.len(), "computed neighbors");
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range() {
        assert!(PathLoss::new(0.0).is_err());
        assert!(PathLoss::new(-3.0).is_err());
    }

    #[test]
    fn test_neighbors() {
        let mut propagation = PathLoss::new(5.0).unwrap();
        let coordinates = [
            Coordinates::new(0.0, 0.0),
            Coordinates::new(3.0, 4.0),
            Coordinates::new(6.0, 8.0),
            Coordinates::new(100.0, 100.0),
        ];
        let neighbors = propagation.neighbors(&coordinates);

        // Range is inclusive and the relation is symmetric
        assert_eq!(neighbors, vec![vec![1], vec![0, 2], vec![1], vec![]]);
        assert!(propagation.neighbors(&[]).is_empty());
    }
}
