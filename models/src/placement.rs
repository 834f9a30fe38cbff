//! Initial placement of nodes.

use crate::{check, Area, Error, Placement};
use adhoc_simulator::Coordinates;
use rand::{rngs::StdRng, Rng};
use std::collections::HashSet;
use tracing::debug;

fn check_nodes(nodes: usize) -> Result<(), Error> {
    check("nodes number", "> 0", nodes as f64, |v| v > 0.0)
}

/// Places nodes on a regular grid centred in the area.
///
/// The grid uses the most square factorisation of the number of nodes (a prime number of
/// nodes yields a single line), oriented along the longer side of the area. Adjacent nodes
/// are `sqrt(range^2 / 2)` apart unless the grid would not fit, in which case the spacing
/// shrinks.
pub struct Grid {
    area: Area,
    nodes: usize,
    transmission_range: f64,
}

impl Grid {
    pub fn new(area: Area, nodes: usize, transmission_range: f64) -> Result<Self, Error> {
        check_nodes(nodes)?;
        check("transmission range", "finite and > 0", transmission_range, |v| {
            v.is_finite() && v > 0.0
        })?;
        Ok(Self {
            area,
            nodes,
            transmission_range,
        })
    }

    /// Returns `(columns, rows)`.
    fn dimensions(&self) -> (usize, usize) {
        let root = (self.nodes as f64).sqrt() as usize;
        let short = (1..=root)
            .rev()
            .find(|value| self.nodes % value == 0)
            .unwrap_or(1);
        let long = self.nodes / short;
        if self.area.width() >= self.area.height() {
            (long, short)
        } else {
            (short, long)
        }
    }

    fn spacing(&self, columns: usize, rows: usize) -> f64 {
        let mut distance = (0.5 * self.transmission_range * self.transmission_range).sqrt();
        if distance * (columns + 1) as f64 > self.area.width() {
            distance = self.area.width() / (columns + 1) as f64;
        }
        if distance * (rows + 1) as f64 > self.area.height() {
            distance = self.area.height() / (rows + 1) as f64;
        }
        distance
    }
}

impl Placement for Grid {
    fn placement(&mut self) -> Vec<Coordinates> {
        let (columns, rows) = self.dimensions();
        let distance = self.spacing(columns, rows);
        let left = 0.5 * (self.area.width() - (columns + 1) as f64 * distance);
        let bottom = 0.5 * (self.area.height() - (rows + 1) as f64 * distance);

        let mut coordinates = Vec::with_capacity(self.nodes);
        for row in 0..rows {
            let y = bottom + (row + 1) as f64 * distance;
            for column in 0..columns {
                let x = left + (column + 1) as f64 * distance;
                coordinates.push(Coordinates::new(x, y));
            }
        }
        debug!(
            nodes = self.nodes,
            columns,
            rows,
            distance,
            area = %self.area,
            "generated grid placement"
        );
        coordinates
    }
}

/// Places nodes uniformly at random in the area, with no two nodes at the same position.
pub struct Uniform {
    area: Area,
    nodes: usize,
    rng: StdRng,
}

impl Uniform {
    pub fn new(area: Area, nodes: usize, rng: StdRng) -> Result<Self, Error> {
        check_nodes(nodes)?;
        Ok(Self { area, nodes, rng })
    }
}

impl Placement for Uniform {
    fn placement(&mut self) -> Vec<Coordinates> {
        loop {
            let coordinates: Vec<_> = (0..self.nodes)
                .map(|_| {
                    Coordinates::new(
                        self.rng.gen_range(0.0..=self.area.width()),
                        self.rng.gen_range(0.0..=self.area.height()),
                    )
                })
                .collect();
            let mut seen = HashSet::with_capacity(self.nodes);
            if coordinates
                .iter()
                .all(|point| seen.insert((point.x.to_bits(), point.y.to_bits())))
            {
                debug!(nodes = self.nodes, area = %self.area, "generated uniform placement");
                return coordinates;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_invalid() {
        let area = Area::square(100.0).unwrap();
        assert!(Grid::new(area, 0, 50.0).is_err());
        assert!(Grid::new(area, 4, 0.0).is_err());
        assert!(Uniform::new(area, 0, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_grid_square_number() {
        let area = Area::square(100.0).unwrap();
        let coordinates = Grid::new(area, 4, 50.0).unwrap().placement();

        // sqrt(50^2 / 2) * 3 > 100, so the spacing shrinks to 100 / 3
        let d = 100.0 / 3.0;
        let expected = [(d, d), (2.0 * d, d), (d, 2.0 * d), (2.0 * d, 2.0 * d)];
        assert_eq!(coordinates.len(), 4);
        for (point, (x, y)) in coordinates.iter().zip(expected) {
            assert!(approx(point.x, x) && approx(point.y, y), "{point:?}");
        }
    }

    #[test]
    fn test_grid_centred() {
        let area = Area::square(1000.0).unwrap();
        let coordinates = Grid::new(area, 2, 10.0).unwrap().placement();

        // 2 is prime: one row of two nodes, sqrt(50) apart, centred
        let d = 50f64.sqrt();
        assert_eq!(coordinates.len(), 2);
        assert!(approx(coordinates[1].x - coordinates[0].x, d));
        assert!(approx(coordinates[0].y, 500.0));
        assert!(approx(coordinates[0].x + coordinates[1].x, 1000.0));
    }

    #[test]
    fn test_grid_orientation() {
        let wide = Area::rectangle(300.0, 100.0).unwrap();
        let mut grid = Grid::new(wide, 6, 10.0).unwrap();
        assert_eq!(grid.dimensions(), (3, 2));
        assert!(grid.placement().iter().all(|p| wide.within(*p)));

        let tall = Area::rectangle(100.0, 300.0).unwrap();
        let mut grid = Grid::new(tall, 6, 10.0).unwrap();
        assert_eq!(grid.dimensions(), (2, 3));
        assert!(grid.placement().iter().all(|p| tall.within(*p)));

        let line = Area::rectangle(100.0, 300.0).unwrap();
        let mut grid = Grid::new(line, 7, 500.0).unwrap();
        assert_eq!(grid.dimensions(), (1, 7));
        let coordinates = grid.placement();
        assert_eq!(coordinates.len(), 7);
        assert!(coordinates.iter().all(|p| line.within(*p)));
    }

    #[test]
    fn test_uniform() {
        let area = Area::rectangle(10.0, 20.0).unwrap();
        let mut placement = Uniform::new(area, 50, StdRng::seed_from_u64(0)).unwrap();
        let coordinates = placement.placement();
        assert_eq!(coordinates.len(), 50);
        assert!(coordinates.iter().all(|p| area.within(*p)));

        // Same seed, same placement
        let mut again = Uniform::new(area, 50, StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(again.placement(), coordinates);
    }
}
