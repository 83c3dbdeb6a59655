//! Spawn-time position clustering.
//!
//! Food is spawned at uniformly random positions and then pulled toward
//! local centroids so it forms naturalistic clumps. Clustering runs exactly
//! once, at spawn; it is never re-invoked mid-simulation.

use crate::model::binning::{average_positions, PositionBinner, PositionBins};
use crate::model::coordinate::Coordinate;
use crate::model::error::SimError;

pub trait PositionClusterer {
    /// Forms clusters from the specified positions and returns the resulting
    /// positions, same length and order as the input.
    fn cluster_positions(&self, positions: &[Coordinate]) -> Vec<Coordinate>;
}

/// Clusters positions by binning them, then linearly interpolating each
/// point toward the centroid of its bin.
pub struct SimplePositionClusterer {
    binner: PositionBinner,
    lerp_factor: f64,
}

impl SimplePositionClusterer {
    pub fn new(binner: PositionBinner, lerp_factor: f64) -> Result<Self, SimError> {
        if !(0.0..=1.0).contains(&lerp_factor) {
            return Err(SimError::invalid_config(format!(
                "lerp_factor must be in [0, 1], got {lerp_factor}"
            )));
        }
        Ok(Self {
            binner,
            lerp_factor,
        })
    }

    fn lerp(&self, from: Coordinate, to: Coordinate) -> Coordinate {
        let f = self.lerp_factor;
        Coordinate::new(from.x * (1.0 - f) + to.x * f, from.y * (1.0 - f) + to.y * f)
    }
}

impl PositionClusterer for SimplePositionClusterer {
    fn cluster_positions(&self, positions: &[Coordinate]) -> Vec<Coordinate> {
        let bins: PositionBins = self.binner.compute_position_bins(positions);
        let centroids: std::collections::HashMap<_, _> = bins
            .iter()
            .map(|(key, members)| (*key, average_positions(members)))
            .collect();
        positions
            .iter()
            .map(|&p| self.lerp(p, centroids[&self.binner.floor_position(p)]))
            .collect()
    }
}

/// Applies a chain of clusterers in sequence, feeding each stage's output
/// into the next.
pub struct CompositePositionClusterer {
    clusterers: Vec<Box<dyn PositionClusterer>>,
}

impl CompositePositionClusterer {
    pub fn new(clusterers: Vec<Box<dyn PositionClusterer>>) -> Self {
        Self { clusterers }
    }
}

impl PositionClusterer for CompositePositionClusterer {
    fn cluster_positions(&self, positions: &[Coordinate]) -> Vec<Coordinate> {
        let mut positions = positions.to_vec();
        for clusterer in &self.clusterers {
            positions = clusterer.cluster_positions(&positions);
        }
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    fn simple(res: u32, factor: f64) -> SimplePositionClusterer {
        SimplePositionClusterer::new(
            PositionBinner::new(NonZeroU32::new(res).unwrap()),
            factor,
        )
        .unwrap()
    }

    fn sample_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(1.0, 1.0),
            Coordinate::new(9.0, 5.0),
            Coordinate::new(42.0, 17.0),
            Coordinate::new(48.0, 11.0),
        ]
    }

    #[test]
    fn test_lerp_factor_zero_is_identity() {
        let clusterer = simple(10, 0.0);
        let points = sample_points();
        assert_eq!(clusterer.cluster_positions(&points), points);
    }

    #[test]
    fn test_lerp_factor_one_moves_points_to_centroid() {
        let clusterer = simple(10, 1.0);
        let points = vec![Coordinate::new(2.0, 2.0), Coordinate::new(8.0, 6.0)];
        let clustered = clusterer.cluster_positions(&points);
        let centroid = Coordinate::new(5.0, 4.0);
        assert_eq!(clustered, vec![centroid, centroid]);
    }

    #[test]
    fn test_output_has_same_length_and_order() {
        let clusterer = simple(10, 0.5);
        let points = sample_points();
        let clustered = clusterer.cluster_positions(&points);
        assert_eq!(clustered.len(), points.len());
        // Points in distinct bins keep their relative arrangement.
        assert!(clustered[2].x > clustered[0].x);
    }

    #[test]
    fn test_composite_equals_sequential_application() {
        let points = sample_points();
        let composite = CompositePositionClusterer::new(vec![
            Box::new(simple(10, 0.3)),
            Box::new(simple(50, 0.7)),
        ]);
        let sequential = simple(50, 0.7).cluster_positions(&simple(10, 0.3).cluster_positions(&points));
        assert_eq!(composite.cluster_positions(&points), sequential);
    }

    #[test]
    fn test_out_of_range_lerp_factor_is_rejected() {
        let binner = PositionBinner::new(NonZeroU32::new(10).unwrap());
        assert!(SimplePositionClusterer::new(binner, 1.5).is_err());
        assert!(SimplePositionClusterer::new(binner, -0.1).is_err());
    }
}
