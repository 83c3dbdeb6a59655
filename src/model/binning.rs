//! Grid binning of entity positions.
//!
//! The binner is the unit of the spatial index: it partitions a set of
//! points into square cells of side `bin_resolution`, keyed by the floored
//! cell origin. Both the spawn-time clusterer and the per-tick search use
//! the same key formula, which is what keeps writers and readers of a bin
//! mapping consistent within a tick.

use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::model::coordinate::Coordinate;

/// Bin origin in world units. Integral because resolutions are integral.
pub type BinKey = (i64, i64);

/// Positions grouped by cell, in input order within each cell.
pub type PositionBins = HashMap<BinKey, Vec<Coordinate>>;

/// Groups positions into bins of positions close to each other.
#[derive(Clone, Copy, Debug)]
pub struct PositionBinner {
    bin_resolution: NonZeroU32,
}

impl PositionBinner {
    pub fn new(bin_resolution: NonZeroU32) -> Self {
        Self { bin_resolution }
    }

    pub fn bin_resolution(&self) -> u32 {
        self.bin_resolution.get()
    }

    /// Groups the specified positions into bins. Every input point lands in
    /// exactly one bin; within a bin, points keep their input order.
    pub fn compute_position_bins(&self, positions: &[Coordinate]) -> PositionBins {
        let mut bins: PositionBins = HashMap::new();
        for &position in positions {
            bins.entry(self.floor_position(position))
                .or_default()
                .push(position);
        }
        bins
    }

    /// The bin key for a position: `(floor(x/r)*r, floor(y/r)*r)`.
    ///
    /// True float floor, so negative coordinates round toward negative
    /// infinity and stay consistent with `compute_position_bins`.
    #[inline]
    pub fn floor_position(&self, position: Coordinate) -> BinKey {
        let r = f64::from(self.bin_resolution.get());
        (
            ((position.x / r).floor() * r) as i64,
            ((position.y / r).floor() * r) as i64,
        )
    }
}

/// Arithmetic mean of a non-empty set of points.
pub fn average_positions(positions: &[Coordinate]) -> Coordinate {
    let n = positions.len() as f64;
    let (sx, sy) = positions
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Coordinate::new(sx / n, sy / n)
}
