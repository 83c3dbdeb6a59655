//! Per-tick nearest-target queries.
//!
//! Every animal queries for the closest food position each tick. `GridSearch`
//! bins the candidate positions at a resolution equal to the querying
//! animal's vision and ranks only the animal's own cell, trading exactness
//! for bounded work. Bin mappings are cached for the duration of one tick,
//! keyed by resolution, so animals sharing a vision value share one mapping;
//! `update` must run once at the start of every tick to drop mappings built
//! from entities that have since died or moved.

use std::collections::HashMap;
use std::num::NonZeroU32;

use rand::seq::index;
use rand::RngCore;

use crate::model::binning::{PositionBinner, PositionBins};
use crate::model::coordinate::Coordinate;

pub trait SearchStrategy {
    /// Returns up to `max_determined_targets` candidate positions ranked
    /// nearest-first, or `None` when nothing is in range. Absence is the
    /// defined "no target" outcome, not an error.
    fn determine_target_position(
        &mut self,
        origin: Coordinate,
        vision: NonZeroU32,
        candidates: &[Coordinate],
        rng: &mut dyn RngCore,
    ) -> Option<Vec<Coordinate>>;

    /// Invalidates any per-tick state. Must be called exactly once per tick,
    /// before any queries run.
    fn update(&mut self);
}

/// Grid-backed search with a one-tick bin cache keyed by resolution.
pub struct GridSearch {
    max_entities_considered: usize,
    max_determined_targets: usize,
    position_bins: HashMap<u32, PositionBins>,
    bin_builds: u64,
}

impl GridSearch {
    pub fn new(max_entities_considered: usize, max_determined_targets: usize) -> Self {
        Self {
            max_entities_considered,
            max_determined_targets,
            position_bins: HashMap::new(),
            bin_builds: 0,
        }
    }

    /// How many bin mappings have been computed since construction. Cache
    /// hits do not increment this.
    pub fn bin_builds(&self) -> u64 {
        self.bin_builds
    }

    fn bins_for(&mut self, binner: PositionBinner, candidates: &[Coordinate]) -> &PositionBins {
        let resolution = binner.bin_resolution();
        if !self.position_bins.contains_key(&resolution) {
            self.position_bins
                .insert(resolution, binner.compute_position_bins(candidates));
            self.bin_builds += 1;
        }
        &self.position_bins[&resolution]
    }
}

impl SearchStrategy for GridSearch {
    fn determine_target_position(
        &mut self,
        origin: Coordinate,
        vision: NonZeroU32,
        candidates: &[Coordinate],
        rng: &mut dyn RngCore,
    ) -> Option<Vec<Coordinate>> {
        let binner = PositionBinner::new(vision);
        let max_entities_considered = self.max_entities_considered;
        let max_determined_targets = self.max_determined_targets;
        let bins = self.bins_for(binner, candidates);
        let cell = bins.get(&binner.floor_position(origin))?;
        if cell.is_empty() {
            return None;
        }

        // Bounded work per query: oversized cells are sampled down to a
        // visibility-scaled cap before ranking, at the cost of sometimes
        // missing same-cell candidates.
        let cap = (max_entities_considered as f64 * f64::from(vision.get()) / 50.0).round()
            as usize;
        let mut considered: Vec<Coordinate> = if cell.len() > cap {
            index::sample(rng, cell.len(), cap)
                .iter()
                .map(|i| cell[i])
                .collect()
        } else {
            cell.clone()
        };

        considered.sort_by(|a, b| origin.distance_to(*a).total_cmp(&origin.distance_to(*b)));
        considered.truncate(max_determined_targets);
        if considered.is_empty() {
            None
        } else {
            Some(considered)
        }
    }

    fn update(&mut self) {
        self.position_bins.clear();
    }
}

/// Linear-scan strategy: picks the first candidate found within the vision
/// distance, looking at no more than `max_entities_considered` candidates.
pub struct RandomSearchAlgorithm {
    pub max_entities_considered: usize,
}

impl SearchStrategy for RandomSearchAlgorithm {
    fn determine_target_position(
        &mut self,
        origin: Coordinate,
        vision: NonZeroU32,
        candidates: &[Coordinate],
        _rng: &mut dyn RngCore,
    ) -> Option<Vec<Coordinate>> {
        for (i, &candidate) in candidates.iter().enumerate() {
            if origin.distance_to(candidate) <= f64::from(vision.get()) {
                return Some(vec![candidate]);
            }
            if i >= self.max_entities_considered {
                break;
            }
        }
        None
    }

    fn update(&mut self) {}
}
