use serde::{Deserialize, Serialize};

/// A point in 2D world space.
///
/// Coordinates are plain values: entities never hold references to each
/// other, only positions. Equality and hashing are structural (bit
/// patterns), so a `Coordinate` can key the per-tick position lookup.
/// Simulation coordinates are always finite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Coordinate) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl Eq for Coordinate {}

impl std::hash::Hash for Coordinate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}
