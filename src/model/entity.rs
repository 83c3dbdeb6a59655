//! Food and animal entities.
//!
//! Entities are plain values owned by the `World`; they refer to each other
//! only through positions. An animal's tick is: pay the energy cost, resolve
//! a target (search, else the remembered target, else a wander point), move
//! toward it without overshooting, then try to eat every target yielded this
//! tick. Death is signalled by underflow (`size <= 0`, `energy <= 0`) and
//! acted on by the next tick's filtering pass, never mid-tick.

use std::collections::HashMap;
use std::num::NonZeroU32;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::coordinate::Coordinate;
use crate::model::search::SearchStrategy;
use crate::model::world::random_position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const BASE_FOOD_COLOUR: Rgb = Rgb {
    r: 255,
    g: 255,
    b: 255,
};
const FOOD_QUALITY_COLOUR_FACTOR: f64 = 20.0;

const BASE_ANIMAL_COLOUR: Rgb = Rgb {
    r: 255,
    g: 100,
    b: 100,
};

/// Floor on the per-tick animal energy cost.
const MIN_ENERGY_LOSS: f64 = 0.1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Food {
    pub size: f64,
    pub energy: f64,
    pub energy_decay: f64,
    pub position: Coordinate,
    initial_energy: f64,
    eaten: bool,
    colour: Rgb,
}

impl Food {
    pub fn new(size: f64, energy: f64, energy_decay: f64, position: Coordinate) -> Self {
        // Richer food renders less red; fixed at creation.
        let offset = FOOD_QUALITY_COLOUR_FACTOR * energy;
        let colour = Rgb {
            r: (f64::from(BASE_FOOD_COLOUR.r) - offset).clamp(0.0, 255.0) as u8,
            g: BASE_FOOD_COLOUR.g,
            b: BASE_FOOD_COLOUR.b,
        };
        Self {
            size,
            energy,
            energy_decay,
            position,
            initial_energy: energy,
            eaten: false,
            colour,
        }
    }

    /// Decays the food's energy. Negative decay rates do not feed.
    pub fn update(&mut self) {
        self.energy -= self.energy_decay.max(0.0);
    }

    pub fn eat(&mut self) {
        self.eaten = true;
    }

    /// Energy at creation; clones are parameterized off this, not the
    /// current (decayed) energy.
    pub fn initial_energy(&self) -> f64 {
        self.initial_energy
    }

    pub fn colour(&self) -> Rgb {
        self.colour
    }

    pub fn is_dead(&self) -> bool {
        self.eaten || self.energy <= 0.0
    }
}

/// Moves `origin` toward `destination` by `speed` units, never overshooting.
/// A zero distance is a no-op.
pub fn move_towards(origin: &mut Coordinate, destination: Coordinate, speed: f64) {
    let distance = origin.distance_to(destination);
    if distance == 0.0 {
        return;
    }
    let factor = (speed / distance).min(1.0);
    origin.x += (destination.x - origin.x) * factor;
    origin.y += (destination.y - origin.y) * factor;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Animal {
    pub size: f64,
    pub speed: f64,
    pub food_size_factor: f64,
    pub position: Coordinate,
    pub vision: NonZeroU32,
    pub food_reach_distance: f64,
    pub energy_loss: f64,
    pub cloning_size: f64,
    pub colour: Rgb,
    /// Remembered across ticks when no fresh target is found; may point at
    /// food another animal has already eaten.
    pub target_position: Option<Coordinate>,
}

impl Animal {
    pub const BASE_COLOUR: Rgb = BASE_ANIMAL_COLOUR;

    /// Runs one tick of this animal against the tick's food snapshot.
    ///
    /// `food_positions` and `food_lookup` were built before any animal
    /// updated this tick; the only food state mutated here is the eaten flag.
    pub fn update<R: Rng>(
        &mut self,
        search: &mut dyn SearchStrategy,
        food_positions: &[Coordinate],
        food_lookup: &HashMap<Coordinate, Vec<usize>>,
        foods: &mut [Food],
        bounds: Coordinate,
        rng: &mut R,
    ) {
        self.size -=
            (self.energy_loss * self.speed * f64::from(self.vision.get())).max(MIN_ENERGY_LOSS);

        let target_positions =
            match search.determine_target_position(self.position, self.vision, food_positions, rng)
            {
                Some(found) => found,
                None => vec![self
                    .target_position
                    .unwrap_or_else(|| random_position(bounds, 0, rng))],
            };

        self.target_position = Some(target_positions[0]);
        move_towards(&mut self.position, target_positions[0], self.speed);
        for &target in &target_positions {
            self.try_eat(target, food_lookup, foods);
        }
    }

    /// Consumes every non-dead food at exactly `target`, if it is in reach.
    ///
    /// A reached target is cleared whether or not any food is still there: a
    /// position with no lookup entry was consumed by someone else already.
    fn try_eat(
        &mut self,
        target: Coordinate,
        food_lookup: &HashMap<Coordinate, Vec<usize>>,
        foods: &mut [Food],
    ) {
        let distance = self.position.distance_to(target);
        if distance > self.food_reach_distance.max(0.0) {
            return;
        }

        self.target_position = None;
        let Some(indices) = food_lookup.get(&target) else {
            return;
        };
        for &idx in indices {
            let food = &mut foods[idx];
            if food.is_dead() {
                continue;
            }
            // Treating the entity as a square: each side grows by the square
            // root of the total size increase.
            self.size += (food.energy * self.food_size_factor).sqrt();
            food.eat();
        }
    }

    pub fn is_dead(&self) -> bool {
        self.size <= 0.0
    }
}
