//! Per-tick population aggregates.
//!
//! The core only captures the numbers; formatting, plotting and persistence
//! belong to whatever samples them.

use serde::{Deserialize, Serialize};

use crate::model::entity::{Animal, Food};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PopulationStats {
    pub tick: u64,
    pub animal_count: usize,
    pub food_count: usize,
    pub mean_vision: f64,
    pub mean_size: f64,
    pub mean_speed: f64,
    pub mean_energy_loss: f64,
    pub mean_food_energy: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn capture(tick: u64, foods: &[Food], animals: &[Animal]) -> PopulationStats {
    PopulationStats {
        tick,
        animal_count: animals.len(),
        food_count: foods.len(),
        mean_vision: mean(animals.iter().map(|a| f64::from(a.vision.get()))),
        mean_size: mean(animals.iter().map(|a| a.size)),
        mean_speed: mean(animals.iter().map(|a| a.speed)),
        mean_energy_loss: mean(animals.iter().map(|a| a.energy_loss)),
        mean_food_energy: mean(foods.iter().map(|f| f.energy)),
    }
}
