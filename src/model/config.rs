//! Simulation parameters.
//!
//! Every tunable the simulation reads lives here, threaded explicitly
//! through calls; nothing consults global state. Configs deserialize from
//! TOML and validate before the first tick.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::model::error::SimError;

/// Parameters for a bounded random draw.
///
/// `sample` draws from `Normal(average, standard_deviation)`, falling back
/// to `uniform(0, average)` when the normal distribution cannot be
/// constructed. Callers may rely on `sample() >= min` and nothing else
/// about the shape.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct Stat {
    pub average: f64,
    pub standard_deviation: f64,
    pub min: f64,
}

impl Default for Stat {
    fn default() -> Self {
        Self {
            average: 0.0,
            standard_deviation: 0.0,
            min: 0.0,
        }
    }
}

impl Stat {
    pub fn new(average: f64, standard_deviation: f64, min: f64) -> Self {
        Self {
            average,
            standard_deviation,
            min,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let number = match Normal::new(self.average, self.standard_deviation) {
            Ok(normal) => normal.sample(rng),
            Err(_) => rng.gen::<f64>() * self.average,
        };
        number.max(self.min)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FoodParams {
    pub initial_amount: usize,
    pub size: Stat,
    pub energy: Stat,
    pub energy_decay: Stat,
    /// Minimum distance to the world borders when spawning.
    pub screen_offset: u32,
}

impl Default for FoodParams {
    fn default() -> Self {
        Self {
            initial_amount: 250,
            size: Stat::new(5.0, 1.0, 0.0),
            energy: Stat::new(10.0, 5.0, 0.0),
            energy_decay: Stat::new(0.05, 0.0, 0.0),
            screen_offset: 50,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AnimalParams {
    pub initial_amount: usize,
    pub size: Stat,
    pub speed: Stat,
    pub vision: Stat,
    pub food_reach_distance: Stat,
    pub energy_loss: Stat,
    pub food_size_factor: Stat,
    pub cloning_size: Stat,
}

impl Default for AnimalParams {
    fn default() -> Self {
        Self {
            initial_amount: 25,
            size: Stat::new(10.0, 3.0, 0.0),
            speed: Stat::new(2.0, 0.5, 0.0),
            vision: Stat::new(200.0, 75.0, 1.0),
            food_reach_distance: Stat::new(20.0, 0.0, 0.0),
            energy_loss: Stat::new(0.8, 0.4, 0.2),
            food_size_factor: Stat::new(1.0, 0.0, 0.0),
            cloning_size: Stat::new(25.0, 5.0, 0.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FoodClonerConfig {
    /// Independent per-food reproduction chance per tick.
    pub chance: f64,
    pub size_dispersion: f64,
    pub energy_dispersion: f64,
    pub max_dispersion: f64,
    /// Cloning stops entirely above this population size.
    pub max_length: usize,
    pub min_size: f64,
    pub max_size: f64,
}

impl Default for FoodClonerConfig {
    fn default() -> Self {
        Self {
            chance: 0.02,
            size_dispersion: 0.2,
            energy_dispersion: 0.2,
            max_dispersion: 50.0,
            max_length: 500,
            min_size: 1.0,
            max_size: 12.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Position jitter applied to an animal offspring, per axis.
    pub clone_dispersion: u32,
    pub vision_dispersion: u32,
    pub colour_dispersion: i32,
    /// Fraction of the parent's size kept by the parent on a split; the
    /// offspring receives the complement.
    pub cloning_size_factor: f64,
    /// Upper bound of the relative upward drift of an offspring's
    /// cloning threshold.
    pub cloning_size_drift: f64,
    /// Chance per tick that one freshly parameterized animal immigrates.
    pub random_new_animal_chance: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            clone_dispersion: 50,
            vision_dispersion: 20,
            colour_dispersion: 20,
            cloning_size_factor: 0.5,
            cloning_size_drift: 0.1,
            random_new_animal_chance: 0.01,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ClusterConfig {
    pub bin_resolution: u32,
    pub lerp_factor: f64,
    /// Number of clustering passes chained at spawn time.
    pub passes: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            bin_resolution: 100,
            lerp_factor: 0.1,
            passes: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub max_entities_considered: usize,
    pub max_determined_targets: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_entities_considered: 100,
            max_determined_targets: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub food: FoodParams,
    pub animal: AnimalParams,
    pub cloner: FoodClonerConfig,
    pub evolution: EvolutionConfig,
    pub cluster: ClusterConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    /// Loads the config from a TOML file, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path.as_ref()) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}", path.as_ref().display());
                }
            },
            Err(_) => {
                tracing::debug!("No config at {}, using defaults", path.as_ref().display());
            }
        }
        Self::default()
    }

    /// Rejects configurations the simulation cannot run on. Called before
    /// the first tick; nothing is clamped mid-simulation.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(SimError::invalid_config("world dimensions must be > 0"));
        }
        if 2 * self.food.screen_offset >= self.world.width.min(self.world.height) {
            return Err(SimError::invalid_config(
                "food.screen_offset must fit twice inside the world",
            ));
        }
        if self.animal.vision.min < 1.0 {
            return Err(SimError::invalid_config(
                "animal.vision.min must be >= 1 (vision doubles as a bin resolution)",
            ));
        }
        if self.cluster.bin_resolution == 0 {
            return Err(SimError::invalid_config("cluster.bin_resolution must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.cluster.lerp_factor) {
            return Err(SimError::invalid_config("cluster.lerp_factor must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.cloner.chance) {
            return Err(SimError::invalid_config("cloner.chance must be in [0, 1]"));
        }
        if self.cloner.max_dispersion < 0.0
            || self.cloner.size_dispersion < 0.0
            || self.cloner.energy_dispersion < 0.0
        {
            return Err(SimError::invalid_config("cloner dispersions must be >= 0"));
        }
        if self.cloner.min_size > self.cloner.max_size {
            return Err(SimError::invalid_config("cloner.min_size must be <= max_size"));
        }
        if !(0.0..1.0).contains(&self.evolution.cloning_size_factor)
            || self.evolution.cloning_size_factor <= 0.0
        {
            return Err(SimError::invalid_config(
                "evolution.cloning_size_factor must be in (0, 1)",
            ));
        }
        if self.evolution.colour_dispersion < 0 {
            return Err(SimError::invalid_config("evolution.colour_dispersion must be >= 0"));
        }
        if self.evolution.cloning_size_drift < 0.0 {
            return Err(SimError::invalid_config("evolution.cloning_size_drift must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.evolution.random_new_animal_chance) {
            return Err(SimError::invalid_config(
                "evolution.random_new_animal_chance must be in [0, 1]",
            ));
        }
        if self.search.max_entities_considered == 0 || self.search.max_determined_targets == 0 {
            return Err(SimError::invalid_config("search limits must be >= 1"));
        }
        Ok(())
    }
}
