//! Population controller.
//!
//! The `World` owns the canonical food and animal sequences and drives one
//! logical tick at a time. A tick runs in a fixed order: search-cache reset,
//! death filtering, food cloning, animal updates, food updates, animal
//! cloning, immigration. The order is observable (dead entities survive
//! until the start of the next tick; contested food goes to the animal that
//! updates first) and is part of the contract. A tick is atomic from the
//! outside; nothing suspends or recovers mid-tick.

use std::collections::HashMap;
use std::num::NonZeroU32;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::binning::PositionBinner;
use crate::model::cluster::{
    CompositePositionClusterer, PositionClusterer, SimplePositionClusterer,
};
use crate::model::config::{AnimalParams, AppConfig, ClusterConfig, FoodParams, Stat};
use crate::model::coordinate::Coordinate;
use crate::model::entity::{Animal, Food, Rgb};
use crate::model::error::SimError;
use crate::model::search::{GridSearch, SearchStrategy};
use crate::model::systems::{cloning, stats};
use crate::model::systems::stats::PopulationStats;

/// Read-only drawing view of one live entity.
#[derive(Clone, Copy, Debug)]
pub struct RenderView {
    pub position: Coordinate,
    pub size: f64,
    pub colour: Rgb,
}

pub struct World {
    pub config: AppConfig,
    pub foods: Vec<Food>,
    pub animals: Vec<Animal>,
    pub tick: u64,
    search: Box<dyn SearchStrategy>,
    rng: ChaCha8Rng,
}

impl World {
    /// Validates the config, spawns both populations and builds the search
    /// service. Invalid configuration fails here, before the first tick.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let mut rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let bounds = world_bounds(&config);
        let clusterer = build_clusterer(&config.cluster)?;
        let foods = spawn_foods(&config.food, clusterer.as_ref(), bounds, &mut rng);
        let animals = spawn_animals(&config.animal, config.animal.initial_amount, bounds, &mut rng);
        let search = Box::new(GridSearch::new(
            config.search.max_entities_considered,
            config.search.max_determined_targets,
        ));

        tracing::info!(
            foods = foods.len(),
            animals = animals.len(),
            seed = ?config.world.seed,
            "world spawned"
        );

        Ok(Self {
            config,
            foods,
            animals,
            tick: 0,
            search,
            rng,
        })
    }

    /// Advances the simulation by one tick and returns its aggregates.
    pub fn update(&mut self) -> PopulationStats {
        self.tick += 1;
        let bounds = world_bounds(&self.config);

        // A cache held over from the previous tick would serve positions of
        // entities that died or moved.
        self.search.update();

        // Entities that underflowed last tick leave now, in one place.
        self.animals.retain(|animal| !animal.is_dead());
        self.foods.retain(|food| !food.is_dead());

        cloning::clone_foods(&mut self.foods, &self.config.cloner, bounds, &mut self.rng);

        // Snapshot the food index once; animal updates go through these
        // indices and mutate nothing but the eaten flags behind them.
        let food_positions: Vec<Coordinate> = self.foods.iter().map(|f| f.position).collect();
        let mut food_lookup: HashMap<Coordinate, Vec<usize>> = HashMap::new();
        for (idx, food) in self.foods.iter().enumerate() {
            food_lookup.entry(food.position).or_default().push(idx);
        }

        // Newest animals act first. Contested same-position food goes to
        // whoever updates first; the order is observable and fixed.
        for idx in (0..self.animals.len()).rev() {
            self.animals[idx].update(
                self.search.as_mut(),
                &food_positions,
                &food_lookup,
                &mut self.foods,
                bounds,
                &mut self.rng,
            );
        }

        for food in &mut self.foods {
            food.update();
        }

        cloning::clone_animals(&mut self.animals, &self.config.evolution, &mut self.rng);
        cloning::immigrate(
            &mut self.animals,
            &self.config.animal,
            self.config.evolution.random_new_animal_chance,
            bounds,
            &mut self.rng,
        );

        let stats = stats::capture(self.tick, &self.foods, &self.animals);
        tracing::debug!(
            tick = stats.tick,
            animals = stats.animal_count,
            foods = stats.food_count,
            "tick complete"
        );
        stats
    }

    /// Current aggregates without advancing the simulation.
    pub fn stats(&self) -> PopulationStats {
        stats::capture(self.tick, &self.foods, &self.animals)
    }

    /// One view per live entity, foods first, for an external drawing layer.
    pub fn render_views(&self) -> Vec<RenderView> {
        self.foods
            .iter()
            .filter(|f| !f.is_dead())
            .map(|f| RenderView {
                position: f.position,
                size: f.size,
                colour: f.colour(),
            })
            .chain(
                self.animals
                    .iter()
                    .filter(|a| !a.is_dead())
                    .map(|a| RenderView {
                        position: a.position,
                        size: a.size,
                        colour: a.colour,
                    }),
            )
            .collect()
    }
}

fn world_bounds(config: &AppConfig) -> Coordinate {
    Coordinate::new(f64::from(config.world.width), f64::from(config.world.height))
}

/// A random position on integral world coordinates, at least `offset` away
/// from every border.
pub fn random_position<R: Rng + ?Sized>(bounds: Coordinate, offset: u32, rng: &mut R) -> Coordinate {
    Coordinate::new(
        f64::from(rng.gen_range(offset..=(bounds.x as u32 - offset))),
        f64::from(rng.gen_range(offset..=(bounds.y as u32 - offset))),
    )
}

/// Builds the spawn-time clusterer: `passes` identical lerp stages chained
/// behind one interface.
pub fn build_clusterer(cfg: &ClusterConfig) -> Result<Box<dyn PositionClusterer>, SimError> {
    let resolution = NonZeroU32::new(cfg.bin_resolution)
        .ok_or_else(|| SimError::invalid_config("cluster.bin_resolution must be > 0"))?;
    let stages = (0..cfg.passes)
        .map(|_| {
            SimplePositionClusterer::new(PositionBinner::new(resolution), cfg.lerp_factor)
                .map(|stage| Box::new(stage) as Box<dyn PositionClusterer>)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Box::new(CompositePositionClusterer::new(stages)))
}

/// Spawns the initial food population: uniformly random positions pulled
/// into clumps by the clusterer, then parameterized per food.
pub fn spawn_foods<R: Rng>(
    params: &FoodParams,
    clusterer: &dyn PositionClusterer,
    bounds: Coordinate,
    rng: &mut R,
) -> Vec<Food> {
    let positions: Vec<Coordinate> = (0..params.initial_amount)
        .map(|_| random_position(bounds, params.screen_offset, rng))
        .collect();

    clusterer
        .cluster_positions(&positions)
        .into_iter()
        .map(|position| {
            Food::new(
                params.size.sample(rng),
                params.energy.sample(rng).max(0.0),
                params.energy_decay.sample(rng),
                position,
            )
        })
        .collect()
}

fn sample_vision<R: Rng + ?Sized>(stat: &Stat, rng: &mut R) -> NonZeroU32 {
    NonZeroU32::new((stat.sample(rng) as u32).max(1)).unwrap_or(NonZeroU32::MIN)
}

/// One freshly parameterized animal at a random position.
pub fn spawn_animal<R: Rng + ?Sized>(
    params: &AnimalParams,
    bounds: Coordinate,
    rng: &mut R,
) -> Animal {
    Animal {
        size: params.size.sample(rng),
        speed: params.speed.sample(rng),
        food_size_factor: params.food_size_factor.sample(rng),
        position: random_position(bounds, 0, rng),
        vision: sample_vision(&params.vision, rng),
        food_reach_distance: params.food_reach_distance.sample(rng),
        energy_loss: params.energy_loss.sample(rng),
        cloning_size: params.cloning_size.sample(rng),
        colour: Animal::BASE_COLOUR,
        target_position: None,
    }
}

/// Spawns the initial animal population.
pub fn spawn_animals<R: Rng>(
    params: &AnimalParams,
    count: usize,
    bounds: Coordinate,
    rng: &mut R,
) -> Vec<Animal> {
    (0..count).map(|_| spawn_animal(params, bounds, rng)).collect()
}
