//! Reproduction and immigration.
//!
//! Both cloning passes scan a population that must not change under them:
//! new entities go into a side buffer and are appended only after the scan
//! completes.

use rand::Rng;

use crate::model::config::{AnimalParams, EvolutionConfig, FoodClonerConfig};
use crate::model::coordinate::Coordinate;
use crate::model::entity::{Animal, Food, Rgb};
use crate::model::world::spawn_animal;

/// Uniform draw in `±factor`.
fn dispersion_factor<R: Rng + ?Sized>(factor: f64, rng: &mut R) -> f64 {
    (rng.gen::<f64>() - 0.5) * 2.0 * factor
}

/// Stochastic food reproduction with bounded dispersion.
///
/// Skipped entirely once the population exceeds `max_length`; otherwise each
/// food independently clones with probability `chance`.
pub fn clone_foods<R: Rng>(
    foods: &mut Vec<Food>,
    cfg: &FoodClonerConfig,
    bounds: Coordinate,
    rng: &mut R,
) {
    if foods.is_empty() || foods.len() > cfg.max_length {
        return;
    }

    let mut spawned = Vec::new();
    for food in foods.iter() {
        if rng.gen::<f64>() >= cfg.chance {
            continue;
        }
        let position = Coordinate::new(
            disperse_axis(bounds.x, food.position.x, cfg, rng),
            disperse_axis(bounds.y, food.position.y, cfg, rng),
        );
        spawned.push(clone_food(food, position, cfg, rng));
    }
    foods.append(&mut spawned);
}

/// Offsets one axis by a bounded random amount, keeping the result at least
/// half a dispersion away from the world edge.
fn disperse_axis<R: Rng + ?Sized>(
    screen_dimension: f64,
    food_coordinate: f64,
    cfg: &FoodClonerConfig,
    rng: &mut R,
) -> f64 {
    let half_dispersion = cfg.max_dispersion / 2.0;
    let value = food_coordinate + dispersion_factor(cfg.max_dispersion, rng);
    value.clamp(half_dispersion, screen_dimension - half_dispersion)
}

fn clone_food<R: Rng + ?Sized>(
    food: &Food,
    position: Coordinate,
    cfg: &FoodClonerConfig,
    rng: &mut R,
) -> Food {
    let size_factor = 1.0 + dispersion_factor(cfg.size_dispersion, rng);
    let energy_factor = 1.0 + dispersion_factor(cfg.energy_dispersion, rng);
    Food::new(
        (size_factor * food.size).clamp(cfg.min_size, cfg.max_size),
        energy_factor * food.initial_energy(),
        0.8 * energy_factor * food.energy_decay,
        position,
    )
}

/// Splits every animal grown past its cloning threshold.
///
/// The parent keeps `cloning_size_factor` of its size and the offspring
/// receives the complement, so a split conserves size exactly. Offspring
/// attributes are jittered copies; the inherited target is dropped.
pub fn clone_animals<R: Rng>(animals: &mut Vec<Animal>, cfg: &EvolutionConfig, rng: &mut R) {
    let mut offspring = Vec::new();
    for animal in animals.iter_mut() {
        if animal.size <= animal.cloning_size {
            continue;
        }

        let parent_size = animal.size;
        animal.size = parent_size * cfg.cloning_size_factor;

        let mut child = animal.clone();
        child.size = parent_size - animal.size;
        child.position = Coordinate::new(
            animal.position.x + f64::from(rng.gen_range(0..=cfg.clone_dispersion)),
            animal.position.y + f64::from(rng.gen_range(0..=cfg.clone_dispersion)),
        );
        child.colour = Rgb {
            r: jitter_channel(animal.colour.r, cfg.colour_dispersion, rng),
            g: jitter_channel(animal.colour.g, cfg.colour_dispersion, rng),
            b: jitter_channel(animal.colour.b, cfg.colour_dispersion, rng),
        };
        child.vision = jitter_vision(animal.vision, cfg.vision_dispersion, rng);
        child.cloning_size = animal.cloning_size * (1.0 + rng.gen::<f64>() * cfg.cloning_size_drift);
        child.speed = animal.speed * (1.0 + (rng.gen::<f64>() - 0.5) / 10.0);
        child.energy_loss = animal.energy_loss * (1.0 + (rng.gen::<f64>() - 0.5) / 10.0);
        child.target_position = None;
        offspring.push(child);
    }
    animals.append(&mut offspring);
}

fn jitter_channel<R: Rng + ?Sized>(channel: u8, dispersion: i32, rng: &mut R) -> u8 {
    (i32::from(channel) + rng.gen_range(-dispersion..=dispersion)).clamp(0, 255) as u8
}

fn jitter_vision<R: Rng + ?Sized>(
    vision: std::num::NonZeroU32,
    dispersion: u32,
    rng: &mut R,
) -> std::num::NonZeroU32 {
    let d = i64::from(dispersion);
    let jittered = i64::from(vision.get()) + rng.gen_range(-d..=d);
    std::num::NonZeroU32::new(jittered.max(1) as u32)
        .unwrap_or(std::num::NonZeroU32::MIN)
}

/// With probability `chance`, appends one entirely new randomly
/// parameterized animal, independent of reproduction.
pub fn immigrate<R: Rng>(
    animals: &mut Vec<Animal>,
    params: &AnimalParams,
    chance: f64,
    bounds: Coordinate,
    rng: &mut R,
) {
    if rng.gen::<f64>() < chance {
        animals.push(spawn_animal(params, bounds, rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::num::NonZeroU32;

    fn parent_animal(size: f64, cloning_size: f64) -> Animal {
        Animal {
            size,
            speed: 2.0,
            food_size_factor: 1.0,
            position: Coordinate::new(100.0, 100.0),
            vision: NonZeroU32::new(50).unwrap(),
            food_reach_distance: 10.0,
            energy_loss: 0.5,
            cloning_size,
            colour: Animal::BASE_COLOUR,
            target_position: Some(Coordinate::new(1.0, 1.0)),
        }
    }

    #[test]
    fn test_food_cloning_respects_population_cap() {
        let cfg = FoodClonerConfig {
            chance: 1.0,
            max_length: 2,
            ..FoodClonerConfig::default()
        };
        let mut foods = vec![
            Food::new(5.0, 10.0, 0.1, Coordinate::new(100.0, 100.0));
            3
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        clone_foods(&mut foods, &cfg, Coordinate::new(800.0, 600.0), &mut rng);
        assert_eq!(foods.len(), 3);
    }

    #[test]
    fn test_food_clones_stay_within_bounds_and_size_limits() {
        let cfg = FoodClonerConfig {
            chance: 1.0,
            ..FoodClonerConfig::default()
        };
        let bounds = Coordinate::new(800.0, 600.0);
        let half = cfg.max_dispersion / 2.0;
        // Parent hugging the border: clones must be pushed back inside.
        let mut foods = vec![Food::new(11.9, 10.0, 0.1, Coordinate::new(1.0, 599.0))];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            clone_foods(&mut foods, &cfg, bounds, &mut rng);
            if foods.len() > cfg.max_length {
                break;
            }
        }
        assert!(foods.len() > 1);
        for food in &foods[1..] {
            assert!(food.position.x >= half && food.position.x <= bounds.x - half);
            assert!(food.position.y >= half && food.position.y <= bounds.y - half);
            assert!(food.size >= cfg.min_size && food.size <= cfg.max_size);
        }
    }

    #[test]
    fn test_food_clone_energy_derives_from_initial_energy() {
        let cfg = FoodClonerConfig {
            chance: 1.0,
            energy_dispersion: 0.0,
            size_dispersion: 0.0,
            ..FoodClonerConfig::default()
        };
        let mut parent = Food::new(5.0, 10.0, 1.0, Coordinate::new(400.0, 300.0));
        parent.update();
        assert_eq!(parent.energy, 9.0);

        let mut foods = vec![parent];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        clone_foods(&mut foods, &cfg, Coordinate::new(800.0, 600.0), &mut rng);
        assert_eq!(foods.len(), 2);
        // Dispersions are zero: energy comes straight off the parent's
        // creation-time energy, decay is scaled by 0.8.
        assert_eq!(foods[1].energy, 10.0);
        assert!((foods[1].energy_decay - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_animal_split_conserves_size() {
        let cfg = EvolutionConfig::default();
        let mut animals = vec![parent_animal(100.0, 25.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        clone_animals(&mut animals, &cfg, &mut rng);

        assert_eq!(animals.len(), 2);
        let (parent, child) = (&animals[0], &animals[1]);
        assert!((parent.size + child.size - 100.0).abs() < 1e-9);
        assert!((parent.size - 100.0 * cfg.cloning_size_factor).abs() < 1e-9);
    }

    #[test]
    fn test_offspring_jitter_stays_within_bounds() {
        let cfg = EvolutionConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let mut animals = vec![parent_animal(100.0, 25.0)];
            let parent = animals[0].clone();
            clone_animals(&mut animals, &cfg, &mut rng);
            let child = &animals[1];

            assert!(child.position.x >= parent.position.x);
            assert!(child.position.x <= parent.position.x + f64::from(cfg.clone_dispersion));
            assert!(
                i64::from(child.vision.get()) - i64::from(parent.vision.get())
                    <= i64::from(cfg.vision_dispersion)
            );
            assert!(child.vision.get() >= 1);
            assert!(child.cloning_size >= parent.cloning_size);
            assert!(child.cloning_size <= parent.cloning_size * (1.0 + cfg.cloning_size_drift));
            assert!((child.speed / parent.speed - 1.0).abs() <= 0.05);
            assert!((child.energy_loss / parent.energy_loss - 1.0).abs() <= 0.05);
            assert_eq!(child.target_position, None);
        }
    }

    #[test]
    fn test_undersized_animals_do_not_split() {
        let cfg = EvolutionConfig::default();
        let mut animals = vec![parent_animal(10.0, 25.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        clone_animals(&mut animals, &cfg, &mut rng);
        assert_eq!(animals.len(), 1);
    }

    #[test]
    fn test_vision_jitter_floors_at_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..100 {
            let v = jitter_vision(NonZeroU32::new(2).unwrap(), 20, &mut rng);
            assert!(v.get() >= 1);
        }
    }

    #[test]
    fn test_immigration_is_chance_gated() {
        let params = AnimalParams::default();
        let bounds = Coordinate::new(800.0, 600.0);
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        let mut animals = Vec::new();
        immigrate(&mut animals, &params, 0.0, bounds, &mut rng);
        assert!(animals.is_empty());

        immigrate(&mut animals, &params, 1.0, bounds, &mut rng);
        assert_eq!(animals.len(), 1);
        assert!(animals[0].vision.get() >= 1);
    }
}
