//! Death timing: underflowed entities stay visible for the remainder of
//! their tick and leave exactly once, at the start of the following tick.

use std::num::NonZeroU32;

use veldt_lib::model::config::AppConfig;
use veldt_lib::model::coordinate::Coordinate;
use veldt_lib::model::entity::{Animal, Food};
use veldt_lib::model::world::World;

fn empty_world(seed: u64) -> World {
    let mut config = AppConfig::default();
    config.world.seed = Some(seed);
    config.food.initial_amount = 0;
    config.animal.initial_amount = 0;
    config.cloner.chance = 0.0;
    config.evolution.random_new_animal_chance = 0.0;
    World::new(config).unwrap()
}

#[test]
fn test_starved_food_is_filtered_next_tick() {
    let mut world = empty_world(1);
    world
        .foods
        .push(Food::new(5.0, 0.5, 1.0, Coordinate::new(10.5, 10.5)));

    world.update();
    assert_eq!(world.foods.len(), 1, "dead food lingers until next tick");
    assert!(world.foods[0].is_dead());
    assert!(world.foods[0].energy < 0.0);

    world.update();
    assert!(world.foods.is_empty(), "filtered exactly once, at tick start");
}

#[test]
fn test_starved_animal_is_filtered_next_tick() {
    let mut world = empty_world(1);
    world.animals.push(Animal {
        size: 0.05,
        speed: 1.0,
        food_size_factor: 1.0,
        position: Coordinate::new(10.0, 10.0),
        vision: NonZeroU32::new(5).unwrap(),
        food_reach_distance: 10.0,
        energy_loss: 0.0,
        cloning_size: 1e9,
        colour: Animal::BASE_COLOUR,
        target_position: None,
    });

    world.update();
    assert_eq!(world.animals.len(), 1, "dead animal lingers until next tick");
    assert!(world.animals[0].is_dead());

    world.update();
    assert!(world.animals.is_empty());
}

#[test]
fn test_no_live_entity_carries_negative_vitals_across_a_tick() {
    let mut config = AppConfig::default();
    config.world.seed = Some(99);
    config.food.initial_amount = 40;
    config.animal.initial_amount = 10;
    let mut world = World::new(config).unwrap();

    for _ in 0..50 {
        world.update();
        // Anything negative after this tick must be flagged dead, so the
        // next tick's filter removes it.
        for food in &world.foods {
            if food.energy <= 0.0 {
                assert!(food.is_dead());
            }
        }
        for animal in &world.animals {
            if animal.size <= 0.0 {
                assert!(animal.is_dead());
            }
        }
    }
}

#[test]
fn test_dead_food_is_not_eaten() {
    let mut world = empty_world(4);
    let position = Coordinate::new(100.0, 100.0);
    let mut spoiled = Food::new(5.0, 10.0, 0.0, position);
    spoiled.eat();
    world.foods.push(spoiled);
    world.animals.push(Animal {
        size: 10.0,
        speed: 2.0,
        food_size_factor: 1.0,
        position,
        vision: NonZeroU32::new(5).unwrap(),
        food_reach_distance: 50.0,
        energy_loss: 0.0,
        cloning_size: 1e9,
        colour: Animal::BASE_COLOUR,
        target_position: None,
    });

    world.update();
    // The spoiled food was filtered before the animal ran; only the flat
    // cost applies.
    assert!((world.animals[0].size - 9.9).abs() < 1e-9);
}
