//! # Veldt
//!
//! A predator/prey population simulator: food clumps across a plane, animals
//! hunt it through an approximate spatial index, and both populations evolve
//! through energy decay, mutation-bearing asexual reproduction and random
//! immigration.
//!
//! The crate is the simulation core only. It exposes plain data and update
//! functions; drawing, input and plotting are external collaborators that
//! read [`model::world::World::render_views`] and the per-tick
//! [`model::systems::stats::PopulationStats`].
//!
//! ## Example
//!
//! ```
//! use veldt_lib::model::config::AppConfig;
//! use veldt_lib::model::world::World;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = Some(42);
//! let mut world = World::new(config).unwrap();
//! let stats = world.update();
//! assert_eq!(stats.tick, 1);
//! ```

pub mod model;
