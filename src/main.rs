use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use veldt_lib::model::config::AppConfig;
use veldt_lib::model::world::World;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the RNG seed from the config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 10_000)]
    ticks: u64,

    /// Log a stats line every N ticks
    #[arg(long, default_value_t = 100)]
    log_every: u64,

    /// Append per-tick population stats to this file as JSON lines
    #[arg(long)]
    stats_out: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(&args.config);
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }

    let mut world = World::new(config)?;
    let mut stats_out = match &args.stats_out {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    for _ in 0..args.ticks {
        let stats = world.update();

        if let Some(file) = stats_out.as_mut() {
            writeln!(file, "{}", serde_json::to_string(&stats)?)?;
        }
        if args.log_every > 0 && stats.tick % args.log_every == 0 {
            tracing::info!(
                tick = stats.tick,
                animals = stats.animal_count,
                foods = stats.food_count,
                mean_vision = stats.mean_vision,
                mean_size = stats.mean_size,
                "tick"
            );
        }
        if stats.animal_count == 0 {
            tracing::info!(tick = stats.tick, "population extinct");
            break;
        }
    }

    let final_stats = world.stats();
    tracing::info!(
        tick = final_stats.tick,
        animals = final_stats.animal_count,
        foods = final_stats.food_count,
        "simulation finished"
    );
    Ok(())
}
