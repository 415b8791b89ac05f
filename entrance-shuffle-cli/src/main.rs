use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

use entrance_shuffle_core::{
    set_entrances, MaximalExplorer, ShuffleOptions, World, WorldDescription, WorldId,
    DEFAULT_RESTRICTIVE_RETRIES,
};

#[derive(Debug, Parser)]
#[command(name = "entrance-shuffle", version, about = "Dungeon entrance shuffler")]
struct Args {
    /// World description JSON file. Pass once per player; ids follow the order given.
    #[arg(long = "world", value_name = "FILE", required = true)]
    worlds: Vec<PathBuf>,

    #[arg(long)]
    seed: u64,

    /// Placement attempts per world before giving up.
    #[arg(long, default_value_t = DEFAULT_RESTRICTIVE_RETRIES)]
    retries: usize,

    /// Write the entrance table here instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn load_world(path: &Path, id: WorldId) -> Result<World> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("Unable to read world file {}", path.display()))?;
    let description = WorldDescription::from_json(&src)
        .with_context(|| format!("Unable to parse world file {}", path.display()))?;
    description
        .build(id)
        .with_context(|| format!("Invalid world in {}", path.display()))
}

fn run(args: Args) -> Result<()> {
    let mut worlds = args
        .worlds
        .iter()
        .enumerate()
        .map(|(idx, path)| load_world(path, WorldId(idx)))
        .collect::<Result<Vec<_>>>()?;

    let options = ShuffleOptions {
        restrictive_retries: args.retries,
    };
    let mut rng = StdRng::seed_from_u64(args.seed);
    let table = set_entrances(&mut worlds, &MaximalExplorer, &mut rng, &options, |worlds| {
        for world in worlds.iter() {
            info!(
                "World {}: {} shuffled entrances",
                world.id,
                world.get_shuffled_entrances().len()
            );
        }
    })
    .with_context(|| format!("Entrance shuffle failed for seed {}", args.seed))?;

    let json = serde_json::to_string_pretty(&table)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Unable to write {}", path.display()))?;
            info!("Wrote entrance table to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
