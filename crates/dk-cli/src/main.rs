//! CLI frontend for the Deepkeep world generator and simulation.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dk",
    about = "Deepkeep: generate and simulate dungeon keeper worlds",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log more to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short = 'v', long = "log-verbose", action = ArgAction::Count, global = true)]
    log_verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a world and print its faction roster
    Generate {
        /// RNG seed for deterministic generation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Name of the world
        #[arg(short, long, default_value = "Deepkeep")]
        world: String,

        /// Name of the keeper (drawn from the seed when omitted)
        #[arg(short, long)]
        keeper: Option<String>,

        /// Keeper immigrants arrive much more often
        #[arg(long)]
        fast_immigration: bool,

        /// Keeper starts with a large stock of every resource
        #[arg(long)]
        starting_resources: bool,

        /// Generator config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the world as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate a world and run its turn queue
    Simulate {
        /// RNG seed for generation and actor decisions
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Maximum number of steps
        #[arg(short = 'n', long, default_value = "1000")]
        steps: u64,

        /// Chance per turn that an actor takes a passage
        #[arg(long, default_value = "0.05")]
        travel_chance: f64,

        /// Generator config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show all events (not just summary)
        #[arg(long)]
        verbose: bool,
    },

    /// List the archetypes of the standard catalog
    Catalog,
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_verbosity);

    let result = match cli.command {
        Commands::Generate {
            seed,
            world,
            keeper,
            fast_immigration,
            starting_resources,
            config,
            json,
        } => {
            let options = commands::world_options(world, keeper, fast_immigration, starting_resources);
            commands::generate::run(seed, &options, config.as_deref(), json)
        }
        Commands::Simulate {
            seed,
            steps,
            travel_chance,
            config,
            verbose,
        } => commands::simulate::run(seed, steps, travel_chance, config.as_deref(), verbose),
        Commands::Catalog => commands::catalog::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
