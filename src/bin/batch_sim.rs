//! Headless Batch Simulator
//!
//! Plays many automatic games against the computer and prints aggregate
//! results as JSON or text. Useful for tuning difficulty tables and economy.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use firesync::core::config::GameConfig;
use firesync::core::types::Difficulty;
use firesync::game::AutoStrategy;
use firesync::simulation::{run_batch, BatchConfig};
use firesync::weapons::WeaponCatalog;

const DEFAULT_CONFIG: &str = "data/config.toml";

/// Headless Batch Simulator - automatic player vs computer
#[derive(Parser, Debug)]
#[command(name = "batch_sim")]
#[command(about = "Run many automatic FireSync games and report win rates")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 1000)]
    games: u64,

    /// Computer difficulty: easy, normal or hard
    #[arg(long, default_value = "normal")]
    difficulty: Difficulty,

    /// Player strategy: strongest, cheapest or random
    #[arg(long, default_value = "strongest")]
    strategy: AutoStrategy,

    /// Perk key used in every game
    #[arg(long)]
    perk: Option<String>,

    /// Attachment keys bought before the first round (repeatable)
    #[arg(long = "attachment")]
    attachments: Vec<String>,

    /// Base seed; game i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Game config TOML (defaults to data/config.toml, then built-in values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Weapon catalog TOML
    #[arg(long)]
    weapons: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("firesync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match GameConfig::load_or_default(args.config.as_deref(), Path::new(DEFAULT_CONFIG)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = match &args.weapons {
        Some(path) => WeaponCatalog::load(path),
        None => WeaponCatalog::embedded(),
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Failed to load weapon catalog: {}", e);
            std::process::exit(1);
        }
    };

    let batch = BatchConfig {
        games: args.games,
        difficulty: args.difficulty,
        strategy: args.strategy,
        perk: args.perk.clone(),
        attachments: args.attachments.clone(),
        seed: args.seed.unwrap_or_else(|| rand::random()),
    };

    let report = match run_batch(&catalog, &config, &batch) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Batch failed: {}", e);
            std::process::exit(1);
        }
    };

    let print_json = || match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize report: {}", e),
    };

    match args.format.as_str() {
        "json" => print_json(),
        "text" => {
            println!("Batch Result");
            println!("============");
            println!("Games: {} ({} difficulty, {} strategy)", report.games, report.difficulty, report.strategy);
            println!("Perk: {}", report.perk.as_deref().unwrap_or("none"));
            println!(
                "Games won/lost/drawn: {}/{}/{} ({:.1}% won)",
                report.game_results.wins,
                report.game_results.losses,
                report.game_results.draws,
                report.game_win_rate * 100.0
            );
            println!(
                "Rounds won/lost/drawn: {}/{}/{} ({:.1}% won)",
                report.round_results.wins,
                report.round_results.losses,
                report.round_results.draws,
                report.round_win_rate * 100.0
            );
            println!("Average final balance: ${:.0}", report.average_final_balance);
            println!(
                "Computer tiers (low/medium/high/untiered): {}/{}/{}/{}",
                report.computer_tiers.low,
                report.computer_tiers.medium,
                report.computer_tiers.high,
                report.computer_tiers.untiered
            );
            println!();
            println!("Events:");
            for (event, count) in &report.events {
                println!("  {:<16} {}", event, count);
            }
            println!();
            println!("Seed: {}", report.seed);
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            print_json();
        }
    }
}
