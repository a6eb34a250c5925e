//! FireSync - Entry Point
//!
//! Interactive console game: from the main menu pick a team and a perk, then
//! buy one weapon per round and see whether it beats the computer's pick.
//! Games can be replayed until the player exits.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use firesync::core::config::GameConfig;
use firesync::core::error::Result;
use firesync::core::types::{Difficulty, Outcome};
use firesync::engine::ScoringWeights;
use firesync::game::{GameSession, Profile, RoundReport};
use firesync::weapons::{WeaponCatalog, WeaponInstance};

const DEFAULT_CONFIG: &str = "data/config.toml";
const DEFAULT_WEAPONS: &str = "data/weapons.toml";

/// FireSync - turn-based weapon battles against the computer
#[derive(Parser, Debug)]
#[command(name = "firesync")]
#[command(about = "Buy a weapon each round and out-score the computer")]
struct Args {
    /// Game config TOML (defaults to data/config.toml, then built-in values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Weapon catalog TOML (defaults to data/weapons.toml, then the built-in catalog)
    #[arg(long)]
    weapons: Option<PathBuf>,

    /// Computer difficulty: easy, normal or hard
    #[arg(long, default_value = "normal")]
    difficulty: Difficulty,

    /// Perk key to use for the whole game (asked interactively if omitted)
    #[arg(long)]
    perk: Option<String>,

    /// Random seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Profile file to update with the result
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Player name stored in a new profile
    #[arg(long, default_value = "player")]
    name: String,

    /// Print the weapon table and exit
    #[arg(long)]
    list: bool,

    /// Print perks and attachments and exit
    #[arg(long)]
    perks: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("firesync=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = GameConfig::load_or_default(args.config.as_deref(), Path::new(DEFAULT_CONFIG))?;
    let catalog = load_catalog(args.weapons.as_deref())?;

    if args.list {
        print_weapon_table(&catalog, &config.scoring);
        return Ok(());
    }
    if args.perks {
        print_modifiers(&config);
        return Ok(());
    }

    let mut profile = match &args.profile {
        Some(path) => Some(Profile::load_or_default(path, &args.name)?),
        None => None,
    };

    println!("\n=== FIRESYNC ===");
    println!("{} rounds against the computer ({} difficulty)", config.rounds.len(), args.difficulty);

    let mut games = 0u64;
    loop {
        println!();
        println!("Menu");
        println!("--------");
        println!(" 1. Play");
        println!(" 2. Weapon table");
        println!(" 3. Perks and attachments");
        println!(" 4. Exit");

        let Some(input) = prompt("\nYour choice: ")? else {
            break;
        };
        match MenuChoice::parse(&input) {
            Some(MenuChoice::Play) => {
                let seed = match args.seed {
                    Some(seed) => seed.wrapping_add(games),
                    None => rand::random(),
                };
                games += 1;
                play_game(&args, &catalog, &config, seed, profile.as_mut())?;
            }
            Some(MenuChoice::WeaponTable) => print_weapon_table(&catalog, &config.scoring),
            Some(MenuChoice::Modifiers) => print_modifiers(&config),
            Some(MenuChoice::Exit) => break,
            None => println!("Please enter a number between 1 and 4"),
        }
    }

    Ok(())
}

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Play,
    WeaponTable,
    Modifiers,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "p" | "play" => Some(Self::Play),
            "2" | "w" | "weapons" => Some(Self::WeaponTable),
            "3" | "m" | "perks" => Some(Self::Modifiers),
            "4" | "q" | "exit" | "quit" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Side the player fights for; cosmetic only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Team {
    Terrorists,
    CounterTerrorists,
}

impl Team {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "t" => Some(Self::Terrorists),
            "2" | "ct" => Some(Self::CounterTerrorists),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Terrorists => "Terrorists",
            Self::CounterTerrorists => "Counter-Terrorists",
        }
    }
}

fn choose_team() -> Result<Option<Team>> {
    println!();
    println!("1) T");
    println!("2) CT");
    loop {
        let Some(input) = prompt("Please select your team: ")? else {
            return Ok(None);
        };
        match Team::parse(&input) {
            Some(team) => return Ok(Some(team)),
            None => println!("Please enter 1 (T) or 2 (CT)"),
        }
    }
}

/// One full game from team selection to the final result
fn play_game(
    args: &Args,
    catalog: &WeaponCatalog,
    config: &GameConfig,
    seed: u64,
    mut profile: Option<&mut Profile>,
) -> Result<()> {
    let Some(team) = choose_team()? else {
        return Ok(());
    };
    println!("Playing for the {}", team.label());

    let perk = match args.perk.clone() {
        Some(perk) => Some(perk),
        None => choose_perk(config)?,
    };

    let mut session = GameSession::new(catalog, config, args.difficulty, perk.as_deref(), seed)?;
    tracing::info!(seed, "Session seed");

    while let Some(round) = session.current_round() {
        let Some(report) = play_turn(&mut session, config, round)? else {
            println!("\nGame abandoned.");
            return Ok(());
        };
        print_report(&report);
        let board = session.scoreboard();
        println!("Score Table : {} - {} ({} drawn)", board.wins, board.losses, board.draws);
        if let Some(profile) = profile.as_deref_mut() {
            profile.record_round(&report);
        }
    }

    let summary = session.summary();
    println!();
    println!("=== Game Over ===");
    println!(
        "Rounds won: {}, lost: {}, drawn: {}",
        summary.scoreboard.wins, summary.scoreboard.losses, summary.scoreboard.draws
    );
    println!("Final balance: ${}", summary.final_balance);
    println!(
        "{}",
        match summary.outcome {
            Outcome::Win => "You win the game!",
            Outcome::Loss => "The computer wins the game.",
            Outcome::Draw => "The game is a draw.",
        }
    );
    println!("Seed: {}", seed);

    if let (Some(profile), Some(path)) = (profile, args.profile.as_deref()) {
        profile.record_game(&summary);
        profile.save(path)?;
        println!(
            "Profile '{}': {} games, {:.0}% won, favorite weapon: {}",
            profile.name,
            profile.games_played(),
            profile.win_rate() * 100.0,
            profile.favorite_weapon().unwrap_or("-")
        );
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<WeaponCatalog> {
    match path {
        Some(path) => WeaponCatalog::load(path),
        None if Path::new(DEFAULT_WEAPONS).exists() => WeaponCatalog::load(Path::new(DEFAULT_WEAPONS)),
        None => WeaponCatalog::embedded(),
    }
}

/// Read one trimmed line; `None` on end of input
fn prompt(message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn choose_perk(config: &GameConfig) -> Result<Option<String>> {
    if config.perks.is_empty() {
        return Ok(None);
    }

    println!();
    println!("Perks (one for the whole game):");
    println!("  0) none");
    for (i, perk) in config.perks.iter().enumerate() {
        println!("  {}) {} - {}", i + 1, perk.name, perk.description);
    }

    loop {
        let Some(input) = prompt("Select your perk: ")? else {
            return Ok(None);
        };
        match input.parse::<usize>() {
            Ok(0) => return Ok(None),
            Ok(n) if n <= config.perks.len() => return Ok(Some(config.perks[n - 1].key.clone())),
            _ => println!("Please enter a number between 0 and {}", config.perks.len()),
        }
    }
}

/// Run the menu for one round; `None` when the player quits
fn play_turn(session: &mut GameSession<'_>, config: &GameConfig, round: u32) -> Result<Option<RoundReport>> {
    loop {
        let offers = session.offers();
        let category = session.round_plan().map(|p| p.category.label()).unwrap_or("-");

        println!();
        println!(
            "--- Round {}/{} | {} | Balance: ${} ---",
            round,
            session.total_rounds(),
            category,
            session.balance()
        );
        for (i, offer) in offers.iter().enumerate() {
            println!(
                "  {}) {:<14} ${:<5} score {:>8.1}{}",
                i + 1,
                offer.weapon.name,
                offer.weapon.price,
                offer.weapon.balanced_score,
                if offer.affordable { "" } else { "  (can't afford)" }
            );
        }

        let Some(input) = prompt("Select your weapon ('a' attachments, 'q' quit): ")? else {
            return Ok(None);
        };

        match input.as_str() {
            "q" | "quit" => return Ok(None),
            "a" => {
                buy_attachment_menu(session, config)?;
                continue;
            }
            _ => {}
        }

        let Some(offer) = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| offers.get(idx))
        else {
            println!("Please enter a number between 1 and {}", offers.len());
            continue;
        };

        match session.play_round(&offer.weapon.name) {
            Ok(report) => return Ok(Some(report)),
            Err(e) => println!("{}", e),
        }
    }
}

fn buy_attachment_menu(session: &mut GameSession<'_>, config: &GameConfig) -> Result<()> {
    println!();
    println!("Attachments (kept for the rest of the game):");
    for (i, attachment) in config.attachments.iter().enumerate() {
        let owned = session.attachments().contains(&attachment.key);
        println!(
            "  {}) {:<18} ${:<5}{}",
            i + 1,
            attachment.name,
            attachment.price,
            if owned { " (owned)" } else { "" }
        );
    }

    let Some(input) = prompt("Buy attachment (number, empty to go back): ")? else {
        return Ok(());
    };
    if input.is_empty() {
        return Ok(());
    }

    match input.parse::<usize>().ok().and_then(|n| config.attachments.get(n.wrapping_sub(1))) {
        Some(attachment) => match session.buy_attachment(&attachment.key) {
            Ok(()) => println!("Bought {}. Balance: ${}", attachment.name, session.balance()),
            Err(e) => println!("{}", e),
        },
        None => println!("No such attachment"),
    }
    Ok(())
}

fn print_report(report: &RoundReport) {
    if let Some(event) = &report.event {
        println!("Event: {}", event);
    }
    println!("Your Weapon is {} ({:.1})", report.player.name, report.player.balanced_score);
    println!("Enemy Weapon is {} ({:.1})", report.computer.name, report.computer.balanced_score);
    println!(
        "{}",
        match report.outcome {
            Outcome::Win => "You win",
            Outcome::Loss => "You lose",
            Outcome::Draw => "Draw",
        }
    );
    println!("Bonus ${} + resale ${} -> balance ${}", report.bonus, report.resale, report.balance);
}

fn print_weapon_table(catalog: &WeaponCatalog, weights: &ScoringWeights) {
    println!("|--------------|--------|------|---------------|-------------|--------------|--------------|------|---------|-------|");
    println!("|Weapon Name   |Price($)|Damage|Fire Rate (RPM)|Magazine Size|Damage Falloff|Accurate Range|Recoil|  Score  |  DPS  |");
    println!("|--------------|--------|------|---------------|-------------|--------------|--------------|------|---------|-------|");
    for base in catalog.iter() {
        let w = WeaponInstance::from_base(base, weights);
        println!(
            "|{:<14}|{:>8}|{:>6}|{:>15.2}|{:>13}|{:>14}|{:>14.2}|{:>6.1}|{:>9.3}|{:>7.1}|",
            w.name,
            w.price,
            w.damage,
            w.fire_rate,
            w.magazine,
            w.falloff,
            w.range,
            w.recoil,
            w.balanced_score / 100.0,
            w.dps
        );
    }
    println!("|--------------|--------|------|---------------|-------------|--------------|--------------|------|---------|-------|");
}

fn print_modifiers(config: &GameConfig) {
    println!("Perks:");
    for perk in &config.perks {
        println!("  {:<16} {} - {}", perk.key, perk.name, perk.description);
    }
    println!();
    println!("Attachments:");
    for attachment in &config.attachments {
        println!("  {:<16} {} (${})", attachment.key, attachment.name, attachment.price);
    }
    println!();
    println!("Random events (first to fire wins):");
    for event in &config.events {
        println!("  {:<16} {} ({:.0}%)", event.key, event.name, event.probability * 100.0);
    }
}
