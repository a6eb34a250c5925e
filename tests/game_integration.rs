//! Game integration tests
//!
//! Whole rounds and games through `GameSession`, automatic players, the
//! batch simulator and player profiles.

use firesync::core::config::{GameConfig, RoundPlan};
use firesync::core::types::{Category, Difficulty, Outcome};
use firesync::engine::{compute_balanced_score, Attribute, Effect, RandomEvent};
use firesync::game::{play_auto_game, AutoGame, AutoStrategy, GameSession, Profile};
use firesync::simulation::{run_batch, BatchConfig};
use firesync::weapons::{WeaponBase, WeaponCatalog};
use firesync::FireSyncError;

fn auto_game(difficulty: Difficulty, strategy: AutoStrategy, seed: u64) -> AutoGame {
    AutoGame {
        difficulty,
        strategy,
        perk: None,
        attachments: Vec::new(),
        seed,
    }
}

#[test]
fn test_round_outcome_rule() {
    assert_eq!(Outcome::from_scores(120.0, 95.0), Outcome::Win);
    assert_eq!(Outcome::from_scores(95.0, 120.0), Outcome::Loss);
    assert_eq!(Outcome::from_scores(100.0, 100.0), Outcome::Draw);
}

#[test]
fn test_identical_weapons_draw_every_round() {
    // One weapon per category: both sides always field the same gun
    let catalog = WeaponCatalog::from_weapons([WeaponBase {
        name: "Twin".into(),
        category: Category::Pistol,
        price: 300,
        damage: 30,
        fire_rate: 400.0,
        magazine: 12,
        falloff: 5,
        range: 20.0,
        recoil: 3.0,
    }]);
    let config = GameConfig {
        rounds: vec![RoundPlan::new(Category::Pistol, 900); 3],
        ..GameConfig::default()
    };

    let mut session = GameSession::new(&catalog, &config, Difficulty::Hard, None, 77).expect("valid game");
    while !session.is_finished() {
        let report = session.play_round("Twin").expect("affordable");
        assert_eq!(report.outcome, Outcome::Draw);
        assert_eq!(report.bonus, config.economy.draw_bonus);
        assert_eq!(report.computer_tier, None);
    }
    assert_eq!(session.summary().outcome, Outcome::Draw);
}

#[test]
fn test_round_event_hits_both_sides() {
    let pistol = |name: &str, damage: u32, range: f64| WeaponBase {
        name: name.into(),
        category: Category::Pistol,
        price: 300,
        damage,
        fire_rate: 400.0,
        magazine: 12,
        falloff: 5,
        range,
        recoil: 3.0,
    };
    let catalog = WeaponCatalog::from_weapons([
        pistol("Snub", 20, 10.0),
        pistol("Long Barrel", 40, 25.0),
        pistol("Target", 30, 40.0),
    ]);
    let config = GameConfig {
        rounds: vec![RoundPlan::new(Category::Pistol, 900); 4],
        events: vec![RandomEvent::new("sandstorm", "Sandstorm", 1.0, Effect::scale(Attribute::Range, -0.2))],
        ..GameConfig::default()
    };

    let mut session = GameSession::new(&catalog, &config, Difficulty::Normal, None, 13).expect("valid game");
    while !session.is_finished() {
        let report = session.play_round("Snub").expect("affordable");
        assert_eq!(report.event.as_deref(), Some("sandstorm"));

        assert!((report.player.range - 8.0).abs() < 1e-9);
        let computer_base = catalog.get(&report.computer.name).expect("computer picks from the catalog");
        assert!((report.computer.range - computer_base.range * 0.8).abs() < 1e-9);

        // Both sides are rescored after the event
        assert_eq!(report.player.balanced_score, compute_balanced_score(&report.player, &config.scoring));
        assert_eq!(report.computer.balanced_score, compute_balanced_score(&report.computer, &config.scoring));
    }
}

#[test]
fn test_balance_flow_across_rounds() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let config = GameConfig::default();
    let mut session = GameSession::new(&catalog, &config, Difficulty::Normal, None, 31).expect("valid game");

    let mut expected = config.rounds[0].income;
    for (idx, plan) in config.rounds.iter().enumerate() {
        assert_eq!(session.balance(), expected);
        let offers = session.offers();
        assert!(offers.iter().all(|o| o.weapon.category == plan.category));
        let cheapest = offers
            .iter()
            .filter(|o| o.affordable)
            .min_by_key(|o| o.weapon.price)
            .expect("each round has an affordable weapon");

        let report = session.play_round(&cheapest.weapon.name).expect("round plays");
        let resale = (report.price_paid as f64 * config.economy.sell_rate).floor() as u32;
        assert_eq!(report.resale, resale);
        expected = expected - report.price_paid + report.bonus + resale;
        assert_eq!(report.balance, expected);

        if let Some(next) = config.rounds.get(idx + 1) {
            expected += next.income;
        }
    }
    assert_eq!(session.summary().final_balance, expected);
}

#[test]
fn test_game_finished_rejects_more_rounds() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let config = GameConfig::default();
    let mut session = GameSession::new(&catalog, &config, Difficulty::Easy, None, 5).expect("valid game");
    while !session.is_finished() {
        let name = session.offers()[0].weapon.name.clone();
        session.play_round(&name).expect("cheapest weapons are first in the catalog");
    }
    assert!(matches!(session.play_round("AWP"), Err(FireSyncError::GameFinished(5))));
    assert!(matches!(session.buy_attachment("compensator"), Err(FireSyncError::GameFinished(5))));
}

#[test]
fn test_same_seed_same_game() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let config = GameConfig::default();
    let game = AutoGame {
        perk: Some("eagle_eye".into()),
        attachments: vec!["extended_mag".into()],
        ..auto_game(Difficulty::Hard, AutoStrategy::Random, 1234)
    };

    let (a_summary, a_rounds) = play_auto_game(&catalog, &config, &game).expect("game plays");
    let (b_summary, b_rounds) = play_auto_game(&catalog, &config, &game).expect("game plays");

    assert_eq!(a_summary.scoreboard, b_summary.scoreboard);
    assert_eq!(a_summary.final_balance, b_summary.final_balance);
    for (a, b) in a_rounds.iter().zip(&b_rounds) {
        assert_eq!(a.player, b.player);
        assert_eq!(a.computer, b.computer);
        assert_eq!(a.event, b.event);
        assert_eq!(a.outcome, b.outcome);
    }
    // Game ids are unique even for identical seeds
    assert_ne!(a_summary.id, b_summary.id);
}

#[test]
fn test_strongest_player_beats_cheapest_on_easy() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let config = GameConfig::default();

    let wins = |strategy| {
        (0..200u64)
            .map(|seed| {
                let (summary, _) = play_auto_game(&catalog, &config, &auto_game(Difficulty::Easy, strategy, seed))
                    .expect("game plays");
                summary.scoreboard.wins
            })
            .sum::<u32>()
    };

    assert!(wins(AutoStrategy::Strongest) > wins(AutoStrategy::Cheapest));
}

#[test]
fn test_batch_independent_of_thread_count() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let config = GameConfig::default();
    let batch = BatchConfig {
        games: 64,
        difficulty: Difficulty::Normal,
        strategy: AutoStrategy::Random,
        seed: 2718,
        ..BatchConfig::default()
    };

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .expect("thread pool")
        .install(|| run_batch(&catalog, &config, &batch))
        .expect("batch runs");
    let parallel = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("thread pool")
        .install(|| run_batch(&catalog, &config, &batch))
        .expect("batch runs");

    assert_eq!(single.game_results, parallel.game_results);
    assert_eq!(single.round_results, parallel.round_results);
    assert_eq!(single.computer_tiers, parallel.computer_tiers);
    assert_eq!(single.computer_picks, parallel.computer_picks);
    assert_eq!(single.events, parallel.events);
    assert_eq!(single.average_final_balance, parallel.average_final_balance);
}

#[test]
fn test_batch_report_serializes() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let config = GameConfig::default();
    let batch = BatchConfig {
        games: 10,
        ..BatchConfig::default()
    };
    let report = run_batch(&catalog, &config, &batch).expect("batch runs");

    let json = serde_json::to_string(&report).expect("report serializes");
    assert!(json.contains("\"difficulty\":\"normal\""));
    assert!(json.contains("\"strategy\":\"strongest\""));
}

#[test]
fn test_invalid_weapon_records_rejected_at_load() {
    let toml = r#"
        [[weapon]]
        name = "Good"
        category = "smg"
        price = 1200
        damage = 25
        fire_rate = 800.0
        magazine = 30
        falloff = 10
        range = 12.0
        recoil = 4.0

        [[weapon]]
        name = "Free Lunch"
        category = "smg"
        price = 0
        damage = 25
        fire_rate = 800.0
        magazine = 30
        falloff = 10
        range = 12.0
        recoil = 4.0

        [[weapon]]
        name = "Mystery"
        category = "railgun"
        price = 9000
        damage = 999
        fire_rate = 10.0
        magazine = 1
        falloff = 0
        range = 99.0
        recoil = 0.0
    "#;
    let catalog = WeaponCatalog::from_toml_str(toml).expect("catalog parses");
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get("Good").is_some());
    assert_eq!(catalog.rejected().len(), 2);
    assert!(catalog
        .rejected()
        .iter()
        .all(|e| matches!(e, FireSyncError::Data { .. })));
}

#[test]
fn test_profile_tracks_games() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let config = GameConfig::default();
    let mut profile = Profile::new("integration");

    for seed in 0..3 {
        let (summary, rounds) =
            play_auto_game(&catalog, &config, &auto_game(Difficulty::Normal, AutoStrategy::Strongest, seed))
                .expect("game plays");
        rounds.iter().for_each(|r| profile.record_round(r));
        profile.record_game(&summary);
    }

    assert_eq!(profile.games_played(), 3);
    assert_eq!(profile.rounds.total(), 15);
    assert_eq!(profile.games.total(), 3);
    assert_eq!(profile.recent_games.len(), 3);
    assert!(profile.win_rate() >= 0.0 && profile.win_rate() <= 1.0);
}
