//! Engine integration tests
//!
//! Scoring formula, modifier arithmetic and tiered opponent selection,
//! exercised through the public API only.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use firesync::core::config::GameConfig;
use firesync::core::types::{Category, Difficulty, Tier};
use firesync::engine::{
    apply_attachments, apply_event, compute_balanced_score, compute_dps, sample_event,
    select_opponent, select_tiered, Attachment, Attribute, Effect, ModifierPipeline, RandomEvent,
    ScoringWeights, TierPartition, TierWeights,
};
use firesync::weapons::{WeaponBase, WeaponCatalog, WeaponInstance};
use firesync::FireSyncError;

fn base(name: &str, damage: u32, falloff: u32, recoil: f64) -> WeaponBase {
    WeaponBase {
        name: name.into(),
        category: Category::Rifle,
        price: 2500,
        damage,
        fire_rate: 600.0,
        magazine: 30,
        falloff,
        range: 20.0,
        recoil,
    }
}

fn instance(name: &str, damage: u32) -> WeaponInstance {
    WeaponInstance::from_base(&base(name, damage, 4, 6.0), &ScoringWeights::default())
}

// ============================================================================
// Scoring
// ============================================================================

#[test]
fn test_zero_denominator_scores_zero() {
    let weapon = WeaponInstance::from_base(&base("Perfect", 40, 0, 0.0), &ScoringWeights::default());
    assert_eq!(weapon.balanced_score, 0.0);
    assert!(weapon.dps > 0.0);
}

#[test]
fn test_denominator_weight_zero_scores_zero() {
    let weights = ScoringWeights {
        denominator: 0.0,
        ..ScoringWeights::default()
    };
    let weapon = WeaponInstance::from_base(&base("Any", 40, 4, 6.0), &weights);
    assert_eq!(weapon.balanced_score, 0.0);
}

#[test]
fn test_catalog_scores_are_finite() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let weights = ScoringWeights::default();
    for weapon in catalog.iter() {
        let instance = WeaponInstance::from_base(weapon, &weights);
        assert!(instance.balanced_score.is_finite(), "{} has a non-finite score", weapon.name);
        assert!(instance.balanced_score > 0.0);
    }
}

proptest! {
    #[test]
    fn unit_weight_formula_holds(
        damage in 1u32..200,
        fire_rate in 1.0f64..1500.0,
        magazine in 1u32..200,
        falloff in 0u32..50,
        range in 0.5f64..100.0,
        recoil in 0.0f64..50.0,
    ) {
        prop_assume!(falloff as f64 + recoil > 0.0);
        let weapon = WeaponInstance::from_base(
            &WeaponBase {
                name: "prop".into(),
                category: Category::Smg,
                price: 1000,
                damage,
                fire_rate,
                magazine,
                falloff,
                range,
                recoil,
            },
            &ScoringWeights::default(),
        );
        let expected = (damage as f64 * fire_rate + magazine as f64 * range)
            / (falloff as f64 + recoil);
        prop_assert!((weapon.balanced_score - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert_eq!(compute_balanced_score(&weapon, &ScoringWeights::default()), weapon.balanced_score);
    }

    #[test]
    fn dps_is_damage_per_second(damage in 0u32..500, fire_rate in 0.0f64..2000.0) {
        let mut weapon = instance("prop", 10);
        weapon.damage = damage;
        weapon.fire_rate = fire_rate;
        let dps = compute_dps(&weapon);
        prop_assert!(dps >= 0.0);
        prop_assert!((dps - damage as f64 * fire_rate / 60.0).abs() < 1e-9);
    }

    #[test]
    fn extended_magazine_never_lowers_score(damage in 1u32..200, magazine in 1u32..100) {
        let mut weapon = instance("prop", damage);
        weapon.magazine = magazine;
        weapon.rescore(&ScoringWeights::default());
        let before = weapon.balanced_score;

        let mag = Attachment::new("extended_mag", "Extended Magazine", 400, vec![Effect::add(Attribute::Magazine, 10.0)]);
        let after = apply_attachments(weapon, [&mag], &ScoringWeights::default());
        prop_assert_eq!(after.magazine, magazine + 10);
        prop_assert!(after.balanced_score >= before);
    }

    #[test]
    fn scaled_attributes_never_negative(amount in -1.0f64..2.0) {
        let weapon = instance("prop", 50);
        let event = RandomEvent::new("any", "Any", 1.0, Effect::scale(Attribute::Recoil, amount));
        let after = apply_event(weapon, &event, &ScoringWeights::default());
        prop_assert!(after.recoil >= 0.0);
        prop_assert!(after.balanced_score >= 0.0);
    }
}

// ============================================================================
// Modifiers
// ============================================================================

#[test]
fn test_range_event_reduces_range_and_score() {
    let weapon = instance("Rifle", 36);
    let before = weapon.balanced_score;
    let sandstorm = RandomEvent::new("sandstorm", "Sandstorm", 0.1, Effect::scale(Attribute::Range, -0.2));

    let after = apply_event(weapon, &sandstorm, &ScoringWeights::default());

    assert!((after.range - 16.0).abs() < 1e-9);
    assert!(after.balanced_score < before);
}

#[test]
fn test_perk_price_floors() {
    let config = GameConfig::default();
    let pipeline = ModifierPipeline::new(&config);
    let mut odd = base("Odd", 30, 4, 6.0);
    odd.price = 1999;

    let weapon = pipeline.loadout(&odd, Some("bargain_hunter"), &[] as &[&str]);
    // 1999 * 0.85 = 1699.15
    assert_eq!(weapon.price, 1699);
}

#[test]
fn test_unknown_keys_are_noops() {
    let config = GameConfig::default();
    let pipeline = ModifierPipeline::new(&config);
    let rifle = base("Rifle", 36, 4, 6.0);

    let plain = pipeline.instance(&rifle);
    let modified = pipeline.loadout(&rifle, Some("x-ray_vision"), &["jetpack", "grappling_hook"]);

    assert_eq!(modified, plain);
}

#[test]
fn test_attachments_stack_in_order() {
    let config = GameConfig::default();
    let pipeline = ModifierPipeline::new(&config);
    let rifle = base("Rifle", 100, 4, 10.0);

    let weapon = pipeline.loadout(&rifle, None, &["heavy_barrel", "suppressor"]);
    // 100 -> floor(110) -> floor(99)
    assert_eq!(weapon.damage, 99);
    // 10 -> 11 -> 7.7
    assert!((weapon.recoil - 7.7).abs() < 1e-9);
}

#[test]
fn test_event_sampling_first_success_wins() {
    let events = vec![
        RandomEvent::new("always_a", "A", 1.0, Effect::scale(Attribute::Range, -0.2)),
        RandomEvent::new("always_b", "B", 1.0, Effect::scale(Attribute::Recoil, 0.1)),
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..100 {
        assert_eq!(sample_event(&events, &mut rng).map(|e| e.key.as_str()), Some("always_a"));
    }

    let never = vec![RandomEvent::new("never", "Never", 0.0, Effect::scale(Attribute::Range, -0.2))];
    assert!(sample_event(&never, &mut rng).is_none());
    assert!(sample_event(&[], &mut rng).is_none());
}

#[test]
fn test_default_event_rates() {
    let config = GameConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let draws = 20_000;
    let fired = (0..draws).filter(|_| sample_event(&config.events, &mut rng).is_some()).count();

    // 1 - 0.90 * 0.85 * 0.92 * 0.95 ≈ 0.331
    let rate = fired as f64 / draws as f64;
    assert!((rate - 0.331).abs() < 0.02, "event rate {rate}");
}

// ============================================================================
// Opponent selection
// ============================================================================

#[test]
fn test_hard_difficulty_favours_top_tier() {
    let candidates: Vec<WeaponInstance> = (1..=9).map(|i| instance(&format!("W{i}"), i * 10)).collect();
    let config = GameConfig::default();
    let weights = config.difficulty.weights(Difficulty::Hard);
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let draws = 10_000;
    let high = (0..draws)
        .filter(|_| {
            let pick = select_opponent(&candidates, weights, &mut rng).expect("non-empty");
            pick.damage >= 70
        })
        .count();

    let share = high as f64 / draws as f64;
    assert!((share - 0.6).abs() < 0.03, "top tier share {share}");
}

#[test]
fn test_two_candidates_split_evenly() {
    let candidates = vec![instance("Weak", 10), instance("Strong", 90)];
    let weights = TierWeights::new(0.1, 0.3, 0.6);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let draws = 10_000;
    let mut strong = 0;
    for _ in 0..draws {
        let selection = select_tiered(&candidates, &weights, &mut rng).expect("never errors");
        assert_eq!(selection.tier, None);
        if selection.weapon.name == "Strong" {
            strong += 1;
        }
    }
    let share = strong as f64 / draws as f64;
    assert!((share - 0.5).abs() < 0.03, "share {share}");
}

#[test]
fn test_single_candidate_always_chosen() {
    let candidates = vec![instance("Only", 10)];
    let weights = TierWeights::new(0.0, 0.0, 1.0);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..50 {
        assert_eq!(select_opponent(&candidates, &weights, &mut rng).expect("one candidate").name, "Only");
    }
}

#[test]
fn test_empty_candidates_is_degenerate() {
    let weights = TierWeights::new(0.3, 0.4, 0.3);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(matches!(
        select_opponent(&[], &weights, &mut rng),
        Err(FireSyncError::DegenerateInput(_))
    ));
}

#[test]
fn test_partition_remainder_goes_to_medium() {
    let partition = TierPartition::new(7).expect("seven candidates are tiered");
    assert_eq!(partition.range(Tier::Low), 0..2);
    assert_eq!(partition.range(Tier::Medium), 2..5);
    assert_eq!(partition.range(Tier::High), 5..7);
}

#[test]
fn test_catalog_categories_all_selectable() {
    let catalog = WeaponCatalog::embedded().expect("embedded catalog");
    let config = GameConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    for plan in &config.rounds {
        let candidates = catalog.instances(plan.category, &config.scoring);
        let pick = select_opponent(&candidates, config.difficulty.weights(Difficulty::Normal), &mut rng)
            .expect("every round category has weapons");
        assert_eq!(pick.category, plan.category);
    }
}
