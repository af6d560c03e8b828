use std::collections::HashSet;

use guessweight_game::constants::LEVEL_SIZE;
use guessweight_game::level::{achievable_sums, can_approximate, comparison_targets};
use guessweight_game::{ANIMALS, ModeId, animal_by_id, select_level};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[test]
fn levels_are_full_distinct_and_known_for_every_seed() {
    for seed in 0..64_u64 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut used = Vec::new();
        for round in 0..8 {
            let level = select_level(ModeId::Weights, &used, LEVEL_SIZE, &mut rng);
            let distinct: HashSet<&str> = level.level_animals.iter().map(String::as_str).collect();
            assert_eq!(distinct.len(), LEVEL_SIZE, "seed {seed} round {round}");
            assert!(distinct.iter().all(|id| animal_by_id(id).is_some()));
            used = level.used_animals;
        }
    }
}

#[test]
fn first_four_levels_never_repeat_an_animal() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xA11);
    let mut used = Vec::new();
    let mut seen = HashSet::new();
    for _ in 0..ANIMALS.len() / LEVEL_SIZE {
        let level = select_level(ModeId::Input, &used, LEVEL_SIZE, &mut rng);
        for id in &level.level_animals {
            assert!(seen.insert(id.clone()), "{id} repeated");
        }
        used = level.used_animals;
    }
    assert_eq!(seen.len(), ANIMALS.len());
}

#[test]
fn exhausted_catalog_evicts_oldest_entries() {
    let mut rng = ChaCha20Rng::seed_from_u64(17);
    let used: Vec<String> = ANIMALS.iter().map(|a| a.id.to_string()).collect();
    let level = select_level(ModeId::Input, &used, LEVEL_SIZE, &mut rng);
    assert_eq!(level.level_animals.len(), LEVEL_SIZE);
    assert_eq!(level.used_animals.len(), ANIMALS.len());
    assert_eq!(&level.used_animals[..15], &used[5..]);
    let oldest: HashSet<&str> = used[..5].iter().map(String::as_str).collect();
    assert!(level.level_animals.iter().all(|id| oldest.contains(id.as_str())));
}

#[test]
fn same_seed_draws_same_level() {
    let draw = |seed| {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        select_level(ModeId::Animals, &[], LEVEL_SIZE, &mut rng)
    };
    assert_eq!(draw(123), draw(123));
}

#[test]
fn comparison_targets_are_within_ten_percent_for_every_seed() {
    for seed in 0..32_u64 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut used = Vec::new();
        for _ in 0..3 {
            let level = select_level(ModeId::Animals, &used, LEVEL_SIZE, &mut rng);
            let masses: Vec<u32> = level
                .weight_animals
                .iter()
                .map(|id| animal_by_id(id).unwrap().weight)
                .collect();
            let sums = achievable_sums(&masses);
            for id in &level.level_animals {
                assert!(!level.weight_animals.contains(id));
                assert!(can_approximate(animal_by_id(id).unwrap().weight, &sums));
            }
            used = level.used_animals;
        }
    }
}

#[test]
fn fallback_rack_still_balances_enough_targets() {
    let fallback: Vec<&str> = ANIMALS.iter().take(LEVEL_SIZE).map(|a| a.id).collect();
    assert!(comparison_targets(&fallback).len() >= LEVEL_SIZE);
}
