//! Level generation: which animals a round asks about, and for comparison mode
//! which reference animals sit on the rack.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::{ANIMALS, Animal, ModeId, animal_by_id};
use crate::constants::{COMPARISON_MAX_COPIES, COMPARISON_MAX_RETRIES, USED_EVICTION_COUNT};
use crate::scoring::within_tolerance;

/// Result of drawing a level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSelection {
    pub level_animals: Vec<String>,
    /// Recently-seen window to carry into the next draw.
    pub used_animals: Vec<String>,
    /// Reference animals for comparison mode; empty otherwise.
    pub weight_animals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPick {
    pub ids: Vec<&'static str>,
    /// Set when the unused part of the pool could not cover the request.
    pub exhausted: bool,
}

/// Draw `count` distinct ids from `pool`, preferring ids not in `used`.
///
/// When the unused ids run out the remainder comes from the used ones,
/// oldest first. The final selection is shuffled.
pub fn pick_from_pool<R: Rng + ?Sized>(
    pool: &[&'static str],
    used: &[String],
    count: usize,
    rng: &mut R,
) -> PoolPick {
    let is_used = |id: &str| used.iter().any(|u| u == id);
    let mut available: Vec<&'static str> = pool.iter().copied().filter(|id| !is_used(id)).collect();
    available.shuffle(rng);
    available.truncate(count);

    let exhausted = available.len() < count;
    if exhausted {
        for old in used {
            if available.len() >= count {
                break;
            }
            if let Some(id) = pool.iter().copied().find(|id| *id == old.as_str())
                && !available.contains(&id)
            {
                available.push(id);
            }
        }
        available.shuffle(rng);
    }

    PoolPick {
        ids: available,
        exhausted,
    }
}

fn next_used_window(used: &[String], picked: &PoolPick) -> Vec<String> {
    let skip = if picked.exhausted {
        USED_EVICTION_COUNT.min(used.len())
    } else {
        0
    };
    used[skip..]
        .iter()
        .cloned()
        .chain(picked.ids.iter().map(|id| (*id).to_string()))
        .collect()
}

fn catalog_ids() -> Vec<&'static str> {
    ANIMALS.iter().map(|animal| animal.id).collect()
}

/// Draw a level from the whole catalog.
pub fn select_basic_level<R: Rng + ?Sized>(
    used: &[String],
    count: usize,
    rng: &mut R,
) -> LevelSelection {
    let picked = pick_from_pool(&catalog_ids(), used, count, rng);
    log::debug!(
        "basic level {:?} (exhausted: {})",
        picked.ids,
        picked.exhausted
    );
    LevelSelection {
        used_animals: next_used_window(used, &picked),
        level_animals: picked.ids.iter().map(|id| (*id).to_string()).collect(),
        weight_animals: Vec::new(),
    }
}

/// Every total reachable with 0..=`COMPARISON_MAX_COPIES` copies of each mass.
#[must_use]
pub fn achievable_sums(masses: &[u32]) -> BTreeSet<u64> {
    let mut sums = BTreeSet::from([0_u64]);
    for &mass in masses {
        let mut next = BTreeSet::new();
        for &sum in &sums {
            for copies in 0..=COMPARISON_MAX_COPIES {
                next.insert(sum + u64::from(mass) * u64::from(copies));
            }
        }
        sums = next;
    }
    sums
}

/// Whether some achievable total lies within tolerance of `target`.
#[must_use]
pub fn can_approximate(target: u32, sums: &BTreeSet<u64>) -> bool {
    let target = u64::from(target);
    let low = target - target / 10;
    let high = target + target / 10 + 1;
    sums.range(low..=high)
        .any(|&sum| within_tolerance(target, sum))
}

/// Animals outside `weight_ids` that the given reference animals can balance.
#[must_use]
pub fn comparison_targets(weight_ids: &[&str]) -> Vec<&'static Animal> {
    let masses: Vec<u32> = weight_ids
        .iter()
        .filter_map(|id| animal_by_id(id))
        .map(|animal| animal.weight)
        .collect();
    let sums = achievable_sums(&masses);
    ANIMALS
        .iter()
        .filter(|animal| !weight_ids.contains(&animal.id))
        .filter(|animal| can_approximate(animal.weight, &sums))
        .collect()
}

/// Draw a comparison-mode level whose targets are solvable with the rack.
///
/// Tries random reference sets until one balances at least `count` other
/// animals. After `COMPARISON_MAX_RETRIES` misses it falls back to the first
/// `count` catalog animals and accepts whatever pool they yield.
pub fn select_comparison_level<R: Rng + ?Sized>(
    used: &[String],
    count: usize,
    rng: &mut R,
) -> LevelSelection {
    let ids = catalog_ids();
    let mut accepted: Option<(Vec<&'static str>, Vec<&'static Animal>)> = None;

    for attempt in 1..=COMPARISON_MAX_RETRIES {
        let mut candidate = ids.clone();
        candidate.shuffle(rng);
        candidate.truncate(count);
        let targets = comparison_targets(&candidate);
        if targets.len() >= count {
            log::debug!("comparison rack {candidate:?} accepted on attempt {attempt}");
            accepted = Some((candidate, targets));
            break;
        }
    }

    let (weight_ids, targets) = accepted.unwrap_or_else(|| {
        let fallback: Vec<&'static str> = ids.iter().copied().take(count).collect();
        log::warn!("no balanced comparison rack found; falling back to {fallback:?}");
        let targets = comparison_targets(&fallback);
        (fallback, targets)
    });

    let pool: Vec<&'static str> = targets.iter().map(|animal| animal.id).collect();
    let picked = pick_from_pool(&pool, used, count, rng);
    LevelSelection {
        used_animals: next_used_window(used, &picked),
        level_animals: picked.ids.iter().map(|id| (*id).to_string()).collect(),
        weight_animals: weight_ids.iter().map(|id| (*id).to_string()).collect(),
    }
}

/// Draw the next level for a play mode.
pub fn select_level<R: Rng + ?Sized>(
    mode: ModeId,
    used: &[String],
    count: usize,
    rng: &mut R,
) -> LevelSelection {
    if mode.is_comparison() {
        select_comparison_level(used, count, rng)
    } else {
        select_basic_level(used, count, rng)
    }
}
