use std::collections::HashSet;

use anyhow::{Result, ensure};
use guessweight_game::constants::{LEADERBOARD_CAPACITY, LEVEL_SIZE};
use guessweight_game::{DifficultyId, GamePhase, ModeId, animal_by_id, final_score};

use super::policy::GameplayStrategy;
use super::simulation::{SIMULATED_PLAYER, SimulationPlan, SimulationSummary};

/// A named plan the tester can run.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

const CATALOG: [(&str, &str); 7] = [
    ("smoke", "Perfect typed run climbs all tiers and saves"),
    ("scale", "Perfect timed easy level on the weight-piece scale"),
    ("comparison", "Perfect run balancing animals against animals"),
    ("idle", "Idle player on hard loses to the clock"),
    ("bisect", "Hint-driven player on typed input"),
    ("sloppy", "Careless player on the scale under time pressure"),
    ("fresh-levels", "Consecutive levels never repeat animals"),
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG.to_vec()
}

#[must_use]
pub fn scenario_keys() -> Vec<&'static str> {
    CATALOG.iter().map(|(key, _)| *key).collect()
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<TestScenario> {
    let plan = match key {
        "smoke" => SimulationPlan::new(ModeId::Input, GameplayStrategy::Perfect)
            .with_expectation(session_invariants)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(
                    summary.levels_cleared == 3,
                    "cleared {} levels",
                    summary.levels_cleared
                );
                ensure!(summary.final_score == 750, "scored {}", summary.final_score);
                let entry = summary
                    .saved_entry
                    .as_ref()
                    .map(|entry| entry.difficulty_label.as_str());
                ensure!(entry == Some("Hard"), "saved entry labelled {entry:?}");
                Ok(())
            }),
        "scale" => SimulationPlan::new(ModeId::Weights, GameplayStrategy::Perfect)
            .timed()
            .with_max_levels(1)
            .with_expectation(session_invariants)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(summary.rejected == 0, "{} loads rejected", summary.rejected);
                ensure!(
                    summary.levels.len() == 1,
                    "played {} levels",
                    summary.levels.len()
                );
                ensure!(
                    summary.final_score == 50 * 2,
                    "scored {}",
                    summary.final_score
                );
                Ok(())
            }),
        "comparison" => SimulationPlan::new(ModeId::Animals, GameplayStrategy::Perfect)
            .with_expectation(session_invariants)
            .with_expectation(comparison_levels_are_solvable),
        "idle" => SimulationPlan::new(ModeId::Input, GameplayStrategy::Idle)
            .starting_at(DifficultyId::Hard)
            .timed()
            .with_expectation(session_invariants)
            .with_expectation(|summary: &SimulationSummary| {
                ensure!(
                    summary.final_phase == GamePhase::Lost,
                    "ended {:?}",
                    summary.final_phase
                );
                ensure!(summary.timeouts == 3, "{} timeouts", summary.timeouts);
                let clock = 3 * DifficultyId::Hard.tier().time_limit;
                ensure!(
                    summary.ticks == clock,
                    "{} ticks, expected {clock}",
                    summary.ticks
                );
                ensure!(summary.final_score == 0, "scored {}", summary.final_score);
                ensure!(
                    summary.events.hint_count("timeUp") == 2,
                    "expected two time-up hints"
                );
                ensure!(
                    summary.events.lost_screens == 1,
                    "lost screen shown {} times",
                    summary.events.lost_screens
                );
                Ok(())
            }),
        "bisect" => SimulationPlan::new(ModeId::Input, GameplayStrategy::Bisect)
            .with_expectation(session_invariants)
            .with_expectation(|summary: &SimulationSummary| {
                let events = &summary.events;
                ensure!(summary.timeouts == 0, "bisect never waits");
                ensure!(
                    events.hint_count("correct") == summary.correct,
                    "hit hints out of step"
                );
                ensure!(
                    events.hint_count("wrong") + events.hint_count("outOfAttempts")
                        == summary.guesses - summary.correct,
                    "every miss should produce exactly one hint"
                );
                Ok(())
            }),
        "sloppy" => SimulationPlan::new(ModeId::Weights, GameplayStrategy::Sloppy)
            .starting_at(DifficultyId::Medium)
            .timed()
            .with_expectation(session_invariants),
        "fresh-levels" => SimulationPlan::new(ModeId::Input, GameplayStrategy::Perfect)
            .without_saving()
            .with_expectation(session_invariants)
            .with_expectation(levels_do_not_repeat),
        _ => return None,
    };
    Some(TestScenario::simulation(key, plan))
}

/// Properties every run must keep regardless of how it was played.
fn session_invariants(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(state.is_consistent(), "final session is inconsistent");
    ensure!(
        state.highest_difficulty >= state.difficulty,
        "highest tier fell behind"
    );

    let expected = final_score(
        state.base_score,
        state.highest_difficulty,
        summary.timed,
        summary.mode,
    );
    ensure!(
        summary.final_score == expected,
        "score {} does not match formula {expected}",
        summary.final_score
    );
    ensure!(summary.correct <= summary.guesses, "more hits than guesses");

    match summary.final_phase {
        GamePhase::Lost => ensure!(state.is_lost(), "lost with attempts to spare"),
        GamePhase::LevelComplete => ensure!(state.is_level_complete(), "level not finished"),
        other => anyhow::bail!("run stopped in {other:?}"),
    }

    let events = &summary.events;
    ensure!(events.inits == 1, "init rendered {} times", events.inits);
    let unfinished = u32::try_from(summary.levels.len())? - summary.levels_cleared;
    ensure!(
        events.rounds_started == summary.correct + unfinished,
        "{} rounds announced for {} hits",
        events.rounds_started,
        summary.correct
    );
    ensure!(
        events.inputs_cleared == summary.guesses - summary.rejected,
        "input cleared {} times",
        events.inputs_cleared
    );
    ensure!(
        events.level_complete_screens == summary.levels_cleared,
        "level-complete screen shown {} times",
        events.level_complete_screens
    );
    let lost = u32::from(summary.final_phase == GamePhase::Lost);
    ensure!(
        events.lost_screens == lost,
        "lost screen shown {} times",
        events.lost_screens
    );

    for level in &summary.levels {
        ensure!(
            level.animals.len() == LEVEL_SIZE,
            "level of {} animals",
            level.animals.len()
        );
        let distinct: HashSet<&String> = level.animals.iter().collect();
        ensure!(
            distinct.len() == LEVEL_SIZE,
            "duplicate animal in {:?}",
            level.animals
        );
    }

    ensure!(summary.session_cleared, "session record left behind");
    ensure!(
        summary.leaderboard.len() <= LEADERBOARD_CAPACITY,
        "leaderboard overflow"
    );
    ensure!(
        summary.leaderboard.windows(2).all(|pair| pair[0].score >= pair[1].score),
        "leaderboard out of order"
    );
    if let Some(entry) = &summary.saved_entry {
        ensure!(
            entry.name == SIMULATED_PLAYER,
            "saved under '{}'",
            entry.name
        );
        ensure!(
            entry.score == summary.final_score,
            "saved {} of {}",
            entry.score,
            summary.final_score
        );
        ensure!(entry.timed == summary.timed, "timed flag lost");
        let ranked = summary.leaderboard.iter().any(|row| row == entry);
        let lowest = summary.leaderboard.last().map_or(0, |row| row.score);
        ensure!(
            ranked || entry.score <= lowest,
            "saved score missing from the leaderboard"
        );
    }
    Ok(())
}

fn comparison_levels_are_solvable(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.levels_cleared == 3,
        "cleared {} levels",
        summary.levels_cleared
    );
    for level in &summary.levels {
        ensure!(
            !level.weight_animals.is_empty(),
            "level without a reference rack"
        );
        ensure!(
            level.animals.iter().all(|id| !level.weight_animals.contains(id)),
            "target also sits on the rack: {:?} vs {:?}",
            level.animals,
            level.weight_animals
        );
        ensure!(
            level.weight_animals.iter().all(|id| animal_by_id(id).is_some()),
            "unknown reference animal"
        );
    }
    Ok(())
}

fn levels_do_not_repeat(summary: &SimulationSummary) -> Result<()> {
    for pair in summary.levels.windows(2) {
        let overlap: Vec<&String> = pair[1]
            .animals
            .iter()
            .filter(|id| pair[0].animals.contains(id))
            .collect();
        ensure!(
            overlap.is_empty(),
            "{:?} repeated on {}",
            overlap,
            pair[1].difficulty
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        for key in scenario_keys() {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.name, key);
            assert!(!scenario.plan.expectations.is_empty());
        }
        assert!(get_scenario("missing").is_none());
    }

    #[test]
    fn listing_has_descriptions() {
        assert!(list_scenarios().iter().all(|(_, description)| !description.is_empty()));
    }
}
