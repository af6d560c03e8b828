use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::scenarios::TestScenario;
use super::simulation::{SimulationPlan, SimulationSummary, Simulator};

/// Outcome of one iteration, kept for the CSV report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayRecord {
    pub scenario: String,
    pub seed: u64,
    pub mode: String,
    pub strategy: String,
    pub timed: bool,
    pub phase: String,
    pub difficulty: String,
    pub levels_cleared: u32,
    pub guesses: u32,
    pub correct: u32,
    pub timeouts: u32,
    pub final_score: u32,
}

impl PlayRecord {
    fn from_summary(scenario: &str, summary: &SimulationSummary) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed: summary.seed,
            mode: summary.mode.as_str().to_string(),
            strategy: summary.strategy.label().to_string(),
            timed: summary.timed,
            phase: format!("{:?}", summary.final_phase),
            difficulty: summary.final_state.difficulty.as_str().to_string(),
            levels_cleared: summary.levels_cleared,
            guesses: summary.guesses,
            correct: summary.correct,
            timeouts: summary.timeouts,
            final_score: summary.final_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
    pub records: Vec<PlayRecord>,
}

impl ScenarioResult {
    /// Mean final score over the iterations that produced a summary.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_score(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let total: u64 = self.records.iter().map(|r| u64::from(r.final_score)).sum();
        total as f64 / self.records.len() as f64
    }
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} (mode: {} strategy: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.mode,
                    scenario.plan.strategy,
                    seed
                );
            }

            let result = self.run_single_scenario(scenario, seed, iterations);
            results.push(result);
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut records = Vec::new();
        let simulator = Simulator::new(self.verbose);

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = match simulator.run_plan(&scenario.plan, iteration_seed) {
                Ok(summary) => summary,
                Err(err) => {
                    failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): run aborted: {err:#}",
                        i + 1
                    ));
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} aborted: {}",
                            i + 1,
                            iterations,
                            err.to_string().red()
                        );
                    }
                    continue;
                }
            };
            records.push(PlayRecord::from_summary(&scenario.name, &summary));

            if let Some(err) = evaluate_expectations(&scenario.plan, &summary) {
                failures.push(format!(
                    "Iteration {} (mode {}, strategy {}, seed {}, phase {:?}, tier {}, levels {}, score {}): {}",
                    i + 1,
                    summary.mode,
                    summary.strategy,
                    summary.seed,
                    summary.final_phase,
                    summary.final_state.difficulty,
                    summary.levels_cleared,
                    summary.final_score,
                    err
                ));

                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.clone().red()
                    );
                }
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) levels:{} guesses:{} score:{}",
                        i + 1,
                        iterations,
                        summary.levels_cleared,
                        summary.guesses,
                        summary.final_score
                    );
                }
            }
        }

        let avg_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration: avg_duration,
            performance_data,
            records,
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    for expectation in &plan.expectations {
        if let Err(err) = expectation.check(summary) {
            return Some(err.to_string());
        }
    }
    None
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|millis| Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scenarios::get_scenario;

    #[test]
    fn smoke_scenario_passes_for_a_few_seeds() {
        let scenario = get_scenario("smoke").unwrap();
        let results = LogicTester::new(false).run_scenario(&scenario, &[1, 2], 2);
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.successful_iterations, 2);
            assert_eq!(result.records.len(), 2);
            assert!((result.average_score() - 750.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn failed_expectation_is_reported_with_context() {
        let mut scenario = get_scenario("idle").unwrap();
        scenario.plan = scenario
            .plan
            .with_expectation(|_: &SimulationSummary| -> anyhow::Result<()> {
                anyhow::bail!("always unhappy")
            });
        let results = LogicTester::new(false).run_scenario(&scenario, &[9], 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("always unhappy"));
        assert!(results[0].failures[0].contains("seed 9"));
    }

    #[test]
    fn durations_serialize_as_millis() {
        let result = ScenarioResult {
            scenario_name: "smoke".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
            records: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["performance_data"][0], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_duration, Duration::from_millis(12));
    }
}
