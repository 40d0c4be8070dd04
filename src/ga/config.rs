//! Run configuration.
//!
//! A flat set of knobs read once when the evolution loop starts. Every
//! field has a default (the values of the reference runs), so a JSON file
//! only needs to name what it changes:
//!
//! ```
//! use u_rcpsp::ga::GaConfig;
//! use u_rcpsp::ga::operators::{PairingStrategy, SelectionStrategy};
//!
//! let config = GaConfig::from_json_str(r#"{
//!     "population_size": 40,
//!     "pairing": "falloff_cosine",
//!     "selection": { "tournament": { "size": 3 } },
//!     "fitness": { "penalties": { "idle_resource": 0.01 } }
//! }"#).unwrap();
//!
//! assert_eq!(config.population_size, 40);
//! assert_eq!(config.pairing, PairingStrategy::FalloffCosine);
//! assert_eq!(config.selection, SelectionStrategy::Tournament { size: 3 });
//! assert_eq!(config.generation_limit, 50);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::operators::{CloneStrategy, PairingStrategy, RecombinationShape, SelectionStrategy};
use crate::error::{Error, Result};

/// Penalty weights charged by the fitness simulator.
///
/// A zero weight disables the corresponding check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Per tick, per free resource that could run a ready pending task.
    pub idle_resource: f64,
    /// Per tick, per ready task whose assigned resource is occupied.
    pub waiting_task: f64,
    /// Per task not assigned to its least-skilled eligible resource.
    pub skill_mismatch: f64,
    /// Per predecessor still incomplete when a task starts
    /// (only when precedence is not enforced).
    pub precedence_violation: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            idle_resource: 0.0,
            waiting_task: 0.0,
            skill_mismatch: 0.0,
            precedence_violation: 0.3,
        }
    }
}

/// How a simulated schedule is turned into a scalar fitness.
///
/// `fitness = makespan_weight * M + cost_weight * cost + penalties`, where
/// `M` is the makespan, or the makespan divided by the instance's total
/// duration when `normalize_makespan` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub makespan_weight: f64,
    /// Small by default so cost only breaks makespan ties.
    pub cost_weight: f64,
    /// Scales the makespan term to `makespan / total_duration`, where
    /// `total_duration` is the sum of all task durations (the serial
    /// upper bound). This is not a final-tick-over-horizon ratio such as
    /// `(makespan + 1) / horizon`, so thresholds tuned on that scale do
    /// not carry over.
    pub normalize_makespan: bool,
    /// `true`: tasks wait for their predecessors. `false`: tasks start
    /// anyway and each missing predecessor is penalized.
    pub enforce_precedence: bool,
    pub penalties: PenaltyWeights,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            makespan_weight: 1.0,
            cost_weight: 1e-5,
            normalize_makespan: false,
            enforce_precedence: true,
            penalties: PenaltyWeights::default(),
        }
    }
}

impl FitnessConfig {
    /// Sets the penalty weights.
    pub fn with_penalties(mut self, penalties: PenaltyWeights) -> Self {
        self.penalties = penalties;
        self
    }

    /// Enforces precedence algorithmically (`true`) or penalizes it (`false`).
    pub fn with_enforced_precedence(mut self, enforce: bool) -> Self {
        self.enforce_precedence = enforce;
        self
    }

    /// Sets the makespan and cost weights.
    pub fn with_weights(mut self, makespan_weight: f64, cost_weight: f64) -> Self {
        self.makespan_weight = makespan_weight;
        self.cost_weight = cost_weight;
        self
    }

    /// Divides the makespan by the instance's total duration.
    pub fn with_normalized_makespan(mut self, normalize: bool) -> Self {
        self.normalize_makespan = normalize;
        self
    }

    fn validate(&self) -> Result<()> {
        let weights = [
            ("fitness.makespan_weight", self.makespan_weight),
            ("fitness.cost_weight", self.cost_weight),
            ("fitness.penalties.idle_resource", self.penalties.idle_resource),
            ("fitness.penalties.waiting_task", self.penalties.waiting_task),
            ("fitness.penalties.skill_mismatch", self.penalties.skill_mismatch),
            (
                "fitness.penalties.precedence_violation",
                self.penalties.precedence_violation,
            ),
        ];
        for (key, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::config(key, format!("must be finite and >= 0, got {value}")));
            }
        }
        Ok(())
    }
}

/// Evolution loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Target population size after each selection.
    pub population_size: usize,
    /// Maximum number of generations.
    pub generation_limit: usize,
    /// Stop once the best fitness is at or below this value.
    pub fitness_threshold: Option<f64>,
    /// Leading fraction of the population allowed to breed.
    pub breeder_fraction: f64,
    /// Duplicate fraction above which clone handling kicks in.
    pub clone_threshold: f64,
    /// Per-gene mutation probability.
    pub mutation_probability: f64,
    /// Probability that a breeding pair produces a child.
    pub crossover_probability: f64,
    pub pairing: PairingStrategy,
    pub recombination: RecombinationShape,
    pub selection: SelectionStrategy,
    pub clone_strategy: CloneStrategy,
    /// Standard deviation of clone-escape priority draws, as a fraction
    /// of the task count.
    pub clone_escape_spread: f64,
    pub fitness: FitnessConfig,
    /// Evaluate fitness on the rayon thread pool.
    pub parallel: bool,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generation_limit: 50,
            fitness_threshold: None,
            breeder_fraction: 1.0,
            clone_threshold: 0.05,
            mutation_probability: 0.03,
            crossover_probability: 0.4,
            pairing: PairingStrategy::EqualOpportunity,
            recombination: RecombinationShape::SinglePoint,
            selection: SelectionStrategy::Ranking,
            clone_strategy: CloneStrategy::Mutation { amplification: 10.0 },
            clone_escape_spread: 0.5,
            fitness: FitnessConfig::default(),
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Parses a JSON configuration and validates it.
    ///
    /// Unknown strategy names are rejected by serde; there is no fallback.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_generation_limit(mut self, limit: usize) -> Self {
        self.generation_limit = limit;
        self
    }

    pub fn with_fitness_threshold(mut self, threshold: f64) -> Self {
        self.fitness_threshold = Some(threshold);
        self
    }

    pub fn with_breeder_fraction(mut self, fraction: f64) -> Self {
        self.breeder_fraction = fraction;
        self
    }

    pub fn with_clone_threshold(mut self, threshold: f64) -> Self {
        self.clone_threshold = threshold;
        self
    }

    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p;
        self
    }

    pub fn with_pairing(mut self, pairing: PairingStrategy) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn with_recombination(mut self, shape: RecombinationShape) -> Self {
        self.recombination = shape;
        self
    }

    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_clone_strategy(mut self, strategy: CloneStrategy) -> Self {
        self.clone_strategy = strategy;
        self
    }

    pub fn with_fitness(mut self, fitness: FitnessConfig) -> Self {
        self.fitness = fitness;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of breeders for the current target size (at least one).
    pub fn breeder_count(&self) -> usize {
        ((self.breeder_fraction * self.population_size as f64).ceil() as usize)
            .clamp(1, self.population_size.max(1))
    }

    /// Validates every knob.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::config(
                "population_size",
                format!("must be at least 2, got {}", self.population_size),
            ));
        }
        if self.generation_limit == 0 {
            return Err(Error::config("generation_limit", "must be greater than 0"));
        }
        if let Some(t) = self.fitness_threshold {
            if !t.is_finite() {
                return Err(Error::config("fitness_threshold", "must be finite"));
            }
        }
        if !(self.breeder_fraction > 0.0 && self.breeder_fraction <= 1.0) {
            return Err(Error::config(
                "breeder_fraction",
                format!("must be in (0, 1], got {}", self.breeder_fraction),
            ));
        }

        let probabilities = [
            ("clone_threshold", self.clone_threshold),
            ("mutation_probability", self.mutation_probability),
            ("crossover_probability", self.crossover_probability),
        ];
        for (key, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(key, format!("must be in [0, 1], got {value}")));
            }
        }

        if let SelectionStrategy::Tournament { size } = self.selection {
            if size == 0 {
                return Err(Error::config("selection.tournament.size", "must be at least 1"));
            }
        }
        if let CloneStrategy::Mutation { amplification } = self.clone_strategy {
            if !amplification.is_finite() || amplification < 1.0 {
                return Err(Error::config(
                    "clone_strategy.mutation.amplification",
                    format!("must be finite and >= 1, got {amplification}"),
                ));
            }
        }
        if !self.clone_escape_spread.is_finite() || self.clone_escape_spread <= 0.0 {
            return Err(Error::config(
                "clone_escape_spread",
                format!("must be finite and > 0, got {}", self.clone_escape_spread),
            ));
        }

        self.fitness.validate()
    }
}
