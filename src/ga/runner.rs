//! Generational evolution loop.
//!
//! [`Evolution`] drives the population through
//! `Initializing -> Running { generation } -> Terminated(reason)`.
//! One generation:
//!
//! 1. Breeders are the leading `ceil(breeder_fraction * N)` individuals
//!    (the population is kept sorted, best first).
//! 2. Pairing + recombination append offspring.
//! 3. Every individual mutates at the base probability.
//! 4. Dirty individuals are evaluated.
//! 5. Clone handling runs when duplicates exceed the threshold.
//! 6. Selection reduces the population back to `N`.
//! 7. Statistics are recorded and the all-time best is updated.
//! 8. Elitism: the all-time best is re-inserted if no structurally equal
//!    individual survived (the population holds `N + 1` until the next
//!    selection).
//!
//! All randomness comes from one seeded `SmallRng`, consumed in a fixed
//! order, so a fixed seed reproduces a run exactly.
//!
//! # Reference
//! Holland (1975), "Adaptation in Natural and Artificial Systems";
//! De Jong (1975), elitist strategy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::chromosome::{MutationMode, ScheduleChromosome};
use super::config::GaConfig;
use super::observer::ProgressSink;
use super::population::{evaluate_all, score, sort_by_fitness, GenerationStats};
use super::ProblemInstance;
use crate::error::{Error, Result};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    GenerationLimit,
    /// The cancellation flag was observed between generations.
    Cancelled,
    /// Best fitness reached the configured threshold.
    FitnessThreshold,
}

/// Lifecycle of an [`Evolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initializing,
    /// `generation` is the last completed generation (0 = initial population).
    Running { generation: usize },
    Terminated(TerminationReason),
}

/// Outcome of a complete run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// All-time best chromosome (evaluated).
    pub best: ScheduleChromosome,
    pub best_fitness: f64,
    /// One entry per generation, starting with generation 0.
    pub stats: Vec<GenerationStats>,
    /// Generations run after initialization.
    pub generations: usize,
    pub reason: TerminationReason,
}

/// Evolution loop over one problem instance.
pub struct Evolution<'a> {
    instance: &'a ProblemInstance,
    config: GaConfig,
    rng: SmallRng,
    population: Vec<ScheduleChromosome>,
    best: Option<ScheduleChromosome>,
    stats: Vec<GenerationStats>,
    state: RunState,
    cancel: Arc<AtomicBool>,
}

impl<'a> Evolution<'a> {
    /// Validates the configuration and seeds the RNG.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] for any out-of-range knob.
    pub fn new(instance: &'a ProblemInstance, config: GaConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self {
            instance,
            config,
            rng,
            population: Vec::new(),
            best: None,
            stats: Vec::new(),
            state: RunState::Initializing,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared flag; storing `true` stops the run before the next generation.
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Current population, best first.
    pub fn population(&self) -> &[ScheduleChromosome] {
        &self.population
    }

    /// All-time best chromosome, once initialized.
    pub fn best(&self) -> Option<&ScheduleChromosome> {
        self.best.as_ref()
    }

    pub fn stats(&self) -> &[GenerationStats] {
        &self.stats
    }

    /// Builds and evaluates the random initial population (generation 0).
    pub fn initialize(&mut self, sink: &mut dyn ProgressSink) {
        let size = self.config.population_size;
        self.population = (0..size)
            .map(|_| ScheduleChromosome::random(self.instance, &mut self.rng))
            .collect();
        evaluate_all(
            &mut self.population,
            self.instance,
            &self.config.fitness,
            self.config.parallel,
        );
        sort_by_fitness(&mut self.population);

        self.best = None;
        self.stats.clear();
        self.record(0, sink);
        self.state = RunState::Running { generation: 0 };
    }

    /// Runs one generation, initializing first if needed.
    ///
    /// Returns the number of the generation just completed. Does nothing
    /// once the run has terminated.
    pub fn step(&mut self, sink: &mut dyn ProgressSink) -> usize {
        let previous = match self.state {
            RunState::Initializing => {
                self.initialize(sink);
                0
            }
            RunState::Running { generation } => generation,
            RunState::Terminated(_) => return self.generation(),
        };
        let generation = previous + 1;

        let breeders = self.config.breeder_count().min(self.population.len());
        let offspring =
            self.config
                .pairing
                .breed(&self.population[..breeders], &self.config, &mut self.rng);
        let offspring_count = offspring.len();
        self.population.extend(offspring);

        for chromosome in self.population.iter_mut() {
            chromosome.mutate(
                self.instance,
                self.config.mutation_probability,
                MutationMode::Standard,
                &mut self.rng,
            );
        }
        evaluate_all(
            &mut self.population,
            self.instance,
            &self.config.fitness,
            self.config.parallel,
        );

        let clones = self.config.clone_strategy.apply(
            &mut self.population,
            self.instance,
            &self.config,
            &mut self.rng,
        );

        let candidates = std::mem::take(&mut self.population);
        self.population =
            self.config
                .selection
                .select(candidates, self.config.population_size, &mut self.rng);

        debug!(
            generation,
            offspring = offspring_count,
            duplicates = clones.duplicates,
            clones_handled = clones.handled,
            "generation evolved"
        );

        self.record(generation, sink);
        self.preserve_elite();
        self.state = RunState::Running { generation };
        generation
    }

    /// Runs until a termination condition holds.
    ///
    /// Conditions are checked before each generation: cancellation, then
    /// the fitness threshold, then the generation limit.
    #[instrument(
        level = "info",
        skip_all,
        fields(
            tasks = self.instance.task_count(),
            resources = self.instance.resource_count(),
            population = self.config.population_size,
        )
    )]
    pub fn run(&mut self, sink: &mut dyn ProgressSink) -> Result<RunResult> {
        if self.state == RunState::Initializing {
            self.initialize(sink);
        }

        let reason = loop {
            if let RunState::Terminated(reason) = self.state {
                break reason;
            }
            if let Some(reason) = self.termination_reason() {
                self.state = RunState::Terminated(reason);
                break reason;
            }
            self.step(sink);
        };

        let best = self.best.clone().ok_or(Error::NoSolution)?;
        let best_fitness = score(&best);
        let generations = self.generation();

        info!(?reason, generations, best_fitness, "evolution finished");

        Ok(RunResult {
            best,
            best_fitness,
            stats: self.stats.clone(),
            generations,
            reason,
        })
    }

    fn generation(&self) -> usize {
        self.stats.last().map_or(0, |s| s.generation)
    }

    fn termination_reason(&self) -> Option<TerminationReason> {
        if self.cancel.load(Ordering::Relaxed) {
            return Some(TerminationReason::Cancelled);
        }
        if let (Some(threshold), Some(best)) = (self.config.fitness_threshold, &self.best) {
            if score(best) <= threshold {
                return Some(TerminationReason::FitnessThreshold);
            }
        }
        if self.generation() >= self.config.generation_limit {
            return Some(TerminationReason::GenerationLimit);
        }
        None
    }

    /// Records statistics and updates the all-time best (strictly better only).
    fn record(&mut self, generation: usize, sink: &mut dyn ProgressSink) {
        let stats = GenerationStats::collect(generation, &self.population);
        sink.on_generation(&stats);
        self.stats.push(stats);

        let Some(leader) = self.population.first() else {
            return;
        };
        let improved = match &self.best {
            Some(best) => score(leader) < score(best),
            None => true,
        };
        if improved {
            let fitness = score(leader);
            self.best = Some(leader.clone());
            sink.on_best_improved(generation, leader, fitness);
        }
    }

    /// Re-inserts the all-time best if no structurally equal copy survived.
    fn preserve_elite(&mut self) {
        if let Some(best) = &self.best {
            if !self.population.contains(best) {
                self.population.insert(0, best.clone());
            }
        }
    }
}
