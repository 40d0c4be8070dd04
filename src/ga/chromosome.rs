//! Resource/priority dual-vector chromosome.
//!
//! # Encoding
//!
//! The chromosome consists of two vectors indexed by task ID:
//! - **Resource vector**: the resource assigned to each task, always drawn
//!   from the task's eligible set.
//! - **Priority vector**: a scheduling key in `[0, n)` per task. Lower
//!   values are attempted earlier by the simulator; equal keys fall back
//!   to task ID.
//!
//! For recombination both vectors are viewed as one gene sequence of
//! length `2n` (resources first, then priorities), so a single cut can
//! sever assignment and ordering information together.
//!
//! # Fitness cache
//!
//! Fitness is computed lazily and cached. Only [`ScheduleChromosome::mutate`]
//! (when a gene actually changes) and recombination (which builds a fresh
//! child) can leave the cache empty.

use std::hash::{Hash, Hasher};

use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::config::{FitnessConfig, GaConfig};
use super::ProblemInstance;
use crate::models::{ResourceId, Schedule, TaskId};
use crate::scheduler::{self, SimulationOutcome};

/// Candidate schedule: resource assignment plus priority per task.
///
/// Lower fitness = better schedule (minimization convention).
/// Equality and hashing look at the genes only, never at the cache.
#[derive(Debug, Clone)]
pub struct ScheduleChromosome {
    resource_of: Vec<ResourceId>,
    priority_of: Vec<u32>,
    /// Cached fitness; `None` when dirty.
    fitness: Option<f64>,
}

/// How priorities are redrawn during mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MutationMode {
    /// Uniform in `[0, n)`.
    Standard,
    /// Normal around the current value with standard deviation
    /// `spread * n`, rounded and clamped. Used to push clones apart.
    CloneEscape { spread: f64 },
}

impl PartialEq for ScheduleChromosome {
    fn eq(&self, other: &Self) -> bool {
        self.resource_of == other.resource_of && self.priority_of == other.priority_of
    }
}

impl Eq for ScheduleChromosome {}

impl Hash for ScheduleChromosome {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resource_of.hash(state);
        self.priority_of.hash(state);
    }
}

impl ScheduleChromosome {
    /// Creates a random chromosome: uniform eligible resource and uniform
    /// priority for every task.
    pub fn random<R: Rng>(instance: &ProblemInstance, rng: &mut R) -> Self {
        let n = instance.task_count();
        let resource_of = (0..n)
            .map(|task| random_resource(instance, task, rng))
            .collect();
        let priority_of = (0..n).map(|_| random_priority(n, rng)).collect();
        Self {
            resource_of,
            priority_of,
            fitness: None,
        }
    }

    /// Creates a chromosome from explicit genes (not yet evaluated).
    ///
    /// Use [`is_valid`](Self::is_valid) to check it against an instance.
    pub fn from_genes(resource_of: Vec<ResourceId>, priority_of: Vec<u32>) -> Self {
        Self {
            resource_of,
            priority_of,
            fitness: None,
        }
    }

    /// Assigned resource per task.
    #[inline]
    pub fn resource_of(&self) -> &[ResourceId] {
        &self.resource_of
    }

    /// Scheduling priority per task.
    #[inline]
    pub fn priority_of(&self) -> &[u32] {
        &self.priority_of
    }

    /// Number of tasks encoded.
    #[inline]
    pub fn task_count(&self) -> usize {
        self.resource_of.len()
    }

    /// Length of the combined gene sequence (`2n`).
    #[inline]
    pub fn gene_count(&self) -> usize {
        self.resource_of.len() + self.priority_of.len()
    }

    /// Validates the chromosome against an instance.
    ///
    /// Checks lengths, resource eligibility and priority range.
    pub fn is_valid(&self, instance: &ProblemInstance) -> bool {
        let n = instance.task_count();
        if self.resource_of.len() != n || self.priority_of.len() != n {
            return false;
        }
        let resources_ok = self
            .resource_of
            .iter()
            .enumerate()
            .all(|(task, &r)| r < instance.resource_count() && instance.is_eligible(task, r));
        resources_ok && self.priority_of.iter().all(|&p| (p as usize) < n)
    }

    /// Returns the cached fitness, if any.
    #[inline]
    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Fitness (lower is better), simulated on first use and cached.
    ///
    /// Deterministic: the same genes, instance and configuration always
    /// yield a bit-identical value.
    pub fn fitness(&mut self, instance: &ProblemInstance, config: &FitnessConfig) -> f64 {
        match self.fitness {
            Some(f) => f,
            None => {
                let f = scheduler::simulate(instance, self, config).fitness;
                self.fitness = Some(f);
                f
            }
        }
    }

    /// Runs the simulator without touching the cache.
    pub fn evaluate(&self, instance: &ProblemInstance, config: &FitnessConfig) -> SimulationOutcome {
        scheduler::simulate(instance, self, config)
    }

    /// Replays the simulation, recording the concrete timeline.
    pub fn replay(
        &self,
        instance: &ProblemInstance,
        config: &FitnessConfig,
    ) -> (SimulationOutcome, Schedule) {
        scheduler::replay(instance, self, config)
    }

    /// Mutates genes independently with probability `probability`.
    ///
    /// For each task, the resource is redrawn from the eligible set with
    /// probability `p`, and independently the priority is redrawn with
    /// probability `p` according to `mode`. Returns whether any gene
    /// changed; the fitness cache is cleared only in that case.
    pub fn mutate<R: Rng>(
        &mut self,
        instance: &ProblemInstance,
        probability: f64,
        mode: MutationMode,
        rng: &mut R,
    ) -> bool {
        let n = self.task_count();
        let mut changed = false;

        for task in 0..n {
            if rng.random_bool(probability) {
                let resource = random_resource(instance, task, rng);
                changed |= resource != self.resource_of[task];
                self.resource_of[task] = resource;
            }
            if rng.random_bool(probability) {
                let current = self.priority_of[task];
                let priority = match mode {
                    MutationMode::Standard => random_priority(n, rng),
                    MutationMode::CloneEscape { spread } => {
                        escape_priority(current, n, spread, rng)
                    }
                };
                changed |= priority != current;
                self.priority_of[task] = priority;
            }
        }

        if changed {
            self.fitness = None;
        }
        changed
    }

    /// Attempts crossover with `other` as parent B.
    ///
    /// Fires with the configured crossover probability and then yields
    /// exactly one child built with the configured recombination shape.
    pub fn crossover<R: Rng>(&self, other: &Self, config: &GaConfig, rng: &mut R) -> Option<Self> {
        if !rng.random_bool(config.crossover_probability) {
            return None;
        }
        Some(config.recombination.recombine(self, other, rng))
    }
}

// ======================== Recombination primitives ========================

/// Single-point recombination at `cut`.
///
/// Child gene `k` comes from `a` for `k <= cut` and from `b` for `k > cut`,
/// over the combined sequence of length `2n`.
pub fn single_point(
    a: &ScheduleChromosome,
    b: &ScheduleChromosome,
    cut: usize,
) -> ScheduleChromosome {
    recombine_by(a, b, |k| k > cut)
}

/// Double-point recombination: genes in `(first, second]` come from `b`,
/// all others from `a`.
pub fn double_point(
    a: &ScheduleChromosome,
    b: &ScheduleChromosome,
    first: usize,
    second: usize,
) -> ScheduleChromosome {
    let (lo, hi) = if first <= second {
        (first, second)
    } else {
        (second, first)
    };
    recombine_by(a, b, |k| k > lo && k <= hi)
}

fn recombine_by(
    a: &ScheduleChromosome,
    b: &ScheduleChromosome,
    from_b: impl Fn(usize) -> bool,
) -> ScheduleChromosome {
    let n = a.task_count();
    let parent = |k: usize| if from_b(k) { b } else { a };

    let resource_of = (0..n).map(|k| parent(k).resource_of[k]).collect();
    let priority_of = (0..n).map(|k| parent(n + k).priority_of[k]).collect();

    ScheduleChromosome {
        resource_of,
        priority_of,
        fitness: None,
    }
}

// ======================== Gene sampling ========================

fn random_resource<R: Rng>(instance: &ProblemInstance, task: TaskId, rng: &mut R) -> ResourceId {
    let candidates = instance.eligible_resources(task);
    candidates[rng.random_range(0..candidates.len())]
}

fn random_priority<R: Rng>(task_count: usize, rng: &mut R) -> u32 {
    rng.random_range(0..task_count as u32)
}

fn escape_priority<R: Rng>(current: u32, task_count: usize, spread: f64, rng: &mut R) -> u32 {
    let max = (task_count - 1) as f64;
    match Normal::new(f64::from(current), spread * task_count as f64) {
        Ok(normal) => normal.sample(rng).round().clamp(0.0, max) as u32,
        Err(_) => random_priority(task_count, rng),
    }
}
