//! Configurable genetic operators for scheduling.
//!
//! Every operator family is a closed enum selected at runtime from
//! [`GaConfig`]: recombination shape, pairing strategy, clone handling and
//! survivor selection. Each family is dispatched through a single `match`.
//!
//! # Usage
//!
//! ```
//! use u_rcpsp::ga::GaConfig;
//! use u_rcpsp::ga::operators::{PairingStrategy, RecombinationShape};
//!
//! let config = GaConfig::default()
//!     .with_pairing(PairingStrategy::FalloffLinear)
//!     .with_recombination(RecombinationShape::DoublePoint);
//! assert_eq!(config.pairing, PairingStrategy::FalloffLinear);
//! ```
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning", Ch. 3 (crossover, selection)
//! - Miller & Goldberg (1995), "Genetic Algorithms, Tournament Selection,
//!   and the Effects of Noise"

use std::collections::HashSet;
use std::f64::consts::FRAC_PI_2;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chromosome::{double_point, single_point, MutationMode, ScheduleChromosome};
use super::config::GaConfig;
use super::population::{duplicate_groups, evaluate_all, score, sort_by_fitness};
use super::ProblemInstance;

// ======================== Recombination ========================

/// Shape of the cut over the combined `2n` gene sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecombinationShape {
    /// One cut `c` uniform in `[0, 2n)`: genes `<= c` from A, rest from B.
    SinglePoint,
    /// Two cuts `i <= j`: genes in `(i, j]` from B, rest from A.
    DoublePoint,
}

impl RecombinationShape {
    /// Produces one child from parents `a` and `b`.
    pub fn recombine<R: Rng>(
        &self,
        a: &ScheduleChromosome,
        b: &ScheduleChromosome,
        rng: &mut R,
    ) -> ScheduleChromosome {
        let len = a.gene_count();
        if len == 0 {
            return a.clone();
        }
        match self {
            Self::SinglePoint => single_point(a, b, rng.random_range(0..len)),
            Self::DoublePoint => {
                let first = rng.random_range(0..len);
                let second = rng.random_range(0..len);
                double_point(a, b, first.min(second), first.max(second))
            }
        }
    }
}

// ======================== Pairing ========================

/// How breeders are paired for crossover.
///
/// Breeders are passed in rank order (best first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStrategy {
    /// Adjacent pairs `(0,1), (2,3), ...`.
    SimplePairs,
    /// Every ordered pair `(i, j)` with `i != j`.
    EqualOpportunity,
    /// Pairs `i < j` accepted with a probability falling linearly in rank.
    FalloffLinear,
    /// Pairs `i < j` accepted with a cosine-shaped falloff.
    FalloffCosine,
}

impl PairingStrategy {
    /// Attempts crossover over the breeders and returns the offspring.
    ///
    /// Each attempted pair still passes the crossover-probability gate of
    /// [`ScheduleChromosome::crossover`].
    pub fn breed<R: Rng>(
        &self,
        breeders: &[ScheduleChromosome],
        config: &GaConfig,
        rng: &mut R,
    ) -> Vec<ScheduleChromosome> {
        let n = breeders.len();
        let mut offspring = Vec::new();

        match self {
            Self::SimplePairs => {
                for pair in breeders.chunks_exact(2) {
                    offspring.extend(pair[0].crossover(&pair[1], config, rng));
                }
            }
            Self::EqualOpportunity => {
                for i in 0..n {
                    for j in (0..n).filter(|&j| j != i) {
                        offspring.extend(breeders[i].crossover(&breeders[j], config, rng));
                    }
                }
            }
            Self::FalloffLinear | Self::FalloffCosine => {
                let cosine = matches!(self, Self::FalloffCosine);
                for i in 0..n {
                    for j in (i + 1)..n {
                        let p = falloff_probability(i, j, n, cosine);
                        if rng.random::<f64>() < p {
                            offspring.extend(breeders[i].crossover(&breeders[j], config, rng));
                        }
                    }
                }
            }
        }

        offspring
    }
}

/// Acceptance probability of pair `(i, j)`, `i < j < n`, for falloff pairing.
///
/// `lin = (n - j - 1) / (n - i)`; the cosine variant maps `f = 1 - lin`
/// to `cos(f * pi / 2)`.
pub fn falloff_probability(i: usize, j: usize, n: usize, cosine: bool) -> f64 {
    let lin = (n - j - 1) as f64 / (n - i) as f64;
    if cosine {
        ((1.0 - lin) * FRAC_PI_2).cos()
    } else {
        lin
    }
}

// ======================== Clone handling ========================

/// Response to a population crowded with structural duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneStrategy {
    /// Re-mutate surplus copies at `min(1, amplification * p)` using
    /// clone-escape priority draws.
    Mutation { amplification: f64 },
    /// Drop surplus copies and refill with random chromosomes.
    Elimination,
    /// Detect and report only.
    Disabled,
}

/// Outcome of one clone-handling pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloneReport {
    /// `population.len() - distinct` before handling.
    pub duplicates: usize,
    /// `duplicates / population_size`.
    pub fraction: f64,
    /// Whether the threshold was exceeded and the strategy acted.
    pub handled: bool,
}

impl CloneStrategy {
    /// Detects duplicates and, above `clone_threshold`, applies the
    /// strategy. Touched chromosomes are re-evaluated before returning.
    pub fn apply<R: Rng>(
        &self,
        population: &mut Vec<ScheduleChromosome>,
        instance: &ProblemInstance,
        config: &GaConfig,
        rng: &mut R,
    ) -> CloneReport {
        let groups = duplicate_groups(population);
        let duplicates = population.len() - groups.len();
        let fraction = duplicates as f64 / config.population_size.max(1) as f64;
        let exceeded = duplicates > 0 && fraction > config.clone_threshold;

        let handled = match self {
            _ if !exceeded => false,
            Self::Disabled => false,
            Self::Mutation { amplification } => {
                let probability = (amplification * config.mutation_probability).min(1.0);
                let mode = MutationMode::CloneEscape {
                    spread: config.clone_escape_spread,
                };
                for group in &groups {
                    for &idx in group.iter().skip(1) {
                        population[idx].mutate(instance, probability, mode, rng);
                    }
                }
                true
            }
            Self::Elimination => {
                eliminate_clones(population, instance, config.population_size, rng);
                true
            }
        };

        if handled {
            evaluate_all(population, instance, &config.fitness, config.parallel);
            debug!(duplicates, fraction, strategy = ?self, "clone handling applied");
        }

        CloneReport {
            duplicates,
            fraction,
            handled,
        }
    }
}

/// Draws per missing slot before refills may repeat an existing genotype.
const REFILL_ATTEMPTS: usize = 32;

/// Keeps the first (best) member of each group, then tops up with distinct
/// random chromosomes to `target`.
///
/// On instances with fewer than `target` distinct genotypes the refill
/// falls back to repeats after a bounded number of draws.
fn eliminate_clones<R: Rng>(
    population: &mut Vec<ScheduleChromosome>,
    instance: &ProblemInstance,
    target: usize,
    rng: &mut R,
) {
    sort_by_fitness(population);
    let mut seen: HashSet<ScheduleChromosome> = HashSet::with_capacity(target);
    population.retain(|c| seen.insert(c.clone()));

    let max_draws = target.saturating_mul(REFILL_ATTEMPTS);
    let mut draws = 0usize;
    while population.len() < target {
        let candidate = ScheduleChromosome::random(instance, rng);
        draws += 1;
        if draws > max_draws || seen.insert(candidate.clone()) {
            population.push(candidate);
        }
    }
}

// ======================== Selection ========================

/// Survivor selection down to the target population size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Sort ascending by fitness and truncate.
    Ranking,
    /// `target` tournaments, each sampling `size` individuals uniformly
    /// with replacement; the fittest of each survives.
    Tournament { size: usize },
}

impl SelectionStrategy {
    /// Selects `target` survivors from an evaluated population.
    ///
    /// The result is sorted ascending by fitness.
    pub fn select<R: Rng>(
        &self,
        mut population: Vec<ScheduleChromosome>,
        target: usize,
        rng: &mut R,
    ) -> Vec<ScheduleChromosome> {
        match self {
            Self::Ranking => {
                sort_by_fitness(&mut population);
                population.truncate(target);
                population
            }
            Self::Tournament { size } => {
                if population.is_empty() {
                    return population;
                }
                let len = population.len();
                let mut survivors: Vec<ScheduleChromosome> = (0..target)
                    .map(|_| {
                        let mut best = rng.random_range(0..len);
                        for _ in 1..*size {
                            let challenger = rng.random_range(0..len);
                            if score(&population[challenger]) < score(&population[best]) {
                                best = challenger;
                            }
                        }
                        population[best].clone()
                    })
                    .collect();
                sort_by_fitness(&mut survivors);
                survivors
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Resource, Task};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    fn instance() -> ProblemInstance {
        let resources = vec![
            Resource::new(0, 10.0).with_skill(1, 1),
            Resource::new(1, 20.0).with_skill(1, 2).with_skill(2, 1),
            Resource::new(2, 40.0).with_skill(1, 3).with_skill(2, 3),
        ];
        let tasks = vec![
            Task::new(0, 2).with_requirement(1, 1),
            Task::new(1, 3).with_requirement(2, 1),
            Task::new(2, 1).with_predecessor(0),
            Task::new(3, 4).with_requirement(1, 2).with_predecessor(1),
            Task::new(4, 2),
            Task::new(5, 3).with_requirement(2, 2).with_predecessor(2),
        ];
        ProblemInstance::new(resources, tasks).unwrap()
    }

    fn evaluated(inst: &ProblemInstance, n: usize, rng: &mut SmallRng) -> Vec<ScheduleChromosome> {
        let mut pop: Vec<_> = (0..n).map(|_| ScheduleChromosome::random(inst, rng)).collect();
        evaluate_all(&mut pop, inst, &GaConfig::default().fitness, false);
        sort_by_fitness(&mut pop);
        pop
    }

    #[test]
    fn test_recombine_shapes_keep_eligibility() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(42);
        let a = ScheduleChromosome::random(&inst, &mut rng);
        let b = ScheduleChromosome::random(&inst, &mut rng);

        for shape in [RecombinationShape::SinglePoint, RecombinationShape::DoublePoint] {
            for _ in 0..50 {
                let child = shape.recombine(&a, &b, &mut rng);
                assert!(child.is_valid(&inst));
                // Every gene comes from one of the parents at the same locus
                for k in 0..inst.task_count() {
                    let r = child.resource_of()[k];
                    assert!(r == a.resource_of()[k] || r == b.resource_of()[k]);
                    let p = child.priority_of()[k];
                    assert!(p == a.priority_of()[k] || p == b.priority_of()[k]);
                }
            }
        }
    }

    #[test]
    fn test_pairing_offspring_counts_at_full_probability() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(1);
        let breeders = evaluated(&inst, 5, &mut rng);
        let config = GaConfig::default().with_crossover_probability(1.0);

        let simple = PairingStrategy::SimplePairs.breed(&breeders, &config, &mut rng);
        assert_eq!(simple.len(), 2);

        let equal = PairingStrategy::EqualOpportunity.breed(&breeders, &config, &mut rng);
        assert_eq!(equal.len(), 5 * 4);

        let linear = PairingStrategy::FalloffLinear.breed(&breeders, &config, &mut rng);
        assert!(linear.len() <= 10);
        for child in equal.iter().chain(&linear) {
            assert!(child.is_valid(&inst));
            assert!(child.cached_fitness().is_none());
        }
    }

    #[test]
    fn test_pairing_respects_crossover_gate() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(2);
        let breeders = evaluated(&inst, 6, &mut rng);
        let config = GaConfig::default().with_crossover_probability(0.0);

        for strategy in [
            PairingStrategy::SimplePairs,
            PairingStrategy::EqualOpportunity,
            PairingStrategy::FalloffLinear,
            PairingStrategy::FalloffCosine,
        ] {
            assert!(strategy.breed(&breeders, &config, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_falloff_probability() {
        // Best pair of four: lin = 2/4
        assert!((falloff_probability(0, 1, 4, false) - 0.5).abs() < 1e-12);
        // Last partner is never accepted
        assert_eq!(falloff_probability(0, 3, 4, false), 0.0);
        assert!(falloff_probability(0, 3, 4, true).abs() < 1e-12);
        // Cosine is never below linear
        for j in 1..4 {
            assert!(falloff_probability(0, j, 4, true) >= falloff_probability(0, j, 4, false));
        }
    }

    #[test]
    fn test_ranking_selection_truncates_sorted() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut pop = evaluated(&inst, 30, &mut rng);
        pop.reverse();

        let best = pop.iter().map(score).fold(f64::INFINITY, f64::min);
        let selected = SelectionStrategy::Ranking.select(pop, 10, &mut rng);
        assert_eq!(selected.len(), 10);
        assert_eq!(score(&selected[0]), best);
        for w in selected.windows(2) {
            assert!(score(&w[0]) <= score(&w[1]));
        }
    }

    #[test]
    fn test_tournament_selection_size() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(4);
        let pop = evaluated(&inst, 25, &mut rng);
        let worst = pop.iter().map(score).fold(f64::NEG_INFINITY, f64::max);

        let selected = SelectionStrategy::Tournament { size: 3 }.select(pop, 12, &mut rng);
        assert_eq!(selected.len(), 12);
        for w in selected.windows(2) {
            assert!(score(&w[0]) <= score(&w[1]));
        }
        assert!(selected.iter().all(|c| score(c) <= worst));
    }

    #[test]
    fn test_clone_elimination_dedups_and_refills() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(5);
        let config = GaConfig::default()
            .with_population_size(10)
            .with_clone_strategy(CloneStrategy::Elimination);

        let base = evaluated(&inst, 3, &mut rng);
        let mut pop: Vec<_> = base.iter().cycle().take(12).cloned().collect();

        let report = CloneStrategy::Elimination.apply(&mut pop, &inst, &config, &mut rng);
        assert!(report.handled);
        assert_eq!(report.duplicates, 9);
        assert_eq!(pop.len(), 10);

        // No group keeps more than one member, refills included
        assert!(duplicate_groups(&pop).iter().all(|g| g.len() == 1));
        for seeded in &base {
            assert!(pop.contains(seeded));
        }
        assert!(pop.iter().all(|c| c.cached_fitness().is_some()));
    }

    #[test]
    fn test_clone_elimination_refill_terminates_on_tiny_instance() {
        // One task, one resource: a single priority/resource genotype exists
        let inst = ProblemInstance::new(vec![Resource::new(0, 1.0)], vec![Task::new(0, 2)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(8);
        let config = GaConfig::default().with_population_size(5);
        let mut pop = vec![ScheduleChromosome::random(&inst, &mut rng); 6];
        evaluate_all(&mut pop, &inst, &config.fitness, false);

        let report = CloneStrategy::Elimination.apply(&mut pop, &inst, &config, &mut rng);
        assert!(report.handled);
        assert_eq!(pop.len(), 5);
        assert!(pop.iter().all(|c| c.is_valid(&inst)));
    }

    #[test]
    fn test_clone_mutation_spreads_duplicates() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(6);
        let config = GaConfig::default()
            .with_population_size(10)
            .with_mutation_probability(0.1);
        let seed = evaluated(&inst, 1, &mut rng).remove(0);
        let mut pop = vec![seed; 10];

        let report = config.clone_strategy.apply(&mut pop, &inst, &config, &mut rng);
        assert!(report.handled);
        assert_eq!(report.duplicates, 9);

        let distinct: HashSet<_> = pop.iter().collect();
        assert!(distinct.len() > 1);
        assert!(pop.iter().all(|c| c.is_valid(&inst) && c.cached_fitness().is_some()));
    }

    #[test]
    fn test_clone_handling_below_threshold_or_disabled() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(7);
        let config = GaConfig::default().with_population_size(10);
        let mut pop = evaluated(&inst, 10, &mut rng);
        pop[9] = pop[0].clone();
        let before = pop.clone();

        let report = CloneStrategy::Disabled.apply(&mut pop, &inst, &config, &mut rng);
        assert!(!report.handled);
        assert_eq!(report.duplicates, 1);
        assert!((report.fraction - 0.1).abs() < 1e-12);
        assert_eq!(pop, before);

        let lenient = config.with_clone_threshold(0.5);
        let report = CloneStrategy::Elimination.apply(&mut pop, &inst, &lenient, &mut rng);
        assert!(!report.handled);
        assert_eq!(pop, before);
    }

    #[test]
    fn test_strategy_json_names() {
        let json = serde_json::to_string(&PairingStrategy::FalloffCosine).unwrap();
        assert_eq!(json, "\"falloff_cosine\"");
        let parsed: SelectionStrategy =
            serde_json::from_str(r#"{"tournament":{"size":4}}"#).unwrap();
        assert_eq!(parsed, SelectionStrategy::Tournament { size: 4 });
        assert!(serde_json::from_str::<RecombinationShape>("\"triple_point\"").is_err());
    }
}
