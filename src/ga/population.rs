//! Population helpers: evaluation, ordering, statistics, duplicates.
//!
//! The population is a plain `Vec<ScheduleChromosome>`. Between
//! generations it is kept sorted ascending by fitness, so the leading
//! entries are the best individuals.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::chromosome::ScheduleChromosome;
use super::config::FitnessConfig;
use super::ProblemInstance;

/// Fitness used for ordering: cached value, or `+inf` when unevaluated.
#[inline]
pub fn score(chromosome: &ScheduleChromosome) -> f64 {
    chromosome.cached_fitness().unwrap_or(f64::INFINITY)
}

/// Evaluates every chromosome whose cache is empty.
///
/// Evaluation draws no randomness, so the parallel path produces exactly
/// the same values as the sequential one.
pub fn evaluate_all(
    population: &mut [ScheduleChromosome],
    instance: &ProblemInstance,
    config: &FitnessConfig,
    parallel: bool,
) {
    if parallel {
        population.par_iter_mut().for_each(|chromosome| {
            chromosome.fitness(instance, config);
        });
    } else {
        for chromosome in population.iter_mut() {
            chromosome.fitness(instance, config);
        }
    }
}

/// Stable sort, best (lowest fitness) first.
pub fn sort_by_fitness(population: &mut [ScheduleChromosome]) {
    population.sort_by(|a, b| score(a).total_cmp(&score(b)));
}

/// Groups structurally identical chromosomes.
///
/// Each group lists member indices in population order; groups are ordered
/// by their first member.
pub fn duplicate_groups(population: &[ScheduleChromosome]) -> Vec<Vec<usize>> {
    let mut index_of: HashMap<&ScheduleChromosome, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (idx, chromosome) in population.iter().enumerate() {
        match index_of.get(chromosome) {
            Some(&group) => groups[group].push(idx),
            None => {
                index_of.insert(chromosome, groups.len());
                groups.push(vec![idx]);
            }
        }
    }
    groups
}

/// Number of chromosomes that duplicate an earlier one.
pub fn duplicate_count(population: &[ScheduleChromosome]) -> usize {
    population.len() - duplicate_groups(population).len()
}

/// Fitness summary of one generation (after selection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub population_size: usize,
    pub duplicates: usize,
}

impl GenerationStats {
    /// Summarizes an evaluated population.
    ///
    /// An empty population yields zeros.
    pub fn collect(generation: usize, population: &[ScheduleChromosome]) -> Self {
        let scores: Vec<f64> = population.iter().map(score).collect();
        let (min, max, mean) = if scores.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            (min, max, mean)
        };

        Self {
            generation,
            min,
            max,
            mean,
            population_size: population.len(),
            duplicates: duplicate_count(population),
        }
    }
}
