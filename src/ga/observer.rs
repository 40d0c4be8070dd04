//! Progress reporting for the evolution loop.
//!
//! The loop calls a [`ProgressSink`] synchronously at generation
//! boundaries. Both hooks default to no-ops, so a sink only implements
//! what it needs.

use tracing::{debug, info};

use super::chromosome::ScheduleChromosome;
use super::population::GenerationStats;

/// Receives generation statistics and best-so-far improvements.
pub trait ProgressSink {
    /// Called once per generation (including generation 0) after selection.
    fn on_generation(&mut self, _stats: &GenerationStats) {}

    /// Called when the all-time best strictly improves.
    fn on_best_improved(&mut self, _generation: usize, _best: &ScheduleChromosome, _fitness: f64) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {}

/// Forwards events to `tracing`: generations at `debug`, improvements at
/// `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_generation(&mut self, stats: &GenerationStats) {
        debug!(
            generation = stats.generation,
            min = stats.min,
            max = stats.max,
            mean = stats.mean,
            duplicates = stats.duplicates,
            "generation complete"
        );
    }

    fn on_best_improved(&mut self, generation: usize, _best: &ScheduleChromosome, fitness: f64) {
        info!(generation, fitness, "new best schedule");
    }
}
