//! Genetic algorithm for multi-skill project scheduling.
//!
//! Uses a resource/priority dual-vector encoding decoded by the
//! discrete-event simulator in [`crate::scheduler`].
//!
//! # Encoding
//!
//! - **Resource vector**: eligible resource per task.
//! - **Priority vector**: scheduling key per task; lower keys start first
//!   when several tasks compete at the same tick.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable recombination, pairing, clone
//!   handling and selection strategies
//! - [`config`]: Run configuration (serde + builders)
//!
//! # Reference
//! - Myszkowski et al. (2018), "iMOPSE: a library for bicriteria
//!   optimization in MS-RCPSP"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"

mod chromosome;
pub mod config;
mod observer;
pub mod operators;
mod population;
mod problem;
mod runner;

pub use chromosome::{MutationMode, ScheduleChromosome, double_point, single_point};
pub use config::{FitnessConfig, GaConfig, PenaltyWeights};
pub use observer::{NoopSink, ProgressSink, TracingSink};
pub use population::{
    GenerationStats, duplicate_count, duplicate_groups, evaluate_all, score, sort_by_fitness,
};
pub use problem::ProblemInstance;
pub use runner::{Evolution, RunResult, RunState, TerminationReason};
