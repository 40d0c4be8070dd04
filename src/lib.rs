//! Multi-skill resource-constrained project scheduling (MS-RCPSP).
//!
//! Assigns every task to a skilled-enough resource and orders the work so
//! that a weighted combination of makespan and cost is minimized. Search
//! is a generational genetic algorithm; candidate schedules are decoded by
//! a discrete-event simulator.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Resource`, `SkillSet`, `Schedule`,
//!   `Assignment`, `Violation`
//! - **`validation`**: Input integrity checks (dense IDs, DAG cycles, eligibility)
//! - **`ga`**: Problem instance, chromosome, operators, evolution loop
//! - **`scheduler`**: Fitness simulator and schedule KPIs
//! - **`io`**: iMOPSE `.def` loader, solution writer, run reports
//!
//! # Example
//!
//! ```
//! use u_rcpsp::ga::{Evolution, GaConfig, NoopSink, ProblemInstance};
//! use u_rcpsp::models::{Resource, Task};
//!
//! let instance = ProblemInstance::new(
//!     vec![Resource::new(0, 10.0).with_skill(1, 2), Resource::new(1, 25.0).with_skill(1, 3)],
//!     vec![
//!         Task::new(0, 3).with_requirement(1, 1),
//!         Task::new(1, 2).with_requirement(1, 3),
//!         Task::new(2, 4).with_predecessor(0),
//!     ],
//! )
//! .unwrap();
//!
//! let config = GaConfig::default().with_generation_limit(10).with_seed(7);
//! let result = Evolution::new(&instance, config).unwrap().run(&mut NoopSink).unwrap();
//! assert!(result.best.is_valid(&instance));
//! ```
//!
//! # References
//!
//! - Myszkowski et al. (2018), "iMOPSE: a library for bicriteria optimization
//!   in Multi-Skill Resource-Constrained Project Scheduling Problem"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod error;
pub mod ga;
pub mod io;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Error, Result};
