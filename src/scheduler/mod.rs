//! Schedule decoding and KPI evaluation.
//!
//! # Simulator
//!
//! `simulate` decodes a chromosome with a tick-stepped discrete-event
//! simulation and returns its weighted fitness; `replay` runs the same
//! simulation and also records the timeline as a [`Schedule`](crate::models::Schedule).
//!
//! # KPI
//!
//! `ScheduleKpi` computes standard scheduling metrics: makespan, cost,
//! utilization, flow time and precedence violations.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Myszkowski et al. (2015), "Hybrid ant colony optimization in solving
//!   multi-skill resource-constrained project scheduling problem"

mod kpi;
mod simulator;

pub use kpi::ScheduleKpi;
pub use simulator::{PenaltyBreakdown, SimulationOutcome, replay, simulate};
