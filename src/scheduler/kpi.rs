//! Schedule quality metrics (KPIs).
//!
//! Computes standard performance indicators from a replayed schedule and
//! the instance it was built for.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest finish tick |
//! | Total Cost | Sum of duration × hourly cost |
//! | Avg Utilization | Mean resource busyness over the makespan |
//! | Avg Flow Time | Mean finish tick (all tasks released at 0) |
//! | Violations | Tasks started ahead of a predecessor |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ga::ProblemInstance;
use crate::models::{ResourceId, Schedule};

/// Schedule performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Latest finish tick.
    pub makespan: u32,
    /// Sum of `duration * cost` over the assignments.
    pub total_cost: f64,
    /// Average resource utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Per-resource utilization.
    pub utilization_by_resource: BTreeMap<ResourceId, f64>,
    /// Mean finish tick.
    pub avg_flow_time: f64,
    /// Number of recorded precedence violations.
    pub violation_count: usize,
    /// Tasks not placed on their least-skilled eligible resource.
    pub overqualified_assignments: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its instance.
    pub fn calculate(schedule: &Schedule, instance: &ProblemInstance) -> Self {
        let makespan = schedule.makespan();

        let total_cost = schedule
            .assignments
            .iter()
            .map(|a| instance.resource(a.resource_id).cost_of(instance.task(a.task_id)))
            .sum();

        let utilization_by_resource: BTreeMap<ResourceId, f64> = instance
            .resources()
            .iter()
            .filter_map(|r| {
                schedule
                    .resource_utilization(r.id, makespan)
                    .map(|u| (r.id, u))
            })
            .collect();
        let avg_utilization = if utilization_by_resource.is_empty() {
            0.0
        } else {
            utilization_by_resource.values().sum::<f64>() / utilization_by_resource.len() as f64
        };

        let avg_flow_time = if schedule.assignments.is_empty() {
            0.0
        } else {
            let total: f64 = schedule.assignments.iter().map(|a| f64::from(a.finish)).sum();
            total / schedule.assignments.len() as f64
        };

        let overqualified_assignments = schedule
            .assignments
            .iter()
            .filter(|a| a.resource_id != instance.least_skilled_resource(a.task_id))
            .count();

        Self {
            makespan,
            total_cost,
            avg_utilization,
            utilization_by_resource,
            avg_flow_time,
            violation_count: schedule.violations.len(),
            overqualified_assignments,
        }
    }
}
