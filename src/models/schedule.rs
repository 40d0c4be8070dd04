//! Schedule (replayed solution) model.
//!
//! A schedule is the concrete timeline produced by replaying a chromosome
//! through the simulator: which resource ran which task over which ticks,
//! plus any precedence violations incurred when precedence is penalized
//! instead of enforced.
//!
//! # Ticks
//! Ticks are 1-based and inclusive: a task of duration 3 started at tick 3
//! occupies ticks 3, 4 and 5 and has `finish == 5`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ResourceId, TaskId};

/// A complete timed schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Task assignments in the order they were started.
    pub assignments: Vec<Assignment>,
    /// Precedence violations (empty when precedence is enforced).
    pub violations: Vec<Violation>,
}

/// A task-resource-time assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub task_id: TaskId,
    pub resource_id: ResourceId,
    /// First occupied tick.
    pub start: u32,
    /// Last occupied tick (inclusive).
    pub finish: u32,
}

/// A task started before one of its predecessors completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Tick at which the task started.
    pub tick: u32,
    pub task_id: TaskId,
    /// The predecessor that was still incomplete.
    pub missing_predecessor: TaskId,
}

impl Assignment {
    /// Creates an assignment covering `duration` ticks from `start`.
    pub fn new(task_id: TaskId, resource_id: ResourceId, start: u32, duration: u32) -> Self {
        Self {
            task_id,
            resource_id,
            start,
            finish: start + duration - 1,
        }
    }

    /// Number of occupied ticks.
    #[inline]
    pub fn duration(&self) -> u32 {
        self.finish - self.start + 1
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether the schedule respects every precedence constraint.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Makespan: latest finish tick (0 when empty).
    pub fn makespan(&self) -> u32 {
        self.assignments.iter().map(|a| a.finish).max().unwrap_or(0)
    }

    /// Finds the assignment of a task.
    pub fn assignment_for_task(&self, task_id: TaskId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.task_id == task_id)
    }

    /// Returns all assignments on a resource.
    pub fn assignments_for_resource(&self, resource_id: ResourceId) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.resource_id == resource_id)
            .collect()
    }

    /// Assignments grouped by start tick, ascending.
    ///
    /// Within a tick, assignments keep the order in which they were started.
    pub fn by_start_tick(&self) -> BTreeMap<u32, Vec<&Assignment>> {
        let mut rows: BTreeMap<u32, Vec<&Assignment>> = BTreeMap::new();
        for a in &self.assignments {
            rows.entry(a.start).or_default().push(a);
        }
        rows
    }

    /// Computes resource utilization: busy ticks / horizon.
    ///
    /// Returns `None` if `horizon` is zero.
    pub fn resource_utilization(&self, resource_id: ResourceId, horizon: u32) -> Option<f64> {
        if horizon == 0 {
            return None;
        }
        let busy: u32 = self
            .assignments_for_resource(resource_id)
            .iter()
            .map(|a| a.duration())
            .sum();
        Some(f64::from(busy) / f64::from(horizon))
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}
