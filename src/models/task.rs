//! Task model.
//!
//! A task is an indivisible unit of work: it runs on exactly one resource
//! for its full duration, needs a skill profile, and may depend on other
//! tasks finishing first (precedence constraints forming a DAG).
//!
//! # Time Representation
//! Durations are integer time units. The simulator advances a clock in
//! whole ticks; there is no calendar.

use serde::{Deserialize, Serialize};

use super::SkillSet;

/// Dense, 0-based task index.
pub type TaskId = usize;

/// A task to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task ID (equals its index in the instance).
    pub id: TaskId,
    /// Processing time in ticks (must be positive).
    pub duration: u32,
    /// Minimum skill levels a resource must offer.
    pub requirements: SkillSet,
    /// Tasks that must complete before this one starts.
    pub predecessors: Vec<TaskId>,
}

impl Task {
    /// Creates a task with no requirements or predecessors.
    pub fn new(id: TaskId, duration: u32) -> Self {
        Self {
            id,
            duration,
            requirements: SkillSet::new(),
            predecessors: Vec::new(),
        }
    }

    /// Adds a skill requirement.
    pub fn with_requirement(mut self, skill: u32, level: u32) -> Self {
        self.requirements.insert(skill, level);
        self
    }

    /// Adds a predecessor.
    pub fn with_predecessor(mut self, predecessor: TaskId) -> Self {
        if !self.predecessors.contains(&predecessor) {
            self.predecessors.push(predecessor);
        }
        self
    }
}
