//! Input validation for scheduling problems.
//!
//! Checks structural integrity of tasks and resources before an instance
//! is built. Detects:
//! - Non-contiguous IDs (IDs must equal their index)
//! - Zero-duration tasks
//! - Missing or self-referencing predecessors
//! - Circular precedence dependencies (DAG validation)
//! - Tasks no resource is skilled enough to perform
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use crate::models::{Resource, Task, TaskId};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An ID does not match its position (duplicate, gap, or not 0-based).
    NonContiguousId,
    /// A task has zero duration.
    ZeroDuration,
    /// A task references a predecessor that doesn't exist, or itself.
    InvalidPredecessor,
    /// Precedence graph contains a cycle.
    CyclicDependency,
    /// No resource has the skills a task requires.
    NoEligibleResource,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a scheduling problem.
///
/// Checks:
/// 1. Resource IDs are dense and 0-based (`resources[i].id == i`)
/// 2. Task IDs are dense and 0-based (`tasks[i].id == i`)
/// 3. Every task has a positive duration
/// 4. All predecessor references point to other existing tasks
/// 5. No circular precedence dependencies
/// 6. Every task has at least one eligible resource
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_instance(tasks: &[Task], resources: &[Resource]) -> ValidationResult {
    let mut errors = Vec::new();

    for (idx, r) in resources.iter().enumerate() {
        if r.id != idx {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonContiguousId,
                format!("Resource at position {idx} has ID {}", r.id),
            ));
        }
    }

    for (idx, task) in tasks.iter().enumerate() {
        if task.id != idx {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonContiguousId,
                format!("Task at position {idx} has ID {}", task.id),
            ));
        }

        if task.duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                format!("Task {} has zero duration", task.id),
            ));
        }

        for &pred in &task.predecessors {
            if pred >= tasks.len() || pred == idx {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPredecessor,
                    format!("Task {} references invalid predecessor {pred}", task.id),
                ));
            }
        }

        if !resources.iter().any(|r| r.can_perform(task)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoEligibleResource,
                format!("Task {} has no eligible resource", task.id),
            ));
        }
    }

    // Cycle detection only makes sense over a well-formed graph
    let references_ok = !errors
        .iter()
        .any(|e| e.kind == ValidationErrorKind::InvalidPredecessor);
    if references_ok {
        if let Some(cycle_err) = detect_cycles(tasks) {
            errors.push(cycle_err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the precedence graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS. If a back-edge is found (visiting a node
/// currently in the recursion stack), a cycle exists.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
fn detect_cycles(tasks: &[Task]) -> Option<ValidationError> {
    // Adjacency list: task → successors
    let mut adj: Vec<Vec<TaskId>> = vec![Vec::new(); tasks.len()];
    for (idx, task) in tasks.iter().enumerate() {
        for &pred in &task.predecessors {
            adj[pred].push(idx);
        }
    }

    let mut visited = vec![false; tasks.len()];
    let mut in_stack = vec![false; tasks.len()];

    for node in 0..tasks.len() {
        if !visited[node] && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving task {node}"),
            ));
        }
    }

    None
}

fn has_cycle_dfs(
    node: TaskId,
    adj: &[Vec<TaskId>],
    visited: &mut [bool],
    in_stack: &mut [bool],
) -> bool {
    visited[node] = true;
    in_stack[node] = true;

    for &next in &adj[node] {
        if in_stack[next] {
            return true; // Back edge → cycle
        }
        if !visited[next] && has_cycle_dfs(next, adj, visited, in_stack) {
            return true;
        }
    }

    in_stack[node] = false;
    false
}
