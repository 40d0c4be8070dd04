//! Solution writer.
//!
//! Renders a replayed schedule as one row per start tick listing the
//! `resource-task` pairs started at that tick (1-based IDs):
//!
//! ```text
//! Hour 	 Resource assignments (resource ID - task ID)
//! 1 1-1 2-3
//! 3 1-2
//! ```
//!
//! With `debug`, a trailer reports makespan, cost and every precedence
//! violation.

use std::path::Path;

use crate::error::{Error, Result};
use crate::ga::ProblemInstance;
use crate::models::Schedule;
use crate::scheduler::SimulationOutcome;

const HEADER: &str = "Hour \t Resource assignments (resource ID - task ID)";
const RULE: &str = "===================================";

/// Renders a solution file body.
pub fn render_solution(
    instance: &ProblemInstance,
    outcome: &SimulationOutcome,
    schedule: &Schedule,
    debug: bool,
) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for (tick, row) in schedule.by_start_tick() {
        let pairs: Vec<String> = row
            .iter()
            .map(|a| format!("{}-{}", a.resource_id + 1, a.task_id + 1))
            .collect();
        out.push_str(&format!("{tick} {}\n", pairs.join(" ")));
    }

    if debug {
        out.push_str(&format!("\nDebug\n{RULE}\n"));
        out.push_str(&format!("Makespan: {}\n", outcome.makespan));
        out.push_str(&format!("Cost: {}\n", outcome.total_cost));
        out.push_str(&format!("Prerequisites:\n{RULE}\n"));
        for v in &schedule.violations {
            let reqs: Vec<String> = instance
                .task(v.task_id)
                .predecessors
                .iter()
                .map(|p| (p + 1).to_string())
                .collect();
            out.push_str(&format!(
                "{}\t{}: {} (reqs: {})\n",
                v.tick,
                v.task_id + 1,
                v.missing_predecessor + 1,
                reqs.join(", ")
            ));
        }
    }

    out
}

/// Writes [`render_solution`] output to `path`.
pub fn write_solution(
    path: impl AsRef<Path>,
    instance: &ProblemInstance,
    outcome: &SimulationOutcome,
    schedule: &Schedule,
    debug: bool,
) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_solution(instance, outcome, schedule, debug))
        .map_err(|e| Error::io(path, e))
}
