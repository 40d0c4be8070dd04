//! File formats: instance loading, solution output and run reports.

pub mod def;
pub mod report;
pub mod solution;

pub use def::{parse_def, read_def};
pub use report::{render_stats, write_params, write_stats};
pub use solution::{render_solution, write_solution};
