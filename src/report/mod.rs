//! Console output for the ETL jobs.
//!
//! - [`console`]: progress lines on stderr; respects `--verbose` / `--quiet`.
//! - [`terminal`]: skip tallies, record samples and the final summary box.

pub mod console;
pub mod terminal;
