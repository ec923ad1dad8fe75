//! Command-line front end: argument parsing, logging setup and the run
//! driver behind the `risk-engine` binary.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
