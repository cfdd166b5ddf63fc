//! waypath CLI library.
//!
//! Argument parsing helpers and output formatting shared by the
//! `waypath-cli` binary's subcommands.

pub mod output;

pub use output::{parse_endpoint, parse_mode, parse_snap_distance, OutputFormat};
