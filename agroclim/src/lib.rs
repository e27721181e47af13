//! Library side of the `agroclim` command-line tool.
//!
//! The binary in `main.rs` is a thin clap front end; loading, concurrent
//! validation, output and threshold assembly live here so they can be
//! tested directly.

pub mod output;
pub mod pipeline;
pub mod thresholds;
