//! # CLI Layer
//!
//! This module is **one possible UI client** for bookshelf. It is the only
//! place that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Handles argument parsing
//! - Initializes logging
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - `setup`: clap argument definitions
//! - `commands`: `run()`, context setup and per-command handlers
//! - `menu`: interactive numbered menu over the same handlers
//! - `print`: output formatting

mod commands;
mod menu;
mod print;
mod setup;

pub use commands::run;
