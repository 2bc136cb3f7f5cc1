//! Command-line interface for Compass.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations and dispatch

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ProfileArgs};
pub use commands::{dispatch, CommandResult};
