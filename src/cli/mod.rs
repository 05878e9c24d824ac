//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server (optionally with the email worker)
//! - `migrate` - Database migrations
//! - `jobs` - Background job management

pub mod args;

pub use args::{Cli, Commands};
