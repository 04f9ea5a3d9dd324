//! CLI module
//!
//! Command-line front end over [`crate::client::ConfigServiceV2Client`].
//!
//! # Commands
//!
//! - `list` - List buckets, views, sinks or exclusions under a parent
//! - `get` - Fetch one resource by name
//! - `delete` - Delete one resource by name
//! - `cmek` - Show CMEK settings
//! - `parse-name` - Identify a resource name offline

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, ResourceKind};
pub use runner::Runner;
