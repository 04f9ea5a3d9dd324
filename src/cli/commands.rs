//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for the Cloud Logging configuration service
#[derive(Parser, Debug)]
#[command(name = "logging-config")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Service endpoint (host or URL)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// API key sent as `x-goog-api-key`
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Service account key file (JSON)
    #[arg(short, long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Client options file (YAML)
    #[arg(short, long, global = true)]
    pub options: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List resources under a parent
    List {
        /// Resource collection
        kind: ResourceKind,

        /// Parent resource, e.g. `projects/my-project`
        #[arg(long)]
        parent: String,

        /// Results per page requested from the service
        #[arg(long)]
        page_size: Option<i32>,

        /// Stop after this many results
        #[arg(long)]
        max_items: Option<usize>,
    },

    /// Fetch a single resource
    Get {
        kind: ResourceKind,

        /// Full resource name
        #[arg(long)]
        name: String,
    },

    /// Delete a resource
    Delete {
        kind: ResourceKind,

        /// Full resource name
        #[arg(long)]
        name: String,
    },

    /// Show CMEK settings
    Cmek {
        /// e.g. `organizations/123/cmekSettings`
        #[arg(long)]
        name: String,
    },

    /// Identify a resource name and print its segments
    ParseName {
        path: String,
    },
}

/// Resource collections reachable from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResourceKind {
    #[value(alias = "buckets")]
    Bucket,
    #[value(alias = "views")]
    View,
    #[value(alias = "sinks")]
    Sink,
    #[value(alias = "exclusions")]
    Exclusion,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
