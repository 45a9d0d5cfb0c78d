//! CLI command definitions
//!
//! Defines the clap commands for the trigger CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Options accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Server REST API root (default: http://127.0.0.1:8080/api)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// YAML test case table to use instead of the built-in one
    #[arg(long, global = true, value_name = "PATH")]
    pub table: Option<PathBuf>,

    /// Configuration file (default: platform config dir/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log requests and endpoint resolution to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trigger a test case against the first registered client
    #[command(alias = "r")]
    Run {
        /// Test case identifier, e.g. TD_LWM2M_1_INT_201_step_01
        test_case: String,
    },

    /// List the test cases in the table
    #[command(alias = "ls")]
    List {
        /// Only show identifiers starting with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Show the request a test case sends, without contacting the server
    Show {
        /// Test case identifier
        test_case: String,
    },

    /// Validate the test case table
    Check,

    /// List the clients registered on the server
    Devices,
}
