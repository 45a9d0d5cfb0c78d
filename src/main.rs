//! LWM2M Trigger - stimulus trigger for LWM2M server interop tests
//!
//! Looks up a test case in the table, finds the client registered on the
//! device-management server and sends it the test case's request through
//! the server's REST API.

use std::io::IsTerminal;

use clap::{CommandFactory, Parser};
use lwm2m_trigger::cli::{self, Settings};
use lwm2m_trigger::commands::{Commands, GlobalArgs};
use lwm2m_trigger::common::logging;

#[derive(Parser)]
#[command(
    name = "lwm2m-trigger",
    about = "Trigger LWM2M interop test stimuli over a server's REST API"
)]
#[command(version, long_about = None)]
struct Cli {
    /// Test case to trigger (same as 'run <TEST_CASE>')
    #[arg(short = 's', long = "stimuli", value_name = "TEST_CASE")]
    stimuli: Option<String>,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.global.verbose);

    if cli.global.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let command = match (cli.stimuli, cli.command) {
        (Some(test_case), None) => Commands::Run { test_case },
        (None, Some(command)) => command,
        (Some(_), Some(_)) => Cli::command()
            .error(
                clap::error::ErrorKind::ArgumentConflict,
                "'-s <TEST_CASE>' cannot be combined with a subcommand",
            )
            .exit(),
        (None, None) => {
            let _ = Cli::command().print_help();
            std::process::exit(2);
        }
    };

    let result = match Settings::resolve(&cli.global) {
        Ok(settings) => cli::dispatch(command, &settings).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
