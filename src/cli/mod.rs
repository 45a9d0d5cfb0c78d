//! CLI command handling
//!
//! Resolves settings, loads the test case table and dispatches commands.

mod report;

use colored::Colorize;
use std::path::PathBuf;

use crate::commands::{Commands, GlobalArgs};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::dispatch::{url, Dispatcher, HttpTransport, Transport};
use crate::table::TestCaseTable;

/// Settings after merging CLI flags, the config file and defaults
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub table_path: Option<PathBuf>,
}

impl Settings {
    /// Merge flags over the config file over defaults
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        Ok(Self {
            base_url: args
                .base_url
                .clone()
                .unwrap_or(config.server.base_url),
            table_path: args.table.clone().or(config.table.path),
        })
    }

    /// Load the configured table, or the built-in one
    pub fn load_table(&self) -> Result<TestCaseTable> {
        let table = match &self.table_path {
            Some(path) => TestCaseTable::from_path(path)?,
            None => TestCaseTable::builtin()?,
        };
        tracing::debug!("Loaded table '{}' ({} test cases)", table.name(), table.len());
        Ok(table)
    }

    fn dispatcher(&self) -> Result<Dispatcher<HttpTransport>> {
        Dispatcher::new(&self.base_url, HttpTransport::new()?)
    }
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Run { test_case } => {
            let table = settings.load_table()?;
            let dispatcher = settings.dispatcher()?;
            run_test_case(&dispatcher, &table, &test_case).await
        }

        Commands::List { prefix } => {
            let table = settings.load_table()?;
            let ids: Vec<&str> = table
                .ids()
                .filter(|id| prefix.as_deref().map_or(true, |p| id.starts_with(p)))
                .collect();

            if ids.is_empty() {
                println!("No test cases match");
            } else {
                for id in ids {
                    println!("{}", id);
                }
            }
            Ok(())
        }

        Commands::Show { test_case } => {
            let table = settings.load_table()?;
            let base_url = url::normalize_base_url(&settings.base_url)?;

            let steps = match table.chain(&test_case) {
                Ok(steps) => steps,
                Err(e) => return report_failure(e),
            };
            for (i, (id, descriptor)) in steps.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                let template = url::operation_template(&base_url, descriptor);
                report::descriptor(id, descriptor, &template);
            }
            Ok(())
        }

        Commands::Check => {
            let table = settings.load_table()?;
            let problems = table.validate();

            if problems.is_empty() {
                println!(
                    "{} {} test cases in table '{}' are well-formed",
                    "✓".green(),
                    table.len(),
                    table.name()
                );
                return Ok(());
            }

            for problem in &problems {
                report::diagnostic(problem);
            }
            Err(Error::TableParse(format!(
                "{} problem(s) in table '{}'",
                problems.len(),
                table.name()
            )))
        }

        Commands::Devices => {
            let dispatcher = settings.dispatcher()?;
            match dispatcher.list_clients().await {
                Ok(clients) => {
                    report::devices(&clients);
                    Ok(())
                }
                Err(e) => report_failure(e),
            }
        }
    }
}

/// Run a test case and everything it chains to, printing the transcript
///
/// Unknown identifiers, network failures and device resolution failures
/// are printed and end the run; they are not returned as errors.
pub async fn run_test_case<T: Transport>(
    dispatcher: &Dispatcher<T>,
    table: &TestCaseTable,
    id: &str,
) -> Result<()> {
    let steps = match table.chain(id) {
        Ok(steps) => steps,
        Err(e) => return report_failure(e),
    };

    for (step_id, descriptor) in steps {
        report::test_case_header(step_id, descriptor);
        if let Err(e) = dispatcher
            .execute_observed(descriptor, &mut report::Transcript)
            .await
        {
            return report_failure(e);
        }
    }

    Ok(())
}

/// Print a test case failure, or hand back any other error
fn report_failure(error: Error) -> Result<()> {
    if error.is_test_case_failure() {
        tracing::debug!("Stopping after failure: {}", error);
        report::diagnostic(&error);
        Ok(())
    } else {
        Err(error)
    }
}
