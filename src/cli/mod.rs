//! CLI entry point
//!
//! Resolves configuration, sets up logging, gathers credentials and hands
//! the job to the [`Orchestrator`](crate::orchestrator::Orchestrator).

pub mod args;
pub mod validation;

pub use args::Cli;
pub use validation::{validate_job_name, validate_username, CliValidationError};

use anyhow::{Context, Result};
use std::io::{self, IsTerminal, Write};

use crate::ansible::{AnsibleRunner, Credentials};
use crate::compiler::PlaybookCompiler;
use crate::config::AppConfig;
use crate::logging::init_logging;
use crate::orchestrator::{Orchestrator, RunError};
use crate::subprocess::SubprocessManager;

/// Read the password from the terminal, or from the first line of stdin when
/// it is not a terminal.
pub fn prompt_password() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        print!("Password: ");
        io::stdout().flush()?;
    }

    let mut input = String::new();
    stdin
        .read_line(&mut input)
        .context("Failed to read password")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn execute(cli: Cli) -> Result<()> {
    validate_username(&cli.username)?;
    validate_job_name(&cli.job)?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.projects_dir {
        config.projects_dir = dir;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = dir;
    }

    let _log_guard = init_logging(cli.verbose, Some(&config.log_dir))?;

    let job_dir = config.job_dir(&cli.job);
    println!();
    println!("Starting {}", cli.job);

    let compiler = PlaybookCompiler::new(&job_dir, config.device_profile())
        .with_context(|| format!("Cannot use job directory {}", job_dir.display()))?;

    let password = match cli.password {
        Some(password) => password,
        None if cli.dry_run => String::new(),
        None => prompt_password()?,
    };
    let credentials = Credentials::new(cli.username, password);

    let runner = AnsibleRunner::new(SubprocessManager::production(), config.runner_settings());
    let orchestrator = Orchestrator::new(compiler, runner, credentials).dry_run(cli.dry_run);

    let mut stdout = io::stdout();
    match orchestrator.run_job(&mut stdout).await {
        Ok(outcomes) => {
            tracing::info!("Finished {} ({} change(s))", cli.job, outcomes.len());
            Ok(())
        }
        Err(RunError::Job(e)) => {
            tracing::info!("{}", e);
            Err(anyhow::Error::new(e).context("Error found. exiting..."))
        }
        Err(e) => Err(e.into()),
    }
}
