//! Job execution loop
//!
//! Changes are processed one at a time, in job-file order. Each change is
//! compiled and then handed to ansible-playbook; progress is written to the
//! supplied output as it happens.

use std::io::Write;
use std::path::Path;
use tracing::Instrument;

use crate::ansible::{AnsibleRunner, Credentials, ExecutionResult};
use crate::compiler::{CompileError, CompiledChange, PlaybookCompiler};
use crate::job::{load_job, ChangeSpec, JobRecord};
use crate::Error;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Job(Error),

    #[error("Stopping at change {change:?}: {source}")]
    Workspace {
        change: String,
        #[source]
        source: CompileError,
    },

    #[error("Failed to write progress output: {0}")]
    Output(#[from] std::io::Error),
}

/// What happened to one change.
#[derive(Debug)]
pub enum ChangeOutcome {
    /// ansible-playbook ran; check `result.succeeded()` for its exit status.
    Applied {
        name: String,
        result: ExecutionResult,
    },
    /// Compiled only (dry run).
    Compiled {
        name: String,
        compiled: CompiledChange,
    },
    /// Compilation or execution failed; later changes still ran.
    Skipped { name: String, reason: String },
}

impl ChangeOutcome {
    pub fn name(&self) -> &str {
        match self {
            ChangeOutcome::Applied { name, .. }
            | ChangeOutcome::Compiled { name, .. }
            | ChangeOutcome::Skipped { name, .. } => name,
        }
    }
}

pub struct Orchestrator {
    compiler: PlaybookCompiler,
    runner: AnsibleRunner,
    credentials: Credentials,
    dry_run: bool,
}

impl Orchestrator {
    pub fn new(
        compiler: PlaybookCompiler,
        runner: AnsibleRunner,
        credentials: Credentials,
    ) -> Self {
        Self {
            compiler,
            runner,
            credentials,
            dry_run: false,
        }
    }

    /// Compile every change but do not invoke ansible-playbook.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn job_dir(&self) -> &Path {
        self.compiler.job_dir()
    }

    /// Load the job file from the compiler's job directory and run it.
    pub async fn run_job<W: Write>(&self, out: &mut W) -> Result<Vec<ChangeOutcome>, RunError> {
        let job = load_job(self.job_dir()).map_err(RunError::Job)?;
        tracing::info!("Loaded {} change(s) from {}", job.len(), self.job_dir().display());
        self.run(&job, out).await
    }

    /// Process `job` in order. Returns early only on a working-tree failure.
    pub async fn run<W: Write>(
        &self,
        job: &JobRecord,
        out: &mut W,
    ) -> Result<Vec<ChangeOutcome>, RunError> {
        let mut outcomes = Vec::with_capacity(job.len());

        for change in job {
            let span = tracing::info_span!("change", name = %change.name);
            let outcome = self.run_change(change, out).instrument(span).await?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn run_change<W: Write>(
        &self,
        change: &ChangeSpec,
        out: &mut W,
    ) -> Result<ChangeOutcome, RunError> {
        writeln!(out, "Preparing {}", change.description)?;

        let compiled = match self.compiler.compile(change) {
            Ok(compiled) => compiled,
            Err(e) if e.is_fatal() => {
                tracing::error!("{}", e);
                writeln!(out, "{e}")?;
                writeln!(out, "exiting...")?;
                return Err(RunError::Workspace {
                    change: change.name.clone(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::error!("Skipping change {:?}: {}", change.name, e);
                writeln!(out, "{e}")?;
                return Ok(ChangeOutcome::Skipped {
                    name: change.name.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if self.dry_run {
            writeln!(
                out,
                "Compiled {} (inventory {})",
                compiled.playbook_path.display(),
                compiled.inventory_path.display()
            )?;
            return Ok(ChangeOutcome::Compiled {
                name: change.name.clone(),
                compiled,
            });
        }

        writeln!(out, "Applying {}", change.description)?;
        let result = match self
            .runner
            .run(
                &self.credentials,
                &compiled.playbook_path,
                &compiled.inventory_path,
            )
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("ansible-playbook could not be run: {}", e);
                writeln!(out, "{e}")?;
                return Ok(ChangeOutcome::Skipped {
                    name: change.name.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if result.recap_found() {
            writeln!(out, "{}", result.recap)?;
        } else {
            // No recap to show, fall back to the transcript
            writeln!(out, "{}", result.full_output)?;
        }

        if !result.succeeded() {
            tracing::warn!("ansible-playbook exited with {}", result.status);
            writeln!(
                out,
                "{} failed: ansible-playbook exited with {}",
                change.name, result.status
            )?;
        }

        Ok(ChangeOutcome::Applied {
            name: change.name.clone(),
            result,
        })
    }
}
