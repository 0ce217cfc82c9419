//! ansible-playbook execution
//!
//! Runs a compiled change through `ansible-playbook`, logging each line of
//! output as it arrives and separating the `PLAY RECAP` section from the
//! rest of the transcript.
//!
//! Credentials travel in a private temporary extra-vars file rather than on
//! the command line, and host-key checking is configured on the child's
//! environment only.

pub mod credentials;
pub mod recap;

use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::subprocess::{
    ExitStatus, ProcessCommand, ProcessCommandBuilder, ProcessError, ProcessStream,
    SubprocessManager,
};
use crate::Result;

pub use credentials::Credentials;
pub use recap::{ExecutionResult, RecapCollector, RECAP_MARKER};

pub const HOST_KEY_CHECKING_ENV: &str = "ANSIBLE_HOST_KEY_CHECKING";

/// How ansible-playbook is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    pub executable: String,
    pub host_key_checking: bool,
    pub timeout: Option<Duration>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            executable: "ansible-playbook".to_string(),
            host_key_checking: false,
            timeout: None,
        }
    }
}

pub struct AnsibleRunner {
    subprocess: SubprocessManager,
    settings: RunnerSettings,
}

impl AnsibleRunner {
    pub fn new(subprocess: SubprocessManager, settings: RunnerSettings) -> Self {
        Self {
            subprocess,
            settings,
        }
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    /// `-i <inventory> <playbook> --extra-vars @<vars file>`
    pub fn build_command(
        &self,
        playbook_path: &Path,
        inventory_path: &Path,
        extra_vars_path: &Path,
    ) -> ProcessCommand {
        let host_key_checking = if self.settings.host_key_checking {
            "True"
        } else {
            "False"
        };

        ProcessCommandBuilder::new(&self.settings.executable)
            .arg("-i")
            .arg(&inventory_path.display().to_string())
            .arg(&playbook_path.display().to_string())
            .arg("--extra-vars")
            .arg(&format!("@{}", extra_vars_path.display()))
            .env(HOST_KEY_CHECKING_ENV, host_key_checking)
            .timeout_opt(self.settings.timeout)
            .build()
    }

    /// Run the playbook and wait for it to finish. A non-zero exit is
    /// reported through [`ExecutionResult::status`], not as an error.
    pub async fn run(
        &self,
        credentials: &Credentials,
        playbook_path: &Path,
        inventory_path: &Path,
    ) -> Result<ExecutionResult> {
        let extra_vars = credentials.write_extra_vars()?;
        let command = self.build_command(playbook_path, inventory_path, extra_vars.path());

        tracing::info!(
            "Running {} against {} as {}",
            self.settings.executable,
            playbook_path.display(),
            credentials.username()
        );

        let ProcessStream {
            mut stdout,
            mut stderr,
            status,
        } = self.subprocess.runner().run_streaming(command).await?;

        let mut status_task = tokio::spawn(status);
        let (stderr_tx, mut stderr_rx) = mpsc::unbounded_channel();
        let stderr_task = tokio::spawn(async move {
            while let Some(line) = stderr.next().await {
                if stderr_tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut collector = RecapCollector::new();
        let mut exited: Option<ExitStatus> = None;
        let status = loop {
            tokio::select! {
                biased;
                line = stdout.next() => match line {
                    Some(Ok(line)) => {
                        tracing::debug!("{}", line);
                        collector.push_line(&line);
                    }
                    Some(Err(e)) => {
                        // Dropping the status future kills the child before
                        // the vars file goes away.
                        status_task.abort();
                        stderr_task.abort();
                        let _ = status_task.await;
                        return Err(e.into());
                    }
                    None => match exited.take() {
                        Some(status) => break status,
                        None => break status_task.await.map_err(join_error)??,
                    },
                },
                joined = &mut status_task, if exited.is_none() => {
                    let status = joined.map_err(join_error)??;
                    if status == ExitStatus::Timeout {
                        // Descendants of the killed child can keep the pipes open.
                        break status;
                    }
                    exited = Some(status);
                }
            }
        };

        if status == ExitStatus::Timeout {
            stderr_task.abort();
        } else {
            stderr_task.await.map_err(join_error)?;
        }
        let mut stderr_lines = Vec::new();
        while let Ok(line) = stderr_rx.try_recv() {
            stderr_lines.push(line?);
        }
        collector.push_stderr(&stderr_lines);

        if !collector.recap_seen() {
            tracing::warn!("No {} found in ansible-playbook output", RECAP_MARKER);
        }
        tracing::debug!("ansible-playbook finished with {}", status);

        Ok(collector.finish(status))
    }
}

fn join_error(e: tokio::task::JoinError) -> ProcessError {
    ProcessError::InternalError {
        message: format!("ansible-playbook output task failed: {e}"),
    }
}
