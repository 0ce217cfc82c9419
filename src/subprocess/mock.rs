use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessRunner, ProcessStream, ProcessStreamFut};

/// Scripted stand-in for a real process runner.
///
/// Streaming runs replay the configured stdout/stderr line by line and then
/// resolve to the configured exit status.
#[derive(Clone)]
pub struct MockProcessRunner {
    expectations: Arc<Mutex<Vec<MockExpectation>>>,
    call_history: Arc<Mutex<Vec<ProcessCommand>>>,
}

#[derive(Clone)]
struct MockResponse {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

struct MockExpectation {
    program: String,
    response: MockResponse,
}

pub struct MockCommandConfig {
    runner: MockProcessRunner,
    expectation: MockExpectation,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(Vec::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn expect_command(&mut self, program: &str) -> MockCommandConfig {
        MockCommandConfig {
            runner: self.clone(),
            expectation: MockExpectation {
                program: program.to_string(),
                response: MockResponse {
                    status: ExitStatus::Success,
                    stdout: String::new(),
                    stderr: String::new(),
                },
            },
        }
    }

    pub fn verify_called(&self, program: &str, times: usize) -> bool {
        let history = self.lock_history();
        let count = history.iter().filter(|cmd| cmd.program == program).count();
        count == times
    }

    pub fn get_call_history(&self) -> Vec<ProcessCommand> {
        self.lock_history().clone()
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, Vec<ProcessCommand>> {
        self.call_history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn respond(&self, command: &ProcessCommand) -> Result<MockResponse, ProcessError> {
        self.lock_history().push(command.clone());

        let expectations = self
            .expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        expectations
            .iter()
            .find(|expectation| expectation.program == command.program)
            .map(|expectation| expectation.response.clone())
            .ok_or_else(|| {
                ProcessError::MockExpectationNotMet(format!(
                    "No expectation found for command: {} {:?}",
                    command.program, command.args
                ))
            })
    }

    fn line_stream(text: &str) -> ProcessStreamFut {
        let lines: Vec<Result<String, ProcessError>> =
            text.lines().map(|line| Ok(line.to_string())).collect();
        Box::pin(futures::stream::iter(lines))
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run_streaming(&self, command: ProcessCommand) -> Result<ProcessStream, ProcessError> {
        let response = self.respond(&command)?;
        let status = response.status;

        Ok(ProcessStream {
            stdout: Self::line_stream(&response.stdout),
            stderr: Self::line_stream(&response.stderr),
            status: Box::pin(async move { Ok::<_, ProcessError>(status) }),
        })
    }
}

impl MockCommandConfig {
    pub fn returns_stdout(mut self, stdout: &str) -> Self {
        self.expectation.response.stdout = stdout.to_string();
        self
    }

    pub fn returns_stderr(mut self, stderr: &str) -> Self {
        self.expectation.response.stderr = stderr.to_string();
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        self.expectation.response.status = if code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error(code)
        };
        self
    }

    pub fn returns_success(mut self) -> Self {
        self.expectation.response.status = ExitStatus::Success;
        self
    }

    pub fn finish(self) {
        self.runner
            .expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(self.expectation);
    }
}

impl Default for MockProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}
