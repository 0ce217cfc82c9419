use std::path::{Component, Path};

/// CLI validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CliValidationError {
    #[error("Job name must not be empty")]
    EmptyJobName,

    #[error("Job name '{0}' must be a single directory name under the projects directory")]
    JobNameNotPlain(String),

    #[error("Username must not be empty")]
    EmptyUsername,
}

/// Job names select a direct child of the projects directory.
pub fn validate_job_name(job: &str) -> Result<(), CliValidationError> {
    if job.trim().is_empty() {
        return Err(CliValidationError::EmptyJobName);
    }

    let mut components = Path::new(job).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(CliValidationError::JobNameNotPlain(job.to_string())),
    }
}

pub fn validate_username(username: &str) -> Result<(), CliValidationError> {
    if username.trim().is_empty() {
        return Err(CliValidationError::EmptyUsername);
    }
    Ok(())
}
