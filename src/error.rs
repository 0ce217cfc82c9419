use std::path::PathBuf;
use thiserror::Error;

use crate::subprocess::ProcessError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Job directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("No .yml or .yaml job file found in {}", .0.display())]
    NoJobFile(PathBuf),

    #[error("Multiple .yml or .yaml job files found in {}: {}", .dir.display(), .files.join(", "))]
    AmbiguousJobFile { dir: PathBuf, files: Vec<String> },

    #[error("Error parsing job file {}: {message}", .path.display())]
    MalformedJob { path: PathBuf, message: String },

    #[error("{} is outside the allowed base directory {}", .path.display(), .base.display())]
    OutsideSandbox { path: PathBuf, base: PathBuf },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Jinja2 template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Devices {first} and {second} both shorten to host name {short}")]
    HostnameCollision {
        short: String,
        first: String,
        second: String,
    },

    #[error("Serialization error for {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Job-loading failures that leave nothing to run.
    pub fn is_job_error(&self) -> bool {
        matches!(
            self,
            Error::DirectoryNotFound(_)
                | Error::NoJobFile(_)
                | Error::AmbiguousJobFile { .. }
                | Error::MalformedJob { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
