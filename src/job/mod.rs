//! Job definitions
//!
//! A job lives in its own directory under the projects root. The directory
//! holds exactly one YAML file describing the changes to make, next to the
//! Jinja2 templates those changes reference.
//!
//! ```yaml
//! - name: Update Banner
//!   description: Update the login banner
//!   jinja2_template: banner.j2
//!   device_names:
//!     - 10.1.1.1
//!     - core1.example.net
//!   variables:
//!     motd: hello
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

const JOB_FILE_EXTENSIONS: [&str; 2] = [".yml", ".yaml"];

/// One planned change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSpec {
    pub name: String,
    pub description: String,
    pub jinja2_template: String,
    #[serde(default)]
    pub device_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_yaml::Mapping>,
}

impl ChangeSpec {
    /// Directory name for this change, spaces replaced with underscores.
    pub fn dir_name(&self) -> String {
        self.name.replace(' ', "_")
    }

    /// File name of the main playbook.
    pub fn playbook_name(&self) -> String {
        format!("{}.yml", self.dir_name())
    }
}

/// The parsed job file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobRecord {
    pub changes: Vec<ChangeSpec>,
}

impl JobRecord {
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeSpec> {
        self.changes.iter()
    }
}

impl<'a> IntoIterator for &'a JobRecord {
    type Item = &'a ChangeSpec;
    type IntoIter = std::slice::Iter<'a, ChangeSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Locate the single job file in `directory`.
pub fn find_job_file(directory: &Path) -> Result<PathBuf> {
    if !directory.is_dir() {
        return Err(Error::DirectoryNotFound(directory.to_path_buf()));
    }

    let entries = fs::read_dir(directory).map_err(|e| Error::io(directory, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(directory, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if JOB_FILE_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext)) {
            candidates.push(file_name.to_string());
        }
    }
    candidates.sort();

    match candidates.len() {
        0 => Err(Error::NoJobFile(directory.to_path_buf())),
        1 => Ok(directory.join(&candidates[0])),
        _ => Err(Error::AmbiguousJobFile {
            dir: directory.to_path_buf(),
            files: candidates,
        }),
    }
}

/// Parse job file contents.
pub fn parse_job(content: &str, path: &Path) -> Result<JobRecord> {
    serde_yaml::from_str(content).map_err(|e| Error::MalformedJob {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the job defined in `directory`.
pub fn load_job(directory: &Path) -> Result<JobRecord> {
    let job_file = find_job_file(directory)?;
    tracing::debug!("Loading job file {}", job_file.display());

    let content = fs::read_to_string(&job_file).map_err(|e| Error::io(&job_file, e))?;
    let job = parse_job(&content, &job_file)?;

    tracing::debug!("Job defines {} change(s)", job.len());
    Ok(job)
}
