//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const BANNER_JOB: &str = r#"
- name: Update Banner
  description: Set the login banner
  jinja2_template: banner.j2
  device_names:
    - 10.1.1.1
    - core1.example.net
  variables:
    motd: hello
- name: NTP Servers
  description: Configure NTP servers
  jinja2_template: ntp.j2
  device_names:
    - edge1.example.net
"#;

/// Workspace with `PROJECTS/<job>/` and `LOGS/` under a temporary root.
pub struct JobFixture {
    temp_dir: TempDir,
    job: String,
}

impl JobFixture {
    pub fn new(job: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("PROJECTS").join(job))?;
        Ok(Self {
            temp_dir,
            job: job.to_string(),
        })
    }

    /// Fixture holding [`BANNER_JOB`] and both of its templates.
    pub fn banner() -> Result<Self> {
        Self::new("branch-refresh")?
            .with_file("job.yml", BANNER_JOB)?
            .with_file("banner.j2", "banner motd ^{{ motd }}^\n")?
            .with_file("ntp.j2", "ntp server 10.0.0.1\n")
    }

    pub fn with_file(self, name: &str, content: &str) -> Result<Self> {
        fs::write(self.job_dir().join(name), content)?;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root().join("PROJECTS")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root().join("LOGS")
    }

    pub fn job_dir(&self) -> PathBuf {
        self.projects_dir().join(&self.job)
    }

    pub fn playbooks(&self, change_dir: &str) -> PathBuf {
        self.job_dir().join(change_dir).join("playbooks")
    }

    /// Write an executable shell script standing in for ansible-playbook.
    #[cfg(unix)]
    pub fn fake_ansible(&self, name: &str, body: &str) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.root().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }
}

/// Prints a short transcript, echoing what it was given.
pub const FAKE_ANSIBLE: &str = r#"
echo "PLAY [Implement defined automation tasks] ***"
echo "ARGS $1 $2 $3 $4"
vars_file="${5#@}"
grep -q '^ansible_user: netops$' "$vars_file" && echo "USER OK"
grep -q '^ansible_password: s3cret$' "$vars_file" && echo "PASSWORD OK"
echo "HOSTKEY $ANSIBLE_HOST_KEY_CHECKING"
echo "PLAY RECAP ***"
echo "core1 : ok=3 changed=1 unreachable=0 failed=0"
echo "deprecation warning" >&2
exit 0
"#;
