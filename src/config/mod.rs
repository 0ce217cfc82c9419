use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ansible::RunnerSettings;
use crate::compiler::DeviceProfile;
use crate::{Error, Result};


pub const CONFIG_FILE_NAME: &str = "ezconfig.toml";

pub const ENV_PROJECTS_DIR: &str = "EZCONFIG_PROJECTS_DIR";
pub const ENV_LOG_DIR: &str = "EZCONFIG_LOG_DIR";
pub const ENV_ANSIBLE_PLAYBOOK: &str = "EZCONFIG_ANSIBLE_PLAYBOOK";

/// Per-user config file, e.g. `~/.config/ezconfig/ezconfig.toml` on Linux.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "ezconfig", "ezconfig")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding one sub-directory per job.
    pub projects_dir: PathBuf,
    pub log_dir: PathBuf,
    pub ansible: AnsibleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnsibleConfig {
    pub executable: String,
    pub connection: String,
    pub network_os: String,
    pub config_module: String,
    pub host_key_checking: bool,
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::from("PROJECTS"),
            log_dir: PathBuf::from("LOGS"),
            ansible: AnsibleConfig::default(),
        }
    }
}

impl Default for AnsibleConfig {
    fn default() -> Self {
        let profile = DeviceProfile::default();
        let runner = RunnerSettings::default();
        Self {
            executable: runner.executable,
            connection: profile.connection,
            network_os: profile.network_os,
            config_module: profile.config_module,
            host_key_checking: runner.host_key_checking,
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Load configuration, first match wins:
    /// 1. `explicit` (must exist)
    /// 2. `ezconfig.toml` in the current directory
    /// 3. the per-user config file
    /// 4. built-in defaults
    ///
    /// Environment overrides are applied on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidates = [Some(PathBuf::from(CONFIG_FILE_NAME)), user_config_path()];
                match candidates.into_iter().flatten().find(|p| p.is_file()) {
                    Some(path) => Self::from_file(&path)?,
                    None => Self::default(),
                }
            }
        };

        config.merge_env_vars();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge_env_vars(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `EZCONFIG_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_PROJECTS_DIR).filter(|v| !v.is_empty()) {
            self.projects_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|v| !v.is_empty()) {
            self.log_dir = PathBuf::from(dir);
        }

        if let Some(executable) = lookup(ENV_ANSIBLE_PLAYBOOK).filter(|v| !v.is_empty()) {
            self.ansible.executable = executable;
        }
    }

    pub fn job_dir(&self, job: &str) -> PathBuf {
        self.projects_dir.join(job)
    }

    pub fn device_profile(&self) -> DeviceProfile {
        DeviceProfile {
            connection: self.ansible.connection.clone(),
            network_os: self.ansible.network_os.clone(),
            config_module: self.ansible.config_module.clone(),
        }
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            executable: self.ansible.executable.clone(),
            host_key_checking: self.ansible.host_key_checking,
            timeout: self.ansible.timeout_secs.map(Duration::from_secs),
        }
    }
}
