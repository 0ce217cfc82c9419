//! Job change to Ansible playbook compilation
//!
//! Each change is compiled into its own self-contained working directory
//! under the job directory:
//!
//! ```text
//! <job>/<Change_Name>/playbooks/
//!     <Change_Name>.yml                      main playbook
//!     inventory.yml
//!     <template-stem>_task.yml               render + apply
//!     gather_prechange_config_task.yml
//!     gather_postchange_config_task.yml
//!     host_vars/<short-host>.yml
//!     templates/<template>.j2
//!     tmp/                                   rendered configs
//!     change_validation/                     config snapshots
//! ```
//!
//! Steps run in a fixed order since later artifacts reference names produced
//! by earlier ones. The working directory is wiped before every compile, so
//! the same change always yields byte-identical files.

pub mod inventory;
pub mod tasks;


use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::artifact::{AnsibleTree, ArtifactStore};
use crate::hostname::shorten;
use crate::job::ChangeSpec;
use crate::Error;

pub use inventory::{Inventory, INVENTORY_FILE};
pub use tasks::{Play, SnapshotPhase, Task, POSTCHANGE_TASK_FILE, PRECHANGE_TASK_FILE};

/// Connection settings and config module for the target platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub connection: String,
    pub network_os: String,
    pub config_module: String,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            connection: "network_cli".to_string(),
            network_os: "ios".to_string(),
            config_module: "cisco.ios.ios_config".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid change name {0:?}: it must name a directory inside the job directory")]
    InvalidName(String),

    #[error("Error occurred while creating working environment. {0}")]
    Workspace(#[source] Error),

    #[error(transparent)]
    Artifact(#[from] Error),
}

impl CompileError {
    /// Working-tree failures stop the whole run; anything else only skips
    /// the change being compiled.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompileError::Workspace(_))
    }
}

/// Paths produced by compiling one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledChange {
    pub change_dir: PathBuf,
    pub playbook_path: PathBuf,
    pub inventory_path: PathBuf,
    pub task_file: String,
    pub host_vars: Vec<PathBuf>,
}

pub struct PlaybookCompiler {
    store: ArtifactStore,
    job_dir: PathBuf,
    profile: DeviceProfile,
}

impl PlaybookCompiler {
    /// Compiler for changes of the job in `job_dir`. Nothing is written
    /// outside that directory.
    pub fn new(job_dir: impl AsRef<Path>, profile: DeviceProfile) -> Result<Self, Error> {
        let store = ArtifactStore::new(job_dir.as_ref())?;
        let job_dir = store.base_root().to_path_buf();
        Ok(Self {
            store,
            job_dir,
            profile,
        })
    }

    pub fn job_dir(&self) -> &Path {
        &self.job_dir
    }

    pub fn compile(&self, change: &ChangeSpec) -> Result<CompiledChange, CompileError> {
        let dir_name = change.dir_name();
        let playbook_name = change.playbook_name();

        let change_dir = self
            .store
            .confine(&self.job_dir.join(&dir_name))
            .map_err(CompileError::Workspace)?;
        if dir_name.trim().is_empty() || change_dir == self.job_dir {
            return Err(CompileError::InvalidName(change.name.clone()));
        }

        let tree = self
            .store
            .ensure_ansible_tree(&change_dir)
            .map_err(CompileError::Workspace)?;

        self.store.copy_template(&change.jinja2_template, tree.root())?;
        tracing::debug!("Building Jinja2 templates complete");

        self.write_snapshot_tasks(&tree)?;
        let task_file = self.write_change_task(&change.jinja2_template, &tree)?;
        tracing::debug!("Building task {} complete", task_file);

        let inventory_path = self.write_inventory(&change.device_names, &tree)?;
        tracing::debug!("Building inventory file complete");

        let host_vars = self.write_host_vars(change, &tree)?;
        tracing::debug!("Building hostvars files complete ({})", host_vars.len());

        let playbook = tasks::main_playbook(&change.description, &task_file);
        let playbook_path = self
            .store
            .write_structured(&playbook, &tree.playbooks(), &playbook_name)?;

        Ok(CompiledChange {
            change_dir: tree.root().to_path_buf(),
            playbook_path,
            inventory_path,
            task_file,
            host_vars,
        })
    }

    fn write_snapshot_tasks(&self, tree: &AnsibleTree) -> Result<(), Error> {
        for phase in [SnapshotPhase::PreChange, SnapshotPhase::PostChange] {
            let task = tasks::snapshot_task(phase, &tree.change_validation(), &self.profile);
            self.store
                .write_structured(&task, &tree.playbooks(), phase.task_file())?;
        }
        Ok(())
    }

    fn write_change_task(&self, template: &str, tree: &AnsibleTree) -> Result<String, Error> {
        let task_file = tasks::task_file_name(template);
        let task = tasks::change_task(template, &tree.tmp(), &self.profile);
        self.store
            .write_structured(&task, &tree.playbooks(), &task_file)?;
        Ok(task_file)
    }

    fn write_inventory(&self, devices: &[String], tree: &AnsibleTree) -> Result<PathBuf, Error> {
        if devices.is_empty() {
            tracing::warn!("Change has no device_names; inventory will be empty");
        }
        let inventory = Inventory::from_devices(devices, &self.profile)?;
        self.store
            .write_structured(&inventory, &tree.playbooks(), INVENTORY_FILE)
    }

    /// Same variables for every device.
    fn write_host_vars(
        &self,
        change: &ChangeSpec,
        tree: &AnsibleTree,
    ) -> Result<Vec<PathBuf>, Error> {
        let Some(variables) = &change.variables else {
            return Ok(Vec::new());
        };

        let mut written = Vec::with_capacity(change.device_names.len());
        for device in &change.device_names {
            let file_name = format!("{}.yml", shorten(device));
            let path = self
                .store
                .write_structured(variables, &tree.host_vars(), &file_name)?;
            if !written.contains(&path) {
                written.push(path);
            }
        }
        Ok(written)
    }
}
