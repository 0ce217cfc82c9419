//! Ansible task and play documents
//!
//! Tasks are built as data and handed to the artifact store for
//! serialization. A task is a single module invocation, so it serializes as
//! `name`, then `<module>: <args>`, then an optional `when` guard.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::DeviceProfile;

pub const PRECHANGE_TASK_FILE: &str = "gather_prechange_config_task.yml";
pub const POSTCHANGE_TASK_FILE: &str = "gather_postchange_config_task.yml";
pub const RUN_GATE_VAR: &str = "run_other_playbook";

const HOST_PLACEHOLDER: &str = "{{ inventory_hostname }}";
const TEMPLATE_SUFFIX: &str = ".j2";

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub module: String,
    pub args: Value,
    pub when: Option<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, module: impl Into<String>, args: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            args: args.into(),
            when: None,
        }
    }

    /// `include_tasks` of another task file, gated on the run flag.
    pub fn include(name: impl Into<String>, task_file: &str) -> Self {
        Self::new(name, "include_tasks", task_file).when(RUN_GATE_VAR)
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.when = Some(condition.into());
        self
    }
}

impl Serialize for Task {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.when.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry(&self.module, &self.args)?;
        if let Some(when) = &self.when {
            map.serialize_entry("when", when)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Play {
    pub hosts: String,
    pub name: String,
    pub vars: Mapping,
    pub tasks: Vec<Task>,
}

/// Which side of the change a configuration snapshot is taken on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPhase {
    PreChange,
    PostChange,
}

impl SnapshotPhase {
    pub fn task_file(self) -> &'static str {
        match self {
            SnapshotPhase::PreChange => PRECHANGE_TASK_FILE,
            SnapshotPhase::PostChange => POSTCHANGE_TASK_FILE,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            SnapshotPhase::PreChange => "pre",
            SnapshotPhase::PostChange => "post",
        }
    }

    fn include_name(self) -> &'static str {
        match self {
            SnapshotPhase::PreChange => "Gather pre-change configurations",
            SnapshotPhase::PostChange => "Gather post-change configurations",
        }
    }

    /// Backup file name written for each host.
    pub fn backup_file_name(self) -> String {
        format!("{}_change_show_run_{HOST_PLACEHOLDER}.txt", self.prefix())
    }

    /// The main playbook entry that pulls in this snapshot.
    pub fn include_task(self) -> Task {
        Task::include(self.include_name(), self.task_file())
    }
}

/// Single-step task backing up the running configuration.
pub fn snapshot_task(
    phase: SnapshotPhase,
    change_validation_dir: &Path,
    profile: &DeviceProfile,
) -> Vec<Task> {
    let mut backup_options = Mapping::new();
    backup_options.insert("filename".into(), phase.backup_file_name().into());
    backup_options.insert(
        "dir_path".into(),
        change_validation_dir.display().to_string().into(),
    );

    let mut args = Mapping::new();
    args.insert("backup".into(), true.into());
    args.insert("backup_options".into(), backup_options.into());

    vec![Task::new(
        "Take Configuration Snapshot",
        &profile.config_module,
        args,
    )]
}

/// `banner.j2` -> `banner_task.yml`
pub fn task_file_name(template_file_name: &str) -> String {
    template_file_name.replace(TEMPLATE_SUFFIX, "_task.yml")
}

/// `banner.j2` -> `bannerconfig.txt`
pub fn config_file_name(template_file_name: &str) -> String {
    template_file_name.replace(TEMPLATE_SUFFIX, "config.txt")
}

/// Render the template per host, then push the rendered file to the device.
pub fn change_task(template_file_name: &str, tmp_dir: &Path, profile: &DeviceProfile) -> Vec<Task> {
    let config_path = format!(
        "{}/{HOST_PLACEHOLDER}_{}",
        tmp_dir.display(),
        config_file_name(template_file_name)
    );

    let mut render = Mapping::new();
    render.insert("src".into(), template_file_name.into());
    render.insert("dest".into(), config_path.clone().into());

    let mut apply = Mapping::new();
    apply.insert("src".into(), config_path.into());
    apply.insert("save_when".into(), "modified".into());

    vec![
        Task::new("Render Configuration", "template", render),
        Task::new("Apply Configuration", &profile.config_module, apply),
    ]
}

/// One play over all hosts: snapshot, change, snapshot.
pub fn main_playbook(description: &str, change_task_file: &str) -> Vec<Play> {
    let mut vars = Mapping::new();
    vars.insert(RUN_GATE_VAR.into(), true.into());

    vec![Play {
        hosts: "all".to_string(),
        name: "Implement defined automation tasks".to_string(),
        vars,
        tasks: vec![
            SnapshotPhase::PreChange.include_task(),
            Task::include(description, change_task_file),
            SnapshotPhase::PostChange.include_task(),
        ],
    }]
}
