//! Working directory management for generated Ansible artifacts
//!
//! Every path the store touches must lie under its base root. Paths are
//! resolved lexically, so the check works for directories that do not exist
//! yet and cannot be escaped with `..` components in a change name.

use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

pub const PLAYBOOK_REL_PATH: &str = "playbooks";
pub const HOST_VARS_REL_PATH: &str = "playbooks/host_vars";
pub const TMP_REL_PATH: &str = "playbooks/tmp";
pub const TEMPLATE_REL_PATH: &str = "playbooks/templates";
pub const CHANGE_VALIDATION_REL_PATH: &str = "playbooks/change_validation";

/// Fixed layout of a change's Ansible working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsibleTree {
    root: PathBuf,
}

impl AnsibleTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn playbooks(&self) -> PathBuf {
        self.root.join(PLAYBOOK_REL_PATH)
    }

    pub fn host_vars(&self) -> PathBuf {
        self.root.join(HOST_VARS_REL_PATH)
    }

    pub fn tmp(&self) -> PathBuf {
        self.root.join(TMP_REL_PATH)
    }

    pub fn templates(&self) -> PathBuf {
        self.root.join(TEMPLATE_REL_PATH)
    }

    pub fn change_validation(&self) -> PathBuf {
        self.root.join(CHANGE_VALIDATION_REL_PATH)
    }

    /// Root first, then each subdirectory in creation order.
    pub fn directories(&self) -> Vec<PathBuf> {
        vec![
            self.root.clone(),
            self.playbooks(),
            self.host_vars(),
            self.tmp(),
            self.templates(),
            self.change_validation(),
        ]
    }
}

/// File-system side of playbook compilation, sandboxed to `base_root`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    base_root: PathBuf,
}

impl ArtifactStore {
    pub fn new(base_root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            base_root: resolve(base_root.as_ref())?,
        })
    }

    pub fn base_root(&self) -> &Path {
        &self.base_root
    }

    /// Resolve `path` and make sure it stays under the base root.
    pub fn confine(&self, path: &Path) -> Result<PathBuf> {
        let resolved = resolve(path)?;
        if resolved.starts_with(&self.base_root) {
            Ok(resolved)
        } else {
            Err(Error::OutsideSandbox {
                path: resolved,
                base: self.base_root.clone(),
            })
        }
    }

    /// Delete `path` if it exists, then create it with any missing parents.
    pub fn reset_directory(&self, path: &Path) -> Result<()> {
        let path = self.confine(path)?;

        if path.exists() {
            tracing::trace!("Removing existing directory {}", path.display());
            fs::remove_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        }

        fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))
    }

    /// Reset each directory in order, stopping at the first failure.
    ///
    /// Directories created before the failure are left in place.
    pub fn reset_directories<P: AsRef<Path>>(&self, paths: &[P]) -> Result<()> {
        for path in paths {
            self.reset_directory(path.as_ref())?;
        }
        Ok(())
    }

    /// Recreate the full Ansible working tree rooted at `root`.
    pub fn ensure_ansible_tree(&self, root: &Path) -> Result<AnsibleTree> {
        let tree = AnsibleTree::new(self.confine(root)?);
        self.reset_directories(&tree.directories())?;
        tracing::debug!("Created Ansible working tree at {}", tree.root().display());
        Ok(tree)
    }

    /// Copy a template from the parent of `change_dir` into its templates
    /// directory. Returns the destination path.
    pub fn copy_template(&self, template_file_name: &str, change_dir: &Path) -> Result<PathBuf> {
        let change_dir = self.confine(change_dir)?;
        let source_dir = change_dir
            .parent()
            .ok_or_else(|| Error::TemplateNotFound(PathBuf::from(template_file_name)))?;
        let source = self.confine(&source_dir.join(template_file_name))?;

        if !source.is_file() {
            return Err(Error::TemplateNotFound(source));
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| Error::TemplateNotFound(source.clone()))?;
        let dest = AnsibleTree::new(&change_dir).templates().join(file_name);
        fs::copy(&source, &dest).map_err(|e| Error::io(&dest, e))?;

        tracing::trace!("Copied {} to {}", source.display(), dest.display());
        Ok(dest)
    }

    /// Serialize `content` as block-style YAML to `dest_dir/dest_file_name`,
    /// replacing any existing file.
    pub fn write_structured<T>(
        &self,
        content: &T,
        dest_dir: &Path,
        dest_file_name: &str,
    ) -> Result<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        let dest = self.confine(&dest_dir.join(dest_file_name))?;
        let yaml = serde_yaml::to_string(content).map_err(|e| Error::Serialization {
            path: dest.clone(),
            source: e,
        })?;

        fs::write(&dest, yaml).map_err(|e| Error::io(&dest, e))?;
        tracing::trace!("Wrote {}", dest.display());
        Ok(dest)
    }
}

/// Make `path` absolute and fold `.`/`..` components without touching the
/// file system.
fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| Error::io(path, e))?;
        cwd.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}
