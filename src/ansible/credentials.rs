use serde::Serialize;
use std::io::Write;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Device login passed to ansible-playbook as `ansible_user` and
/// `ansible_password`.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct ExtraVars<'a> {
    ansible_user: &'a str,
    ansible_password: &'a str,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Write the credentials to a private temporary YAML file for use as
    /// `--extra-vars @<file>`. The file is removed when the handle drops.
    pub fn write_extra_vars(&self) -> Result<NamedTempFile> {
        let vars = ExtraVars {
            ansible_user: &self.username,
            ansible_password: &self.password,
        };
        let yaml = serde_yaml::to_string(&vars).map_err(|e| Error::Serialization {
            path: "extra-vars".into(),
            source: e,
        })?;

        // NamedTempFile is created with mode 0600 on unix
        let mut file = tempfile::Builder::new()
            .prefix("ezconfig-vars-")
            .suffix(".yml")
            .tempfile()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let path = file.path().to_path_buf();
        file.write_all(yaml.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| Error::io(path, e))?;

        Ok(file)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("netops", "s3cret");
        let debug = format!("{creds:?}");
        assert!(debug.contains("netops"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_extra_vars_file_contents() {
        let creds = Credentials::new("netops", "p@ss: word #1");
        let file = creds.write_extra_vars().unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let vars: serde_yaml::Mapping = serde_yaml::from_str(&content).unwrap();
        assert_eq!(
            vars.get("ansible_user").and_then(|v| v.as_str()),
            Some("netops")
        );
        assert_eq!(
            vars.get("ansible_password").and_then(|v| v.as_str()),
            Some("p@ss: word #1")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_extra_vars_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let file = Credentials::new("netops", "s3cret")
            .write_extra_vars()
            .unwrap();
        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_extra_vars_file_removed_on_drop() {
        let file = Credentials::new("netops", "s3cret")
            .write_extra_vars()
            .unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }
}
