//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// Generate and run Ansible change playbooks from a job description
#[derive(Parser, Debug)]
#[command(name = "ezconfig")]
#[command(
    about = "ezconfig - Generate and run Ansible change playbooks for network devices",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Device login username
    #[arg(short = 'u', long)]
    pub username: String,

    /// Device login password (prompted for when omitted)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Job directory name under the projects directory
    #[arg(short = 'j', long = "job", visible_alias = "project", value_name = "NAME")]
    pub job: String,

    /// Path to configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Override the projects directory
    #[arg(long, value_name = "DIR")]
    pub projects_dir: Option<PathBuf>,

    /// Override the log directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Compile playbooks without running ansible-playbook
    #[arg(long, help = "Generate playbooks without executing them")]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_project_alias() {
        let cli = Cli::try_parse_from(["ezconfig", "-u", "netops", "--project", "core"]).unwrap();
        assert_eq!(cli.job, "core");
        assert!(cli.password.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "ezconfig",
            "-vv",
            "--username",
            "netops",
            "-p",
            "s3cret",
            "-j",
            "core",
            "-c",
            "site.toml",
            "--projects-dir",
            "/srv/jobs",
            "--log-dir",
            "/srv/logs",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.username, "netops");
        assert_eq!(cli.password.as_deref(), Some("s3cret"));
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
        assert_eq!(cli.projects_dir, Some(PathBuf::from("/srv/jobs")));
        assert_eq!(cli.log_dir, Some(PathBuf::from("/srv/logs")));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_username_and_job_required() {
        assert!(Cli::try_parse_from(["ezconfig", "--job", "core"]).is_err());
        assert!(Cli::try_parse_from(["ezconfig", "-u", "netops"]).is_err());
    }
}
