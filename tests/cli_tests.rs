//! Integration tests for the CLI interface

mod common;

use assert_cmd::Command;
use common::JobFixture;
use predicates::prelude::*;

/// `ezconfig` isolated from any config file or environment on the host.
fn ezconfig(fixture: &JobFixture) -> Command {
    let mut cmd = Command::cargo_bin("ezconfig").unwrap();
    cmd.current_dir(fixture.root())
        .env("XDG_CONFIG_HOME", fixture.root())
        .env("HOME", fixture.root())
        .env_remove("EZCONFIG_PROJECTS_DIR")
        .env_remove("EZCONFIG_LOG_DIR")
        .env("EZCONFIG_ANSIBLE_PLAYBOOK", "ezconfig-test-no-such-ansible")
        .arg("--projects-dir")
        .arg(fixture.projects_dir())
        .arg("--log-dir")
        .arg(fixture.log_dir());
    cmd
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = Command::cargo_bin("ezconfig").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--username"))
        .stdout(predicate::str::contains("--job"));
}

#[test]
fn test_missing_username() {
    let mut cmd = Command::cargo_bin("ezconfig").unwrap();
    cmd.args(["--job", "core"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--username"));
}

#[test]
fn test_missing_job_directory() {
    let fixture = JobFixture::new("present").unwrap();
    ezconfig(&fixture)
        .args(["-u", "netops", "-p", "pw", "--job", "absent"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Starting absent"))
        .stderr(predicate::str::contains("Job directory not found"));
}

#[test]
fn test_job_without_job_file() {
    let fixture = JobFixture::new("empty").unwrap();
    ezconfig(&fixture)
        .args(["-u", "netops", "-p", "pw", "--job", "empty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No .yml or .yaml job file"));
}

#[test]
fn test_job_name_must_stay_in_projects_dir() {
    let fixture = JobFixture::new("core").unwrap();
    ezconfig(&fixture)
        .args(["-u", "netops", "-p", "pw", "--job", "../core"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("single directory name"));
}

#[test]
fn test_dry_run_compiles_every_change() {
    let fixture = JobFixture::banner().unwrap();
    ezconfig(&fixture)
        .args(["-u", "netops", "--job", fixture.job(), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preparing Set the login banner"))
        .stdout(predicate::str::contains("Preparing Configure NTP servers"))
        .stdout(predicate::str::contains("Compiled"))
        .stdout(predicate::str::contains("Applying").not());

    let banner = fixture.playbooks("Update_Banner");
    assert!(banner.join("Update_Banner.yml").is_file());
    assert!(banner.join("inventory.yml").is_file());
    assert!(banner.join("host_vars").join("core1.yml").is_file());
    assert!(banner.join("templates").join("banner.j2").is_file());
    assert!(fixture
        .playbooks("NTP_Servers")
        .join("NTP_Servers.yml")
        .is_file());
}

#[test]
fn test_project_alias_and_log_file() {
    let fixture = JobFixture::banner().unwrap();
    ezconfig(&fixture)
        .args(["-u", "netops", "--project", fixture.job(), "--dry-run", "-v"])
        .assert()
        .success();

    let log = std::fs::read_to_string(fixture.log_dir().join("ezconfig.log")).unwrap();
    assert!(log.contains("Created Ansible working tree"));
}

#[test]
fn test_password_flag_is_never_logged() {
    let fixture = JobFixture::banner().unwrap();
    ezconfig(&fixture)
        .args(["-vv", "-u", "netops", "-p", "s3cret", "--job", fixture.job()])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret").not())
        .stderr(predicate::str::contains("s3cret").not());

    let log = std::fs::read_to_string(fixture.log_dir().join("ezconfig.log")).unwrap();
    assert!(log.contains("ezconfig started with verbosity level: 2"));
    assert!(!log.contains("s3cret"));
}

#[test]
fn test_unrunnable_ansible_skips_changes_but_completes() {
    let fixture = JobFixture::banner().unwrap();
    ezconfig(&fixture)
        .args(["-u", "netops", "-p", "pw", "--job", fixture.job()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applying Set the login banner"))
        .stdout(predicate::str::contains("Applying Configure NTP servers"))
        .stdout(predicate::str::contains("Command not found"));
}

#[test]
fn test_explicit_config_file() {
    let fixture = JobFixture::banner().unwrap();
    let config = fixture.root().join("site.toml");
    std::fs::write(
        &config,
        "[ansible]\nnetwork_os = \"eos\"\nconfig_module = \"arista.eos.eos_config\"\n",
    )
    .unwrap();

    ezconfig(&fixture)
        .args(["-u", "netops", "--job", fixture.job(), "--dry-run", "-c"])
        .arg(&config)
        .assert()
        .success();

    let playbooks = fixture.playbooks("Update_Banner");
    let inventory = std::fs::read_to_string(playbooks.join("inventory.yml")).unwrap();
    assert!(inventory.contains("ansible_network_os: eos"));
    let task = std::fs::read_to_string(playbooks.join("banner_task.yml")).unwrap();
    assert!(task.contains("arista.eos.eos_config"));
}
