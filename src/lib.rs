//! # ezconfig
//!
//! Turns a declarative job description into self-contained Ansible change
//! playbooks for network devices and runs them.
//!
//! ## Usage
//!
//! ```bash
//! ezconfig -u <username> --job <job> [-p <password>] [--dry-run]
//! ```
//!
//! ## Modules
//!
//! - `job` - Locate and parse the job file
//! - `hostname` - Short host names for inventory and host_vars
//! - `artifact` - Sandboxed working-directory and YAML file writer
//! - `compiler` - Per-change playbook, inventory and task generation
//! - `ansible` - ansible-playbook execution and recap extraction
//! - `orchestrator` - Sequential compile-and-apply loop over a job
//! - `subprocess` - Process runner abstraction with a scriptable mock
//! - `config`, `logging`, `cli` - Application plumbing

pub mod ansible;
pub mod artifact;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod hostname;
pub mod job;
pub mod logging;
pub mod orchestrator;
pub mod subprocess;

pub use error::{Error, Result};
