use serde::Serialize;
use std::collections::BTreeMap;

use super::DeviceProfile;
use crate::hostname::shorten;
use crate::{Error, Result};

pub const INVENTORY_FILE: &str = "inventory.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub ansible_host: String,
    pub ansible_connection: String,
    pub ansible_network_os: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HostGroup {
    pub hosts: BTreeMap<String, HostEntry>,
}

/// `all.hosts`, keyed by short host name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Inventory {
    pub all: HostGroup,
}

impl Inventory {
    /// Build from device identifiers. Two different identifiers that shorten
    /// to the same name are rejected; a repeated identifier is kept once.
    pub fn from_devices<S: AsRef<str>>(devices: &[S], profile: &DeviceProfile) -> Result<Self> {
        let mut hosts: BTreeMap<String, HostEntry> = BTreeMap::new();

        for device in devices {
            let device = device.as_ref();
            let short = shorten(device);

            if let Some(existing) = hosts.get(&short) {
                if existing.ansible_host == device {
                    continue;
                }
                return Err(Error::HostnameCollision {
                    short,
                    first: existing.ansible_host.clone(),
                    second: device.to_string(),
                });
            }

            hosts.insert(
                short,
                HostEntry {
                    ansible_host: device.to_string(),
                    ansible_connection: profile.connection.clone(),
                    ansible_network_os: profile.network_os.clone(),
                },
            );
        }

        Ok(Self {
            all: HostGroup { hosts },
        })
    }

    pub fn host_names(&self) -> impl Iterator<Item = &str> {
        self.all.hosts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.all.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.hosts.is_empty()
    }
}
