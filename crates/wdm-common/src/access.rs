//! Port-ownership access control.
//!
//! Experimenters share one fiber patch plan. Before a driver touches a
//! device it asks an [`AccessGuard`] whether the caller owns every patch
//! endpoint the device sits on. The check happens once, at device
//! construction; nothing is locked afterwards.

use std::collections::BTreeMap;
use std::env;

use tracing::{debug, warn};

use crate::config::TestbedConfig;

/// Endpoint placeholder for an unpatched side; never checked.
pub const NULL_ENDPOINT: &str = "NULL";

/// Decides whether the current user may operate a set of patches.
pub trait AccessGuard {
    /// Returns true if every endpoint in `patch_pairs` is available to the
    /// current user.
    fn is_authorized(&self, patch_pairs: &[(String, String)]) -> bool;
}

/// Outcome of checking patches against the ownership table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessDecision {
    /// Endpoints missing from the table.
    pub nonexistent: Vec<String>,
    /// Endpoints owned by someone else, with their owner list.
    pub foreign: Vec<(String, String)>,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        self.nonexistent.is_empty() && self.foreign.is_empty()
    }
}

/// [`AccessGuard`] backed by a snapshot of the shared ports table.
#[derive(Debug, Clone)]
pub struct PortOwnershipRegistry {
    owners: BTreeMap<String, String>,
    user: String,
}

impl PortOwnershipRegistry {
    pub fn new(owners: BTreeMap<String, String>, user: impl Into<String>) -> Self {
        Self {
            owners,
            user: user.into(),
        }
    }

    /// Builds a registry from the config's ports table for the user running
    /// the process (`SUDO_USER`, then `USER`).
    pub fn from_config(config: &TestbedConfig) -> Self {
        Self::new(config.ports.clone(), current_user().unwrap_or_default())
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Checks every endpoint of every patch.
    pub fn check(&self, patch_pairs: &[(String, String)]) -> AccessDecision {
        let mut decision = AccessDecision::default();

        let endpoints = patch_pairs
            .iter()
            .flat_map(|(a, b)| [a.as_str(), b.as_str()])
            .filter(|name| *name != NULL_ENDPOINT);

        for name in endpoints {
            match self.owners.get(name) {
                None => decision.nonexistent.push(name.to_string()),
                Some(owners) => {
                    let owned_by_user = !self.user.is_empty()
                        && owners
                            .split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .any(|o| o == self.user);
                    if !owners.trim().is_empty() && !owned_by_user {
                        decision.foreign.push((name.to_string(), owners.clone()));
                    }
                }
            }
        }
        decision
    }
}

impl AccessGuard for PortOwnershipRegistry {
    fn is_authorized(&self, patch_pairs: &[(String, String)]) -> bool {
        if self.user.is_empty() {
            warn!("No user name (SUDO_USER and USER unset); denying {:?}", patch_pairs);
            return false;
        }
        let decision = self.check(patch_pairs);
        if decision.is_allowed() {
            debug!(user = %self.user, "Patch access granted: {:?}", patch_pairs);
            return true;
        }
        if !decision.nonexistent.is_empty() {
            warn!(user = %self.user, "Nonexistent ports: {:?}", decision.nonexistent);
        }
        if !decision.foreign.is_empty() {
            warn!(user = %self.user, "Ports with other owners: {:?}", decision.foreign);
        }
        false
    }
}

/// The user behind `sudo`, or the login user.
pub fn current_user() -> Option<String> {
    env::var("SUDO_USER")
        .ok()
        .filter(|u| !u.is_empty())
        .or_else(|| env::var("USER").ok().filter(|u| !u.is_empty()))
}
