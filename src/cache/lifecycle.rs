//! Lifecycle phase tracking for the offline cache
//!
//! Phases are recorded, not enforced: the host delivers install and activate
//! events and is trusted to order them.

use crate::cache::entry::Generation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of the cache as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No install has completed yet
    #[default]
    Uninstalled,
    /// A generation is being seeded
    Installing,
    /// Idle; a current and/or waiting generation may exist
    Installed,
    /// Stale generations are being pruned
    Activating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninstalled => write!(f, "uninstalled"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
        }
    }
}

/// Snapshot of lifecycle state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    /// Current phase
    pub phase: Phase,
    /// Generation serving fetches (set by activation)
    pub current: Option<Generation>,
    /// Generation installed but not yet activated
    pub waiting: Option<Generation>,
}

impl Lifecycle {
    pub(crate) fn begin_install(&mut self) {
        self.phase = Phase::Installing;
    }

    pub(crate) fn finish_install(&mut self, generation: &Generation) {
        self.phase = Phase::Installed;
        self.waiting = Some(generation.clone());
    }

    /// Store could not be opened; the previous state stays authoritative
    pub(crate) fn abandon_install(&mut self) {
        self.phase = if self.current.is_some() || self.waiting.is_some() {
            Phase::Installed
        } else {
            Phase::Uninstalled
        };
    }

    pub(crate) fn begin_activate(&mut self) {
        self.phase = Phase::Activating;
    }

    pub(crate) fn finish_activate(&mut self, generation: &Generation) {
        self.phase = Phase::Installed;
        self.current = Some(generation.clone());
        if self.waiting.as_ref() == Some(generation) {
            self.waiting = None;
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current {
            Some(current) => write!(f, "{} (current={})", self.phase, current),
            None => write!(f, "{}", self.phase),
        }
    }
}
