//! Analysis settings.

use serde::{Deserialize, Serialize};

/// Toggles controlling which checks run and how aggressive they are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable the coding-style checks (everything except the memset
    /// misuse detection, which always runs).
    pub check_coding_style: bool,

    /// Enable checks that may produce false positives. Currently gates
    /// the virtual-destructor check only.
    pub inconclusive: bool,

    /// Set when the input was preprocessed against a specific
    /// configuration; disables the const-member-function check, whose
    /// member resolution is unreliable under partial configurations.
    pub ifcfg: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_coding_style: true,
            inconclusive: false,
            ifcfg: false,
        }
    }
}
