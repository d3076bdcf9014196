//! Bridge configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target pipeline profile. Fixed for a deployment; selected once at
/// bridge construction, never branched on per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// DPDK software pipeline.
    Dpdk,
    /// ES2K hardware pipeline.
    Es2k,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Dpdk => write!(f, "dpdk"),
            ProfileKind::Es2k => write!(f, "es2k"),
        }
    }
}

/// Configuration of one bridge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// P4Runtime device id the session programs.
    pub device_id: u64,
    /// Target pipeline profile.
    pub profile: ProfileKind,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_id: 1,
            profile: ProfileKind::Es2k,
        }
    }
}
