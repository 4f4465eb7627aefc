//! Configuration for the analyzer.
//!
//! Defaults reproduce the behavior of the command-line tool; library users
//! can override them in code or load them from JSON.

use crate::formats::elf::sections::STRTAB_NAME;
use crate::io::IOLimits;
use serde::{Deserialize, Serialize};

pub use crate::formats::elf::symbols::StrtabPolicy;

/// Master configuration for an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Limits applied when acquiring a file from disk.
    pub io: IOLimits,
    /// How the symbol string table is located.
    pub strtab_policy: StrtabPolicy,
    /// Section name used by the name-based string table lookup.
    pub strtab_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            io: IOLimits::default(),
            strtab_policy: StrtabPolicy::default(),
            strtab_name: STRTAB_NAME.to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
