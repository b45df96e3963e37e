//! Inspection settings, optionally loaded from a TOML file.
//!
//! ```toml
//! process_names = ["Slippi_Dolphin.exe"]
//! slot = 1
//!
//! [walk]
//! max_nodes = 128
//!
//! [tolerance]
//! atol = 1e-5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::DEFAULT_PROCESS_NAMES;
use crate::skeleton::{SkeletonStyle, Tolerance, WalkLimits};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Executable names accepted as the emulator
    pub process_names: Vec<String>,
    /// Player slot inspected when a command does not name one
    pub slot: u32,
    pub walk: WalkLimits,
    pub style: SkeletonStyle,
    pub tolerance: Tolerance,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            process_names: DEFAULT_PROCESS_NAMES.iter().map(|s| s.to_string()).collect(),
            slot: 0,
            walk: WalkLimits::default(),
            style: SkeletonStyle::default(),
            tolerance: Tolerance::default(),
        }
    }
}

impl InspectConfig {
    /// Create a new configuration builder
    pub fn builder() -> InspectConfigBuilder {
        InspectConfigBuilder::default()
    }

    /// Load from a TOML file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn process_names(&self) -> Vec<&str> {
        self.process_names.iter().map(String::as_str).collect()
    }
}

/// Builder for InspectConfig
#[derive(Debug, Clone, Default)]
pub struct InspectConfigBuilder {
    process_names: Option<Vec<String>>,
    slot: Option<u32>,
    walk: Option<WalkLimits>,
    style: Option<SkeletonStyle>,
    tolerance: Option<Tolerance>,
}

impl InspectConfigBuilder {
    pub fn process_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.process_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn slot(mut self, slot: u32) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn walk(mut self, limits: WalkLimits) -> Self {
        self.walk = Some(limits);
        self
    }

    pub fn style(mut self, style: SkeletonStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Build the configuration
    pub fn build(self) -> InspectConfig {
        let default = InspectConfig::default();
        InspectConfig {
            process_names: self.process_names.unwrap_or(default.process_names),
            slot: self.slot.unwrap_or(default.slot),
            walk: self.walk.unwrap_or(default.walk),
            style: self.style.unwrap_or(default.style),
            tolerance: self.tolerance.unwrap_or(default.tolerance),
        }
    }
}
