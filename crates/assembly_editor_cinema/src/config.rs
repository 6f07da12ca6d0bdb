// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tunables for the playback driver.

use crate::error::{CinemaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cinema configuration file name
pub const CONFIG_FILE_NAME: &str = "cinema.ron";

/// Playback tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinemaConfig {
    /// Opacity change per time unit during a fade
    pub fade_rate: f32,
    /// Delay between steps at speed zero; speeds of this magnitude have no delay
    pub max_delay: f32,
    /// Positions moved by a skip buffered while playing
    pub skip_distance: usize,
}

impl Default for CinemaConfig {
    fn default() -> Self {
        Self {
            fade_rate: 3.0,
            max_delay: 2.0,
            skip_distance: 2,
        }
    }
}

impl CinemaConfig {
    /// Load from a RON file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No cinema config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Parse and validate RON content
    pub fn from_ron(content: &str) -> Result<Self> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Reject values the driver cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.fade_rate.is_finite() && self.fade_rate > 0.0) {
            return Err(CinemaError::InvalidConfig(format!(
                "fade_rate must be positive, got {}",
                self.fade_rate
            )));
        }
        if !(self.max_delay.is_finite() && self.max_delay >= 0.0) {
            return Err(CinemaError::InvalidConfig(format!(
                "max_delay must not be negative, got {}",
                self.max_delay
            )));
        }
        Ok(())
    }
}
