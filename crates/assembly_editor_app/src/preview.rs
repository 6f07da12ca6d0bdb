// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless preview settings.
//!
//! A preview replays a timeline of user inputs against the cinema
//! controller at a fixed frame rate. Settings are stored as RON.

use assembly_editor_cinema::{CinemaConfig, CinemaError, Result, CONFIG_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Preview settings file name
pub const PREVIEW_FILE_NAME: &str = "preview.ron";

/// Environment variable overriding the settings path
pub const PREVIEW_PATH_ENV: &str = "ASSEMBLY_PREVIEW_SETTINGS";

/// A user input replayed by the preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PreviewInput {
    /// Press play
    Play,
    /// Press pause
    Pause,
    /// Move the speed slider
    SetSpeed(f32),
    /// Drag the progress bar
    SkipTo(isize),
    /// Step one item forward
    SkipForward,
    /// Step one item backward
    SkipBackward,
    /// Jump to the start
    SkipToStart,
    /// Jump to the end
    SkipToEnd,
    /// Leave cinema mode
    Exit,
}

/// Input scheduled at a point in preview time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// Time in seconds since entering cinema mode
    pub at: f32,
    /// Input to apply
    pub input: PreviewInput,
}

/// Headless preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Simulated frames per second
    pub frame_rate: f32,
    /// Total preview length in seconds
    pub duration: f32,
    /// Speed slider value when entering cinema mode
    pub initial_speed: f32,
    /// Playback tunables
    pub cinema: CinemaConfig,
    /// Inputs to replay, in any order
    pub script: Vec<ScriptedInput>,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            duration: 30.0,
            initial_speed: 1.0,
            cinema: CinemaConfig::default(),
            script: vec![
                ScriptedInput { at: 0.0, input: PreviewInput::SetSpeed(1.5) },
                ScriptedInput { at: 0.1, input: PreviewInput::Play },
                ScriptedInput { at: 2.0, input: PreviewInput::SkipBackward },
                ScriptedInput { at: 4.0, input: PreviewInput::Pause },
                ScriptedInput { at: 5.0, input: PreviewInput::SkipTo(5) },
                ScriptedInput { at: 6.0, input: PreviewInput::SetSpeed(-2.0) },
                ScriptedInput { at: 6.5, input: PreviewInput::Play },
                ScriptedInput { at: 9.0, input: PreviewInput::SetSpeed(2.0) },
                ScriptedInput { at: 14.0, input: PreviewInput::SkipToEnd },
                ScriptedInput { at: 15.0, input: PreviewInput::Play },
                ScriptedInput { at: 20.0, input: PreviewInput::Exit },
            ],
        }
    }
}

impl PreviewSettings {
    /// Settings path from the environment or the working directory
    pub fn default_path() -> PathBuf {
        std::env::var_os(PREVIEW_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(PREVIEW_FILE_NAME))
    }

    /// Load from a RON file, falling back to the built-in demo if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No preview settings at {:?}, using built-in demo", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Standalone cinema config living next to a settings file
    pub fn cinema_config_path(settings_path: &Path) -> PathBuf {
        settings_path.with_file_name(CONFIG_FILE_NAME)
    }

    /// Replace the embedded playback tunables with a standalone cinema config.
    ///
    /// Returns whether a config file was found.
    pub fn load_cinema_override(&mut self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        self.cinema = CinemaConfig::load(path)?;
        tracing::info!("Using cinema config from {:?}", path);
        Ok(true)
    }

    /// Parse and validate RON content
    pub fn from_ron(content: &str) -> Result<Self> {
        let settings: Self = ron::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Reject settings the preview loop cannot run
    pub fn validate(&self) -> Result<()> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(CinemaError::InvalidConfig(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(CinemaError::InvalidConfig(format!(
                "duration must not be negative, got {}",
                self.duration
            )));
        }
        self.cinema.validate()
    }

    /// Script sorted by time; inputs at the same time keep their file order
    pub fn sorted_script(&self) -> Vec<ScriptedInput> {
        let mut script = self.script.clone();
        script.sort_by(|a, b| a.at.total_cmp(&b.at));
        script
    }
}
