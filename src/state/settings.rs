//! User settings persisted as JSON beside the executable
//!
//! The record is loaded once at startup and written back on every
//! toggle and when the window closes. A missing or unreadable file is
//! never fatal: the defaults take over.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::data::{parse_hex_color, to_hex_color, MaskKind, MaskSpec};
use crate::error::Result;

/// File name of the settings file
const SETTINGS_FILE: &str = "usersettings.json";

/// All persisted user preferences
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Jump to the next image right after a mask is applied
    pub auto_advance: bool,

    /// Play a short cue on every mask application
    pub crop_sound: bool,

    /// Disable deleting images from disk
    pub safe_mode: bool,

    /// Last chosen input folder ("" when unset)
    #[serde(alias = "input_folder")]
    pub default_input_folder: String,

    /// Last chosen output folder ("" when unset)
    #[serde(alias = "output_folder")]
    pub default_output_folder: String,

    /// Color or Mosaic
    pub mask_type: MaskKind,

    /// Fill color as `#RRGGBB` or `#RRGGBBAA`
    pub mask_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_advance: true,
            crop_sound: true,
            safe_mode: false,
            default_input_folder: String::new(),
            default_output_folder: String::new(),
            mask_type: MaskKind::Color,
            mask_color: "#000000".to_string(),
        }
    }
}

impl Settings {
    /// Convert to pretty JSON for the settings file
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON, filling missing keys with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from `path`, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            tracing::info!("no settings at {}, using defaults", path.display());
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write to `path`. Failures are logged, never surfaced.
    pub fn save(&self, path: &Path) {
        let result = self.to_json().and_then(|json| Ok(fs::write(path, json)?));
        match result {
            Ok(()) => tracing::debug!("settings saved to {}", path.display()),
            Err(e) => tracing::warn!("failed to save settings to {}: {}", path.display(), e),
        }
    }

    /// Where the settings file lives.
    ///
    /// Next to the executable when that can be determined, otherwise in
    /// the user config directory.
    pub fn default_path() -> PathBuf {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        match beside_exe {
            Some(dir) => dir.join(SETTINGS_FILE),
            None => {
                let mut path = dirs::config_dir()
                    .or_else(dirs::home_dir)
                    .unwrap_or_else(|| PathBuf::from("."));
                path.push("mask-pruner");
                if let Err(e) = fs::create_dir_all(&path) {
                    tracing::warn!("could not create {}: {}", path.display(), e);
                }
                path.push(SETTINGS_FILE);
                path
            }
        }
    }

    /// Parsed fill color, black when the stored string is invalid
    pub fn color(&self) -> Rgba<u8> {
        parse_hex_color(&self.mask_color).unwrap_or(Rgba([0, 0, 0, 255]))
    }

    /// Store a color in canonical hex form
    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.mask_color = to_hex_color(color);
    }

    /// The mask the engine should apply
    pub fn mask_spec(&self) -> MaskSpec {
        MaskSpec::new(self.mask_type, self.color())
    }

    pub fn input_folder(&self) -> Option<PathBuf> {
        non_empty_path(&self.default_input_folder)
    }

    pub fn output_folder(&self) -> Option<PathBuf> {
        non_empty_path(&self.default_output_folder)
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}
