//! Editor settings: every tunable constant of the editing operations.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Carve tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarveSettings {
    /// Distance each split half is pushed away from the plane
    pub split_separation: f32,
    /// Circular bore cutter radius
    pub bore_radius: f32,
    /// Circular bore cutter length
    pub bore_length: f32,
    pub bore_segments: u32,
    /// Extrusion depth of sketch cutters, symmetric about the stroke center
    pub sketch_depth: f32,
}

impl Default for CarveSettings {
    fn default() -> Self {
        Self {
            split_separation: 0.2,
            bore_radius: 0.3,
            bore_length: 5.0,
            bore_segments: 32,
            sketch_depth: 20.0,
        }
    }
}

/// Bend, tube and circle shaping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingSettings {
    /// Bend curvature coefficient
    pub bend_k: f32,
    pub tube_radius: f32,
    pub tube_tubular_segments: u32,
    pub tube_radial_segments: u32,
    /// Circles with a smaller drawn radius are discarded
    pub circle_min_radius: f32,
    pub circle_tube: f32,
    pub circle_radial_segments: u32,
    pub circle_tubular_segments: u32,
}

impl Default for ShapingSettings {
    fn default() -> Self {
        Self {
            bend_k: 0.5,
            tube_radius: 0.1,
            tube_tubular_segments: 64,
            tube_radial_segments: 8,
            circle_min_radius: 0.1,
            circle_tube: 0.05,
            circle_radial_segments: 16,
            circle_tubular_segments: 100,
        }
    }
}

/// Freehand stroke settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawSettings {
    /// Depth along the pointer ray at which stroke points are sampled
    pub draw_depth: f32,
    /// Minimum stroke length for the planarity hint
    pub planar_min_points: usize,
    /// Extent under which a stroke counts as flat
    pub planar_threshold: f32,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            draw_depth: 5.0,
            planar_min_points: 5,
            planar_threshold: 0.1,
        }
    }
}

/// Repeat engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Height above the offset point the probe ray starts from
    pub probe_height: f32,
    /// Pause between iterations of a multi-repeat
    pub repeat_pacing_ms: u64,
    /// Distance used when none is given
    pub default_distance: f32,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            probe_height: 10.0,
            repeat_pacing_ms: 200,
            default_distance: 1.0,
        }
    }
}

/// Shape colors (0xRRGGBB)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub default_color: u32,
    pub tube_color: u32,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            default_color: shared::DEFAULT_COLOR,
            tube_color: 0xff00ff,
        }
    }
}

/// All editor settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub carve: CarveSettings,
    pub shaping: ShapingSettings,
    pub draw: DrawSettings,
    pub replay: ReplaySettings,
    pub colors: ColorSettings,
}

impl EditorSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "sculpt", "sculpt")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the config dir, or return default if not found
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from(&path) {
                Ok(settings) => return settings,
                Err(PersistenceError::Io(_)) => {}
                Err(e) => tracing::warn!("Ignoring settings at {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, PersistenceError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings to the config dir
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Failed to save settings to {}: {e}", path.display());
                }
            }
        }
    }

    /// Settings for headless runs: no pause between repeats
    pub fn headless() -> Self {
        let mut settings = Self::default();
        settings.replay.repeat_pacing_ms = 0;
        settings
    }
}
