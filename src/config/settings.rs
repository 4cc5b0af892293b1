use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub music_enabled: bool,
    pub sound_enabled: bool,
    /// Master volume, 0.0 to 1.0
    pub volume: f32,
    pub music_volume: f32,
    pub effects_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            music_enabled: true,
            sound_enabled: true,
            volume: 0.5,
            music_volume: 0.3,
            effects_volume: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory holding `blocks/` and `sprites/`, relative to the working directory
    pub directory: PathBuf,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleSettings {
    pub show_grid: bool,
}

impl Default for PuzzleSettings {
    fn default() -> Self {
        Self { show_grid: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingSettings {
    /// Steer toward the mouse pointer when it moves over the road
    pub mouse_steering: bool,
}

impl Default for DrivingSettings {
    fn default() -> Self {
        Self {
            mouse_steering: true,
        }
    }
}
