//! Configuration constants and settings for the business card
//!
//! This module contains the fixed parameters (render resolution, frame rate,
//! device classification thresholds, card geometry) and the optional runtime
//! `CardConfig` loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::card::theme::ThemeId;
use crate::card::tilt::{RestingPose, TiltConfig};
use crate::error::{CardError, Result};

/// Width of the offscreen render target in pixels
pub const RENDER_WIDTH: u32 = 800;

/// Height of the offscreen render target in pixels
pub const RENDER_HEIGHT: u32 = 600;

/// Target frames per second for the Bevy render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of pre-roll frames to skip before starting output
/// This allows the scene to fully load and stabilize
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Environment variable that points at a config file
pub const CONFIG_ENV_VAR: &str = "CARD_CONFIG";

/// Config file looked up in the working directory when the variable is unset
pub const DEFAULT_CONFIG_FILE: &str = "card.toml";

/// Device classification thresholds
pub mod device {
    use std::time::Duration;

    /// Viewports at or below this width (CSS pixels) are treated as mobile
    pub const MOBILE_MAX_WIDTH: u32 = 768;

    /// Tilt limit on mobile-like devices (degrees)
    pub const MOBILE_MAX_ROTATION_DEG: f32 = 5.0;

    /// Tilt limit on desktop (degrees)
    pub const DESKTOP_MAX_ROTATION_DEG: f32 = 10.0;

    /// Minimum spacing between pointer-driven updates on mobile-like devices
    pub const MOBILE_THROTTLE: Duration = Duration::from_millis(100);

    /// Minimum spacing between pointer-driven updates on desktop
    pub const DESKTOP_THROTTLE: Duration = Duration::from_millis(16);
}

/// Tilt engine defaults
pub mod tilt {
    /// Resting pose (degrees) applied when the pointer is not over the card
    pub const RESTING_X: f32 = 15.0;
    pub const RESTING_Y: f32 = -20.0;
    pub const RESTING_Z: f32 = 5.0;

    /// Multiplier applied to the normalized pointer offset
    pub const DAMPING: f32 = 0.8;

    /// Share of the rotation limit used for the Z roll
    pub const ROLL_WEIGHT: f32 = 0.3;

    /// Duration of the eased return to the resting pose (seconds)
    pub const TRANSITION_SECS: f32 = 0.3;
}

/// Card scene geometry (world units)
pub mod card {
    /// Card face size, matches a 3.5in x 2in business card
    pub const WIDTH: f32 = 3.5;
    pub const HEIGHT: f32 = 2.0;
    pub const DEPTH: f32 = 0.04;

    /// Thickness of the electric border strips
    pub const BORDER_THICKNESS: f32 = 0.05;

    /// Background glow plate is this much larger than the card
    pub const BACKGROUND_GLOW_SCALE: f32 = 1.35;

    /// Distance of the glow light in front of the card face
    pub const GLOW_LIGHT_OFFSET: f32 = 0.6;

    /// Glow light intensity while hovered
    pub const GLOW_INTENSITY: f32 = 60_000.0;

    /// CSS pixels per world unit for scroll-driven translation
    pub const PIXELS_PER_UNIT: f32 = 160.0;
}

/// Performance monitoring settings
pub mod performance {
    /// Interval for logging performance stats (seconds)
    pub const STATS_PRINT_INTERVAL: f64 = 2.0;

    /// Number of frame timing samples to keep for averaging
    pub const FRAME_TIMING_SAMPLES: usize = 60;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}

// =============================================================================
// Runtime configuration
// =============================================================================

/// Runtime settings, all sections optional in the file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub render: RenderSection,
    pub tilt: TiltSection,
    pub theme: ThemeSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub target_fps: f64,
    pub pre_roll_frames: u32,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            pre_roll_frames: PRE_ROLL_FRAMES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltSection {
    pub resting_x: f32,
    pub resting_y: f32,
    pub resting_z: f32,
    pub damping: f32,
    pub roll_weight: f32,
    /// Clamp pointer samples to the card region before computing tilt and glow
    pub clamp_to_region: bool,
}

impl Default for TiltSection {
    fn default() -> Self {
        Self {
            resting_x: tilt::RESTING_X,
            resting_y: tilt::RESTING_Y,
            resting_z: tilt::RESTING_Z,
            damping: tilt::DAMPING,
            roll_weight: tilt::ROLL_WEIGHT,
            clamp_to_region: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSection {
    pub initial: ThemeId,
}

impl CardConfig {
    /// Load from `$CARD_CONFIG`, else `card.toml` if present, else defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&raw)?;
        tracing::info!(target: "card::config", path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.render.target_fps.is_finite() && self.render.target_fps > 0.0) {
            return Err(CardError::Config(format!(
                "render.target_fps must be positive, got {}",
                self.render.target_fps
            )));
        }
        if !(self.tilt.damping > 0.0 && self.tilt.damping <= 1.0) {
            return Err(CardError::Config(format!(
                "tilt.damping must be in (0, 1], got {}",
                self.tilt.damping
            )));
        }
        if !(0.0..=1.0).contains(&self.tilt.roll_weight) {
            return Err(CardError::Config(format!(
                "tilt.roll_weight must be in [0, 1], got {}",
                self.tilt.roll_weight
            )));
        }
        Ok(())
    }

    pub fn tilt_config(&self) -> TiltConfig {
        TiltConfig {
            resting: RestingPose {
                x: self.tilt.resting_x,
                y: self.tilt.resting_y,
                z: self.tilt.resting_z,
            },
            damping: self.tilt.damping,
            roll_weight: self.tilt.roll_weight,
            clamp_to_region: self.tilt.clamp_to_region,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = CardConfig::from_toml("").unwrap();
        assert_eq!(config, CardConfig::default());
        assert_eq!(config.tilt_config(), TiltConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = CardConfig::from_toml(
            r#"
            [tilt]
            damping = 0.5

            [theme]
            initial = "ember"
            "#,
        )
        .unwrap();
        assert_eq!(config.tilt.damping, 0.5);
        assert_eq!(config.tilt.resting_x, tilt::RESTING_X);
        assert_eq!(config.theme.initial, ThemeId::Ember);
        assert_eq!(config.render.target_fps, TARGET_FPS);
    }

    #[test]
    fn rejects_out_of_range_damping() {
        let err = CardConfig::from_toml("[tilt]\ndamping = 1.5\n").unwrap_err();
        assert!(matches!(err, CardError::Config(_)));
    }

    #[test]
    fn rejects_unknown_theme() {
        let err = CardConfig::from_toml("[theme]\ninitial = \"neon\"\n").unwrap_err();
        assert!(matches!(err, CardError::Toml(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\ntarget_fps = 30.0").unwrap();
        let config = CardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.render.target_fps, 30.0);
        assert_eq!(config.render.pre_roll_frames, PRE_ROLL_FRAMES);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CardConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CardError::Io(_)));
    }
}
