//! Effect gating
//!
//! Pure decisions derived from a `PerformanceProfile`: which expensive layers
//! are mounted and whether transforms ease or snap.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::profile::PerformanceProfile;
use super::tilt::TiltState;
use crate::config::tilt::TRANSITION_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransitionMode {
    Eased(Duration),
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectGates {
    /// Electric border (displacement/turbulence filter) subtree is mounted
    pub electric_border: bool,
    /// Blurred background glow layer is mounted
    pub blur_layers: bool,
    pub transitions: bool,
}

impl EffectGates {
    pub fn from_profile(profile: &PerformanceProfile) -> Self {
        Self {
            electric_border: profile.enable_complex_filters,
            blur_layers: profile.enable_blur,
            transitions: profile.enable_transitions,
        }
    }

    /// Eased only when returning to rest; tracking always snaps to the pointer
    pub fn transition_for(&self, state: &TiltState) -> TransitionMode {
        if self.transitions && !state.is_hovered {
            TransitionMode::Eased(Duration::from_secs_f32(TRANSITION_SECS))
        } else {
            TransitionMode::Instant
        }
    }

    pub fn glow_visible(&self, state: &TiltState) -> bool {
        state.is_hovered
    }

    pub fn background_glow_visible(&self, state: &TiltState) -> bool {
        self.blur_layers && state.is_hovered
    }
}

impl Default for EffectGates {
    fn default() -> Self {
        Self::from_profile(&PerformanceProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::profile::{classify, EnvironmentSnapshot};

    fn gates(width: u32, touch: bool, reduced: bool) -> EffectGates {
        EffectGates::from_profile(&classify(&EnvironmentSnapshot {
            viewport_width: Some(width),
            touch_capable: Some(touch),
            prefers_reduced_motion: Some(reduced),
        }))
    }

    #[test]
    fn mobile_unmounts_expensive_layers() {
        let mobile = gates(390, true, false);
        assert!(!mobile.electric_border);
        assert!(!mobile.blur_layers);

        let desktop = gates(1440, false, false);
        assert!(desktop.electric_border);
        assert!(desktop.blur_layers);
    }

    #[test]
    fn hover_snaps_and_rest_eases() {
        let gates = gates(1440, false, false);
        let mut state = TiltState::default();
        assert!(matches!(gates.transition_for(&state), TransitionMode::Eased(_)));

        state.is_hovered = true;
        assert_eq!(gates.transition_for(&state), TransitionMode::Instant);
    }

    #[test]
    fn reduced_motion_always_snaps() {
        let gates = gates(1440, false, true);
        assert_eq!(gates.transition_for(&TiltState::default()), TransitionMode::Instant);
    }

    #[test]
    fn glow_layers_follow_hover() {
        let mut state = TiltState::default();
        let desktop = gates(1440, false, false);
        let mobile = gates(390, true, false);
        assert!(!desktop.glow_visible(&state));

        state.is_hovered = true;
        assert!(desktop.glow_visible(&state));
        assert!(desktop.background_glow_visible(&state));
        assert!(mobile.glow_visible(&state));
        assert!(!mobile.background_glow_visible(&state));
    }
}
