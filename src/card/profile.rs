//! Device capability classification
//!
//! Maps a snapshot of environment signals (viewport width, touch capability,
//! reduced-motion preference) to a `PerformanceProfile`. Signals the
//! environment cannot report fail open to the desktop branch, so a capable
//! browser is never denied effects; the cost is a possible brief flash of full
//! effects before the frontend reports its real signals.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::device::*;

/// Environment signals as reported by the frontend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    /// Viewport width in CSS pixels
    pub viewport_width: Option<u32>,
    /// Coarse pointer or touch points present
    pub touch_capable: Option<bool>,
    /// `prefers-reduced-motion: reduce`
    pub prefers_reduced_motion: Option<bool>,
}

impl EnvironmentSnapshot {
    pub fn is_mobile_like(&self) -> bool {
        self.touch_capable == Some(true)
            || self.viewport_width.is_some_and(|w| w <= MOBILE_MAX_WIDTH)
    }

    pub fn reduced_motion(&self) -> bool {
        self.prefers_reduced_motion == Some(true)
    }
}

/// Which expensive effects may run, and how aggressively
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    pub enable_complex_filters: bool,
    pub enable_blur: bool,
    pub enable_transitions: bool,
    pub throttle_interval: Duration,
    pub max_rotation_deg: f32,
}

impl Default for PerformanceProfile {
    fn default() -> Self {
        classify(&EnvironmentSnapshot::default())
    }
}

/// Classify an environment snapshot. Pure: equal snapshots give equal profiles.
pub fn classify(env: &EnvironmentSnapshot) -> PerformanceProfile {
    let mobile = env.is_mobile_like();
    let (max_rotation_deg, throttle_interval) = if mobile {
        (MOBILE_MAX_ROTATION_DEG, MOBILE_THROTTLE)
    } else {
        (DESKTOP_MAX_ROTATION_DEG, DESKTOP_THROTTLE)
    };

    PerformanceProfile {
        enable_complex_filters: !mobile,
        enable_blur: !mobile,
        enable_transitions: !env.reduced_motion(),
        throttle_interval,
        max_rotation_deg,
    }
}

/// Caches the last snapshot and its profile
#[derive(Debug, Clone, Default)]
pub struct DeviceClassifier {
    snapshot: EnvironmentSnapshot,
    profile: PerformanceProfile,
}

impl DeviceClassifier {
    pub fn new(snapshot: EnvironmentSnapshot) -> Self {
        Self {
            snapshot,
            profile: classify(&snapshot),
        }
    }

    pub fn profile(&self) -> PerformanceProfile {
        self.profile
    }

    pub fn snapshot(&self) -> EnvironmentSnapshot {
        self.snapshot
    }

    /// Reclassify; returns the new profile only if the snapshot changed
    pub fn update(&mut self, snapshot: EnvironmentSnapshot) -> Option<PerformanceProfile> {
        if snapshot == self.snapshot {
            return None;
        }
        self.snapshot = snapshot;
        self.profile = classify(&snapshot);
        tracing::debug!(
            target: "card::profile",
            ?snapshot,
            profile = ?self.profile,
            "environment reclassified"
        );
        Some(self.profile)
    }
}
