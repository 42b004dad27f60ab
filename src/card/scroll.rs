//! Scroll-linked page transform
//!
//! Linear map from scroll offset to the card's fade, shrink and lift. No state.

use serde::{Deserialize, Serialize};

/// Scroll distance (CSS px) over which the full effect plays out
pub const FADE_DISTANCE: f32 = 400.0;

const MIN_OPACITY: f32 = 0.2;
const MIN_SCALE: f32 = 0.9;
const MAX_LIFT: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageTransform {
    pub opacity: f32,
    pub scale: f32,
    /// Vertical translation in CSS pixels, negative is up
    pub translate_y: f32,
}

impl PageTransform {
    pub fn from_scroll(offset_px: f32) -> Self {
        let progress = if offset_px.is_finite() {
            (offset_px / FADE_DISTANCE).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            opacity: 1.0 - progress * (1.0 - MIN_OPACITY),
            scale: 1.0 - progress * (1.0 - MIN_SCALE),
            translate_y: -progress * MAX_LIFT,
        }
    }
}

impl Default for PageTransform {
    fn default() -> Self {
        Self::from_scroll(0.0)
    }
}
