//! Shared state structures for communication between the webview and Bevy
//!
//! This module defines thread-safe data structures that carry frames and stats
//! out of the Bevy render thread and pointer, environment, scroll and theme
//! signals into it.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::card::{
    EffectGates, EnvironmentSnapshot, PageTransform, PerformanceProfile, PointerSample,
    RenderParams, ThemeContext, ThemeId, TiltState,
};
use crate::card::tilt::{EnginePhase, EngineStats};
use crate::error::{CardError, Result};

/// Lock a shared mutex, naming the state in the error if it was poisoned
pub fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> Result<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| CardError::LockPoisoned(name))
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// Thread-safe RGBA frame buffer shared between Bevy and the webview
/// Stores raw RGBA8 pixel data (4 bytes per pixel)
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<Vec<u8>>>>);

/// Frame response containing Base64-encoded RGBA pixel data
#[derive(Serialize, Deserialize)]
pub struct FrameResponse {
    /// Base64-encoded RGBA pixel data (avoids slow JSON array serialization)
    pub data: String,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// Pointer Input
// =============================================================================

/// Pointer event over the displayed frame, in render-target pixels
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Enter { x: f32, y: f32, timestamp_ms: f64 },
    Move { x: f32, y: f32, timestamp_ms: f64 },
    Leave,
}

impl PointerEvent {
    pub fn sample(&self) -> Option<PointerSample> {
        match *self {
            PointerEvent::Enter { x, y, timestamp_ms } | PointerEvent::Move { x, y, timestamp_ms } => {
                let timestamp = Duration::try_from_secs_f64(timestamp_ms / 1000.0).unwrap_or_default();
                Some(PointerSample::new(x, y, timestamp))
            }
            PointerEvent::Leave => None,
        }
    }
}

/// Ordered pointer event queue; the webview pushes, Bevy drains once per tick
#[derive(Clone)]
pub struct SharedPointerInput {
    tx: Sender<PointerEvent>,
    rx: Receiver<PointerEvent>,
}

impl SharedPointerInput {
    pub fn push(&self, event: PointerEvent) {
        // Both ends live in this struct, so the channel cannot be disconnected
        let _ = self.tx.send(event);
    }

    pub fn drain(&self) -> Vec<PointerEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for SharedPointerInput {
    fn default() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }
}

// =============================================================================
// Environment, Scroll, Theme
// =============================================================================

/// Latest environment signals reported by the webview
#[derive(Clone, Default)]
pub struct SharedEnvironment(pub Arc<Mutex<EnvironmentSnapshot>>);

/// Latest page scroll offset (CSS px)
#[derive(Clone, Default)]
pub struct SharedScroll(pub Arc<Mutex<f32>>);

/// Active theme and its subscribers
#[derive(Clone, Default)]
pub struct SharedTheme(pub Arc<Mutex<ThemeContext>>);

impl SharedTheme {
    pub fn new(initial: ThemeId) -> Self {
        Self(Arc::new(Mutex::new(ThemeContext::new(initial))))
    }
}

// =============================================================================
// Card Snapshot
// =============================================================================

/// Everything a renderer needs to paint the card, published once per tick
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CardSnapshot {
    pub tilt: TiltState,
    pub phase: EnginePhase,
    pub profile: PerformanceProfile,
    pub gates: EffectGates,
    pub theme: ThemeId,
    pub page: PageTransform,
    pub css: RenderParams,
}

impl Default for CardSnapshot {
    fn default() -> Self {
        let tilt = TiltState::default();
        let gates = EffectGates::default();
        let theme = ThemeId::default();
        Self {
            tilt,
            phase: EnginePhase::Resting,
            profile: PerformanceProfile::default(),
            gates,
            theme,
            page: PageTransform::default(),
            css: RenderParams::from_state(&tilt, &gates, theme.tokens()),
        }
    }
}

#[derive(Clone, Default)]
pub struct SharedCardSnapshot(pub Arc<Mutex<CardSnapshot>>);

// =============================================================================
// Performance Statistics
// =============================================================================

/// Performance statistics for debugging and monitoring
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct PerformanceStats {
    // Backend (Bevy/Rust) timings
    pub gpu_transfer_ms: f64,
    pub data_processing_ms: f64,
    pub frame_encoding_ms: f64,
    pub bevy_fps: f64,
    pub frame_count: u32,
    pub data_size_kb: f64,
    // Tilt engine counters
    pub engine: EngineStats,
    // Tauri command timings
    pub tauri_get_frame_ms: f64,
    pub tauri_serialize_ms: f64,
}

/// Thread-safe performance statistics
#[derive(Clone, Default)]
pub struct SharedPerfStats(pub Arc<Mutex<PerformanceStats>>);

// =============================================================================
// Bundle
// =============================================================================

/// All shared handles, cloned into Bevy and the webview shell
#[derive(Clone, Default)]
pub struct BridgeState {
    pub frames: SharedFrameBuffer,
    pub perf_stats: SharedPerfStats,
    pub pointer: SharedPointerInput,
    pub environment: SharedEnvironment,
    pub scroll: SharedScroll,
    pub theme: SharedTheme,
    pub snapshot: SharedCardSnapshot,
}

impl BridgeState {
    pub fn new(initial_theme: ThemeId) -> Self {
        Self {
            theme: SharedTheme::new(initial_theme),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_queue_preserves_order() {
        let input = SharedPointerInput::default();
        let producer = input.clone();
        producer.push(PointerEvent::Enter { x: 1.0, y: 2.0, timestamp_ms: 0.0 });
        producer.push(PointerEvent::Move { x: 3.0, y: 4.0, timestamp_ms: 8.0 });
        producer.push(PointerEvent::Leave);

        let events = input.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], PointerEvent::Leave);
        assert!(input.drain().is_empty());
    }

    #[test]
    fn pointer_event_wire_format() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"kind":"move","x":10.5,"y":4,"timestamp_ms":1500}"#).unwrap();
        let sample = event.sample().unwrap();
        assert_eq!((sample.x, sample.y), (10.5, 4.0));
        assert_eq!(sample.timestamp, Duration::from_millis(1500));

        let leave: PointerEvent = serde_json::from_str(r#"{"kind":"leave"}"#).unwrap();
        assert!(leave.sample().is_none());
    }

    #[test]
    fn negative_timestamps_fall_back_to_zero() {
        let event = PointerEvent::Move { x: 0.0, y: 0.0, timestamp_ms: -5.0 };
        assert_eq!(event.sample().unwrap().timestamp, Duration::ZERO);
    }

    #[test]
    fn default_snapshot_is_resting() {
        let snapshot = CardSnapshot::default();
        assert_eq!(snapshot.tilt, TiltState::default());
        assert_eq!(snapshot.phase, EnginePhase::Resting);
        assert!(!snapshot.css.glow_visible);
    }
}
