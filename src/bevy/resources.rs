//! Bevy resource definitions
//!
//! This module contains all global resources used by Bevy systems.
//! Resources are singleton data that can be accessed by any system.

use bevy::prelude::*;
use std::time::Duration;

use crate::card::{
    DeviceClassifier, EffectGates, PageTransform, Region, ThemeId, TiltEngine,
};
use crate::card::theme::SubscriptionId;
use crate::tauri_bridge::shared_state::{lock, SharedTheme};
use crate::tauri_bridge::BridgeState;

// =============================================================================
// Card Interaction
// =============================================================================

/// The card's tilt engine; one per rendered card
#[derive(Resource)]
pub struct TiltEngineRes(pub TiltEngine);

/// Cached environment classification
#[derive(Resource, Default)]
pub struct ClassifierRes(pub DeviceClassifier);

/// Gates derived from the current profile
#[derive(Resource, Default, PartialEq)]
pub struct EffectGatesRes(pub EffectGates);

/// Card bounding region in render-target pixels, re-measured every tick
#[derive(Resource, Default)]
pub struct CardRegion(pub Option<Region>);

/// Whether the last pointer sample fell inside the card region
#[derive(Resource, Default)]
pub struct PointerHover(pub bool);

/// Scroll-driven page transform
#[derive(Resource, Default)]
pub struct PageTransformRes(pub PageTransform);

/// Theme currently painted into the scene
#[derive(Resource)]
pub struct ActiveTheme(pub ThemeId);

/// Theme change notifications from the theme context
#[derive(Resource, Deref)]
pub struct ThemeUpdates(pub Receiver<ThemeId>);

/// The scene's registration with the theme context, removed when the world drops
#[derive(Resource)]
pub struct ThemeSubscription {
    pub theme: SharedTheme,
    pub id: SubscriptionId,
}

impl Drop for ThemeSubscription {
    fn drop(&mut self) {
        if let Ok(mut ctx) = lock(&self.theme.0, "theme") {
            ctx.unsubscribe(self.id);
        }
    }
}

/// Materials recolored on theme or scroll changes
#[derive(Resource)]
pub struct CardMaterials {
    pub card: Handle<StandardMaterial>,
    pub border: Handle<StandardMaterial>,
    pub background_glow: Handle<StandardMaterial>,
}

/// Shared handles to the webview shell
#[derive(Resource, Clone)]
pub struct BridgeRes(pub BridgeState);

// =============================================================================
// Frame Management
// =============================================================================

/// Counter for total frames rendered
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Number of pre-roll frames to skip before starting output
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

/// Frame rate limiter to control output FPS
#[derive(Resource)]
pub struct FrameRateLimiter {
    pub last_frame_time: std::time::Instant,
    pub min_frame_interval: Duration,
}

impl FrameRateLimiter {
    pub fn new(target_fps: f64) -> Self {
        Self {
            last_frame_time: std::time::Instant::now(),
            min_frame_interval: Duration::from_secs_f64(1.0 / target_fps),
        }
    }
}

// =============================================================================
// Performance Monitoring
// =============================================================================

/// Performance timing tracker for frame processing
#[derive(Resource, Default)]
pub struct FrameTimings {
    pub last_print_time: f64,
    pub frame_times: Vec<f64>,
}

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

use crossbeam_channel::{Receiver, Sender};

/// Receives data from render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<Vec<u8>>);

/// Sends data to main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<Vec<u8>>);
