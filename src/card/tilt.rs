//! Pointer tilt and glow engine
//!
//! Turns a stream of pointer samples over the card's bounding region into a
//! bounded, rate-limited rotation plus glow position. Pointer moves never touch
//! the state directly: each one replaces the single pending frame, and the
//! host fires that frame on its next refresh tick via [`TiltEngine::on_frame`].
//! Only the latest sample per tick is ever applied.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::profile::PerformanceProfile;
use crate::config::tilt::*;

// =============================================================================
// Geometry and samples
// =============================================================================

/// Bounding rectangle of the card in pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A region that can be used for normalization
    pub fn is_measurable(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Whether a point lies inside the region, edges included
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.left + self.width / 2.0,
            self.top + self.height / 2.0,
        )
    }

    /// Fractional position of a point in percent, origin at the top-left
    fn percent_of(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.left) / self.width * 100.0,
            (y - self.top) / self.height * 100.0,
        )
    }
}

/// One pointer position with its event timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    pub timestamp: Duration,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, timestamp: Duration) -> Self {
        Self { x, y, timestamp }
    }
}

// =============================================================================
// State
// =============================================================================

/// Rotation (degrees) applied when nothing is hovering the card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestingPose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for RestingPose {
    fn default() -> Self {
        Self {
            x: RESTING_X,
            y: RESTING_Y,
            z: RESTING_Z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltConfig {
    pub resting: RestingPose,
    pub damping: f32,
    pub roll_weight: f32,
    /// Clamp samples into the region so tilt and glow never leave their ranges
    pub clamp_to_region: bool,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            resting: RestingPose::default(),
            damping: DAMPING,
            roll_weight: ROLL_WEIGHT,
            clamp_to_region: true,
        }
    }
}

/// Render-facing snapshot of the card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltState {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub rotate_z: f32,
    pub glow_x: f32,
    pub glow_y: f32,
    pub is_hovered: bool,
}

impl TiltState {
    pub fn resting(pose: RestingPose) -> Self {
        Self {
            rotate_x: pose.x,
            rotate_y: pose.y,
            rotate_z: pose.z,
            glow_x: 50.0,
            glow_y: 50.0,
            is_hovered: false,
        }
    }

    fn set_rotation(&mut self, pose: RestingPose) {
        self.rotate_x = pose.x;
        self.rotate_y = pose.y;
        self.rotate_z = pose.z;
    }
}

impl Default for TiltState {
    fn default() -> Self {
        Self::resting(RestingPose::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    Resting,
    Tracking,
    Disposed,
}

/// Identifies one scheduled frame update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The pending sample was applied to the state
    Applied,
    /// Throttle interval not yet elapsed; the frame stays pending
    Deferred,
    /// The region could not be measured; state kept, frame dropped
    Unmeasured,
    /// Handle was cancelled, replaced, or the engine is disposed
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct PendingFrame {
    handle: FrameHandle,
    sample: PointerSample,
}

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub samples_received: u64,
    pub samples_coalesced: u64,
    pub frames_applied: u64,
    pub frames_deferred: u64,
    pub frames_skipped: u64,
}

// =============================================================================
// Engine
// =============================================================================

pub struct TiltEngine {
    profile: PerformanceProfile,
    config: TiltConfig,
    state: TiltState,
    phase: EnginePhase,
    pending: Option<PendingFrame>,
    next_handle: u64,
    last_applied: Option<Duration>,
    stats: EngineStats,
}

impl TiltEngine {
    pub fn new(profile: PerformanceProfile, config: TiltConfig) -> Self {
        Self {
            profile,
            config,
            state: TiltState::resting(config.resting),
            phase: EnginePhase::Resting,
            pending: None,
            next_handle: 0,
            last_applied: None,
            stats: EngineStats::default(),
        }
    }

    pub fn state(&self) -> TiltState {
        self.state
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn profile(&self) -> PerformanceProfile {
        self.profile
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending.map(|p| p.handle)
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == EnginePhase::Disposed
    }

    /// Swap in a reclassified profile; takes effect from the next frame
    pub fn set_profile(&mut self, profile: PerformanceProfile) {
        if !self.is_disposed() {
            self.profile = profile;
        }
    }

    pub fn pointer_enter(&mut self, sample: PointerSample, region: Option<Region>) {
        if self.is_disposed() {
            return;
        }
        self.phase = EnginePhase::Tracking;
        self.state.is_hovered = true;
        if let Some(region) = region.filter(Region::is_measurable) {
            let (x, y) = self.constrain(sample, &region);
            (self.state.glow_x, self.state.glow_y) = region.percent_of(x, y);
        }
    }

    /// Schedule an update for the next tick, replacing any pending one.
    ///
    /// A move while resting means the enter event was missed; the engine
    /// starts tracking without touching the glow.
    pub fn pointer_move(&mut self, sample: PointerSample) -> Option<FrameHandle> {
        if self.is_disposed() {
            return None;
        }
        if self.phase == EnginePhase::Resting {
            self.phase = EnginePhase::Tracking;
            self.state.is_hovered = true;
        }

        self.stats.samples_received += 1;
        if self.pending.take().is_some() {
            self.stats.samples_coalesced += 1;
        }

        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.pending = Some(PendingFrame { handle, sample });
        Some(handle)
    }

    /// Back to the resting pose. Glow position is left where it was.
    pub fn pointer_leave(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.pending = None;
        self.phase = EnginePhase::Resting;
        self.state.is_hovered = false;
        self.state.set_rotation(self.config.resting);
    }

    pub fn dispose(&mut self) {
        self.pending = None;
        self.phase = EnginePhase::Disposed;
    }

    /// Run the frame identified by `handle` at tick time `now`.
    ///
    /// `region` must be measured fresh for every tick; layout can move the
    /// card between samples.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: Duration,
        region: Option<Region>,
    ) -> FrameOutcome {
        let Some(pending) = self.pending.filter(|p| p.handle == handle) else {
            return FrameOutcome::Stale;
        };

        if let Some(last) = self.last_applied {
            if now.saturating_sub(last) < self.profile.throttle_interval {
                self.stats.frames_deferred += 1;
                return FrameOutcome::Deferred;
            }
        }

        self.pending = None;
        let Some(region) = region.filter(Region::is_measurable) else {
            self.stats.frames_skipped += 1;
            return FrameOutcome::Unmeasured;
        };

        self.apply(pending.sample, &region);
        self.last_applied = Some(now);
        self.stats.frames_applied += 1;
        FrameOutcome::Applied
    }

    fn apply(&mut self, sample: PointerSample, region: &Region) {
        let (x, y) = self.constrain(sample, region);
        let (center_x, center_y) = region.center();
        let nx = (x - center_x) / (region.width / 2.0) * self.config.damping;
        let ny = (y - center_y) / (region.height / 2.0) * self.config.damping;

        let max = self.profile.max_rotation_deg;
        let rest = self.config.resting;
        // Pointer up (negative ny) tips the top edge toward the viewer
        self.state.rotate_x = rest.x - ny * max;
        self.state.rotate_y = rest.y + nx * max;
        self.state.rotate_z = rest.z + nx * max * self.config.roll_weight;

        (self.state.glow_x, self.state.glow_y) = region.percent_of(x, y);
    }

    fn constrain(&self, sample: PointerSample, region: &Region) -> (f32, f32) {
        if self.config.clamp_to_region {
            (
                sample.x.clamp(region.left, region.left + region.width),
                sample.y.clamp(region.top, region.top + region.height),
            )
        } else {
            (sample.x, sample.y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::profile::{classify, EnvironmentSnapshot};
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    fn desktop() -> PerformanceProfile {
        classify(&EnvironmentSnapshot {
            viewport_width: Some(1440),
            touch_capable: Some(false),
            prefers_reduced_motion: Some(false),
        })
    }

    fn mobile() -> PerformanceProfile {
        classify(&EnvironmentSnapshot {
            viewport_width: Some(400),
            touch_capable: Some(true),
            prefers_reduced_motion: Some(false),
        })
    }

    fn region() -> Region {
        Region::new(0.0, 0.0, 300.0, 200.0)
    }

    fn at(x: f32, y: f32, ms: u64) -> PointerSample {
        PointerSample::new(x, y, Duration::from_millis(ms))
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn move_and_fire(engine: &mut TiltEngine, sample: PointerSample, now: Duration) -> FrameOutcome {
        let handle = engine.pointer_move(sample).unwrap();
        engine.on_frame(handle, now, Some(region()))
    }

    #[test]
    fn starts_at_resting_pose() {
        let engine = TiltEngine::new(desktop(), TiltConfig::default());
        let state = engine.state();
        assert_eq!((state.rotate_x, state.rotate_y, state.rotate_z), (15.0, -20.0, 5.0));
        assert_eq!((state.glow_x, state.glow_y), (50.0, 50.0));
        assert!(!state.is_hovered);
        assert_eq!(engine.phase(), EnginePhase::Resting);
    }

    #[test]
    fn center_pointer_keeps_resting_rotation() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        assert_eq!(move_and_fire(&mut engine, at(150.0, 100.0, 1), ms(20)), FrameOutcome::Applied);

        let state = engine.state();
        assert!((state.rotate_x - 15.0).abs() < EPS);
        assert!((state.rotate_y + 20.0).abs() < EPS);
        assert!((state.glow_x - 50.0).abs() < EPS);
        assert!((state.glow_y - 50.0).abs() < EPS);
    }

    #[test]
    fn right_edge_tilts_by_damped_limit() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        move_and_fire(&mut engine, at(300.0, 100.0, 1), ms(20));

        let state = engine.state();
        assert!((state.rotate_y - -12.0).abs() < EPS);
        assert!((state.rotate_x - 15.0).abs() < EPS);
        assert!((state.rotate_z - (5.0 + 0.8 * 10.0 * 0.3)).abs() < EPS);
        assert!((state.glow_x - 100.0).abs() < EPS);
        assert!((state.glow_y - 50.0).abs() < EPS);
    }

    #[test]
    fn pointer_above_center_tips_top_toward_viewer() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        move_and_fire(&mut engine, at(150.0, 0.0, 1), ms(20));
        assert!((engine.state().rotate_x - 23.0).abs() < EPS);
    }

    #[test]
    fn enter_sets_glow_but_not_rotation() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(75.0, 50.0, 0), Some(region()));

        let state = engine.state();
        assert!(state.is_hovered);
        assert_eq!(engine.phase(), EnginePhase::Tracking);
        assert!((state.glow_x - 25.0).abs() < EPS);
        assert!((state.glow_y - 25.0).abs() < EPS);
        assert_eq!(state.rotate_y, -20.0);
    }

    #[test]
    fn leave_resets_rotation_and_keeps_glow() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(10.0, 10.0, 0), Some(region()));
        move_and_fire(&mut engine, at(290.0, 20.0, 1), ms(20));
        let before = engine.state();
        assert_ne!(before.rotate_y, -20.0);

        engine.pointer_leave();
        let after = engine.state();
        assert_eq!((after.rotate_x, after.rotate_y, after.rotate_z), (15.0, -20.0, 5.0));
        assert_eq!((after.glow_x, after.glow_y), (before.glow_x, before.glow_y));
        assert!(!after.is_hovered);
        assert_eq!(engine.phase(), EnginePhase::Resting);
    }

    #[test]
    fn leave_cancels_pending_frame() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        let handle = engine.pointer_move(at(300.0, 0.0, 1)).unwrap();
        engine.pointer_leave();

        assert_eq!(engine.pending_frame(), None);
        assert_eq!(engine.on_frame(handle, ms(20), Some(region())), FrameOutcome::Stale);
        assert_eq!(engine.state().rotate_y, -20.0);
    }

    #[test]
    fn rapid_moves_coalesce_to_last_sample() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));

        let handles: Vec<_> = [(10.0, 10.0), (200.0, 50.0), (300.0, 100.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| engine.pointer_move(at(x, y, i as u64)).unwrap())
            .collect();

        assert_eq!(engine.pending_frame(), Some(handles[2]));
        assert_eq!(engine.on_frame(handles[0], ms(20), Some(region())), FrameOutcome::Stale);
        assert_eq!(engine.on_frame(handles[1], ms(20), Some(region())), FrameOutcome::Stale);
        assert_eq!(engine.state().rotate_y, -20.0);

        assert_eq!(engine.on_frame(handles[2], ms(20), Some(region())), FrameOutcome::Applied);
        assert!((engine.state().glow_x - 100.0).abs() < EPS);
        assert_eq!(engine.pending_frame(), None);

        let stats = engine.stats();
        assert_eq!(stats.samples_received, 3);
        assert_eq!(stats.samples_coalesced, 2);
        assert_eq!(stats.frames_applied, 1);
    }

    #[test]
    fn throttle_defers_until_interval_elapses() {
        let mut engine = TiltEngine::new(mobile(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        assert_eq!(move_and_fire(&mut engine, at(300.0, 100.0, 0), ms(1000)), FrameOutcome::Applied);

        let handle = engine.pointer_move(at(0.0, 100.0, 5)).unwrap();
        assert_eq!(engine.on_frame(handle, ms(1050), Some(region())), FrameOutcome::Deferred);
        assert_eq!(engine.pending_frame(), Some(handle));
        assert!(engine.state().rotate_y > -20.0);

        assert_eq!(engine.on_frame(handle, ms(1100), Some(region())), FrameOutcome::Applied);
        assert!((engine.state().rotate_y - (-20.0 - 0.8 * 5.0)).abs() < EPS);
    }

    #[test]
    fn unmeasurable_region_is_a_no_op() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        let before = engine.state();

        let handle = engine.pointer_move(at(300.0, 0.0, 1)).unwrap();
        assert_eq!(engine.on_frame(handle, ms(20), None), FrameOutcome::Unmeasured);
        assert_eq!(engine.state(), before);
        assert_eq!(engine.pending_frame(), None);

        let handle = engine.pointer_move(at(300.0, 0.0, 2)).unwrap();
        let collapsed = Region::new(0.0, 0.0, 0.0, 200.0);
        assert_eq!(engine.on_frame(handle, ms(40), Some(collapsed)), FrameOutcome::Unmeasured);
        assert_eq!(engine.state(), before);
        assert_eq!(engine.stats().frames_skipped, 2);
        assert_eq!(engine.stats().frames_applied, 0);
    }

    #[test]
    fn enter_without_region_keeps_glow() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(0.0, 0.0, 0), None);
        assert!(engine.state().is_hovered);
        assert_eq!((engine.state().glow_x, engine.state().glow_y), (50.0, 50.0));
    }

    #[test]
    fn move_while_resting_starts_tracking() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        assert!(engine.pointer_move(at(10.0, 10.0, 0)).is_some());
        assert_eq!(engine.phase(), EnginePhase::Tracking);
        assert!(engine.state().is_hovered);
    }

    #[test]
    fn disposed_engine_ignores_in_flight_frames() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        let handle = engine.pointer_move(at(300.0, 0.0, 1)).unwrap();
        let before = engine.state();

        engine.dispose();
        assert_eq!(engine.on_frame(handle, ms(20), Some(region())), FrameOutcome::Stale);
        assert!(engine.pointer_move(at(0.0, 0.0, 2)).is_none());
        engine.pointer_enter(at(0.0, 0.0, 3), Some(region()));
        engine.pointer_leave();
        engine.set_profile(mobile());

        assert_eq!(engine.state(), before);
        assert_eq!(engine.phase(), EnginePhase::Disposed);
        assert_eq!(engine.profile(), desktop());
    }

    #[test]
    fn unclamped_samples_can_leave_the_region() {
        let config = TiltConfig {
            clamp_to_region: false,
            ..TiltConfig::default()
        };
        let mut engine = TiltEngine::new(desktop(), config);
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        move_and_fire(&mut engine, at(450.0, 100.0, 1), ms(20));
        assert!((engine.state().glow_x - 150.0).abs() < EPS);
        assert!((engine.state().rotate_y - -4.0).abs() < EPS);
    }

    #[test]
    fn clamped_samples_stay_in_range() {
        let mut engine = TiltEngine::new(desktop(), TiltConfig::default());
        engine.pointer_enter(at(150.0, 100.0, 0), Some(region()));
        move_and_fire(&mut engine, at(-500.0, 900.0, 1), ms(20));
        let state = engine.state();
        assert_eq!((state.glow_x, state.glow_y), (0.0, 100.0));
        assert!((state.rotate_y - -28.0).abs() < EPS);
        assert!((state.rotate_x - 7.0).abs() < EPS);
    }

    proptest! {
        #[test]
        fn rotation_offset_never_exceeds_limit(
            left in -500.0f32..500.0,
            top in -500.0f32..500.0,
            width in 1.0f32..2000.0,
            height in 1.0f32..2000.0,
            fx in 0.0f32..=1.0,
            fy in 0.0f32..=1.0,
            is_mobile in any::<bool>(),
        ) {
            let profile = if is_mobile { mobile() } else { desktop() };
            let rect = Region::new(left, top, width, height);
            let mut engine = TiltEngine::new(profile, TiltConfig::default());
            engine.pointer_enter(PointerSample::new(left, top, Duration::ZERO), Some(rect));
            let sample = PointerSample::new(left + fx * width, top + fy * height, ms(1));
            let handle = engine.pointer_move(sample).unwrap();
            prop_assert_eq!(engine.on_frame(handle, ms(500), Some(rect)), FrameOutcome::Applied);

            let state = engine.state();
            let limit = profile.max_rotation_deg + 1e-2;
            prop_assert!((state.rotate_x - 15.0).abs() <= limit);
            prop_assert!((state.rotate_y + 20.0).abs() <= limit);
            prop_assert!((state.rotate_z - 5.0).abs() <= limit);
            prop_assert!((-0.1..=100.1).contains(&state.glow_x));
            prop_assert!((-0.1..=100.1).contains(&state.glow_y));
        }
    }
}
