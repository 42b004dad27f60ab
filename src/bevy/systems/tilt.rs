//! Tilt systems
//!
//! Feeds queued pointer events into the tilt engine, measures the card region,
//! fires the engine's pending frame once per tick and applies the resulting
//! rotation and glow to the scene.

use bevy::{
    math::{EulerRot, Quat, Vec3},
    prelude::*,
};
use tracing::{debug, info};

use crate::bevy::components::{BackgroundGlow, BusinessCard, GlowLight, OffscreenCamera};
use crate::bevy::resources::{
    BridgeRes, CardRegion, EffectGatesRes, PageTransformRes, PointerHover, TiltEngineRes,
};
use crate::bevy::systems::scene::glow_local_position;
use crate::card::{FrameOutcome, Region, TiltEngine, TiltState, TransitionMode};
use crate::config::card::{HEIGHT, PIXELS_PER_UNIT, WIDTH};
use crate::tauri_bridge::PointerEvent;

/// Card rotation for a tilt state.
///
/// Screen-space Z runs clockwise in CSS and counter-clockwise here, so roll
/// is negated.
pub fn tilt_rotation(state: &TiltState) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        state.rotate_x.to_radians(),
        state.rotate_y.to_radians(),
        (-state.rotate_z).to_radians(),
    )
}

/// Route one webview pointer event into the engine.
///
/// The webview reports events over the whole frame, so each sample is
/// hit-tested against the card region here: crossing into the region enters
/// the card, crossing out of it leaves, and only in-region moves are tracked.
/// `over_card` carries the hover state between events.
pub fn dispatch_pointer_event(
    engine: &mut TiltEngine,
    over_card: &mut bool,
    event: PointerEvent,
    region: Option<Region>,
) {
    let Some(sample) = event.sample() else {
        if std::mem::take(over_card) {
            engine.pointer_leave();
        }
        return;
    };

    let inside = region.is_some_and(|r| r.is_measurable() && r.contains(sample.x, sample.y));
    let is_move = matches!(event, PointerEvent::Move { .. });
    match (inside, *over_card) {
        (true, false) => {
            *over_card = true;
            engine.pointer_enter(sample, region);
            if is_move {
                engine.pointer_move(sample);
            }
        }
        (true, true) if is_move => {
            engine.pointer_move(sample);
        }
        (false, true) => {
            *over_card = false;
            engine.pointer_leave();
        }
        _ => {}
    }
}

/// Project the card's untilted face into render-target pixels
pub fn measure_card_region(
    camera_query: Query<(&Camera, &GlobalTransform), With<OffscreenCamera>>,
    card_query: Query<&GlobalTransform, With<BusinessCard>>,
    mut region: ResMut<CardRegion>,
) {
    region.0 = None;
    let (Ok((camera, camera_transform)), Ok(card_transform)) =
        (camera_query.single(), card_query.single())
    else {
        return;
    };

    let (scale, _, center) = card_transform.to_scale_rotation_translation();
    let half = Vec3::new(WIDTH * scale.x / 2.0, HEIGHT * scale.y / 2.0, 0.0);
    let corners = [
        center + Vec3::new(-half.x, half.y, 0.0),
        center + Vec3::new(half.x, half.y, 0.0),
        center + Vec3::new(-half.x, -half.y, 0.0),
        center + Vec3::new(half.x, -half.y, 0.0),
    ];

    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for corner in corners {
        let Ok(point) = camera.world_to_viewport(camera_transform, corner) else {
            return;
        };
        min = min.min(point);
        max = max.max(point);
    }

    let measured = Region::new(min.x, min.y, max.x - min.x, max.y - min.y);
    region.0 = measured.is_measurable().then_some(measured);
}

/// Drain the webview pointer queue in arrival order
pub fn process_pointer_events(
    bridge: Res<BridgeRes>,
    region: Res<CardRegion>,
    mut hover: ResMut<PointerHover>,
    mut engine: ResMut<TiltEngineRes>,
) {
    for event in bridge.0.pointer.drain() {
        dispatch_pointer_event(&mut engine.0, &mut hover.0, event, region.0);
    }
}

/// Run the engine's pending frame for this refresh tick
pub fn fire_pending_frame(
    time: Res<Time>,
    region: Res<CardRegion>,
    mut engine: ResMut<TiltEngineRes>,
) {
    let Some(handle) = engine.0.pending_frame() else {
        return;
    };
    match engine.0.on_frame(handle, time.elapsed(), region.0) {
        FrameOutcome::Unmeasured => {
            debug!(target: "card::tilt", "card region not measurable, frame skipped");
        }
        FrameOutcome::Applied | FrameOutcome::Deferred | FrameOutcome::Stale => {}
    }
}

/// Apply engine rotation (eased or snapped) and the scroll transform
pub fn apply_tilt(
    time: Res<Time>,
    engine: Res<TiltEngineRes>,
    gates: Res<EffectGatesRes>,
    page: Res<PageTransformRes>,
    mut card_query: Query<(&mut Transform, &BusinessCard)>,
) {
    let state = engine.0.state();
    let target = tilt_rotation(&state);

    for (mut transform, card) in card_query.iter_mut() {
        transform.rotation = match gates.0.transition_for(&state) {
            TransitionMode::Eased(duration) => {
                let secs = duration.as_secs_f32().max(f32::EPSILON);
                // Exponential approach, ~98% settled after `duration`
                let t = 1.0 - (-4.0 * time.delta_secs() / secs).exp();
                transform.rotation.slerp(target, t)
            }
            TransitionMode::Instant => target,
        };

        transform.translation =
            card.base_translation + Vec3::Y * (-page.0.translate_y / PIXELS_PER_UNIT);
        transform.scale = Vec3::splat(page.0.scale);
    }
}

/// Move the glow light to the glow position and show glow layers on hover
pub fn update_glow(
    engine: Res<TiltEngineRes>,
    gates: Res<EffectGatesRes>,
    mut glow_query: Query<(&mut Transform, &mut Visibility), With<GlowLight>>,
    mut background_query: Query<&mut Visibility, (With<BackgroundGlow>, Without<GlowLight>)>,
) {
    let state = engine.0.state();
    let shown = |on: bool| if on { Visibility::Inherited } else { Visibility::Hidden };

    for (mut transform, mut visibility) in glow_query.iter_mut() {
        transform.translation = glow_local_position(state.glow_x, state.glow_y);
        visibility.set_if_neq(shown(gates.0.glow_visible(&state)));
    }
    for mut visibility in background_query.iter_mut() {
        visibility.set_if_neq(shown(gates.0.background_glow_visible(&state)));
    }
}

/// Dispose the engine when its card goes away
pub fn dispose_removed_cards(
    mut removed: RemovedComponents<BusinessCard>,
    mut engine: ResMut<TiltEngineRes>,
) {
    if removed.read().count() > 0 && !engine.0.is_disposed() {
        engine.0.dispose();
        info!(target: "card::tilt", stats = ?engine.0.stats(), "card removed, engine disposed");
    }
}
