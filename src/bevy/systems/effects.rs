//! Environment, effect gating, theme and scroll systems
//!
//! Picks up webview-reported signals, reclassifies the device, mounts or
//! unmounts the gated layers, recolors on theme changes and publishes the
//! card snapshot for the webview.

use bevy::prelude::*;
use tracing::{info, warn};

use crate::bevy::components::{BusinessCard, ElectricBorder, GlowLight, OffscreenCamera};
use crate::bevy::resources::{
    ActiveTheme, BridgeRes, CardMaterials, ClassifierRes, EffectGatesRes, PageTransformRes,
    ThemeUpdates, TiltEngineRes,
};
use crate::bevy::systems::scene::{
    background_glow_emissive, border_emissive, card_base_color, spawn_electric_border, srgb,
};
use crate::card::{EffectGates, PageTransform, RenderParams};
use crate::tauri_bridge::shared_state::{lock, CardSnapshot};

/// Reclassify when the webview reports a different environment
pub fn reclassify_environment(
    bridge: Res<BridgeRes>,
    mut classifier: ResMut<ClassifierRes>,
    mut gates: ResMut<EffectGatesRes>,
    mut engine: ResMut<TiltEngineRes>,
) {
    let snapshot = match lock(&bridge.0.environment.0, "environment") {
        Ok(guard) => *guard,
        Err(err) => {
            warn!(target: "card::effects", error = %err, "environment unavailable");
            return;
        }
    };

    if snapshot == classifier.0.snapshot() {
        return;
    }
    let Some(profile) = classifier.0.update(snapshot) else {
        return;
    };

    engine.0.set_profile(profile);
    gates.set_if_neq(EffectGatesRes(EffectGates::from_profile(&profile)));
    info!(
        target: "card::effects",
        mobile_like = snapshot.is_mobile_like(),
        max_rotation_deg = profile.max_rotation_deg,
        transitions = profile.enable_transitions,
        "performance profile updated"
    );
}

/// Mount or unmount the electric border to match the gates
pub fn sync_electric_border(
    mut commands: Commands,
    gates: Res<EffectGatesRes>,
    materials: Option<Res<CardMaterials>>,
    mut meshes: ResMut<Assets<Mesh>>,
    card_query: Query<Entity, With<BusinessCard>>,
    border_query: Query<Entity, With<ElectricBorder>>,
) {
    if !gates.is_changed() {
        return;
    }
    let (Some(materials), Ok(card)) = (materials, card_query.single()) else {
        return;
    };

    let mounted = !border_query.is_empty();
    match (gates.0.electric_border, mounted) {
        (true, false) => spawn_electric_border(&mut commands, card, &mut meshes, &materials.border),
        (false, true) => {
            for strip in border_query.iter() {
                commands.entity(strip).despawn();
            }
        }
        _ => {}
    }
}

/// Apply theme notifications delivered by the theme context
pub fn apply_theme_updates(
    updates: Res<ThemeUpdates>,
    mut active: ResMut<ActiveTheme>,
    page: Res<PageTransformRes>,
    card_materials: Option<Res<CardMaterials>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut camera_query: Query<&mut Camera, With<OffscreenCamera>>,
    mut glow_query: Query<&mut PointLight, With<GlowLight>>,
) {
    let Some(theme) = updates.try_iter().last() else {
        return;
    };
    if theme == active.0 {
        return;
    }
    active.0 = theme;
    let tokens = theme.tokens();

    if let Some(handles) = card_materials {
        if let Some(card) = materials.get_mut(&handles.card) {
            card.base_color = card_base_color(tokens, page.0.opacity);
        }
        if let Some(border) = materials.get_mut(&handles.border) {
            border.base_color = srgb(tokens.border);
            border.emissive = border_emissive(tokens);
        }
        if let Some(glow) = materials.get_mut(&handles.background_glow) {
            glow.base_color = srgb(tokens.glow).with_alpha(0.25);
            glow.emissive = background_glow_emissive(tokens);
        }
    }
    for mut camera in camera_query.iter_mut() {
        camera.clear_color = ClearColorConfig::Custom(srgb(tokens.background));
    }
    for mut light in glow_query.iter_mut() {
        light.color = srgb(tokens.glow);
    }
    info!(target: "card::effects", %theme, "scene recolored");
}

/// Pick up the latest scroll offset and fade the card accordingly
pub fn apply_scroll(
    bridge: Res<BridgeRes>,
    active: Res<ActiveTheme>,
    mut page: ResMut<PageTransformRes>,
    card_materials: Option<Res<CardMaterials>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Ok(offset) = lock(&bridge.0.scroll.0, "scroll").map(|g| *g) else {
        return;
    };
    let transform = PageTransform::from_scroll(offset);
    if transform == page.0 {
        return;
    }
    page.0 = transform;

    if let Some(handles) = card_materials {
        if let Some(card) = materials.get_mut(&handles.card) {
            card.base_color = card_base_color(active.0.tokens(), transform.opacity);
        }
    }
}

/// Publish the current card state and engine counters to the webview
pub fn publish_card_snapshot(
    bridge: Res<BridgeRes>,
    engine: Res<TiltEngineRes>,
    gates: Res<EffectGatesRes>,
    active: Res<ActiveTheme>,
    page: Res<PageTransformRes>,
) {
    let tilt = engine.0.state();
    let snapshot = CardSnapshot {
        tilt,
        phase: engine.0.phase(),
        profile: engine.0.profile(),
        gates: gates.0,
        theme: active.0,
        page: page.0,
        css: RenderParams::from_state(&tilt, &gates.0, active.0.tokens()),
    };

    if let Ok(mut guard) = lock(&bridge.0.snapshot.0, "card snapshot") {
        *guard = snapshot;
    }
    if let Ok(mut stats) = lock(&bridge.0.perf_stats.0, "perf stats") {
        stats.engine = engine.0.stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{
        DeviceClassifier, EnvironmentSnapshot, PerformanceProfile, TiltConfig, TiltEngine,
    };
    use crate::tauri_bridge::BridgeState;

    fn gating_app(bridge: &BridgeState) -> App {
        let profile = PerformanceProfile::default();
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>();
        app.insert_resource(BridgeRes(bridge.clone()));
        app.insert_resource(ClassifierRes(DeviceClassifier::default()));
        app.insert_resource(EffectGatesRes(EffectGates::from_profile(&profile)));
        app.insert_resource(TiltEngineRes(TiltEngine::new(profile, TiltConfig::default())));
        app.insert_resource(CardMaterials {
            card: Handle::default(),
            border: Handle::default(),
            background_glow: Handle::default(),
        });
        app.world_mut().spawn((
            Transform::default(),
            BusinessCard {
                base_translation: Vec3::ZERO,
            },
        ));
        app.add_systems(Update, (reclassify_environment, sync_electric_border).chain());
        app
    }

    fn border_strips(app: &mut App) -> usize {
        let mut strips = app.world_mut().query_filtered::<Entity, With<ElectricBorder>>();
        strips.iter(app.world()).count()
    }

    fn report(bridge: &BridgeState, environment: EnvironmentSnapshot) {
        *lock(&bridge.environment.0, "environment").unwrap() = environment;
    }

    #[test]
    fn border_follows_reclassification() {
        let bridge = BridgeState::default();
        let mut app = gating_app(&bridge);

        app.update();
        assert_eq!(border_strips(&mut app), 4);

        report(
            &bridge,
            EnvironmentSnapshot {
                viewport_width: Some(390),
                touch_capable: Some(true),
                prefers_reduced_motion: None,
            },
        );
        app.update();
        assert_eq!(border_strips(&mut app), 0);
        assert!(!app.world().resource::<EffectGatesRes>().0.electric_border);
        assert_eq!(app.world().resource::<TiltEngineRes>().0.profile().max_rotation_deg, 5.0);

        report(
            &bridge,
            EnvironmentSnapshot {
                viewport_width: Some(1440),
                touch_capable: Some(false),
                prefers_reduced_motion: None,
            },
        );
        app.update();
        assert_eq!(border_strips(&mut app), 4);
    }

    #[test]
    fn unchanged_environment_keeps_border_mounted_once() {
        let bridge = BridgeState::default();
        let mut app = gating_app(&bridge);

        app.update();
        app.update();
        app.update();
        assert_eq!(border_strips(&mut app), 4);
    }
}
