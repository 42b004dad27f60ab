//! Bevy application setup and execution
//!
//! This module handles the creation and configuration of the Bevy app,
//! including plugin registration and system scheduling.

use bevy::{
    app::{App, ScheduleRunnerPlugin},
    prelude::*,
    window::ExitCondition,
};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::bevy::plugins::ImageCopyPlugin;
use crate::bevy::resources::*;
use crate::bevy::systems::*;
use crate::card::{DeviceClassifier, EffectGates, ThemeId, TiltEngine};
use crate::config::CardConfig;
use crate::error::Result;
use crate::tauri_bridge::shared_state::{lock, SharedTheme};
use crate::tauri_bridge::BridgeState;

/// Create and configure the Bevy application
pub fn create_app(bridge: BridgeState, config: &CardConfig) -> App {
    let mut app = App::new();

    // Use DefaultPlugins but configure for headless operation
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            })
            .set(ImagePlugin::default_nearest()),
    );

    // Each runner tick is one display refresh for the tilt engine
    app.add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / config.render.target_fps,
    )));

    app.add_plugins(ImageCopyPlugin);

    // Whatever the webview reported before startup; unknown signals fail open
    let environment = lock(&bridge.environment.0, "environment")
        .map(|g| *g)
        .unwrap_or_default();
    let classifier = DeviceClassifier::new(environment);
    let profile = classifier.profile();

    let initial_theme = match subscribe_to_theme(&bridge.theme) {
        Ok((subscription, updates, current)) => {
            app.insert_resource(subscription);
            app.insert_resource(updates);
            current
        }
        Err(err) => {
            warn!(target: "card::app", error = %err, "theme context unavailable, using default");
            let (_, rx) = crossbeam_channel::unbounded();
            app.insert_resource(ThemeUpdates(rx));
            config.theme.initial
        }
    };

    app.add_systems(Startup, setup_scene);
    app.add_systems(
        Update,
        (
            reclassify_environment,
            sync_electric_border,
            apply_theme_updates,
            apply_scroll,
            measure_card_region,
            process_pointer_events,
            fire_pending_frame,
            apply_tilt,
            update_glow,
            publish_card_snapshot,
        )
            .chain(),
    );
    app.add_systems(PostUpdate, dispose_removed_cards);
    app.add_systems(Last, extract_and_process_frame);

    app.insert_resource(BridgeRes(bridge));
    app.insert_resource(TiltEngineRes(TiltEngine::new(profile, config.tilt_config())));
    app.insert_resource(EffectGatesRes(EffectGates::from_profile(&profile)));
    app.insert_resource(ClassifierRes(classifier));
    app.insert_resource(CardRegion::default());
    app.insert_resource(PointerHover::default());
    app.insert_resource(PageTransformRes::default());
    app.insert_resource(ActiveTheme(initial_theme));
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(config.render.pre_roll_frames));
    app.insert_resource(FrameTimings::default());
    app.insert_resource(FrameRateLimiter::new(config.render.target_fps));

    info!(
        target: "card::app",
        fps = config.render.target_fps,
        theme = %initial_theme,
        ?profile,
        "app configured (headless)"
    );
    app
}

/// Register the scene as a theme listener.
///
/// Returns the subscription guard, the notification receiver and the theme
/// active at registration time.
pub fn subscribe_to_theme(theme: &SharedTheme) -> Result<(ThemeSubscription, ThemeUpdates, ThemeId)> {
    let (theme_tx, theme_rx) = crossbeam_channel::unbounded();
    let mut ctx = lock(&theme.0, "theme")?;
    let id = ctx.subscribe(move |theme, _| {
        if theme_tx.send(theme).is_err() {
            warn!(target: "card::app", %theme, "scene no longer receiving theme updates");
        }
    });
    let subscription = ThemeSubscription {
        theme: theme.clone(),
        id,
    };
    Ok((subscription, ThemeUpdates(theme_rx), ctx.current()))
}

/// Start Bevy in a background thread
pub fn start_bevy(bridge: BridgeState, config: CardConfig) {
    thread::spawn(move || {
        info!(target: "card::app", "bevy thread started");
        let mut app = create_app(bridge, &config);
        app.run();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_updates_reach_the_scene() {
        let shared = SharedTheme::new(ThemeId::Ember);
        let (_subscription, updates, current) = subscribe_to_theme(&shared).unwrap();
        assert_eq!(current, ThemeId::Ember);

        lock(&shared.0, "theme").unwrap().set_theme(ThemeId::Forest);
        assert_eq!(updates.try_recv().unwrap(), ThemeId::Forest);
    }

    #[test]
    fn dropping_the_subscription_unregisters_the_listener() {
        let shared = SharedTheme::default();
        let (subscription, updates, _) = subscribe_to_theme(&shared).unwrap();
        let id = subscription.id;
        drop(subscription);
        drop(updates);

        let mut ctx = lock(&shared.0, "theme").unwrap();
        assert!(!ctx.unsubscribe(id));
        assert!(ctx.set_theme(ThemeId::Mono));
    }
}
