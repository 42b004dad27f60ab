//! Business Card: a tilt-reactive 3D digital business card
//!
//! A headless Bevy scene renders the card into an offscreen texture; a Tauri
//! webview displays the frames and forwards pointer, environment, scroll and
//! theme signals back to the card.
//!
//! Architecture:
//! - Bevy runs in a background thread with NO window (true headless mode)
//! - Each runner tick fires the tilt engine's single pending frame update
//! - GPU texture -> Buffer -> CPU channel -> webview (`frame://` protocol)
//! - The card state is also published as CSS-ready parameters
//!
//! # Module Structure
//!
//! - `card`: Engine-independent interaction core
//!   - `profile`: Device capability classification
//!   - `tilt`: Pointer tilt & glow engine
//!   - `gating`: Effect gating
//!   - `theme`, `scroll`, `render`: Themes, page transform, CSS parameters
//! - `config`: Configuration constants and runtime settings
//! - `error`: Error types
//! - `tauri_bridge`: Bridge layer between the webview and Bevy
//!   - `shared_state`: Thread-safe data structures
//!   - `encoding`: Frame encoding
//!   - `commands`: Tauri command handlers (`desktop` feature)
//!   - `protocol`: Custom protocol handlers (`desktop` feature)
//! - `bevy`: Bevy engine integration
//!   - `components`, `resources`, `plugins`, `systems`, `app`

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Module declarations
mod bevy;
pub mod card;
pub mod config;
pub mod error;
pub mod tauri_bridge;

use config::CardConfig;
use tauri_bridge::BridgeState;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by an embedding host
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config() -> CardConfig {
    CardConfig::load().unwrap_or_else(|err| {
        tracing::warn!(target: "card::config", error = %err, "falling back to default config");
        CardConfig::default()
    })
}

/// Main entry point for the desktop application
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::{thread, time::Duration};

    init_tracing();
    tracing::info!(target: "card::app", "starting");

    let config = load_config();
    let bridge = BridgeState::new(config.theme.initial);

    // Start Bevy in background thread
    bevy::start_bevy(bridge.clone(), config);

    // Wait for Bevy to initialize
    thread::sleep(Duration::from_millis(1000));

    let protocol_bridge = bridge.clone();

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(bridge)
        // Register custom protocol "frame://" for direct binary transfer
        // This bypasses Tauri IPC JSON serialization completely!
        .register_asynchronous_uri_scheme_protocol("frame", move |_ctx, request, responder| {
            let bridge = protocol_bridge.clone();

            // Handle the request in a separate thread to avoid blocking
            std::thread::spawn(move || {
                // For Tauri v2, URL format is: http://frame.localhost/path
                let response =
                    tauri_bridge::protocol::handle_frame_protocol(request.uri().path(), &bridge);
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::get_frame,
            tauri_bridge::commands::get_render_size,
            tauri_bridge::commands::get_performance_stats,
            tauri_bridge::commands::send_pointer_event,
            tauri_bridge::commands::report_environment,
            tauri_bridge::commands::report_scroll,
            tauri_bridge::commands::set_theme,
            tauri_bridge::commands::get_card_state,
        ])
        .run(tauri::generate_context!());

    if let Err(err) = result {
        tracing::error!(target: "card::app", error = %err, "tauri exited with an error");
    }
}

/// Main entry point without the webview: runs the card scene in the foreground
#[cfg(not(feature = "desktop"))]
pub fn run() {
    init_tracing();
    tracing::info!(target: "card::app", "starting headless");

    let config = load_config();
    let bridge = BridgeState::new(config.theme.initial);
    bevy::create_app(bridge, &config).run();
}
