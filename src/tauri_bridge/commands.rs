//! Tauri command handlers
//!
//! This module contains all the Tauri command functions that can be invoked
//! from the frontend JavaScript/TypeScript code.

use base64::{engine::general_purpose::STANDARD, Engine};
use tauri::State;

use crate::card::{EnvironmentSnapshot, ThemeId};
use crate::config::{RENDER_HEIGHT, RENDER_WIDTH};
use crate::error::CardError;
use super::shared_state::{
    lock, BridgeState, CardSnapshot, FrameResponse, PerformanceStats, PointerEvent,
};

/// Get the current rendered frame as Base64-encoded RGBA data
#[tauri::command]
pub fn get_frame(state: State<BridgeState>) -> Result<FrameResponse, String> {
    let cmd_start = std::time::Instant::now();

    let guard = lock(&state.frames.0, "frame buffer").map_err(|e| e.to_string())?;
    let rgba_data = guard
        .as_ref()
        .ok_or_else(|| CardError::FrameNotReady.to_string())?;
    let data_fetch_time = cmd_start.elapsed().as_secs_f64() * 1000.0;

    let encode_start = std::time::Instant::now();
    let base64_data = STANDARD.encode(rgba_data);
    let encode_time = encode_start.elapsed().as_secs_f64() * 1000.0;

    if let Ok(mut stats) = lock(&state.perf_stats.0, "perf stats") {
        stats.tauri_get_frame_ms = data_fetch_time;
        stats.tauri_serialize_ms = encode_time;
    }

    Ok(FrameResponse {
        data: base64_data,
        width: RENDER_WIDTH,
        height: RENDER_HEIGHT,
    })
}

/// Get the render resolution
#[tauri::command]
pub fn get_render_size() -> (u32, u32) {
    (RENDER_WIDTH, RENDER_HEIGHT)
}

/// Get performance statistics
#[tauri::command]
pub fn get_performance_stats(state: State<BridgeState>) -> Result<PerformanceStats, String> {
    let guard = lock(&state.perf_stats.0, "perf stats").map_err(|e| e.to_string())?;
    Ok(guard.clone())
}

/// Queue a pointer enter/move/leave event for the tilt engine
#[tauri::command]
pub fn send_pointer_event(state: State<BridgeState>, event: PointerEvent) {
    state.pointer.push(event);
}

/// Record the webview's viewport width, touch capability and motion preference
#[tauri::command]
pub fn report_environment(
    state: State<BridgeState>,
    environment: EnvironmentSnapshot,
) -> Result<(), String> {
    let mut guard = lock(&state.environment.0, "environment").map_err(|e| e.to_string())?;
    *guard = environment;
    Ok(())
}

/// Record the page scroll offset in CSS pixels
#[tauri::command]
pub fn report_scroll(state: State<BridgeState>, offset: f32) -> Result<(), String> {
    let mut guard = lock(&state.scroll.0, "scroll").map_err(|e| e.to_string())?;
    *guard = offset;
    Ok(())
}

/// Switch the active theme by name; returns whether it changed
#[tauri::command]
pub fn set_theme(state: State<BridgeState>, theme: String) -> Result<bool, String> {
    let theme = theme.parse::<ThemeId>().map_err(|e| format!("{e}"))?;
    let mut guard = lock(&state.theme.0, "theme").map_err(|e| e.to_string())?;
    Ok(guard.set_theme(theme))
}

/// Latest card snapshot (tilt, gates, theme, CSS parameters)
#[tauri::command]
pub fn get_card_state(state: State<BridgeState>) -> Result<CardSnapshot, String> {
    let guard = lock(&state.snapshot.0, "card snapshot").map_err(|e| e.to_string())?;
    Ok(guard.clone())
}
