//! Frame extraction system
//!
//! This module handles extracting rendered frames from the GPU and
//! preparing them for transfer to the webview.

use bevy::{prelude::*, render::renderer::RenderDevice, time::Time};
use std::time::Instant;
use tracing::{debug, info};

use crate::bevy::resources::{
    BridgeRes, FrameCount, FrameRateLimiter, FrameTimings, MainWorldReceiver, PreRollFrames,
};
use crate::config::{performance::*, RENDER_HEIGHT, RENDER_WIDTH};
use crate::tauri_bridge::shared_state::lock;

/// Extract and process frame data from the render pipeline
pub fn extract_and_process_frame(
    receiver: Res<MainWorldReceiver>,
    bridge: Res<BridgeRes>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
    mut timings: ResMut<FrameTimings>,
    mut frame_limiter: ResMut<FrameRateLimiter>,
    time: Res<Time>,
) {
    // Wait for scene to be fully rendered
    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 % 10 == 0 && pre_roll.0 > 0 {
            debug!(target: "card::frames", remaining = pre_roll.0, "pre-roll");
        }
        return;
    }

    // Frame rate limiting - skip if not enough time has passed
    let now = Instant::now();
    if now.duration_since(frame_limiter.last_frame_time) < frame_limiter.min_frame_interval {
        while receiver.try_recv().is_ok() {}
        return;
    }
    frame_limiter.last_frame_time = now;

    let frame_start = Instant::now();

    // Keep only the newest frame from the render world
    let receive_start = Instant::now();
    let Some(image_data) = receiver.try_iter().last() else {
        return;
    };
    let receive_time = receive_start.elapsed().as_secs_f64() * 1000.0;

    let process_start = Instant::now();
    let Some(rgba) = remove_row_padding(&image_data, RENDER_WIDTH, RENDER_HEIGHT) else {
        return;
    };
    let process_time = process_start.elapsed().as_secs_f64() * 1000.0;
    let data_size = rgba.len();

    let Ok(mut guard) = lock(&bridge.0.frames.0, "frame buffer") else {
        return;
    };
    *guard = Some(rgba);
    drop(guard);
    count.0 += 1;

    let total_time = frame_start.elapsed().as_secs_f64() * 1000.0;
    timings.frame_times.push(total_time);

    // Keep only last N samples for averaging
    if timings.frame_times.len() > FRAME_TIMING_SAMPLES {
        timings.frame_times.remove(0);
    }
    let avg_time = timings.frame_times.iter().sum::<f64>() / timings.frame_times.len() as f64;

    if let Ok(mut stats) = lock(&bridge.0.perf_stats.0, "perf stats") {
        stats.gpu_transfer_ms = receive_time;
        stats.data_processing_ms = process_time;
        stats.frame_encoding_ms = total_time;
        stats.frame_count = count.0;
        stats.data_size_kb = data_size as f64 / 1024.0;
        stats.bevy_fps = if avg_time > 0.0 { 1000.0 / avg_time } else { 0.0 };
    }

    // Log detailed stats periodically
    let current_time = time.elapsed_secs_f64();
    if current_time - timings.last_print_time >= STATS_PRINT_INTERVAL {
        let max_time = timings.frame_times.iter().cloned().fold(0.0f64, f64::max);
        let min_time = timings.frame_times.iter().cloned().fold(f64::MAX, f64::min);

        info!(
            target: "card::frames",
            frame = count.0,
            receive_ms = receive_time,
            process_ms = process_time,
            total_ms = total_time,
            avg_ms = avg_time,
            min_ms = min_time,
            max_ms = max_time,
            size_kb = data_size as f64 / 1024.0,
            "frame stats"
        );
        timings.last_print_time = current_time;
    }
}

/// Remove GPU buffer row padding alignment, returning pure RGBA data
pub fn remove_row_padding(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    if data.is_empty() {
        return None;
    }

    let row_bytes = width as usize * 4;
    let aligned_row_bytes = RenderDevice::align_copy_bytes_per_row(row_bytes);
    Some(strip_padding(data, row_bytes, aligned_row_bytes, height as usize))
}

fn strip_padding(data: &[u8], row_bytes: usize, aligned_row_bytes: usize, height: usize) -> Vec<u8> {
    if row_bytes == aligned_row_bytes {
        return data.to_vec();
    }
    data.chunks(aligned_row_bytes)
        .take(height)
        .flat_map(|row| &row[..row_bytes.min(row.len())])
        .copied()
        .collect()
}
