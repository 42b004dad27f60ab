//! Custom protocol handlers for efficient data transfer
//!
//! This module implements the `frame://` custom protocol for direct binary
//! transfer of render frames, bypassing Tauri's IPC JSON serialization.

use serde::Serialize;
use tauri::http::{Response as HttpResponse, StatusCode};

use crate::config::{compression::JPEG_QUALITY, RENDER_HEIGHT, RENDER_WIDTH};
use crate::error::{CardError, Result};
use super::encoding::encode_jpeg;
use super::shared_state::{lock, BridgeState};

type Response = HttpResponse<Vec<u8>>;

/// Handle requests to the custom `frame://` protocol
///
/// Supported endpoints:
/// - `frame` or `frame.jpg`: JPEG-compressed frame (~50-100KB)
/// - `frame.raw`: Raw RGBA frame (~1.8MB)
/// - `stats`: Performance statistics as JSON
/// - `card`: Card snapshot as JSON
pub fn handle_frame_protocol(uri_path: &str, bridge: &BridgeState) -> Response {
    let resource = uri_path.trim_start_matches('/');
    tracing::trace!(target: "card::protocol", resource, "request");

    let result = match resource {
        "frame" | "frame.jpg" => handle_jpeg_frame(bridge),
        "frame.raw" => handle_raw_frame(bridge),
        "stats" => lock(&bridge.perf_stats.0, "perf stats").and_then(|g| json_response(&*g)),
        "card" => lock(&bridge.snapshot.0, "card snapshot").and_then(|g| json_response(&*g)),
        _ => Ok(text_response(StatusCode::NOT_FOUND, "Not Found")),
    };

    result.unwrap_or_else(|err| match err {
        CardError::FrameNotReady => text_response(StatusCode::SERVICE_UNAVAILABLE, "Frame not ready"),
        other => {
            tracing::warn!(target: "card::protocol", resource, error = %other, "request failed");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string())
        }
    })
}

/// Handle JPEG-compressed frame request
fn handle_jpeg_frame(bridge: &BridgeState) -> Result<Response> {
    let guard = lock(&bridge.frames.0, "frame buffer")?;
    let rgba = guard.as_ref().ok_or(CardError::FrameNotReady)?;
    let jpeg = encode_jpeg(rgba, RENDER_WIDTH, RENDER_HEIGHT, JPEG_QUALITY)?;
    frame_response("image/jpeg", jpeg)
}

/// Handle raw RGBA frame request
fn handle_raw_frame(bridge: &BridgeState) -> Result<Response> {
    let guard = lock(&bridge.frames.0, "frame buffer")?;
    let rgba = guard.as_ref().ok_or(CardError::FrameNotReady)?;
    frame_response("application/octet-stream", rgba.clone())
}

fn frame_response(content_type: &str, body: Vec<u8>) -> Result<Response> {
    HttpResponse::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("X-Frame-Width", RENDER_WIDTH.to_string())
        .header("X-Frame-Height", RENDER_HEIGHT.to_string())
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Expose-Headers",
            "X-Frame-Width, X-Frame-Height",
        )
        .body(body)
        .map_err(|e| CardError::Encode(e.to_string()))
}

fn json_response<T: Serialize>(value: &T) -> Result<Response> {
    let json = serde_json::to_vec(value).map_err(|e| CardError::Encode(e.to_string()))?;
    HttpResponse::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(json)
        .map_err(|e| CardError::Encode(e.to_string()))
}

fn text_response(status: StatusCode, body: &str) -> Response {
    let mut response = HttpResponse::new(body.as_bytes().to_vec());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert("Content-Type", tauri::http::HeaderValue::from_static("text/plain"));
    response
}
