//! Bridge layer between the webview shell and Bevy
//!
//! This module handles all communication between the Tauri frontend and
//! the Bevy rendering backend, including command handlers, custom protocols,
//! frame encoding and shared state management.

pub mod encoding;
pub mod shared_state;
#[cfg(feature = "desktop")]
pub mod commands;
#[cfg(feature = "desktop")]
pub mod protocol;

// Re-export commonly used types
pub use shared_state::{
    BridgeState, CardSnapshot, PointerEvent, SharedCardSnapshot, SharedEnvironment,
    SharedFrameBuffer, SharedPerfStats, SharedPointerInput, SharedScroll, SharedTheme,
};
