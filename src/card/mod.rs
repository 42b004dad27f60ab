//! Card interaction core
//!
//! Engine-independent logic: device classification, the pointer tilt engine,
//! effect gating, themes, scroll transform and CSS render parameters.
//!
//! - `profile`: environment snapshot to `PerformanceProfile`
//! - `tilt`: pointer tilt & glow engine with coalesced frame updates
//! - `gating`: profile to mounted layers and transition mode
//! - `theme`: color tokens and the theme context
//! - `scroll`: scroll offset to page transform
//! - `render`: CSS-ready parameters for a DOM renderer

pub mod gating;
pub mod profile;
pub mod render;
pub mod scroll;
pub mod theme;
pub mod tilt;

pub use gating::{EffectGates, TransitionMode};
pub use profile::{classify, DeviceClassifier, EnvironmentSnapshot, PerformanceProfile};
pub use render::RenderParams;
pub use scroll::PageTransform;
pub use theme::{ThemeContext, ThemeId, ThemeTokens};
pub use tilt::{
    EnginePhase, FrameHandle, FrameOutcome, PointerSample, Region, TiltConfig, TiltEngine,
    TiltState,
};
