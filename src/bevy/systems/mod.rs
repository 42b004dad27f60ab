//! Bevy systems
//!
//! This module contains all the systems that operate on the card scene's
//! entities and resources in the Bevy ECS.

pub mod effects;
pub mod frame_extraction;
pub mod scene;
pub mod tilt;

pub use effects::{
    apply_scroll, apply_theme_updates, publish_card_snapshot, reclassify_environment,
    sync_electric_border,
};
pub use frame_extraction::extract_and_process_frame;
pub use scene::setup_scene;
pub use tilt::{
    apply_tilt, dispose_removed_cards, fire_pending_frame, measure_card_region,
    process_pointer_events, update_glow,
};
