//! Bevy component definitions
//!
//! This module contains all component markers used to tag and identify
//! entities of the card scene in the Bevy ECS (Entity Component System).

use bevy::prelude::*;

/// Marker component for the offscreen rendering camera
///
/// Entities with this component are cameras that render to an offscreen
/// texture instead of a window. The card region is measured through it.
#[derive(Component)]
pub struct OffscreenCamera;

/// The card slab driven by the tilt engine
///
/// Removing this component (or despawning the entity) disposes the engine.
#[derive(Component)]
pub struct BusinessCard {
    /// Translation before scroll-driven lift is applied
    pub base_translation: Vec3,
}

/// Point light that follows the glow position over the card face
#[derive(Component)]
pub struct GlowLight;

/// Emissive border strips; only mounted when complex filters are allowed
#[derive(Component)]
pub struct ElectricBorder;

/// Soft plate behind the card; only shown when blur layers are allowed
#[derive(Component)]
pub struct BackgroundGlow;
