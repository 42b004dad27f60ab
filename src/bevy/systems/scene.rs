//! Scene setup system
//!
//! This module handles the initial setup of the card scene: offscreen camera,
//! card slab, glow light, background glow plate, electric border and lights.

use bevy::{
    asset::Assets,
    camera::RenderTarget,
    core_pipeline::tonemapping::Tonemapping,
    image::Image,
    math::{primitives::Cuboid, Vec3},
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
    render::{
        render_resource::{Extent3d, TextureFormat, TextureUsages},
        renderer::RenderDevice,
    },
};
use tracing::info;

use crate::bevy::components::{
    BackgroundGlow, BusinessCard, ElectricBorder, GlowLight, OffscreenCamera,
};
use crate::bevy::plugins::image_copy::ImageCopier;
use crate::bevy::resources::{
    ActiveTheme, CardMaterials, EffectGatesRes, TiltEngineRes,
};
use crate::bevy::systems::tilt::tilt_rotation;
use crate::card::theme::{Rgb, ThemeTokens};
use crate::config::card::*;
use crate::config::{RENDER_HEIGHT, RENDER_WIDTH};

pub fn srgb(rgb: Rgb) -> Color {
    Color::srgb_u8(rgb.0, rgb.1, rgb.2)
}

pub fn card_base_color(tokens: &ThemeTokens, opacity: f32) -> Color {
    srgb(tokens.card).with_alpha(opacity)
}

pub fn border_emissive(tokens: &ThemeTokens) -> LinearRgba {
    srgb(tokens.border).to_linear() * 6.0
}

pub fn background_glow_emissive(tokens: &ThemeTokens) -> LinearRgba {
    srgb(tokens.glow).to_linear() * 0.8
}

/// Setup the card scene with camera, card, glow layers, and lights
#[allow(clippy::too_many_arguments)]
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    theme: Res<ActiveTheme>,
    gates: Res<EffectGatesRes>,
    engine: Res<TiltEngineRes>,
) {
    info!(target: "card::scene", theme = %theme.0, "setting up scene");
    let tokens = theme.0.tokens();

    let size = Extent3d {
        width: RENDER_WIDTH,
        height: RENDER_HEIGHT,
        depth_or_array_layers: 1,
    };

    // Create render target texture
    let mut render_target_image =
        Image::new_target_texture(size.width, size.height, TextureFormat::bevy_default());
    render_target_image.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    let render_target_image_handle = images.add(render_target_image);

    // Spawn image copier for GPU-to-CPU transfer
    commands.spawn(ImageCopier::new(
        render_target_image_handle.clone(),
        size,
        &render_device,
    ));

    commands.spawn((
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(render_target_image_handle.into()),
            clear_color: ClearColorConfig::Custom(srgb(tokens.background)),
            ..default()
        },
        Tonemapping::None,
        Transform::from_xyz(0.0, 0.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        OffscreenCamera,
    ));

    let card_material = materials.add(StandardMaterial {
        base_color: card_base_color(tokens, 1.0),
        metallic: 0.3,
        perceptual_roughness: 0.35,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let border_material = materials.add(StandardMaterial {
        base_color: srgb(tokens.border),
        emissive: border_emissive(tokens),
        unlit: true,
        ..default()
    });
    let background_glow_material = materials.add(StandardMaterial {
        base_color: srgb(tokens.glow).with_alpha(0.25),
        emissive: background_glow_emissive(tokens),
        alpha_mode: AlphaMode::Add,
        unlit: true,
        ..default()
    });

    let state = engine.0.state();
    let card = commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::new(WIDTH, HEIGHT, DEPTH))),
            MeshMaterial3d(card_material.clone()),
            Transform::from_rotation(tilt_rotation(&state)),
            BusinessCard {
                base_translation: Vec3::ZERO,
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                PointLight {
                    intensity: GLOW_INTENSITY,
                    color: srgb(tokens.glow),
                    range: 3.0,
                    ..default()
                },
                Transform::from_translation(glow_local_position(state.glow_x, state.glow_y)),
                Visibility::Hidden,
                GlowLight,
            ));
            parent.spawn((
                Mesh3d(meshes.add(Cuboid::new(
                    WIDTH * BACKGROUND_GLOW_SCALE,
                    HEIGHT * BACKGROUND_GLOW_SCALE,
                    0.001,
                ))),
                MeshMaterial3d(background_glow_material.clone()),
                Transform::from_xyz(0.0, 0.0, -DEPTH * 4.0),
                Visibility::Hidden,
                BackgroundGlow,
            ));
        })
        .id();

    if gates.0.electric_border {
        spawn_electric_border(&mut commands, card, &mut meshes, &border_material);
    }

    commands.insert_resource(CardMaterials {
        card: card_material,
        border: border_material,
        background_glow: background_glow_material,
    });

    // Key light
    commands.spawn((
        PointLight {
            intensity: 1_500_000.0,
            shadows_enabled: true,
            color: Color::srgb(1.0, 0.96, 0.9),
            ..default()
        },
        Transform::from_xyz(3.0, 4.0, 6.0),
    ));

    // Fill light
    commands.spawn((
        DirectionalLight {
            illuminance: 2500.0,
            ..default()
        },
        Transform::from_xyz(-2.0, 1.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!(target: "card::scene", "scene setup complete");
}

/// Four emissive strips framing the card face
pub fn spawn_electric_border(
    commands: &mut Commands,
    card: Entity,
    meshes: &mut Assets<Mesh>,
    material: &Handle<StandardMaterial>,
) {
    let t = BORDER_THICKNESS;
    let horizontal = meshes.add(Cuboid::new(WIDTH + t, t, DEPTH + t));
    let vertical = meshes.add(Cuboid::new(t, HEIGHT + t, DEPTH + t));
    let strips = [
        (horizontal.clone(), Vec3::new(0.0, HEIGHT / 2.0, 0.0)),
        (horizontal, Vec3::new(0.0, -HEIGHT / 2.0, 0.0)),
        (vertical.clone(), Vec3::new(WIDTH / 2.0, 0.0, 0.0)),
        (vertical, Vec3::new(-WIDTH / 2.0, 0.0, 0.0)),
    ];

    commands.entity(card).with_children(|parent| {
        for (mesh, offset) in strips {
            parent.spawn((
                Mesh3d(mesh),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(offset),
                ElectricBorder,
            ));
        }
    });
}

/// Glow percentages to a point just in front of the card face (card-local)
pub fn glow_local_position(glow_x: f32, glow_y: f32) -> Vec3 {
    Vec3::new(
        (glow_x / 100.0 - 0.5) * WIDTH,
        (0.5 - glow_y / 100.0) * HEIGHT,
        DEPTH / 2.0 + GLOW_LIGHT_OFFSET,
    )
}
