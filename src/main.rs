use bevy::pbr::MaterialPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use sandglyph::blinn_phong::{
    upload_point_lights, BlinnPhongExtended, BlinnPhongMaterial, BlinnPhongMaterialHandle,
};
use sandglyph::level::loader as level_loader;
use sandglyph::level::Level;
use sandglyph::lighting::BlinnPhongLight;
use sandglyph::player::{
    camera_follow, jump_input, locomotion_input, player_fixed_tick, track_last_good_height,
    FollowCamera, Player, BODY_HALF_EXTENTS,
};
use sandglyph::session::Session;
use sandglyph::settings::loader as settings_loader;
use sandglyph::settings::Settings;
use sandglyph::stamina::{regenerate_stamina, Stamina};
use sandglyph::ui::{
    spawn_hud, textbox_input, update_action_label, update_hearts, update_stamina_bar,
    update_textbox, Textbox,
};

/// Fixed physics rate, ticks per second.
pub const PHYSICS_TICK_RATE: f64 = 50.0;

fn main() {
    let settings = settings_loader::load_settings_from_dir(settings_loader::SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(settings_loader::SETTINGS_DIR)
        .unwrap_or_else(|_| settings_loader::SettingsWatcher::stub());
    let level = level_loader::load_level_from_dir(level_loader::LEVELS_DIR);
    let level_watcher = level_loader::setup_level_watcher(level_loader::LEVELS_DIR)
        .unwrap_or_else(|_| level_loader::LevelWatcher::stub());

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Sandglyph".to_string(),
            position: WindowPosition::Centered(MonitorSelection::Primary),
            present_mode: PresentMode::AutoNoVsync,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(MaterialPlugin::<BlinnPhongExtended>::default());

    app.insert_resource(Time::<Fixed>::from_hz(PHYSICS_TICK_RATE));
    app.insert_resource(settings.clone());
    app.insert_resource(settings_watcher);
    app.insert_resource(level);
    app.insert_resource(level_watcher);
    // Heart count is sampled once per session; the regen rate is read from
    // live settings every tick.
    app.insert_resource(Stamina::new(settings.stamina.max_hearts));
    app.insert_resource(Session::default());
    app.insert_resource(Textbox::default());

    app.add_systems(Startup, (setup, spawn_hud));

    app.add_systems(
        Update,
        (
            locomotion_input,
            jump_input,
            textbox_input,
            settings_loader::check_settings_changes,
            level_loader::check_level_changes,
            upload_point_lights,
            update_hearts,
            update_stamina_bar,
            update_action_label,
            update_textbox,
        ),
    );

    app.add_systems(FixedUpdate, (player_fixed_tick, regenerate_stamina));
    app.add_systems(PostUpdate, (track_last_good_height, camera_follow).chain());

    app.run();
}

/// Spawn the scene: camera, player body, level geometry sharing one
/// Blinn-Phong material, and a few point lights feeding that material.
#[allow(clippy::needless_pass_by_value)]
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<BlinnPhongExtended>>,
    level: Res<Level>,
) {
    let material = materials.add(BlinnPhongExtended {
        base: StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 0.8,
            metallic: 0.0,
            ..default()
        },
        extension: BlinnPhongMaterial::default(),
    });
    commands.insert_resource(BlinnPhongMaterialHandle(material.clone()));

    let player_spawn = level.spawn + Vec3::Y * BODY_HALF_EXTENTS.y;
    commands.spawn((
        MaterialMeshBundle {
            mesh: meshes.add(Capsule3d::new(
                BODY_HALF_EXTENTS.x,
                2.0 * (BODY_HALF_EXTENTS.y - BODY_HALF_EXTENTS.x),
            )),
            material: material.clone(),
            transform: Transform::from_translation(player_spawn),
            ..default()
        },
        Player::new(player_spawn),
    ));

    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_translation(player_spawn + Vec3::new(0.0, 8.0, -8.0))
                .looking_at(player_spawn, Vec3::Y),
            ..default()
        },
        FollowCamera::default(),
    ));

    for collider in level.colliders() {
        let size = collider.aabb.max - collider.aabb.min;
        commands.spawn(MaterialMeshBundle {
            mesh: meshes.add(Cuboid::new(size.x, size.y, size.z)),
            material: material.clone(),
            transform: Transform::from_translation(collider.aabb.center()),
            ..default()
        });
    }

    for (offset, color) in [
        (Vec3::new(0.0, 6.0, 0.0), Vec3::new(1.0, 0.95, 0.85)),
        (Vec3::new(8.0, 4.0, 8.0), Vec3::new(0.6, 0.7, 1.0)),
        (Vec3::new(-8.0, 4.0, -8.0), Vec3::new(1.0, 0.6, 0.5)),
    ] {
        commands.spawn((
            PointLightBundle {
                point_light: PointLight {
                    intensity: 100_000.0,
                    range: 40.0,
                    color: Color::srgb(color.x, color.y, color.z),
                    shadows_enabled: false,
                    ..default()
                },
                transform: Transform::from_translation(level.spawn + offset),
                ..default()
            },
            BlinnPhongLight { color },
        ));
    }

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 80.0,
    });
}
