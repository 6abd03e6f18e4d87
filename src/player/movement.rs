//! Locomotion state machine: destination seeking, rolling, auto-move.
//!
//! `locomotion_step` is the fixed-tick core and is pure over the player
//! state; `player_fixed_tick` wraps it together with the vertical step,
//! applies the combined displacement through the level, and dispatches the
//! resulting contacts and trigger entries.

use crate::level::{Aabb, Level};
use crate::player::{
    collision, physics, respawn, MotionMode, Player, BODY_HALF_EXTENTS,
};
use crate::session::Session;
use crate::settings::{MovementSettings, Settings};
use crate::stamina::Stamina;
use crate::ui::Textbox;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// How far the click ray is traced into the scene for a destination.
pub const CLICK_RAY_RANGE: f32 = 200.0;

/// Begin a roll: costs stamina, forces auto-movement in the current facing
/// direction for a fixed time. A no-op while already rolling (the timer is
/// never restarted) or when the stamina deduction fails.
pub fn start_roll(player: &mut Player, stamina: &mut Stamina, tuning: &MovementSettings) -> bool {
    if player.mode == MotionMode::Rolling || player.dying() {
        return false;
    }
    if !stamina.deduct(tuning.roll_stamina_cost) {
        return false;
    }
    player.mode = MotionMode::Rolling;
    player.auto_move_speed = tuning.roll_speed;
    player.roll_remaining = tuning.roll_time;
    true
}

/// End the current roll. A seek that was outstanding before the roll resumes;
/// otherwise the destination snaps to where the player stands.
pub fn stop_roll(player: &mut Player, position: Vec3) {
    player.roll_remaining = 0.0;
    if player.seek_pending {
        player.mode = MotionMode::Seeking;
    } else {
        player.mode = MotionMode::Idle;
        player.destination = position;
    }
}

/// Apply a pointer click: `hit` is the resolved world point, if the ray found
/// ground. Clicking always takes control back from a wall-jump auto-move and
/// cancels wall-jump eligibility; clicks are ignored entirely while rolling.
pub fn resolve_click(player: &mut Player, position: Vec3, hit: Option<Vec3>) {
    if player.mode == MotionMode::Rolling {
        return;
    }
    if let Some(point) = hit {
        player.destination = Vec3::new(point.x, position.y, point.z);
        player.direction = (player.destination - position).normalize_or_zero();
    }
    player.seek_pending = true;
    if player.mode == MotionMode::AutoMoving {
        player.mode = MotionMode::Seeking;
    }
    player.touched_wall = false;
}

/// One fixed tick of the locomotion state machine. Returns the horizontal
/// displacement for this tick; the caller combines it with the vertical
/// contribution into a single body move.
///
/// Rolling and auto-move displace unconditionally along the stored direction.
/// Seeking moves toward the destination at walk speed until the remaining
/// distance fits in one tick, then snaps and goes idle. While an auto mode
/// has control the seek neither moves the body nor expires.
pub fn locomotion_step(
    player: &mut Player,
    position: Vec3,
    tuning: &MovementSettings,
    dt: f32,
) -> Vec3 {
    let mut displacement = Vec3::ZERO;

    if player.mode == MotionMode::Rolling {
        player.roll_remaining -= dt;
        if player.roll_remaining <= 0.0 {
            stop_roll(player, position);
        }
    }

    if matches!(player.mode, MotionMode::Rolling | MotionMode::AutoMoving) {
        displacement += player.direction * player.auto_move_speed * dt;
    }

    // The destination is horizontal-only; pin it to the current height so
    // falling or jumping never changes the remaining seek distance.
    player.destination.y = position.y;
    if player.seek_pending {
        let to_destination = player.destination - position;
        if to_destination.length() > tuning.speed * dt {
            if !matches!(player.mode, MotionMode::Rolling | MotionMode::AutoMoving) {
                player.direction = to_destination.normalize();
                displacement += player.direction * tuning.speed * dt;
                player.mode = MotionMode::Seeking;
            }
        } else {
            player.destination = position;
            player.seek_pending = false;
            if player.mode == MotionMode::Seeking {
                player.mode = MotionMode::Idle;
            }
        }
    }

    displacement
}

/// Variable-rate input for locomotion: roll key, click-to-move, and the
/// grounded auto-move cancel.
#[allow(clippy::needless_pass_by_value)]
pub fn locomotion_input(
    settings: Res<Settings>,
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    level: Res<Level>,
    textbox: Res<Textbox>,
    mut stamina: ResMut<Stamina>,
    mut query: Query<(&Transform, &mut Player)>,
) {
    let Ok((transform, mut player)) = query.get_single_mut() else {
        return;
    };
    if textbox.showing_blocking() {
        return;
    }

    if keys.just_pressed(settings.key_for("roll", KeyCode::KeyX)) {
        start_roll(&mut player, &mut stamina, &settings.movement);
    }

    if buttons.just_pressed(MouseButton::Left) {
        let hit = windows
            .get_single()
            .ok()
            .and_then(Window::cursor_position)
            .and_then(|cursor| {
                let (camera, camera_tf) = cameras.get_single().ok()?;
                camera.viewport_to_world(camera_tf, cursor)
            })
            .and_then(|ray| level.raycast(ray.origin, *ray.direction, CLICK_RAY_RANGE));
        resolve_click(&mut player, transform.translation, hit);
    }

    // Kill non-roll auto move on the ground: a wall-jump launch ends the
    // moment the player lands.
    if player.mode == MotionMode::AutoMoving && player.grounded {
        player.mode = MotionMode::Idle;
        player.destination = transform.translation;
        player.seek_pending = false;
    }
}

#[derive(bevy::ecs::system::SystemParam)]
pub struct PlayerTickCtx<'w, 's> {
    pub time: Res<'w, Time>,
    pub settings: Res<'w, Settings>,
    pub level: ResMut<'w, Level>,
    pub stamina: ResMut<'w, Stamina>,
    pub session: ResMut<'w, Session>,
    pub textbox: ResMut<'w, Textbox>,
    pub query: Query<'w, 's, (&'static mut Transform, &'static mut Player)>,
}

/// The fixed physics tick: death countdown, locomotion + vertical motion,
/// one consolidated body move, then contact classification and trigger
/// dispatch on the result.
pub fn player_fixed_tick(mut ctx: PlayerTickCtx<'_, '_>) {
    let dt = ctx.time.delta_seconds();
    let Ok((mut transform, mut player)) = ctx.query.get_single_mut() else {
        return;
    };
    let tuning = ctx.settings.movement.clone();

    // The death sequence suspends normal control entirely; the body stays
    // where it is until the timer expires and the respawn teleport lands.
    if player.dying() {
        if let Some(respawn_pos) =
            respawn::death_step(&mut player, &ctx.level, &mut ctx.stamina, dt)
        {
            transform.translation = respawn_pos;
        }
        return;
    }

    let horizontal = locomotion_step(&mut player, transform.translation, &tuning, dt);
    let vertical = physics::vertical_step(&mut player, &tuning, dt);
    let displacement = horizontal + Vec3::Y * vertical;

    let result = ctx
        .level
        .move_body(transform.translation, BODY_HALF_EXTENTS, displacement);
    transform.translation = result.position;
    player.grounded = result.grounded;

    for contact in &result.contacts {
        collision::apply_contact(&mut player, contact, &mut ctx.session, result.position);
    }

    let body = Aabb::from_center(result.position, BODY_HALF_EXTENTS);
    for kind in ctx.level.triggers_entered(&body) {
        respawn::handle_trigger(kind, &mut player, &mut ctx.session, &mut ctx.textbox, &tuning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MovementSettings;

    const DT: f32 = 0.02;

    fn tuning() -> MovementSettings {
        MovementSettings::default()
    }

    fn player_at(pos: Vec3) -> Player {
        Player::new(pos)
    }

    #[test]
    fn roll_requires_stamina() {
        let mut player = player_at(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        stamina.deduct(61.0); // 39 left, roll costs 40

        assert!(!start_roll(&mut player, &mut stamina, &tuning()));
        assert_eq!(player.mode, MotionMode::Idle);
        assert!((stamina.amount() - 39.0).abs() < 1e-5);
    }

    #[test]
    fn roll_at_exact_cost_starts_and_empties_pool() {
        let mut player = player_at(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        stamina.deduct(60.0); // 40 left

        assert!(start_roll(&mut player, &mut stamina, &tuning()));
        assert_eq!(player.mode, MotionMode::Rolling);
        assert_eq!(stamina.amount(), 0.0);
    }

    #[test]
    fn starting_a_roll_while_rolling_is_a_no_op() {
        let mut player = player_at(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        assert!(start_roll(&mut player, &mut stamina, &tuning()));
        player.roll_remaining = 0.1;

        assert!(!start_roll(&mut player, &mut stamina, &tuning()));
        // no duplicate timer, no second deduction
        assert!((player.roll_remaining - 0.1).abs() < 1e-6);
        assert!((stamina.amount() - 60.0).abs() < 1e-4);
    }

    #[test]
    fn roll_expires_into_idle_and_snaps_destination() {
        let mut player = player_at(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        player.direction = Vec3::X;
        assert!(start_roll(&mut player, &mut stamina, &tuning()));

        let mut position = Vec3::ZERO;
        let mut ticks = 0;
        while player.mode == MotionMode::Rolling && ticks < 1000 {
            position += locomotion_step(&mut player, position, &tuning(), DT);
            ticks += 1;
        }
        assert_eq!(player.mode, MotionMode::Idle);
        assert_eq!(player.destination, position);
        // rolled roughly roll_speed * roll_time along +x
        assert!((position.x - 3.2).abs() < 0.25);
    }

    #[test]
    fn roll_resumes_interrupted_seek() {
        let mut player = player_at(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        resolve_click(&mut player, Vec3::ZERO, Some(Vec3::new(10.0, 0.0, 0.0)));
        assert!(start_roll(&mut player, &mut stamina, &tuning()));

        player.roll_remaining = DT; // expire on the next step
        let _ = locomotion_step(&mut player, Vec3::new(2.0, 0.0, 0.0), &tuning(), DT);
        assert_eq!(player.mode, MotionMode::Seeking);
        assert!(player.seek_pending);
        assert_eq!(player.destination, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn seek_snaps_when_within_one_tick() {
        let mut player = player_at(Vec3::ZERO);
        let close = Vec3::new(0.05, 0.0, 0.0);
        resolve_click(&mut player, Vec3::ZERO, Some(close));

        let displacement = locomotion_step(&mut player, Vec3::ZERO, &tuning(), DT);
        assert_eq!(displacement, Vec3::ZERO);
        assert!(!player.seek_pending);
        assert_eq!(player.mode, MotionMode::Idle);
        assert_eq!(player.destination, Vec3::ZERO);
    }

    #[test]
    fn seek_moves_toward_destination_at_walk_speed() {
        let mut player = player_at(Vec3::ZERO);
        resolve_click(&mut player, Vec3::ZERO, Some(Vec3::new(10.0, 0.0, 0.0)));

        let displacement = locomotion_step(&mut player, Vec3::ZERO, &tuning(), DT);
        assert_eq!(player.mode, MotionMode::Seeking);
        assert!((displacement.x - tuning().speed * DT).abs() < 1e-5);
        assert_eq!(displacement.y, 0.0);
        assert_eq!(displacement.z, 0.0);
    }

    #[test]
    fn auto_move_overrides_seek_without_cancelling_it() {
        let mut player = player_at(Vec3::ZERO);
        resolve_click(&mut player, Vec3::ZERO, Some(Vec3::new(10.0, 0.0, 0.0)));
        player.mode = MotionMode::AutoMoving;
        player.direction = Vec3::Z;
        player.auto_move_speed = 4.0;

        let displacement = locomotion_step(&mut player, Vec3::ZERO, &tuning(), DT);
        // only the forced move contributes
        assert!((displacement.z - 4.0 * DT).abs() < 1e-5);
        assert_eq!(displacement.x, 0.0);
        assert!(player.seek_pending);
    }

    #[test]
    fn click_while_rolling_is_ignored() {
        let mut player = player_at(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        assert!(start_roll(&mut player, &mut stamina, &tuning()));

        resolve_click(&mut player, Vec3::ZERO, Some(Vec3::new(5.0, 0.0, 5.0)));
        assert!(!player.seek_pending);
        assert_eq!(player.mode, MotionMode::Rolling);
    }

    #[test]
    fn click_takes_control_back_from_wall_jump() {
        let mut player = player_at(Vec3::ZERO);
        player.mode = MotionMode::AutoMoving;
        player.touched_wall = true;

        resolve_click(&mut player, Vec3::ZERO, Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(player.mode, MotionMode::Seeking);
        assert!(!player.touched_wall);
    }
}
