//! Vertical motion: gravity, ground jumps, wall jumps.
//!
//! Jumps are edge-triggered: the key-down sets a one-tick latch that the next
//! fixed tick consumes on its ground check. Wall jumps bypass the latch and
//! fire straight from input while airborne against a wall, because they must
//! change direction, auto-move and vertical speed as one state change.

use crate::player::{MotionMode, Player};
use crate::settings::{MovementSettings, Settings};
use crate::stamina::Stamina;
use crate::ui::Textbox;
use bevy::prelude::*;

/// Falling speed cap, units/s.
pub const TERMINAL_FALL_SPEED: f32 = 50.0;

/// One fixed tick of vertical motion. Returns this tick's vertical
/// displacement contribution for the combined body move.
///
/// Grounded resets the speed to exactly zero before anything else; a queued
/// jump then applies the upward impulse (unless a roll is in progress, which
/// swallows the jump). Gravity integrates afterwards either way.
pub fn vertical_step(player: &mut Player, tuning: &MovementSettings, dt: f32) -> f32 {
    if player.grounded {
        player.vertical_speed = 0.0;
        if player.jump_queued {
            if player.mode != MotionMode::Rolling {
                player.vertical_speed = tuning.jump_speed;
            }
            player.jump_queued = false;
        }
    }
    player.vertical_speed -= tuning.gravity * dt;
    if player.vertical_speed < -TERMINAL_FALL_SPEED {
        player.vertical_speed = -TERMINAL_FALL_SPEED;
    }
    player.vertical_speed * dt
}

/// Launch off a touched wall: spends stamina, then sets the movement
/// direction to the wall normal, forces auto-move at walk speed and applies
/// the scaled upward impulse, all together. Fails without mutation when no
/// wall is touched or the stamina deduction fails.
pub fn wall_jump(player: &mut Player, stamina: &mut Stamina, tuning: &MovementSettings) -> bool {
    if !player.touched_wall || !stamina.deduct(tuning.wall_jump_cost) {
        return false;
    }
    player.touched_wall = false;
    player.direction = player.wall_normal;
    player.mode = MotionMode::AutoMoving;
    player.auto_move_speed = tuning.speed;
    player.vertical_speed = tuning.jump_speed * tuning.wall_jump_factor;
    true
}

/// Variable-rate jump input. Also applies the continuous invalidation rule
/// for wall-jump eligibility: the wall-touch flag decays every frame the
/// player is grounded or rolling, independent of contact events.
#[allow(clippy::needless_pass_by_value)]
pub fn jump_input(
    settings: Res<Settings>,
    keys: Res<ButtonInput<KeyCode>>,
    textbox: Res<Textbox>,
    mut stamina: ResMut<Stamina>,
    mut query: Query<&mut Player>,
) {
    let Ok(mut player) = query.get_single_mut() else {
        return;
    };

    if player.mode == MotionMode::Rolling || player.grounded {
        player.touched_wall = false;
    }

    if player.trapped || player.dying() || textbox.showing_blocking() {
        return;
    }
    if keys.just_pressed(settings.key_for("jump", KeyCode::KeyZ)) {
        if player.grounded {
            player.jump_queued = true;
        } else {
            wall_jump(&mut player, &mut stamina, &settings.movement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    fn tuning() -> MovementSettings {
        MovementSettings::default()
    }

    #[test]
    fn ground_contact_zeroes_vertical_speed_same_tick() {
        let mut player = Player::new(Vec3::ZERO);
        player.vertical_speed = -20.0;
        player.grounded = true;

        let _ = vertical_step(&mut player, &tuning(), DT);
        // only this tick's gravity remains, not the old fall speed
        assert!((player.vertical_speed + tuning().gravity * DT).abs() < 1e-5);
    }

    #[test]
    fn queued_jump_consumed_once_on_ground_check() {
        let mut player = Player::new(Vec3::ZERO);
        player.grounded = true;
        player.jump_queued = true;

        let displacement = vertical_step(&mut player, &tuning(), DT);
        assert!(!player.jump_queued);
        assert!(displacement > 0.0);

        // the latch is gone; staying grounded does not jump again
        let displacement = vertical_step(&mut player, &tuning(), DT);
        assert!(displacement < 0.0);
    }

    #[test]
    fn rolling_swallows_the_queued_jump() {
        let mut player = Player::new(Vec3::ZERO);
        player.grounded = true;
        player.jump_queued = true;
        player.mode = MotionMode::Rolling;

        let displacement = vertical_step(&mut player, &tuning(), DT);
        assert!(!player.jump_queued);
        assert!(displacement <= 0.0);
    }

    #[test]
    fn gravity_integrates_while_airborne() {
        let mut player = Player::new(Vec3::ZERO);
        player.grounded = false;

        let mut fallen = 0.0;
        for _ in 0..50 {
            fallen += vertical_step(&mut player, &tuning(), DT);
        }
        assert!(fallen < 0.0);
        assert!((player.vertical_speed + tuning().gravity * DT * 50.0).abs() < 1e-3);
    }

    #[test]
    fn fall_speed_is_capped() {
        let mut player = Player::new(Vec3::ZERO);
        player.grounded = false;
        for _ in 0..1_000 {
            let _ = vertical_step(&mut player, &tuning(), DT);
        }
        assert!((player.vertical_speed + TERMINAL_FALL_SPEED).abs() < 1e-3);
    }

    #[test]
    fn wall_jump_needs_wall_and_stamina() {
        let mut player = Player::new(Vec3::ZERO);
        let mut stamina = Stamina::new(3);

        // no wall touched
        assert!(!wall_jump(&mut player, &mut stamina, &tuning()));
        assert_eq!(stamina.amount(), 100.0);

        // wall touched but stamina short
        player.touched_wall = true;
        player.wall_normal = Vec3::X;
        stamina.deduct(80.0); // 20 left, cost 25
        assert!(!wall_jump(&mut player, &mut stamina, &tuning()));
        assert!(player.touched_wall);
        assert!((stamina.amount() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn wall_jump_sets_all_launch_state_atomically() {
        let mut player = Player::new(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        player.touched_wall = true;
        player.wall_normal = Vec3::X;

        assert!(wall_jump(&mut player, &mut stamina, &tuning()));
        assert!(!player.touched_wall);
        assert_eq!(player.direction, Vec3::X);
        assert_eq!(player.mode, MotionMode::AutoMoving);
        assert_eq!(player.auto_move_speed, tuning().speed);
        let expected = tuning().jump_speed * tuning().wall_jump_factor;
        assert!((player.vertical_speed - expected).abs() < 1e-5);
    }
}
