//! Death/respawn sequencing and trigger-volume dispatch.
//!
//! A hazard contact starts a fixed-length death timer rather than suspending
//! a routine: `death_step` counts it down once per fixed tick and performs
//! the respawn when it reaches zero. Re-entrant hazard hits while the timer
//! runs are ignored. The other trigger kinds are dispatched here too since
//! they share the same contact point.

use crate::level::{Level, TriggerKind};
use crate::player::{MotionMode, Player, BODY_HALF_EXTENTS};
use crate::session::Session;
use crate::settings::MovementSettings;
use crate::stamina::Stamina;
use crate::ui::{FollowUp, Textbox};
use bevy::prelude::*;

/// Clearance above the respawn anchor's top face.
pub const RESPAWN_HEIGHT_OFFSET: f32 = 0.5;

/// Start the death sequence. Ignored while one is already running: the timer
/// never restarts.
pub fn begin_death(player: &mut Player, tuning: &MovementSettings) {
    if !player.dying() {
        player.death_remaining = tuning.death_time;
    }
}

/// Count the death timer down by one tick. On expiry: damage always lands
/// (the stamina resource owns any game-over logic), and the returned respawn
/// position is the last anchored ground's top face plus clearance, falling
/// back to the level spawn when the anchor no longer resolves.
pub fn death_step(
    player: &mut Player,
    level: &Level,
    stamina: &mut Stamina,
    dt: f32,
) -> Option<Vec3> {
    player.death_remaining -= dt;
    if player.death_remaining > 0.0 {
        return None;
    }
    player.death_remaining = 0.0;
    stamina.damage();

    let anchor = player
        .last_ground
        .and_then(|id| level.collider(id))
        .map_or(level.spawn, |c| c.aabb.top_center());
    let respawn = anchor + Vec3::Y * (BODY_HALF_EXTENTS.y + RESPAWN_HEIGHT_OFFSET);

    player.mode = MotionMode::Idle;
    player.seek_pending = false;
    player.destination = respawn;
    player.vertical_speed = 0.0;
    Some(respawn)
}

/// Dispatch one trigger-volume entry.
pub fn handle_trigger(
    kind: TriggerKind,
    player: &mut Player,
    session: &mut Session,
    textbox: &mut Textbox,
    tuning: &MovementSettings,
) {
    match kind {
        TriggerKind::Hazard => begin_death(player, tuning),
        TriggerKind::Trap => {
            if session.first_trap() {
                textbox.create(
                    "You",
                    "You fell into a trap! Shake the tablet to escape.",
                );
            }
            player.trapped = true;
        }
        TriggerKind::TextTrigger => textbox.close(),
        TriggerKind::FinalTrigger => session.final_reached = true,
        TriggerKind::Door => textbox.create_blocking(
            "You",
            "Would you like to leave the tutorial?",
            Some(FollowUp::DoorChoice),
        ),
    }
}

/// Record the last height the player held while alive. Runs in `PostUpdate`
/// so it sees the frame's final transform; the camera follows this value so
/// a hazard fall does not drag the view down with the body.
pub fn track_last_good_height(mut query: Query<(&Transform, &mut Player)>) {
    if let Ok((transform, mut player)) = query.get_single_mut() {
        if !player.dying() {
            player.last_good_y = transform.translation.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Aabb, SurfaceTag};

    const DT: f32 = 0.02;

    fn level_with_floor() -> (Level, u32) {
        let mut level = Level::new(Vec3::new(0.0, 5.0, 0.0));
        let id = level.add_collider(
            Aabb::new(Vec3::new(-4.0, 0.0, -4.0), Vec3::new(4.0, 1.0, 4.0)),
            SurfaceTag::Solid,
        );
        (level, id)
    }

    #[test]
    fn hazard_while_dying_is_ignored() {
        let mut player = Player::new(Vec3::ZERO);
        let tuning = MovementSettings::default();
        begin_death(&mut player, &tuning);
        player.death_remaining = 0.5;

        begin_death(&mut player, &tuning);
        assert!((player.death_remaining - 0.5).abs() < 1e-6);
    }

    #[test]
    fn death_timer_runs_full_duration_before_respawn() {
        let (level, id) = level_with_floor();
        let mut player = Player::new(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        let tuning = MovementSettings::default();
        player.last_ground = Some(id);
        begin_death(&mut player, &tuning);

        let mut ticks = 0;
        let mut respawn = None;
        while respawn.is_none() && ticks < 10_000 {
            respawn = death_step(&mut player, &level, &mut stamina, DT);
            ticks += 1;
        }
        // 2 seconds at 50Hz
        assert_eq!(ticks, 100);
        assert!(!player.dying());

        let pos = respawn.unwrap();
        // top of the floor slab plus body half height and clearance
        assert!((pos.y - (1.0 + BODY_HALF_EXTENTS.y + RESPAWN_HEIGHT_OFFSET)).abs() < 1e-4);
        assert_eq!(pos.x, 0.0);
        assert_eq!(pos.z, 0.0);
    }

    #[test]
    fn respawn_damages_stamina_unconditionally() {
        let (level, id) = level_with_floor();
        let mut player = Player::new(Vec3::ZERO);
        let mut stamina = Stamina::new(1);
        stamina.damage(); // already at zero hearts
        player.last_ground = Some(id);
        player.death_remaining = DT;

        let respawn = death_step(&mut player, &level, &mut stamina, DT);
        assert!(respawn.is_some());
        assert_eq!(stamina.hearts(), 0);
    }

    #[test]
    fn unresolvable_anchor_falls_back_to_spawn() {
        let (level, _) = level_with_floor();
        let mut player = Player::new(Vec3::ZERO);
        let mut stamina = Stamina::new(3);
        player.last_ground = Some(999); // stale id from a reloaded level
        player.death_remaining = DT;

        let pos = death_step(&mut player, &level, &mut stamina, DT).unwrap();
        let expected = level.spawn + Vec3::Y * (BODY_HALF_EXTENTS.y + RESPAWN_HEIGHT_OFFSET);
        assert_eq!(pos, expected);
    }

    #[test]
    fn trap_shows_warning_once_and_flags_player() {
        let mut player = Player::new(Vec3::ZERO);
        let mut session = Session::default();
        let mut textbox = Textbox::default();
        let tuning = MovementSettings::default();

        handle_trigger(TriggerKind::Trap, &mut player, &mut session, &mut textbox, &tuning);
        assert!(player.trapped);
        assert!(textbox.current().is_some());

        textbox.clear();
        handle_trigger(TriggerKind::Trap, &mut player, &mut session, &mut textbox, &tuning);
        // latched: no second warning
        assert!(textbox.current().is_none());
    }

    #[test]
    fn text_trigger_closes_an_open_textbox() {
        let mut player = Player::new(Vec3::ZERO);
        let mut session = Session::default();
        let mut textbox = Textbox::default();
        let tuning = MovementSettings::default();
        textbox.create("Guide", "Welcome.");

        handle_trigger(TriggerKind::TextTrigger, &mut player, &mut session, &mut textbox, &tuning);
        assert!(textbox.current().is_none());
    }

    #[test]
    fn final_trigger_marks_the_session() {
        let mut player = Player::new(Vec3::ZERO);
        let mut session = Session::default();
        let mut textbox = Textbox::default();
        let tuning = MovementSettings::default();

        handle_trigger(TriggerKind::FinalTrigger, &mut player, &mut session, &mut textbox, &tuning);
        assert!(session.final_reached);
    }
}
