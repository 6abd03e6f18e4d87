//! Contact classification and response.
//!
//! Every contact from the body sweep is sorted into floor/ceiling or wall by
//! its normal, then applied to player state: vertical contacts kill vertical
//! speed and maintain the respawn anchor, wall contacts arm the wall jump and
//! abort an active roll.

use crate::level::{Contact, SurfaceTag};
use crate::player::{movement, MotionMode, Player, VERTICAL_NORMAL_MIN};
use crate::session::Session;
use bevy::prelude::*;

/// Broad class of a contact, by normal direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactClass {
    Floor,
    Ceiling,
    Wall,
}

/// Sort a contact normal into floor, ceiling or wall.
#[must_use]
pub fn classify(normal: Vec3) -> ContactClass {
    if normal.y >= VERTICAL_NORMAL_MIN {
        ContactClass::Floor
    } else if normal.y <= -VERTICAL_NORMAL_MIN {
        ContactClass::Ceiling
    } else {
        ContactClass::Wall
    }
}

/// Apply one classified contact to the player.
///
/// Floors and ceilings both zero vertical speed (the ceiling case covers
/// jumping into the underside of a platform). A floor additionally becomes
/// the respawn anchor unless the player is mid-death or the surface is a
/// moving platform; switches are pressed on any vertical contact. Walls
/// record the normal for a later wall jump and force an active roll to stop
/// dead, clearing any residual movement intent.
pub fn apply_contact(
    player: &mut Player,
    contact: &Contact,
    session: &mut Session,
    position: Vec3,
) {
    match classify(contact.normal) {
        class @ (ContactClass::Floor | ContactClass::Ceiling) => {
            player.vertical_speed = 0.0;
            if class == ContactClass::Floor
                && !player.dying()
                && contact.tag != SurfaceTag::MovingPlatform
            {
                player.last_ground = Some(contact.collider);
            }
            if contact.tag == SurfaceTag::Switch {
                session.pressed_switches.push(contact.collider);
            }
        }
        ContactClass::Wall => {
            player.touched_wall = true;
            player.wall_normal = contact.normal;
            if player.mode == MotionMode::Rolling {
                movement::stop_roll(player, position);
                player.mode = MotionMode::Idle;
                player.seek_pending = false;
                player.destination = position;
            }
        }
    }
}
