//! Third-person follow camera.

use crate::player::Player;
use bevy::prelude::*;

/// Marks the camera that trails the player. `offset` is added to the follow
/// target in world space.
#[derive(Component)]
pub struct FollowCamera {
    pub offset: Vec3,
    /// Fraction of the remaining distance closed per frame.
    pub smoothing: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        FollowCamera {
            offset: Vec3::new(0.0, 8.0, -8.0),
            smoothing: 0.15,
        }
    }
}

/// Trail the player from behind and above. The vertical component tracks the
/// last good height instead of the raw transform, so the view holds steady
/// while the body drops into a hazard and snaps back on respawn.
#[allow(clippy::needless_pass_by_value)]
pub fn camera_follow(
    players: Query<(&Transform, &Player), Without<FollowCamera>>,
    mut cameras: Query<(&mut Transform, &FollowCamera), Without<Player>>,
) {
    let Ok((player_tf, player)) = players.get_single() else {
        return;
    };
    let focus = Vec3::new(
        player_tf.translation.x,
        player.last_good_y,
        player_tf.translation.z,
    );
    for (mut camera_tf, follow) in &mut cameras {
        let target = focus + follow.offset;
        camera_tf.translation = camera_tf.translation.lerp(target, follow.smoothing);
        camera_tf.look_at(focus, Vec3::Y);
    }
}
