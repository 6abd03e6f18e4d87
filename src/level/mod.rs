//! Static collision world: tagged box colliders and trigger volumes.
//!
//! The level owns everything the player can stand on, bump into, or wander
//! through. Colliders are axis-aligned boxes addressed by a stable
//! `ColliderId`, which is what the respawn logic stores instead of holding a
//! reference into the scene (the referenced box can disappear on a level
//! reload without dangling anything). `move_body` is the character-controller
//! half of the physics contract: it applies a displacement, clamps against
//! solids axis by axis, and reports every contact with an outward normal so
//! the collision classifier can sort floors from walls.

pub mod loader;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub type ColliderId = u32;

/// Gap left between the body and a surface after clamping, so the next sweep
/// does not start inside the collider it just hit.
const SKIN: f32 = 1.0e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb { min, max }
    }

    #[must_use]
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Aabb {
            min: center - half,
            max: center + half,
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn top_center(&self) -> Vec3 {
        let c = self.center();
        Vec3::new(c.x, self.max.y, c.z)
    }

    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Slab-test a ray against the box. Returns the entry distance when the
    /// ray hits within `max_distance`.
    #[must_use]
    pub fn ray_hit(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_near = 0.0_f32;
        let mut t_far = max_distance;
        for axis in 0..3 {
            let d = direction[axis];
            if d.abs() < 1.0e-8 {
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - origin[axis]) * inv;
            let mut t1 = (self.max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }
        Some(t_near)
    }
}

/// What a solid surface means to gameplay beyond blocking movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SurfaceTag {
    #[default]
    Solid,
    /// Carried surfaces never become the respawn anchor.
    MovingPlatform,
    /// Landing on one presses it.
    Switch,
}

/// Region kinds dispatched when the player's body enters them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    Hazard,
    Trap,
    TextTrigger,
    FinalTrigger,
    Door,
}

impl TriggerKind {
    /// Single-use volumes disappear after firing once.
    #[must_use]
    fn single_use(self) -> bool {
        matches!(
            self,
            TriggerKind::Trap | TriggerKind::TextTrigger | TriggerKind::FinalTrigger
        )
    }
}

#[derive(Clone, Debug)]
pub struct Collider {
    pub aabb: Aabb,
    pub tag: SurfaceTag,
}

#[derive(Clone, Debug)]
struct Trigger {
    aabb: Aabb,
    kind: TriggerKind,
    consumed: bool,
    /// Whether the body overlapped last tick; entry fires on the rising edge.
    inside: bool,
}

/// One resolved touch between the body and a solid collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub collider: ColliderId,
    /// Outward surface normal, always a unit axis vector for box colliders.
    pub normal: Vec3,
    pub tag: SurfaceTag,
}

/// Outcome of one `move_body` call.
#[derive(Clone, Debug, Default)]
pub struct MoveResult {
    pub position: Vec3,
    pub grounded: bool,
    pub contacts: Vec<Contact>,
}

#[derive(Resource, Clone, Debug, Default)]
pub struct Level {
    pub spawn: Vec3,
    colliders: Vec<Collider>,
    triggers: Vec<Trigger>,
}

impl Level {
    #[must_use]
    pub fn new(spawn: Vec3) -> Self {
        Level {
            spawn,
            colliders: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn add_collider(&mut self, aabb: Aabb, tag: SurfaceTag) -> ColliderId {
        self.colliders.push(Collider { aabb, tag });
        (self.colliders.len() - 1) as ColliderId
    }

    pub fn add_trigger(&mut self, aabb: Aabb, kind: TriggerKind) {
        self.triggers.push(Trigger {
            aabb,
            kind,
            consumed: false,
            inside: false,
        });
    }

    #[must_use]
    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id as usize)
    }

    /// All solid colliders, for spawning level geometry.
    pub fn colliders(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }

    /// Apply `displacement` to a box body centered at `center`, clamping
    /// against solid colliders one axis at a time (x, z, then y, matching the
    /// horizontal-then-vertical move order of the locomotion tick). Grounded
    /// means the vertical pass ended on an upward-facing contact.
    #[must_use]
    pub fn move_body(&self, center: Vec3, half: Vec3, displacement: Vec3) -> MoveResult {
        let mut body = Aabb::from_center(center, half);
        let mut contacts = Vec::new();

        for axis in [0_usize, 2, 1] {
            self.sweep_axis(&mut body, axis, displacement[axis], &mut contacts);
        }

        let grounded = contacts.iter().any(|c| c.normal.y > 0.5);
        MoveResult {
            position: body.center(),
            grounded,
            contacts,
        }
    }

    fn sweep_axis(&self, body: &mut Aabb, axis: usize, delta: f32, contacts: &mut Vec<Contact>) {
        if delta == 0.0 {
            return;
        }
        body.min[axis] += delta;
        body.max[axis] += delta;

        for (i, collider) in self.colliders.iter().enumerate() {
            if !body.overlaps(&collider.aabb) {
                continue;
            }
            let size = body.max[axis] - body.min[axis];
            let mut normal = Vec3::ZERO;
            if delta > 0.0 {
                body.max[axis] = collider.aabb.min[axis] - SKIN;
                body.min[axis] = body.max[axis] - size;
                normal[axis] = -1.0;
            } else {
                body.min[axis] = collider.aabb.max[axis] + SKIN;
                body.max[axis] = body.min[axis] + size;
                normal[axis] = 1.0;
            }
            contacts.push(Contact {
                collider: i as ColliderId,
                normal,
                tag: collider.tag,
            });
        }
    }

    /// Cast a ray against the solid colliders and return the nearest hit
    /// point. Drives click-to-move destination resolution.
    #[must_use]
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let mut nearest: Option<f32> = None;
        for collider in &self.colliders {
            if let Some(t) = collider.aabb.ray_hit(origin, direction, max_distance) {
                if nearest.is_none_or(|n| t < n) {
                    nearest = Some(t);
                }
            }
        }
        nearest.map(|t| origin + direction * t)
    }

    /// Report the trigger volumes the body entered this tick. Entry is
    /// edge-triggered: a volume fires when the body transitions from outside
    /// to overlapping, then not again until it leaves. Single-use kinds are
    /// consumed on first fire.
    pub fn triggers_entered(&mut self, body: &Aabb) -> Vec<TriggerKind> {
        let mut entered = Vec::new();
        for trigger in &mut self.triggers {
            if trigger.consumed {
                continue;
            }
            let overlapping = body.overlaps(&trigger.aabb);
            if overlapping && !trigger.inside {
                entered.push(trigger.kind);
                if trigger.kind.single_use() {
                    trigger.consumed = true;
                }
            }
            trigger.inside = overlapping;
        }
        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_level() -> Level {
        let mut level = Level::new(Vec3::new(0.0, 1.0, 0.0));
        // floor slab spanning 20x20 under the origin
        level.add_collider(
            Aabb::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0)),
            SurfaceTag::Solid,
        );
        level
    }

    const HALF: Vec3 = Vec3::new(0.35, 0.9, 0.35);

    #[test]
    fn falling_body_lands_on_floor() {
        let level = flat_level();
        let result = level.move_body(Vec3::new(0.0, 2.0, 0.0), HALF, Vec3::new(0.0, -3.0, 0.0));
        assert!(result.grounded);
        assert_eq!(result.contacts.len(), 1);
        assert_eq!(result.contacts[0].normal, Vec3::Y);
        // resting on the slab top: feet at y=0 (plus skin)
        assert!((result.position.y - HALF.y).abs() < 0.01);
    }

    #[test]
    fn wall_contact_reports_lateral_normal() {
        let mut level = flat_level();
        level.add_collider(
            Aabb::new(Vec3::new(2.0, 0.0, -10.0), Vec3::new(3.0, 5.0, 10.0)),
            SurfaceTag::Solid,
        );
        let result = level.move_body(Vec3::new(1.0, 0.9, 0.0), HALF, Vec3::new(2.0, 0.0, 0.0));
        let wall = result
            .contacts
            .iter()
            .find(|c| c.normal.y.abs() < 0.5)
            .expect("expected a wall contact");
        assert_eq!(wall.normal, Vec3::NEG_X);
        // clamped against the wall face
        assert!(result.position.x < 2.0 - HALF.x + 0.01);
    }

    #[test]
    fn raycast_finds_floor_point() {
        let level = flat_level();
        let hit = level
            .raycast(Vec3::new(3.0, 5.0, 3.0), Vec3::NEG_Y, 20.0)
            .expect("ray straight down should hit the floor");
        assert!((hit.y - 0.0).abs() < 1.0e-4);
        assert!((hit.x - 3.0).abs() < 1.0e-4);
    }

    #[test]
    fn raycast_misses_outside_range() {
        let level = flat_level();
        assert!(level.raycast(Vec3::new(0.0, 50.0, 0.0), Vec3::NEG_Y, 10.0).is_none());
    }

    #[test]
    fn trigger_entry_is_edge_triggered() {
        let mut level = flat_level();
        level.add_trigger(
            Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0)),
            TriggerKind::Hazard,
        );
        let inside = Aabb::from_center(Vec3::new(0.0, 1.0, 0.0), HALF);
        let outside = Aabb::from_center(Vec3::new(5.0, 1.0, 0.0), HALF);

        assert_eq!(level.triggers_entered(&inside), vec![TriggerKind::Hazard]);
        // still overlapping: no re-fire
        assert!(level.triggers_entered(&inside).is_empty());
        assert!(level.triggers_entered(&outside).is_empty());
        // left and came back: fires again (hazards are not single-use)
        assert_eq!(level.triggers_entered(&inside), vec![TriggerKind::Hazard]);
    }

    #[test]
    fn single_use_triggers_consume_on_first_fire() {
        let mut level = flat_level();
        level.add_trigger(
            Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0)),
            TriggerKind::Trap,
        );
        let inside = Aabb::from_center(Vec3::new(0.0, 1.0, 0.0), HALF);
        let outside = Aabb::from_center(Vec3::new(5.0, 1.0, 0.0), HALF);

        assert_eq!(level.triggers_entered(&inside), vec![TriggerKind::Trap]);
        let _ = level.triggers_entered(&outside);
        assert!(level.triggers_entered(&inside).is_empty());
    }
}
