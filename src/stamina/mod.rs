//! Player stamina: a bounded pool plus hearts.
//!
//! Rolling and wall jumping spend stamina through `deduct`, which refuses the
//! whole cost when the pool is short — the caller must not start the action in
//! that case. Deaths go through `damage`, which always lands.

use crate::settings::Settings;
use bevy::prelude::{Res, ResMut, Resource, Time};

pub const MAX_STAMINA: f32 = 100.0;

#[derive(Resource, Clone, Debug)]
pub struct Stamina {
    amount: f32,
    hearts: u32,
    pub max_hearts: u32,
    /// Set while a stamina potion is in effect; the HUD draws a glow.
    pub potion_active: bool,
}

impl Default for Stamina {
    fn default() -> Self {
        Stamina::new(3)
    }
}

impl Stamina {
    #[must_use]
    pub fn new(max_hearts: u32) -> Self {
        Stamina {
            amount: MAX_STAMINA,
            hearts: max_hearts,
            max_hearts,
            potion_active: false,
        }
    }

    #[must_use]
    pub fn amount(&self) -> f32 {
        self.amount
    }

    #[must_use]
    pub fn hearts(&self) -> u32 {
        self.hearts
    }

    /// Spend `cost` stamina. Returns `true` and mutates only when the full
    /// cost is available; otherwise the pool is left untouched.
    pub fn deduct(&mut self, cost: f32) -> bool {
        if self.amount >= cost {
            self.amount -= cost;
            true
        } else {
            false
        }
    }

    /// Take a death's worth of damage: lose one heart (saturating at zero)
    /// and refill the pool. Unconditional; running out of hearts is handled
    /// by whoever reads `hearts()`.
    pub fn damage(&mut self) {
        self.hearts = self.hearts.saturating_sub(1);
        self.amount = MAX_STAMINA;
    }

    /// Passive regeneration for one tick at `rate` units/s, capped at the
    /// pool maximum. The rate is passed per call rather than stored, so a
    /// settings reload applies on the very next tick.
    pub fn regenerate(&mut self, rate: f32, dt: f32) {
        if rate > 0.0 {
            self.amount = (self.amount + rate * dt).min(MAX_STAMINA);
        }
    }
}

/// Fixed-tick stamina regeneration at the currently configured rate.
#[allow(clippy::needless_pass_by_value)]
pub fn regenerate_stamina(time: Res<Time>, settings: Res<Settings>, mut stamina: ResMut<Stamina>) {
    stamina.regenerate(settings.stamina.regen_per_second, time.delta_seconds());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduct_succeeds_at_exact_cost() {
        let mut stamina = Stamina::new(3);
        assert!(stamina.deduct(60.0));
        // 40 left, cost 40: boundary case must succeed and empty the pool
        assert!(stamina.deduct(40.0));
        assert_eq!(stamina.amount(), 0.0);
    }

    #[test]
    fn deduct_failure_leaves_pool_untouched() {
        let mut stamina = Stamina::new(3);
        assert!(stamina.deduct(61.0));
        assert!((stamina.amount() - 39.0).abs() < 1e-5);
        assert!(!stamina.deduct(40.0));
        assert!((stamina.amount() - 39.0).abs() < 1e-5);
    }

    #[test]
    fn damage_always_lands_and_saturates() {
        let mut stamina = Stamina::new(1);
        stamina.deduct(80.0);
        stamina.damage();
        assert_eq!(stamina.hearts(), 0);
        assert_eq!(stamina.amount(), MAX_STAMINA);
        // no hearts left: damage still succeeds without underflow
        stamina.damage();
        assert_eq!(stamina.hearts(), 0);
    }

    #[test]
    fn regeneration_caps_at_max() {
        let mut stamina = Stamina::new(3);
        stamina.deduct(5.0);
        stamina.regenerate(10.0, 0.2);
        assert!((stamina.amount() - 97.0).abs() < 1e-5);
        stamina.regenerate(10.0, 10.0);
        assert_eq!(stamina.amount(), MAX_STAMINA);
    }

    #[test]
    fn regeneration_rate_changes_apply_next_tick() {
        let mut stamina = Stamina::new(3);
        stamina.deduct(50.0);
        stamina.regenerate(10.0, 0.1);
        assert!((stamina.amount() - 51.0).abs() < 1e-5);
        // a retuned rate takes effect immediately, nothing is cached
        stamina.regenerate(40.0, 0.1);
        assert!((stamina.amount() - 55.0).abs() < 1e-5);
        stamina.regenerate(0.0, 10.0);
        assert!((stamina.amount() - 55.0).abs() < 1e-5);
    }
}
