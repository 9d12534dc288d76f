//! Heist math. Pure functions, no mutation.

use crate::{Character, Sector};

/// Percent chance a steal succeeds. Not clamped: the sector alert can push it
/// below zero, which simply never passes the roll.
pub fn steal_success_chance(character: &Character, sector: &Sector) -> f64 {
    f64::from(character.success_rate) * (f64::from(character.condition) / 100.0)
        - sector.alert_level
}

/// Cash taken by a successful steal at the sector's current alert.
pub fn steal_loot(sector: &Sector) -> i64 {
    (sector.base_loot as f64 * (1.0 - sector.alert_level / 200.0)).floor() as i64
}

/// Percent chance of arrest after a failed steal, given the sector alert
/// after the failure penalty has been applied.
pub fn arrest_chance(alert_level: f64) -> f64 {
    alert_level / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_constants, make_character, make_sector};

    #[test]
    fn chance_scales_with_condition() {
        let constants = base_constants();
        let mut thief = make_character("t1", "Vera", &constants, 0);
        thief.success_rate = 80;
        thief.condition = 50;
        let sector = make_sector(0, 10.0, 2_000);
        assert!((steal_success_chance(&thief, &sector) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn chance_can_go_negative() {
        let constants = base_constants();
        let thief = make_character("t1", "Vera", &constants, 0);
        let sector = make_sector(0, 90.0, 2_000);
        assert!(steal_success_chance(&thief, &sector) < 0.0);
    }

    #[test]
    fn loot_is_floored_and_discounted_by_alert() {
        assert_eq!(steal_loot(&make_sector(0, 30.0, 2_000)), 1_700);
        assert_eq!(steal_loot(&make_sector(0, 0.0, 1_337)), 1_337);
        // 1999 * (1 - 7/200) = 1929.035
        assert_eq!(steal_loot(&make_sector(0, 7.0, 1_999)), 1_929);
    }

    #[test]
    fn arrest_chance_is_half_the_alert() {
        assert!((arrest_chance(95.0) - 47.5).abs() < 1e-9);
    }
}
