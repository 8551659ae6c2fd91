use luxdash_api::{clamp_brightness, GroupLevels};

/// Linear compensation model fitted for the classroom.
///
/// For a target illuminance `Y` the mean lamp level is
/// `base = base_m * Y + base_b` and the wall/window spread is
/// `delta = delta_m * Y + delta_b`. Window lamps get `base - delta / 2`,
/// both wall groups get `base + delta / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensationCurve {
    pub base_m: f64,
    pub base_b: f64,
    pub delta_m: f64,
    pub delta_b: f64,
}

impl Default for CompensationCurve {
    fn default() -> Self {
        Self {
            base_m: 1.285714,
            base_b: 1.42857,
            delta_m: 0.285714,
            delta_b: 11.42857,
        }
    }
}

impl CompensationCurve {
    /// Unclamped `(window, wall)` levels in percent.
    pub fn raw_levels(&self, target: f64) -> (f64, f64) {
        if !target.is_finite() || target <= 0.0 {
            return (0.0, 0.0);
        }

        let base = self.base_m * target + self.base_b;
        let delta = self.delta_m * target + self.delta_b;

        (base - delta / 2.0, base + delta / 2.0)
    }

    /// Rounded levels clamped to `0..=100` for each group.
    pub fn levels(&self, target: f64) -> GroupLevels<u8> {
        let (window, wall) = self.raw_levels(target);
        let wall = clamp_brightness(wall);

        GroupLevels::new(wall, wall, clamp_brightness(window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_target_turns_everything_off() {
        let curve = CompensationCurve::default();

        assert_eq!(curve.levels(0.0), GroupLevels::uniform(0));
        assert_eq!(curve.levels(-5.0), GroupLevels::uniform(0));
        assert_eq!(curve.levels(f64::NAN), GroupLevels::uniform(0));
    }

    #[test]
    fn test_window_is_dimmer_than_wall() {
        let curve = CompensationCurve::default();

        assert_eq!(curve.levels(10.0), GroupLevels::new(21, 21, 7));
        assert_eq!(curve.levels(50.0), GroupLevels::new(79, 79, 53));
    }

    #[test]
    fn test_levels_saturate() {
        let curve = CompensationCurve::default();

        assert_eq!(curve.levels(1500.0), GroupLevels::uniform(100));
    }
}
