/// Easing curves for the explode/assemble transition
///
/// Easing remaps linear time progress in `[0, 1]` to a shaped progress. The
/// back curve overshoots both endpoints slightly before settling, which gives
/// the parts a sense of weight.

/// Overshoot constant of the standard back curve
const BACK_OVERSHOOT: f32 = 1.70158;
/// Scaled overshoot used by the symmetric in-out variant
const BACK_IN_OUT: f32 = BACK_OVERSHOOT * 1.525;

/// Selectable easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    InOutBack,
}

impl Easing {
    /// Evaluate the curve at `t` (clamped to `[0, 1]`).
    /// The result may leave `[0, 1]` for overshooting curves.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InOutBack => ease_in_out_back(t),
        }
    }
}

/// Symmetric back easing
pub fn ease_in_out_back(t: f32) -> f32 {
    let c = BACK_IN_OUT;
    if t < 0.5 {
        let x = 2.0 * t;
        (x * x * ((c + 1.0) * x - c)) / 2.0
    } else {
        let x = 2.0 * t - 2.0;
        (x * x * ((c + 1.0) * x + c) + 2.0) / 2.0
    }
}

/// Linear interpolation between `a` and `b`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_points() {
        assert!(ease_in_out_back(0.0).abs() < 1e-6);
        assert!((ease_in_out_back(1.0) - 1.0).abs() < 1e-6);
        assert!((ease_in_out_back(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_overshoot() {
        // Dips below zero early and rises above one late
        assert!(ease_in_out_back(0.1) < 0.0);
        assert!(ease_in_out_back(0.9) > 1.0);
    }

    #[test]
    fn test_symmetry() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let mirrored = 1.0 - ease_in_out_back(1.0 - t);
            assert!((ease_in_out_back(t) - mirrored).abs() < 1e-5);
        }
    }

    #[test]
    fn test_apply_clamps_input() {
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
        assert!((Easing::InOutBack.apply(-0.2)).abs() < 1e-6);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
        assert_eq!(lerp(-0.5, -0.35, 0.0), -0.5);
    }
}
