/// Proportional controller steering a pacing multiplier towards a spend target
pub struct ControllerProportional {
    tolerance_fraction: f64,      // Tolerance as a fraction of target (e.g., 0.05 = 5%)
    max_adjustment_factor: f64,   // Maximum relative change per step (e.g., 0.2 = 20%)
    proportional_gain: f64,       // Proportional gain (e.g., 0.3 = 30% of error)
    min_pacing: f64,
    max_pacing: f64,
}

impl ControllerProportional {
    /// Create a controller with default parameters, pacing kept within [0.05, 1.0]
    pub fn new() -> Self {
        Self::new_advanced(0.05, 0.2, 0.3, 0.05, 1.0)
    }

    /// Create a controller with custom parameters
    ///
    /// # Arguments
    /// * `tolerance_fraction` - Tolerance as a fraction of target
    /// * `max_adjustment_factor` - Maximum relative change per step
    /// * `proportional_gain` - Fraction of the relative error applied per step
    /// * `min_pacing` / `max_pacing` - Bounds of the pacing multiplier
    pub fn new_advanced(tolerance_fraction: f64, max_adjustment_factor: f64, proportional_gain: f64, min_pacing: f64, max_pacing: f64) -> Self {
        Self {
            tolerance_fraction,
            max_adjustment_factor,
            proportional_gain,
            min_pacing,
            max_pacing,
        }
    }

    /// Calculate pacing for the next round from the target and actual spend of the last round
    ///
    /// # Returns
    /// A tuple `(changed, next_pacing)`
    pub fn next_pacing(&self, target: f64, actual: f64, previous_pacing: f64) -> (bool, f64) {
        if target <= 0.0 {
            return (false, previous_pacing);
        }
        let tolerance = target * self.tolerance_fraction;

        let relative_change = if actual < target - tolerance {
            // Underspending - pace up
            let error_ratio = (target - actual) / target;
            (error_ratio * self.proportional_gain).min(self.max_adjustment_factor)
        } else if actual > target + tolerance {
            // Overspending - pace down
            let error_ratio = (actual - target) / target;
            -(error_ratio * self.proportional_gain).min(self.max_adjustment_factor)
        } else {
            0.0
        };

        let next_pacing = (previous_pacing * (1.0 + relative_change)).clamp(self.min_pacing, self.max_pacing);
        (next_pacing != previous_pacing, next_pacing)
    }
}

impl Default for ControllerProportional {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_tolerance_no_change() {
        let controller = ControllerProportional::new();
        assert_eq!(controller.next_pacing(100.0, 102.0, 0.5), (false, 0.5));
    }

    #[test]
    fn test_overspend_lowers_pacing() {
        let controller = ControllerProportional::new();
        let (changed, pacing) = controller.next_pacing(100.0, 200.0, 0.5);
        assert!(changed);
        // error 100%, gain 0.3 -> -20% after the cap
        assert!((pacing - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_underspend_raises_pacing_up_to_max() {
        let controller = ControllerProportional::new();
        let (_, pacing) = controller.next_pacing(100.0, 0.0, 0.9);
        assert_eq!(pacing, 1.0);
        let (changed, pacing) = controller.next_pacing(100.0, 0.0, 1.0);
        assert!(!changed);
        assert_eq!(pacing, 1.0);
    }

    #[test]
    fn test_pacing_floor_and_zero_target() {
        let controller = ControllerProportional::new();
        let (_, pacing) = controller.next_pacing(10.0, 1000.0, 0.05);
        assert_eq!(pacing, 0.05);
        assert_eq!(controller.next_pacing(0.0, 50.0, 0.7), (false, 0.7));
    }
}
