//! Deceleration physics for momentum scrolling.

/// One decelerating motion: a velocity budget consumed tick by tick.
///
/// Each `step` yields the angular increment for that tick (velocity /
/// weight), then bleeds the velocity by the deceleration rate. The motion is
/// exhausted once the velocity crosses zero against its original direction.
/// Scheduling is the caller's concern, so a test can drain a glide in a
/// plain loop while the engine drives it from a timer task.
#[derive(Debug, Clone)]
pub struct Glide {
    velocity: f64,
    direction: f64,
    deceleration: f64,
    weight: f64,
}

impl Glide {
    pub fn new(velocity: f64, deceleration: f64, weight: f64) -> Self {
        Self {
            velocity,
            direction: velocity.signum(),
            deceleration,
            weight,
        }
    }

    /// Angular increment for the next tick, or `None` once exhausted.
    pub fn step(&mut self) -> Option<f64> {
        if self.velocity * self.direction <= 0.0 {
            return None;
        }
        let increment = self.velocity / self.weight;
        self.velocity -= self.deceleration * self.direction;
        Some(increment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn yields_decreasing_increments_until_exhausted() {
        let mut glide = Glide::new(3.0, 1.0, 2.0);
        assert_abs_diff_eq!(glide.step().unwrap(), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(glide.step().unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(glide.step().unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(glide.step(), None);
        assert_eq!(glide.step(), None);
    }

    #[test]
    fn zero_velocity_never_starts() {
        let mut glide = Glide::new(0.0, 1.0, 2.0);
        assert_eq!(glide.step(), None);
    }

    #[test]
    fn negative_velocity_mirrors_positive() {
        let mut forward = Glide::new(2.5, 0.75, 4.0);
        let mut backward = Glide::new(-2.5, 0.75, 4.0);
        loop {
            match (forward.step(), backward.step()) {
                (Some(f), Some(b)) => assert_abs_diff_eq!(f, -b, epsilon = 1e-12),
                (None, None) => break,
                other => panic!("glides fell out of lockstep: {other:?}"),
            }
        }
    }

    #[test]
    fn total_rotation_matches_the_closed_form() {
        let (v0, d, w) = (5.3, 0.7, 12.0);
        let mut glide = Glide::new(v0, d, w);
        let mut total = 0.0;
        while let Some(increment) = glide.step() {
            total += increment;
        }

        let steps = (v0 / d).ceil() as usize;
        let analytic: f64 = (0..steps).map(|k| (v0 - k as f64 * d) / w).sum();
        assert_abs_diff_eq!(total, analytic, epsilon = 1e-9);
    }
}
