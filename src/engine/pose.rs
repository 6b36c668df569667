//! Projection of ring state into renderable poses.
//!
//! The projector is a pure function of the ring and the layout
//! configuration; it is re-run on every ring change and has no state of
//! its own.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::engine::ring::ItemRing;

/// Renderable placement for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Offset along the carousel's rotation axis, centered on item width.
    pub lateral: f64,
    /// Offset along the depth axis; spreads with the pitch angle.
    pub depth: f64,
    /// Near/far size cue in [0, 1], flattening toward 1 as |pitch| grows.
    pub scale: f64,
    /// Rotation about the axis orthogonal to the rotation plane. Zero unless
    /// item rotation is enabled.
    pub rotation: f64,
    pub visible: bool,
}

/// Item widths, uniform or one per item.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ItemWidths {
    #[default]
    None,
    Uniform(f64),
    PerItem(Vec<f64>),
}

impl ItemWidths {
    fn width(&self, index: usize) -> f64 {
        match self {
            ItemWidths::None => 0.0,
            ItemWidths::Uniform(w) => *w,
            ItemWidths::PerItem(widths) => widths.get(index).copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projector {
    pub pitch: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub vertical: bool,
    pub rotate_items: bool,
    /// Arc half-width around the back of the circle (angle π) inside which
    /// items are culled. `None` keeps everything visible.
    pub visibility_arc: Option<f64>,
    pub widths: ItemWidths,
}

impl Projector {
    pub fn project(&self, ring: &ItemRing, index: usize) -> Pose {
        let angle = ring.angle(index);
        let (x, y) = ring.coord(index);
        let radius = ring.radius();

        // The rotation axis reads x in horizontal orientation, y in
        // vertical; the remaining coordinate is the depth cue.
        let (axis_coord, depth_coord, axis_offset, depth_offset) = if self.vertical {
            (y, x, self.offset_y, self.offset_x)
        } else {
            (x, y, self.offset_x, self.offset_y)
        };

        // Rotated items pivot around their midline, so they only need a
        // quarter width of correction.
        let width = self.widths.width(index);
        let centering = if self.rotate_items { width / 4.0 } else { width / 2.0 };
        let lateral = axis_coord + radius + axis_offset - centering;

        let depth = depth_coord * self.pitch + radius * self.pitch + depth_offset;

        // Pure depth cue at pitch 0, collapsing toward 1 as the carousel is
        // pitched edge-on. Absolute value guards rounding artifacts near the
        // back of the circle.
        let flatten = self.pitch.abs() / FRAC_PI_2;
        let scale = ((depth_coord / (2.0 * radius) + 0.5) * (1.0 - flatten) + flatten).abs();

        let rotation = if self.rotate_items { angle } else { 0.0 };

        let visible = match self.visibility_arc {
            None => true,
            Some(arc) => angle <= PI - arc || angle >= PI + arc,
        };

        Pose {
            lateral,
            depth,
            scale,
            rotation,
            visible,
        }
    }

    pub fn project_all(&self, ring: &ItemRing) -> Vec<Pose> {
        (0..ring.len()).map(|i| self.project(ring, i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn flat_projector() -> Projector {
        Projector {
            pitch: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            vertical: false,
            rotate_items: false,
            visibility_arc: None,
            widths: ItemWidths::None,
        }
    }

    #[test]
    fn scale_is_a_pure_depth_cue_at_zero_pitch() {
        let ring = ItemRing::new(2, 100.0, true);
        let projector = flat_projector();
        // Item 0 faces the viewer, item 1 sits at the back.
        assert_abs_diff_eq!(projector.project(&ring, 0).scale, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(projector.project(&ring, 1).scale, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn scale_flattens_toward_one_at_full_pitch() {
        let ring = ItemRing::new(2, 100.0, true);
        let projector = Projector {
            pitch: FRAC_PI_2,
            ..flat_projector()
        };
        assert_abs_diff_eq!(projector.project(&ring, 0).scale, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(projector.project(&ring, 1).scale, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_pitch_leaves_no_depth_spread() {
        let ring = ItemRing::new(4, 100.0, true);
        let projector = flat_projector();
        let poses = projector.project_all(&ring);
        for pose in &poses {
            assert_abs_diff_eq!(pose.depth, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn depth_spread_grows_with_pitch() {
        let ring = ItemRing::new(2, 100.0, true);
        let projector = Projector {
            pitch: 0.5,
            ..flat_projector()
        };
        let front = projector.project(&ring, 0).depth;
        let back = projector.project(&ring, 1).depth;
        // front: 100*0.5 + 100*0.5, back: -100*0.5 + 100*0.5
        assert_abs_diff_eq!(front, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn lateral_centers_on_item_width() {
        let ring = ItemRing::new(1, 100.0, true);
        let mut projector = Projector {
            widths: ItemWidths::Uniform(40.0),
            ..flat_projector()
        };
        // Item 0 at angle 0: x = 0, lateral = 0 + 100 - 20.
        assert_abs_diff_eq!(projector.project(&ring, 0).lateral, 80.0, epsilon = 1e-12);
        // Rotated items pivot on their midline; only a quarter width applies.
        projector.rotate_items = true;
        assert_abs_diff_eq!(projector.project(&ring, 0).lateral, 90.0, epsilon = 1e-12);
    }

    #[test]
    fn per_item_widths_apply_per_index() {
        let ring = ItemRing::new(2, 100.0, true);
        let projector = Projector {
            widths: ItemWidths::PerItem(vec![10.0, 30.0]),
            ..flat_projector()
        };
        let a = projector.project(&ring, 0);
        let b = projector.project(&ring, 1);
        // Both items have x = 0; only the width centering differs.
        assert_abs_diff_eq!(a.lateral, 95.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.lateral, 85.0, epsilon = 1e-12);
    }

    #[test]
    fn vertical_orientation_swaps_the_axes() {
        let mut ring = ItemRing::new(1, 100.0, true);
        ring.set_angle(0, PI / 2.0);
        let projector = Projector {
            vertical: true,
            pitch: 0.5,
            offset_x: 3.0,
            offset_y: 7.0,
            ..flat_projector()
        };
        let pose = projector.project(&ring, 0);
        // At angle π/2: x = 100, y = 0. Vertical lateral reads y.
        assert_abs_diff_eq!(pose.lateral, 0.0 + 100.0 + 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pose.depth, 100.0 * 0.5 + 100.0 * 0.5 + 3.0, epsilon = 1e-12);
    }

    #[test]
    fn rotation_follows_the_angle_only_when_enabled() {
        let mut ring = ItemRing::new(1, 100.0, true);
        ring.set_angle(0, 1.25);
        let mut projector = flat_projector();
        assert_abs_diff_eq!(projector.project(&ring, 0).rotation, 0.0, epsilon = 1e-12);
        projector.rotate_items = true;
        assert_abs_diff_eq!(projector.project(&ring, 0).rotation, 1.25, epsilon = 1e-12);
    }

    #[test]
    fn visibility_arc_culls_the_back_inclusively() {
        let mut ring = ItemRing::new(1, 100.0, true);
        let projector = Projector {
            visibility_arc: Some(FRAC_PI_2),
            ..flat_projector()
        };

        let visible_at = |ring: &mut ItemRing, angle: f64| {
            ring.set_angle(0, angle);
            projector.project(ring, 0).visible
        };

        assert!(!visible_at(&mut ring, PI));
        assert!(visible_at(&mut ring, FRAC_PI_2));
        assert!(visible_at(&mut ring, FRAC_PI_2 - 0.01));
        assert!(visible_at(&mut ring, 3.0 * FRAC_PI_2));
        assert!(visible_at(&mut ring, 3.0 * FRAC_PI_2 + 0.01));
        assert!(!visible_at(&mut ring, PI - 0.01));
        assert!(!visible_at(&mut ring, PI + 0.01));
        assert!(visible_at(&mut ring, 0.0));
    }

    #[test]
    fn no_arc_means_always_visible() {
        let mut ring = ItemRing::new(1, 100.0, true);
        ring.set_angle(0, PI);
        let projector = flat_projector();
        assert!(projector.project(&ring, 0).visible);
    }
}
