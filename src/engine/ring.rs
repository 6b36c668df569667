//! Angular state for the ring of items.

use std::f64::consts::TAU;

/// Per-item angles plus their derived screen coordinates.
///
/// Angles are kept normalized to [0, 2π). The cartesian coordinates are a
/// pure function of angle and radius, cached here and refreshed on every
/// angle change so readers never see them out of sync.
#[derive(Debug, Clone)]
pub struct ItemRing {
    angles: Vec<f64>,
    coords: Vec<(f64, f64)>,
    radius: f64,
    round_coords: bool,
}

impl ItemRing {
    /// Build a ring of `count` items evenly spaced, item 0 at angle 0.
    pub fn new(count: usize, radius: f64, round_coords: bool) -> Self {
        let mut ring = Self {
            angles: vec![0.0; count],
            coords: vec![(0.0, 0.0); count],
            radius,
            round_coords,
        };
        ring.respace();
        ring
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn angle(&self, index: usize) -> f64 {
        self.angles[index]
    }

    /// Cached (x, y) for an item: x = sin(angle)·radius, y = cos(angle)·radius.
    pub fn coord(&self, index: usize) -> (f64, f64) {
        self.coords[index]
    }

    /// Normalize `angle` into [0, 2π), store it and refresh the derived
    /// coordinates for that item.
    pub fn set_angle(&mut self, index: usize, angle: f64) {
        let angle = angle.rem_euclid(TAU);
        self.angles[index] = angle;
        self.coords[index] = self.derive(angle);
    }

    /// Rigidly rotate every item by `delta`. All angles are updated before
    /// this returns, so a caller publishing afterwards always publishes a
    /// consistent snapshot.
    pub fn rotate_all(&mut self, delta: f64) {
        for i in 0..self.angles.len() {
            self.set_angle(i, self.angles[i] + delta);
        }
    }

    /// Reset to even spacing: item i at 2π·i/n.
    pub fn respace(&mut self) {
        let n = self.angles.len();
        for i in 0..n {
            self.set_angle(i, TAU * i as f64 / n as f64);
        }
    }

    /// Re-derive every cached coordinate from the current angles. Idempotent.
    pub fn refresh_coords(&mut self) {
        for i in 0..self.angles.len() {
            self.coords[i] = self.derive(self.angles[i]);
        }
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.refresh_coords();
    }

    /// Index of the item closest to `target` under circular distance, ties
    /// going to the lowest index. `None` when the ring holds no items.
    ///
    /// The target is normalized first, so callers may pass raw accumulated
    /// angles.
    pub fn nearest_to(&self, target: f64) -> Option<usize> {
        let target = target.rem_euclid(TAU);
        let mut best: Option<(usize, f64)> = None;
        for (i, &angle) in self.angles.iter().enumerate() {
            let dist = circular_distance(angle, target);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((i, dist)),
            }
        }
        best.map(|(i, _)| i)
    }

    fn derive(&self, angle: f64) -> (f64, f64) {
        let x = angle.sin() * self.radius;
        let y = angle.cos() * self.radius;
        if self.round_coords {
            (x.round(), y.round())
        } else {
            (x, y)
        }
    }
}

/// Shortest arc between two angles already in [0, 2π).
fn circular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    d.min(TAU - d)
}
