//! The carousel engine: angular state, rotation physics and pose
//! publication.
//!
//! All mutation funnels through one mutex-guarded state; every mutation
//! path ends in a single frame publication on a watch channel, so the host
//! renderer always observes a fully-updated snapshot. Deceleration sessions
//! run as spawned tasks that interleave freely; their rotations superpose
//! on the shared ring.

mod motion;
mod pose;
mod ring;

pub use motion::Glide;
pub use pose::{ItemWidths, Pose, Projector};
pub use ring::ItemRing;

use std::f64::consts::{PI, TAU};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{Config, ConfigError};

/// One published snapshot of every item's pose.
#[derive(Debug, Clone, Default)]
pub struct PoseFrame {
    pub poses: Vec<Pose>,
}

struct State {
    ring: ItemRing,
    projector: Projector,
}

struct Shared {
    state: Mutex<State>,
    frames: watch::Sender<Arc<PoseFrame>>,
    gliding: AtomicUsize,
    deceleration: f64,
    weight: f64,
    tick: Duration,
    snap_on_settle: bool,
}

/// Handle to a running carousel. Cheap to clone; every clone drives the
/// same ring.
#[derive(Clone)]
pub struct Roundabout {
    shared: Arc<Shared>,
}

impl Roundabout {
    /// Validate the configuration, build the engine and hand back the frame
    /// receiver for the host renderer.
    pub fn new(config: &Config) -> Result<(Self, watch::Receiver<Arc<PoseFrame>>), ConfigError> {
        config.validate()?;

        let ring = ItemRing::new(
            config.items.labels.len(),
            config.layout.radius,
            config.layout.round_coords,
        );
        let projector = Projector {
            pitch: config.layout.pitch,
            offset_x: config.layout.offset_x,
            offset_y: config.layout.offset_y,
            vertical: config.layout.vertical,
            rotate_items: config.layout.rotate_items,
            visibility_arc: config.layout.visibility_arc,
            widths: config.items.widths(),
        };

        let first = Arc::new(PoseFrame {
            poses: projector.project_all(&ring),
        });
        let (frames, rx) = watch::channel(first);

        let shared = Arc::new(Shared {
            state: Mutex::new(State { ring, projector }),
            frames,
            gliding: AtomicUsize::new(0),
            deceleration: config.motion.deceleration,
            weight: config
                .motion
                .weight
                .unwrap_or(config.layout.radius * PI),
            tick: Duration::from_millis(config.motion.tick_ms),
            snap_on_settle: config.motion.snap,
        });

        Ok((Self { shared }, rx))
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<PoseFrame>> {
        self.shared.frames.subscribe()
    }

    /// Latest published frame.
    pub fn current_frame(&self) -> Arc<PoseFrame> {
        self.shared.frames.borrow().clone()
    }

    /// Number of deceleration sessions currently in flight.
    pub fn active_glides(&self) -> usize {
        self.shared.gliding.load(Ordering::SeqCst)
    }

    pub fn nearest_index(&self, target: f64) -> Option<usize> {
        self.lock_state().ring.nearest_to(target)
    }

    /// Apply an instantaneous drag sample: one immediate rotation of
    /// delta / weight, outside any deceleration session.
    pub fn drag_delta(&self, delta: f64) {
        let weight = self.shared.weight;
        self.mutate(|state| state.ring.rotate_all(delta / weight));
    }

    /// Start a deceleration session from a release velocity. Returns the
    /// driving task's handle, or `None` for a zero velocity. Sessions stack:
    /// a new swipe never cancels one in flight.
    pub fn spin(&self, velocity: f64) -> Option<JoinHandle<()>> {
        if velocity == 0.0 {
            return None;
        }

        self.shared.gliding.fetch_add(1, Ordering::SeqCst);
        let engine = self.clone();
        Some(tokio::spawn(async move {
            let mut glide = Glide::new(
                velocity,
                engine.shared.deceleration,
                engine.shared.weight,
            );
            while let Some(increment) = glide.step() {
                engine.mutate(|state| state.ring.rotate_all(increment));
                tokio::time::sleep(engine.shared.tick).await;
            }
            // Snap only when the last concurrent session settles.
            if engine.shared.gliding.fetch_sub(1, Ordering::SeqCst) == 1
                && engine.shared.snap_on_settle
            {
                debug!(velocity, "last glide settled, snapping");
                engine.snap();
            }
        }))
    }

    /// Synthetic swipe; same physics as a user release.
    pub fn scroll_velocity(&self, velocity: f64) -> Option<JoinHandle<()>> {
        self.spin(velocity)
    }

    /// Jump the arrangement by `count` item slots, no physics involved.
    pub fn scroll_index(&self, count: i64) {
        self.mutate(|state| {
            if state.ring.is_empty() {
                return;
            }
            let slot = TAU / state.ring.len() as f64;
            state.ring.rotate_all(count as f64 * slot);
        });
    }

    /// Rigidly align the item nearest the front to angle zero, taking the
    /// shorter way around the circle. Smoothing is the renderer's job.
    pub fn snap(&self) {
        self.mutate(|state| {
            let Some(base) = state.ring.nearest_to(0.0) else {
                warn!("snap requested on an empty carousel");
                return;
            };
            let delta = state.ring.angle(base);
            let correction = if delta <= TAU - delta {
                -delta
            } else {
                TAU - delta
            };
            state.ring.rotate_all(correction);
        });
    }

    /// Re-derive the cached coordinates in place. Idempotent; call after
    /// `set_radius`.
    pub fn recompute_geometry(&self) {
        self.mutate(|state| state.ring.refresh_coords());
    }

    pub fn set_radius(&self, radius: f64) -> Result<(), ConfigError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::Radius(radius));
        }
        self.mutate(|state| state.ring.set_radius(radius));
        Ok(())
    }

    /// Re-space items evenly, e.g. after the item set changed on the host
    /// side.
    pub fn force_settle(&self) {
        self.mutate(|state| state.ring.respace());
    }

    /// Run `f` under the state lock, then publish one frame reflecting the
    /// fully-updated ring.
    fn mutate(&self, f: impl FnOnce(&mut State)) {
        let mut state = self.lock_state();
        f(&mut state);
        let frame = Arc::new(PoseFrame {
            poses: state.projector.project_all(&state.ring),
        });
        drop(state);
        self.shared.frames.send_replace(frame);
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
