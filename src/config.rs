use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::color::ColorScheme;
use crate::display::DisplayMode;
use crate::engine::ItemWidths;

/// A configuration rejected at construction. Engine state is never created
/// from an invalid configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("radius must be a positive finite number, got {0}")]
    Radius(f64),
    #[error("pitch must lie in [-pi/2, pi/2], got {0}")]
    Pitch(f64),
    #[error("visibility arc must lie in (0, pi], got {0}")]
    VisibilityArc(f64),
    #[error("deceleration must be a positive finite number, got {0}")]
    Deceleration(f64),
    #[error("weight must be a positive finite number, got {0}")]
    Weight(f64),
    #[error("item_width and item_widths are mutually exclusive")]
    ConflictingWidths,
    #[error("expected {expected} per-item widths, got {got}")]
    WidthCount { expected: usize, got: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub items: ItemsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Circle radius in layout units.
    pub radius: f64,
    /// Tilt in radians; 0 is edge-on (no depth spread), ±pi/2 fully flattens
    /// the perspective.
    pub pitch: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Rotate around the vertical screen axis instead of the horizontal one.
    pub vertical: bool,
    /// Rotate each item by its own angle (billboard effect).
    pub rotate_items: bool,
    /// Cull items within this arc (radians) of the back of the circle.
    pub visibility_arc: Option<f64>,
    /// Round derived coordinates to whole units for visual stability.
    pub round_coords: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radius: 120.0,
            pitch: 0.5,
            offset_x: 0.0,
            offset_y: 0.0,
            vertical: false,
            rotate_items: false,
            visibility_arc: None,
            round_coords: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Velocity bled off per tick while gliding.
    pub deceleration: f64,
    /// Inertia divisor converting velocity to angle; radius·pi when unset.
    pub weight: Option<f64>,
    /// Glide tick interval in milliseconds.
    pub tick_ms: u64,
    /// Align the nearest item to the front once the last glide settles.
    pub snap: bool,
    /// Ignore pointer input in the demo; programmatic commands still work.
    pub disable_swiping: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            deceleration: 0.5,
            weight: None,
            tick_ms: 110,
            snap: true,
            disable_swiping: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemsConfig {
    pub labels: Vec<String>,
    /// Uniform item width. Mutually exclusive with `widths`.
    pub width: Option<f64>,
    /// One width per item. Mutually exclusive with `width`.
    pub widths: Option<Vec<f64>>,
}

impl Default for ItemsConfig {
    fn default() -> Self {
        Self {
            labels: [
                "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            width: None,
            widths: None,
        }
    }
}

impl ItemsConfig {
    pub fn widths(&self) -> ItemWidths {
        match (self.width, &self.widths) {
            (Some(w), None) => ItemWidths::Uniform(w),
            (None, Some(per_item)) => ItemWidths::PerItem(per_item.clone()),
            _ => ItemWidths::None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    pub color_scheme: ColorScheme,
}

impl Config {
    /// Check every constructor invariant. Called by the engine before any
    /// state is created; invalid combinations never fall back silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        if !layout.radius.is_finite() || layout.radius <= 0.0 {
            return Err(ConfigError::Radius(layout.radius));
        }
        if !(-FRAC_PI_2..=FRAC_PI_2).contains(&layout.pitch) {
            return Err(ConfigError::Pitch(layout.pitch));
        }
        if let Some(arc) = layout.visibility_arc {
            if !arc.is_finite() || arc <= 0.0 || arc > PI {
                return Err(ConfigError::VisibilityArc(arc));
            }
        }

        let motion = &self.motion;
        if !motion.deceleration.is_finite() || motion.deceleration <= 0.0 {
            return Err(ConfigError::Deceleration(motion.deceleration));
        }
        if let Some(weight) = motion.weight {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(ConfigError::Weight(weight));
            }
        }

        let items = &self.items;
        if items.width.is_some() && items.widths.is_some() {
            return Err(ConfigError::ConflictingWidths);
        }
        if let Some(per_item) = &items.widths {
            if per_item.len() != items.labels.len() {
                return Err(ConfigError::WidthCount {
                    expected: items.labels.len(),
                    got: per_item.len(),
                });
            }
        }

        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the default XDG config path (~/.config/rondo/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rondo").join("config.toml"))
    }

    /// Load config from the default XDG path if it exists
    /// Returns None if file doesn't exist, logs warning on parse errors
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            match Self::load(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse config at {}: {}\nUsing defaults.",
                        path.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        }
    }

    /// Initialize default config file at XDG path, returns the path
    pub fn init_default_config() -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = Self::generate_config_template();
        std::fs::write(&path, template)?;

        Ok(path)
    }

    /// Generate a commented TOML config template
    pub fn generate_config_template() -> String {
        r#"# Rondo Configuration
# This file is auto-generated. Edit as needed.

[layout]
# Circle radius in layout units
radius = 120.0
# Tilt in radians: 0 = no depth spread, up to +/- 1.5708 (pi/2)
pitch = 0.5
# Extra placement offsets
offset_x = 0.0
offset_y = 0.0
# Rotate around the vertical screen axis instead of the horizontal one
vertical = false
# Rotate each item by its own angle
rotate_items = false
# Hide items within this arc (radians) of the back of the circle
# visibility_arc = 1.5708
# Round derived coordinates to whole units (visual stability)
round_coords = true

[motion]
# Velocity bled off per tick while gliding
deceleration = 0.5
# Inertia divisor; defaults to radius * pi when omitted
# weight = 380.0
# Glide tick interval in milliseconds
tick_ms = 110
# Align the nearest item to the front once the last glide settles
snap = true
# Ignore pointer input (programmatic commands still work)
disable_swiping = false

[items]
# Item labels; the count defines the carousel size
labels = ["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel"]
# Uniform item width, or one width per item - never both
# width = 24.0
# widths = [24.0, 24.0, 24.0, 24.0, 24.0, 24.0, 24.0, 24.0]

[display]
# Display mode: "terminal" or "headless"
mode = "terminal"
# Color scheme: "spectrum", "rainbow", "fire", "ocean", "monochrome"
color_scheme = "spectrum"
"#
        .to_string()
    }

    /// Merge CLI arguments into config (CLI takes priority)
    pub fn merge_args(&mut self, args: &crate::Args) {
        if let Some(mode) = args.mode {
            self.display.mode = mode;
        }
        if let Some(count) = args.items {
            self.items.labels = (1..=count).map(|i| format!("Item {}", i)).collect();
            // A generated item set invalidates any per-item width list.
            self.items.widths = None;
        }

        if let Some(radius) = args.radius {
            self.layout.radius = radius;
        }
        if let Some(pitch) = args.pitch {
            self.layout.pitch = pitch;
        }
        if let Some(arc) = args.visibility_arc {
            self.layout.visibility_arc = Some(arc);
        }
        if args.vertical {
            self.layout.vertical = true;
        }
        if args.rotate_items {
            self.layout.rotate_items = true;
        }

        if let Some(deceleration) = args.deceleration {
            self.motion.deceleration = deceleration;
        }
        if let Some(weight) = args.weight {
            self.motion.weight = Some(weight);
        }
        if let Some(tick) = args.tick_ms {
            self.motion.tick_ms = tick;
        }
        if args.snap {
            self.motion.snap = true;
        }
        if args.disable_swiping {
            self.motion.disable_swiping = true;
        }

        if let Some(width) = args.item_width {
            self.items.width = Some(width);
            self.items.widths = None;
        }

        self.display.color_scheme = args.colors.parse().unwrap_or(self.display.color_scheme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn template_round_trips_through_toml() {
        let config: Config = toml::from_str(&Config::generate_config_template()).unwrap();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.items.labels.len(), 8);
    }

    #[test]
    fn rejects_both_width_forms() {
        let mut config = Config::default();
        config.items.width = Some(10.0);
        config.items.widths = Some(vec![10.0; config.items.labels.len()]);
        assert_eq!(config.validate(), Err(ConfigError::ConflictingWidths));
    }

    #[test]
    fn rejects_mismatched_width_count() {
        let mut config = Config::default();
        config.items.widths = Some(vec![10.0, 20.0]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::WidthCount {
                expected: 8,
                got: 2
            })
        );
    }

    #[test]
    fn rejects_out_of_range_pitch() {
        let mut config = Config::default();
        config.layout.pitch = 2.0;
        assert_eq!(config.validate(), Err(ConfigError::Pitch(2.0)));
        config.layout.pitch = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_visibility_arc() {
        let mut config = Config::default();
        config.layout.visibility_arc = Some(0.0);
        assert!(config.validate().is_err());
        config.layout.visibility_arc = Some(PI + 0.001);
        assert!(config.validate().is_err());
        config.layout.visibility_arc = Some(PI);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_physics() {
        let mut config = Config::default();
        config.motion.deceleration = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.motion.weight = Some(0.0);
        assert_eq!(config.validate(), Err(ConfigError::Weight(0.0)));

        let mut config = Config::default();
        config.layout.radius = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::Radius(0.0)));
    }

    #[test]
    fn empty_item_set_is_valid() {
        let mut config = Config::default();
        config.items.labels.clear();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn width_forms_map_to_item_widths() {
        let mut config = Config::default();
        assert_eq!(config.items.widths(), ItemWidths::None);
        config.items.width = Some(12.0);
        assert_eq!(config.items.widths(), ItemWidths::Uniform(12.0));
        config.items.width = None;
        config.items.widths = Some(vec![1.0, 2.0]);
        assert_eq!(config.items.widths(), ItemWidths::PerItem(vec![1.0, 2.0]));
    }
}
