use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Spectrum,
    Rainbow,
    Fire,
    Ocean,
    Monochrome,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spectrum" => Ok(Self::Spectrum),
            "rainbow" => Ok(Self::Rainbow),
            "fire" => Ok(Self::Fire),
            "ocean" => Ok(Self::Ocean),
            "mono" | "monochrome" => Ok(Self::Monochrome),
            _ => Err(format!("Unknown color scheme: {}", s)),
        }
    }
}

impl ColorScheme {
    /// Get color for a given position (0.0 to 1.0) and intensity (0.0 to 1.0).
    /// The demo uses position = item index fraction and intensity = pose
    /// scale, so near items render bright and far items dim.
    pub fn get_color(&self, position: f32, intensity: f32) -> (u8, u8, u8) {
        let (h, s, l) = match self {
            ColorScheme::Spectrum => {
                // Classic spectrum: purple -> blue -> cyan -> green -> yellow -> red
                let hue = 270.0 - (position * 270.0);
                (hue, 0.9, 0.15 + intensity * 0.45)
            }
            ColorScheme::Rainbow => {
                let hue = position * 360.0;
                (hue, 0.85, 0.2 + intensity * 0.4)
            }
            ColorScheme::Fire => {
                // Red -> orange -> yellow
                let hue = position * 60.0;
                (hue, 0.95, 0.15 + intensity * 0.5)
            }
            ColorScheme::Ocean => {
                // Deep blue -> cyan -> teal
                let hue = 180.0 + position * 60.0;
                (hue, 0.8, 0.15 + intensity * 0.45)
            }
            ColorScheme::Monochrome => {
                // White/gray based on intensity
                (0.0, 0.0, 0.15 + intensity * 0.65)
            }
        };

        let hsl = Hsl::new(h, s, l);
        let rgb: Srgb = hsl.into_color();

        (
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Spectrum => "spectrum",
            ColorScheme::Rainbow => "rainbow",
            ColorScheme::Fire => "fire",
            ColorScheme::Ocean => "ocean",
            ColorScheme::Monochrome => "monochrome",
        }
    }

    pub fn all() -> &'static [ColorScheme] {
        &[
            ColorScheme::Spectrum,
            ColorScheme::Rainbow,
            ColorScheme::Fire,
            ColorScheme::Ocean,
            ColorScheme::Monochrome,
        ]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|c| c == self).unwrap_or(0);
        all[(current + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|c| c == self).unwrap_or(0);
        all[(current + all.len() - 1) % all.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_visits_every_scheme_and_wraps() {
        let mut scheme = ColorScheme::Spectrum;
        for _ in 0..ColorScheme::all().len() {
            scheme = scheme.next();
        }
        assert_eq!(scheme, ColorScheme::Spectrum);
        assert_eq!(scheme.next().prev(), scheme);
    }

    #[test]
    fn intensity_brightens_every_scheme() {
        for scheme in ColorScheme::all() {
            let (r0, g0, b0) = scheme.get_color(0.3, 0.0);
            let (r1, g1, b1) = scheme.get_color(0.3, 1.0);
            let dim = r0 as u32 + g0 as u32 + b0 as u32;
            let bright = r1 as u32 + g1 as u32 + b1 as u32;
            assert!(bright > dim, "{} did not brighten", scheme.name());
        }
    }
}
