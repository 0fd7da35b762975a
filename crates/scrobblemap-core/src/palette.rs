//! Color palette selector handed to the heatmap renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Continuous color scale used for the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Palette {
    /// Perceptually uniform blue-green-yellow scale (default).
    #[default]
    Viridis,
    /// Color-vision-deficiency friendly blue-yellow scale.
    Cividis,
    /// Blue-red-yellow scale.
    Plasma,
    /// Black-purple-cream scale.
    Magma,
    /// Black-red-yellow scale.
    Inferno,
    /// Rainbow-like high contrast scale.
    Turbo,
}

/// Error returned when a palette name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown palette `{0}` (expected one of: viridis, cividis, plasma, magma, inferno, turbo)")]
pub struct UnknownPalette(pub String);

impl Palette {
    /// All supported palettes.
    pub const ALL: [Palette; 6] = [
        Self::Viridis,
        Self::Cividis,
        Self::Plasma,
        Self::Magma,
        Self::Inferno,
        Self::Turbo,
    ];

    /// Returns the renderer-facing name of this palette.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viridis => "Viridis",
            Self::Cividis => "Cividis",
            Self::Plasma => "Plasma",
            Self::Magma => "Magma",
            Self::Inferno => "Inferno",
            Self::Turbo => "Turbo",
        }
    }

    /// Parses a palette name, falling back to [`Palette::Viridis`] for
    /// unknown names.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for Palette {
    type Err = UnknownPalette;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownPalette(s.to_string()))
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
