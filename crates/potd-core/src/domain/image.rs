//! Image variants and output sizes.

use serde::{Deserialize, Serialize};

/// Width of a TRMNL e-ink display.
pub const TRMNL_WIDTH: u32 = 800;

/// Height of a TRMNL e-ink display.
pub const TRMNL_HEIGHT: u32 = 480;

/// Which stored rendition of a picture to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    Original,
    Dithered,
}

impl ImageVariant {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Dithered => "dithered",
        }
    }
}

impl std::fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested output size. Missing dimensions are derived from the aspect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageSize {
    /// Keep the stored bytes as they are.
    pub const ORIGINAL: Self = Self {
        width: None,
        height: None,
    };

    /// Largest width or height a caller may ask for.
    pub const MAX_DIMENSION: u32 = 4096;

    #[must_use]
    pub const fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    /// True when no scaling is requested.
    #[must_use]
    pub const fn is_original(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    /// Resolve the target dimensions for a source of `src_w` x `src_h`.
    ///
    /// Returns `None` when no scaling is requested. Derived dimensions are
    /// truncated and clamped to `1..=MAX_DIMENSION`.
    #[must_use]
    pub fn resolve(&self, src_w: u32, src_h: u32) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (None, None) => None,
            (Some(w), Some(h)) => Some((w, h)),
            (Some(w), None) => {
                let h = (f64::from(w) / f64::from(src_w.max(1))) * f64::from(src_h);
                Some((w, (h as u32).clamp(1, Self::MAX_DIMENSION)))
            }
            (None, Some(h)) => {
                let w = (f64::from(h) / f64::from(src_h.max(1))) * f64::from(src_w);
                Some(((w as u32).clamp(1, Self::MAX_DIMENSION), h))
            }
        }
    }
}
