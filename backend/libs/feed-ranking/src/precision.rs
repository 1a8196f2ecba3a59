/// Zoom level to geohash precision mapping
use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;
pub const DEFAULT_ZOOM: u8 = 5;

/// Map zoom level, validated to `MIN_ZOOM..=MAX_ZOOM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    pub fn new(zoom: u8) -> Result<Self> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(RankingError::InvalidInput(format!(
                "zoom must be between {} and {}, got {}",
                MIN_ZOOM, MAX_ZOOM, zoom
            )));
        }
        Ok(Self(zoom))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn precision(&self) -> usize {
        precision_for_zoom(self.0)
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(DEFAULT_ZOOM)
    }
}

/// Geohash precision for a zoom level: wide views get short, coarse prefixes.
///
/// Total over `u8`; callers reject zooms outside `MIN_ZOOM..=MAX_ZOOM` first.
pub fn precision_for_zoom(zoom: u8) -> usize {
    match zoom {
        0..=5 => 1,
        6..=7 => 2,
        8..=10 => 3,
        11..=12 => 4,
        13..=15 => 5,
        16..=18 => 6,
        _ => 7,
    }
}
