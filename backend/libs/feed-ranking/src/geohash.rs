/// Geohash encoding and neighbor computation
///
/// A geohash interleaves longitude and latitude bisection bits (longitude first)
/// and packs them five at a time into a base32 alphabet. Shared prefixes mean
/// spatial containment: a cell at precision p is a prefix of every point encoded
/// at precision >= p inside it.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RankingError, Result};

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest geohash accepted (60 bits, ~3.7cm cells)
pub const MAX_PRECISION: usize = 12;

/// Precision used when encoding a viewer point before truncation
pub const VIEWER_PRECISION: usize = 8;

/// Precision stored on geotagged posts
pub const POST_PRECISION: usize = 8;

/// Geohash cell key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeoCell(String);

impl GeoCell {
    /// Parse a geohash string, rejecting characters outside the base32 alphabet
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw.len() > MAX_PRECISION {
            return Err(RankingError::InvalidInput(format!(
                "geohash must be 1-{} characters, got {}",
                MAX_PRECISION,
                raw.len()
            )));
        }
        if let Some(bad) = raw.bytes().find(|b| char_value(*b).is_none()) {
            return Err(RankingError::InvalidInput(format!(
                "invalid geohash character '{}'",
                bad as char
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn precision(&self) -> usize {
        self.0.len()
    }

    /// Keep only the leading `precision` characters (at least one)
    pub fn truncate(&self, precision: usize) -> GeoCell {
        let precision = precision.clamp(1, self.0.len());
        GeoCell(self.0[..precision].to_string())
    }

    /// True when `other` lies inside this cell (prefix match)
    pub fn contains(&self, other: &GeoCell) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for GeoCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GeoCell {
    type Error = RankingError;

    fn try_from(value: String) -> Result<Self> {
        GeoCell::parse(&value)
    }
}

impl From<GeoCell> for String {
    fn from(cell: GeoCell) -> Self {
        cell.0
    }
}

/// Rectangular region covered by a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

/// Reject coordinates outside WGS84 bounds (NaN included). Never clamps.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(RankingError::InvalidInput(format!(
            "latitude must be between -90 and 90, got {}",
            latitude
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(RankingError::InvalidInput(format!(
            "longitude must be between -180 and 180, got {}",
            longitude
        )));
    }
    Ok(())
}

/// Encode a point at the given precision
pub fn encode(latitude: f64, longitude: f64, precision: usize) -> Result<GeoCell> {
    validate_coordinates(latitude, longitude)?;
    if !(1..=MAX_PRECISION).contains(&precision) {
        return Err(RankingError::InvalidInput(format!(
            "geohash precision must be 1-{}, got {}",
            MAX_PRECISION, precision
        )));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even = true;
    let mut bits = 0;
    let mut value = 0u8;

    while hash.len() < precision {
        let (range, coordinate) = if even {
            (&mut lon_range, longitude)
        } else {
            (&mut lat_range, latitude)
        };
        let mid = (range.0 + range.1) / 2.0;
        value <<= 1;
        if coordinate >= mid {
            value |= 1;
            range.0 = mid;
        } else {
            range.1 = mid;
        }
        even = !even;

        bits += 1;
        if bits == 5 {
            hash.push(BASE32[value as usize] as char);
            bits = 0;
            value = 0;
        }
    }

    Ok(GeoCell(hash))
}

/// Bounding box of a cell
pub fn decode_bounds(cell: &GeoCell) -> BoundingBox {
    let grid = GridPosition::from_cell(cell);
    let lat_step = 180.0 / (1u64 << grid.lat_bits) as f64;
    let lon_step = 360.0 / (1u64 << grid.lon_bits) as f64;
    let min_lat = -90.0 + grid.lat_index as f64 * lat_step;
    let min_lon = -180.0 + grid.lon_index as f64 * lon_step;

    BoundingBox {
        min_lat,
        max_lat: min_lat + lat_step,
        min_lon,
        max_lon: min_lon + lon_step,
    }
}

/// Centre point of a cell as (latitude, longitude)
pub fn decode(cell: &GeoCell) -> (f64, f64) {
    decode_bounds(cell).center()
}

/// Compass offsets (lat, lon) in order N, NE, E, SE, S, SW, W, NW
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// The eight cells adjacent to `cell`, same precision, in compass order
/// N, NE, E, SE, S, SW, W, NW.
///
/// Longitude wraps across the antimeridian. A step past the top or bottom row
/// crosses the pole: the row stays and longitude turns half way round the
/// globe, so every precision yields eight distinct cells, none equal to `cell`.
pub fn neighbors(cell: &GeoCell) -> [GeoCell; 8] {
    let grid = GridPosition::from_cell(cell);
    NEIGHBOR_OFFSETS.map(|(d_lat, d_lon)| grid.offset(d_lat, d_lon).to_cell())
}

/// Prefix set used to select discovery candidates: the viewer's cell at
/// `precision` plus its eight neighbors.
pub fn search_cells(latitude: f64, longitude: f64, precision: usize) -> Result<Vec<GeoCell>> {
    let viewer = encode(latitude, longitude, precision.max(VIEWER_PRECISION))?.truncate(precision);
    let mut cells = Vec::with_capacity(9);
    cells.extend(neighbors(&viewer));
    cells.insert(0, viewer);
    Ok(cells)
}

fn char_value(c: u8) -> Option<u64> {
    BASE32.iter().position(|b| *b == c).map(|i| i as u64)
}

/// Integer coordinates of a cell on the latitude/longitude grid of its precision
#[derive(Debug, Clone, Copy)]
struct GridPosition {
    lat_index: u64,
    lon_index: u64,
    lat_bits: u32,
    lon_bits: u32,
}

impl GridPosition {
    fn from_cell(cell: &GeoCell) -> Self {
        let mut grid = GridPosition {
            lat_index: 0,
            lon_index: 0,
            lat_bits: 0,
            lon_bits: 0,
        };
        let mut even = true;

        for c in cell.as_str().bytes() {
            // GeoCell only holds alphabet characters
            let value = char_value(c).unwrap_or(0);
            for shift in (0..5).rev() {
                let bit = (value >> shift) & 1;
                if even {
                    grid.lon_index = (grid.lon_index << 1) | bit;
                    grid.lon_bits += 1;
                } else {
                    grid.lat_index = (grid.lat_index << 1) | bit;
                    grid.lat_bits += 1;
                }
                even = !even;
            }
        }

        grid
    }

    fn offset(&self, d_lat: i64, d_lon: i64) -> Self {
        let lat_rows = 1i64 << self.lat_bits;
        let lon_cols = 1i64 << self.lon_bits;

        let lat = self.lat_index as i64 + d_lat;
        let (lat, lon) = if (0..lat_rows).contains(&lat) {
            (lat, self.lon_index as i64)
        } else {
            // Over the pole
            (self.lat_index as i64, self.lon_index as i64 + lon_cols / 2)
        };

        GridPosition {
            lat_index: lat as u64,
            lon_index: (lon + d_lon).rem_euclid(lon_cols) as u64,
            ..*self
        }
    }

    fn to_cell(self) -> GeoCell {
        let total = self.lat_bits + self.lon_bits;
        let mut lon_remaining = self.lon_bits;
        let mut lat_remaining = self.lat_bits;
        let mut hash = String::with_capacity((total / 5) as usize);
        let mut value = 0u8;

        for i in 0..total {
            let bit = if i % 2 == 0 {
                lon_remaining -= 1;
                (self.lon_index >> lon_remaining) & 1
            } else {
                lat_remaining -= 1;
                (self.lat_index >> lat_remaining) & 1
            };
            value = (value << 1) | bit as u8;
            if i % 5 == 4 {
                hash.push(BASE32[value as usize] as char);
                value = 0;
            }
        }

        GeoCell(hash)
    }
}
