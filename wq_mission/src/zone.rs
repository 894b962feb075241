//! Survey zone grid.
//!
//! The survey area is cut into square tiles on a local metric grid centred
//! on the area's centroid. Tiles are named spreadsheet-style: a column label
//! (`A`..`Z`, `AA`, `AB`, ...) followed by a 1-based row number, so column 2
//! row 6 (both 0-based) is `C7`. These tile ids are the `zone_id` values
//! carried by water-quality records.
//!
//! Everything here is pure arithmetic; nothing reads or stores boundaries.

use std::fmt;

/// Metres per degree of latitude, and per degree of longitude at the equator.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Default tile edge length in metres.
pub const DEFAULT_TILE_M: f64 = 50.0;

// ---------------------------------------------------------------------------
// Tile ids
// ---------------------------------------------------------------------------

/// Errors that can arise when parsing a tile id.
#[derive(Debug, PartialEq)]
pub enum ZoneError {
    /// The id has no leading column letters.
    MissingColumn(String),
    /// The id has no row number, a row of 0, or trailing junk.
    BadRow(String),
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneError::MissingColumn(id) => write!(f, "Tile id has no column letters: {}", id),
            ZoneError::BadRow(id) => write!(f, "Tile id has no valid row number: {}", id),
        }
    }
}

impl std::error::Error for ZoneError {}

/// 0-based column index to its letter label: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn col_letters(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let r = (n - 1) % 26;
        letters.push(b'A' + r as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Inverse of `col_letters`. Accepts upper-case ASCII letters only.
pub fn col_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    letters.bytes().try_fold(0usize, |acc, b| {
        acc.checked_mul(26)?.checked_add((b - b'A') as usize + 1)
    })
    .map(|n| n - 1)
}

/// Tile id for a 0-based (column, row) pair, e.g. `(2, 6)` → `C7`.
pub fn tile_id(col: usize, row: usize) -> String {
    format!("{}{}", col_letters(col), row + 1)
}

/// Splits a tile id back into its 0-based (column, row) pair.
pub fn parse_tile_id(id: &str) -> Result<(usize, usize), ZoneError> {
    let split = id
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(id.len());
    let (letters, digits) = id.split_at(split);

    let col = col_index(letters).ok_or_else(|| ZoneError::MissingColumn(id.to_string()))?;

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ZoneError::BadRow(id.to_string()));
    }
    let row = digits
        .parse::<usize>()
        .ok()
        .filter(|r| *r >= 1)
        .ok_or_else(|| ZoneError::BadRow(id.to_string()))?;

    Ok((col, row - 1))
}

// ---------------------------------------------------------------------------
// Local metric grid
// ---------------------------------------------------------------------------

/// Metres per degree of (longitude, latitude) at `lat_deg`.
pub fn meters_per_deg(lat_deg: f64) -> (f64, f64) {
    (METERS_PER_DEGREE * lat_deg.to_radians().cos(), METERS_PER_DEGREE)
}

/// Equirectangular projection around a fixed origin, accurate enough over a
/// lake-sized survey area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalGrid {
    pub origin_lon: f64,
    pub origin_lat: f64,
    m_per_deg_lon: f64,
    m_per_deg_lat: f64,
}

impl LocalGrid {
    pub fn new(origin_lon: f64, origin_lat: f64) -> Self {
        let (m_per_deg_lon, m_per_deg_lat) = meters_per_deg(origin_lat);
        Self {
            origin_lon,
            origin_lat,
            m_per_deg_lon,
            m_per_deg_lat,
        }
    }

    /// (lon, lat) to metres east and north of the origin.
    pub fn to_xy(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            (lon - self.origin_lon) * self.m_per_deg_lon,
            (lat - self.origin_lat) * self.m_per_deg_lat,
        )
    }

    /// Metres east and north of the origin back to (lon, lat).
    pub fn to_lonlat(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_lon + x / self.m_per_deg_lon,
            self.origin_lat + y / self.m_per_deg_lat,
        )
    }
}

/// Tile (column, row) containing the point `(x, y)` on a grid whose first
/// tile starts at `(x0, y0)`. Points west or south of the grid have no tile.
pub fn tile_at(x: f64, y: f64, x0: f64, y0: f64, tile_m: f64) -> Option<(usize, usize)> {
    if tile_m <= 0.0 || x < x0 || y < y0 {
        return None;
    }
    let col = ((x - x0) / tile_m).floor();
    let row = ((y - y0) / tile_m).floor();
    if !col.is_finite() || !row.is_finite() {
        return None;
    }
    Some((col as usize, row as usize))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
