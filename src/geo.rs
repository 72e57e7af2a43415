//! Coordinates ↔ geohash cells.
//!
//! Each symbol carries 5 bits. Bits alternate between longitude and latitude,
//! longitude first; every bit halves the current interval.
//!
//! ```text
//! symbol   s0           s1           s2
//! bits     lo la lo la lo | la lo la lo la | lo la lo la lo ...
//! ```

use crate::alphabet::{GeohashPath, Symbol};

/// Deepest precision `encode` produces (about 3.7cm × 1.9cm at the equator).
pub const MAX_PRECISION: usize = 12;

const BITS_PER_SYMBOL: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("coordinate ({lat}, {lon}) out of range")]
    OutOfRange { lat: f64, lon: f64 },

    #[error("precision {precision} exceeds maximum {max}")]
    PrecisionTooHigh { precision: usize, max: usize },
}

/// Latitude/longitude rectangle covered by a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// The whole globe, covered by the root path.
    pub const WORLD: BoundingBox = BoundingBox {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    /// (lat, lon) of the midpoint.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Half-open containment: the min edges belong to the cell, the max edges
    /// to its neighbour, except at the globe's own edges.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let lat_ok =
            lat >= self.min_lat && (lat < self.max_lat || (self.max_lat == 90.0 && lat == 90.0));
        let lon_ok =
            lon >= self.min_lon && (lon < self.max_lon || (self.max_lon == 180.0 && lon == 180.0));
        lat_ok && lon_ok
    }
}

/// Cell of depth `precision` containing the coordinate.
pub fn encode(lat: f64, lon: f64, precision: usize) -> Result<GeohashPath, GeoError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(GeoError::OutOfRange { lat, lon });
    }
    if precision > MAX_PRECISION {
        return Err(GeoError::PrecisionTooHigh {
            precision,
            max: MAX_PRECISION,
        });
    }

    let mut lat_range = (-90.0, 90.0);
    let mut lon_range = (-180.0, 180.0);
    let mut use_lon = true;
    let mut symbols = Vec::with_capacity(precision);

    for _ in 0..precision {
        let mut value = 0usize;
        for _ in 0..BITS_PER_SYMBOL {
            let (range, coord) = if use_lon {
                (&mut lon_range, lon)
            } else {
                (&mut lat_range, lat)
            };
            let mid = (range.0 + range.1) / 2.0;
            value <<= 1;
            if coord >= mid {
                value |= 1;
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            use_lon = !use_lon;
        }
        symbols.push(Symbol::ALL[value]);
    }

    Ok(GeohashPath::from_symbols(symbols))
}

/// Rectangle covered by `path`. The root covers the world.
pub fn bounds(path: &GeohashPath) -> BoundingBox {
    let mut bbox = BoundingBox::WORLD;
    let mut use_lon = true;

    for symbol in path.symbols() {
        for bit in (0..BITS_PER_SYMBOL).rev() {
            let set = symbol.index() >> bit & 1 == 1;
            if use_lon {
                let mid = (bbox.min_lon + bbox.max_lon) / 2.0;
                if set {
                    bbox.min_lon = mid;
                } else {
                    bbox.max_lon = mid;
                }
            } else {
                let mid = (bbox.min_lat + bbox.max_lat) / 2.0;
                if set {
                    bbox.min_lat = mid;
                } else {
                    bbox.max_lat = mid;
                }
            }
            use_lon = !use_lon;
        }
    }
    bbox
}
