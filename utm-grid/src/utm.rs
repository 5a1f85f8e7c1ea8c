//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! UTM zones and transverse Mercator projection
//!
//! The grid uses the northern variant of every zone for the whole globe: there is no
//! false northing (northings are negative south of the equator) and the projection
//! is evaluated over the full latitude range of ±90°.

use crate::error::{Error, Result};

// WGS84 ellipsoid
const EARTH_MAJOR_AXIS: f64 = 6378137.0;
const FLATTENING: f64 = 1.0 / 298.257223563;

/// UTM point scale factor (k0)
const POINT_SCALE_FACTOR: f64 = 0.9996;
/// UTM false easting in meters
pub const FALSE_EASTING: f64 = 500000.0;
/// False northing of the southern hemisphere CRS variants (EPSG:327xx)
pub const SOUTH_FALSE_NORTHING: f64 = 10000000.0;

/// Eastings outside this range are surely outside their zone
pub const UTM_MIN_EAST: f64 = FALSE_EASTING - 334000.0;
pub const UTM_MAX_EAST: f64 = FALSE_EASTING + 334000.0;
/// Northings of the poles
pub const UTM_MIN_NORTH: f64 = -9997964.943;
pub const UTM_MAX_NORTH: f64 = 9997964.943;

pub const UTM_MIN_LON: f64 = -180.0;
pub const UTM_MAX_LON: f64 = 180.0;
pub const UTM_MIN_LAT: f64 = -90.0;
pub const UTM_MAX_LAT: f64 = 90.0;

/// Beyond this latitude UTM is not defined in the standard, we keep extending the zone
pub const POLAR_LAT: f64 = 80.0;

/// Width of a zone in degrees longitude
pub const ZONE_WIDTH_LON: f64 = 6.0;

pub const MIN_ZONE: u8 = 1;
pub const MAX_ZONE: u8 = 60;

// third flattening (n)
fn third_flattening() -> f64 {
    FLATTENING / (2.0 - FLATTENING)
}

// rectifying radius (A)
fn rectifying_radius() -> f64 {
    let n = third_flattening();
    EARTH_MAJOR_AXIS / (1.0 + n) * (1.0 + n.powi(2) / 4.0 + n.powi(4) / 64.0)
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Hemisphere {
    North,
    South,
}

/// UTM zone of a point
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct UtmZone {
    pub zone: u8,
    pub hemisphere: Hemisphere,
    /// Point is beyond ±80° latitude
    pub polar: bool,
}

impl UtmZone {
    pub fn epsg(&self) -> u32 {
        epsg_code(self.zone, self.hemisphere)
    }
    /// CRS code, e.g. `EPSG:32615`
    pub fn cs_code(&self) -> String {
        format!("EPSG:{}", self.epsg())
    }
}

pub fn epsg_code(zone: u8, hemisphere: Hemisphere) -> u32 {
    match hemisphere {
        Hemisphere::North => 32600 + zone as u32,
        Hemisphere::South => 32700 + zone as u32,
    }
}

/// Central meridian of a zone
pub fn zone_to_lon(zone: u8) -> Result<f64> {
    if zone < MIN_ZONE || zone > MAX_ZONE {
        return Err(Error::tile(format!(
            "Zones must be between {} and {}, got {}",
            MIN_ZONE, MAX_ZONE, zone
        )));
    }
    Ok(zone as f64 * ZONE_WIDTH_LON - 183.0)
}

/// Zone of a longitude in [-180, 180]
pub fn lon_to_zone(lon: f64) -> Result<u8> {
    if !(lon >= UTM_MIN_LON && lon <= UTM_MAX_LON) {
        return Err(Error::lat_lon(format!(
            "Longitude must be between -180.0 and 180.0, got {}",
            lon
        )));
    }
    Ok(zone_of_normalized_lon(lon))
}

fn zone_of_normalized_lon(lon: f64) -> u8 {
    let zone = ((lon + 180.0) / ZONE_WIDTH_LON).floor() as i64 + 1;
    zone.max(MIN_ZONE as i64).min(MAX_ZONE as i64) as u8
}

/// Wrap a longitude into [-180, 180]
pub fn normalize_lon(lon: f64) -> f64 {
    if lon >= UTM_MIN_LON && lon <= UTM_MAX_LON {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Resolve the UTM zone of a WGS84 position
pub fn zone_for(lon: f64, lat: f64) -> Result<UtmZone> {
    if !lon.is_finite() {
        return Err(Error::lat_lon(format!("Longitude must be finite, got {}", lon)));
    }
    if !(lat >= UTM_MIN_LAT && lat <= UTM_MAX_LAT) {
        return Err(Error::lat_lon(format!(
            "Latitude must be between -90 and 90, got {}",
            lat
        )));
    }
    let zone = zone_of_normalized_lon(normalize_lon(lon));
    let hemisphere = if lat >= 0.0 {
        Hemisphere::North
    } else {
        Hemisphere::South
    };
    Ok(UtmZone {
        zone,
        hemisphere,
        polar: lat.abs() > POLAR_LAT,
    })
}

/// Project a WGS84 position into the given zone.
///
/// Returns `(easting, northing)` with false easting and without false northing.
/// Series expansion (Krüger, 3rd order), precise to millimeters within the zone.
pub fn lonlat_to_utm(lon: f64, lat: f64, zone: u8) -> (f64, f64) {
    let n = third_flattening();
    let big_n = 2.0 * n.sqrt() / (1.0 + n);

    let a1 = 1.0 / 2.0 * n - 2.0 / 3.0 * n.powi(2) + 5.0 / 16.0 * n.powi(3);
    let a2 = 13.0 / 48.0 * n.powi(2) - 3.0 / 5.0 * n.powi(3);
    let a3 = 61.0 / 240.0 * n.powi(3);

    let radlon = (lon - ZONE_WIDTH_LON * zone as f64 + 183.0).to_radians();
    let radlat = lat.to_radians();

    let sinlat = radlat.sin();
    // infinite at the poles, the arctangent below resolves that to ±π/2
    let t = (sinlat.atanh() - big_n * (big_n * sinlat).atanh()).sinh();
    let etap = (radlon.sin() / (1.0 + t * t).sqrt()).atanh();
    let xip = (t / radlon.cos()).atan();

    let k0a = POINT_SCALE_FACTOR * rectifying_radius();
    let easting = FALSE_EASTING
        + k0a
            * (etap
                + a1 * (2.0 * xip).cos() * (2.0 * etap).sinh()
                + a2 * (4.0 * xip).cos() * (4.0 * etap).sinh()
                + a3 * (6.0 * xip).cos() * (6.0 * etap).sinh());
    let northing = k0a
        * (xip
            + a1 * (2.0 * xip).sin() * (2.0 * etap).cosh()
            + a2 * (4.0 * xip).sin() * (4.0 * etap).cosh()
            + a3 * (6.0 * xip).sin() * (6.0 * etap).cosh());
    (easting, northing)
}

/// Inverse of [`lonlat_to_utm`]. Longitudes are returned within [-180, 180].
pub fn utm_to_lonlat(easting: f64, northing: f64, zone: u8) -> (f64, f64) {
    let n = third_flattening();

    let b1 = 1.0 / 2.0 * n - 2.0 / 3.0 * n.powi(2) + 37.0 / 96.0 * n.powi(3);
    let b2 = 1.0 / 48.0 * n.powi(2) + 1.0 / 15.0 * n.powi(3);
    let b3 = 17.0 / 480.0 * n.powi(3);

    let d1 = 2.0 * n - 2.0 / 3.0 * n.powi(2) - 2.0 * n.powi(3);
    let d2 = 7.0 / 3.0 * n.powi(2) - 8.0 / 5.0 * n.powi(3);
    let d3 = 56.0 / 15.0 * n.powi(3);

    let k0a = POINT_SCALE_FACTOR * rectifying_radius();
    let xi = northing / k0a;
    let eta = (easting - FALSE_EASTING) / k0a;

    let xip = xi
        - (b1 * (2.0 * xi).sin() * (2.0 * eta).cosh()
            + b2 * (4.0 * xi).sin() * (4.0 * eta).cosh()
            + b3 * (6.0 * xi).sin() * (6.0 * eta).cosh());
    let etap = eta
        - (b1 * (2.0 * xi).cos() * (2.0 * eta).sinh()
            + b2 * (4.0 * xi).cos() * (4.0 * eta).sinh()
            + b3 * (6.0 * xi).cos() * (6.0 * eta).sinh());

    let chi = (xip.sin() / etap.cosh()).asin();

    let lat = (chi + d1 * (2.0 * chi).sin() + d2 * (4.0 * chi).sin() + d3 * (6.0 * chi).sin())
        .to_degrees();
    let lon = ZONE_WIDTH_LON * zone as f64 - 183.0 + (etap.sinh() / xip.cos()).atan().to_degrees();

    ((lon + 180.0).rem_euclid(360.0) - 180.0, lat)
}
