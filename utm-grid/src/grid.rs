//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//!Tile grids

use crate::coverage::TileCoverage;
use crate::error::{Error, Result};
use crate::key::{format_resolution, parse_pad, parse_resolution, parse_tilesize};
use crate::shape::Shape;
use crate::tile::Tile;
use crate::utm::{lonlat_to_utm, zone_for, FALSE_EASTING, UTM_MAX_LON, UTM_MIN_LON};
use geo::{Area, Centroid, MultiPolygon, Polygon, Rect};
use std::fmt;

/// Square meters per square degree at the equator (111 km per degree)
const M2_PER_DEG2: f64 = 12321000000.0;

/// `tiles_from_shape` warns when more tiles than this are expected
pub const NTILES_WARNING_THRESHOLD: u64 = 50000;

/// Projected extent
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }
    /// Extent grown by `distance` on every side
    pub fn buffered(&self, distance: f64) -> Extent {
        Extent {
            minx: self.minx - distance,
            miny: self.miny - distance,
            maxx: self.maxx + distance,
            maxy: self.maxy + distance,
        }
    }
    /// Extent moved north by `distance`
    pub fn shifted_north(&self, distance: f64) -> Extent {
        Extent {
            miny: self.miny + distance,
            maxy: self.maxy + distance,
            ..*self
        }
    }
    /// Corners, counter-clockwise starting at the lower right
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.maxx, self.miny),
            (self.maxx, self.maxy),
            (self.minx, self.maxy),
            (self.minx, self.miny),
        ]
    }
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.minx && x <= self.maxx && y >= self.miny && y <= self.maxy
    }
    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new((self.minx, self.miny), (self.maxx, self.maxy)).to_polygon()
    }
    /// `[minx, miny, maxx, maxy]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.minx, self.miny, self.maxx, self.maxy]
    }
}

/// Division of every UTM zone into square tiles of equal size.
///
/// Tiles are laid out on a lattice of `tilesize * resolution` meters with its origin at the
/// zone's central meridian on the equator. Each tile raster is padded by `pad` pixels on every
/// side, so neighboring tiles overlap by `2 * pad` pixels.
#[derive(PartialEq, Clone, Debug)]
pub struct Grid {
    /// Pixel size in meters
    resolution: f64,
    /// Width and height of a tile in pixels, without padding
    tilesize: u32,
    /// Extra pixels on each side of a tile
    pad: u32,
}

impl Grid {
    pub fn new(resolution: f64, tilesize: u32, pad: u32) -> Result<Grid> {
        if tilesize == 0 {
            return Err(Error::tile("Tile size must be greater than zero"));
        }
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(Error::tile(format!(
                "Resolution must be greater than zero, got {}",
                resolution
            )));
        }
        if pad
            .checked_mul(2)
            .and_then(|padding| padding.checked_add(tilesize))
            .is_none()
        {
            return Err(Error::tile(format!(
                "Tile size {} with pad {} exceeds the maximal raster size",
                tilesize, pad
            )));
        }
        Ok(Grid {
            resolution,
            tilesize,
            pad,
        })
    }
    /// Grid from its key `tilesize:pad:resolution`
    pub fn from_key(key: &str) -> Result<Grid> {
        let fields: Vec<&str> = key.split(':').collect();
        if fields.len() != 3 {
            return Err(Error::tile(format!("Invalid grid key '{}'", key)));
        }
        let tilesize = parse_tilesize(fields[0])?;
        let pad = parse_pad(fields[1])?;
        let resolution = parse_resolution(fields[2])?;
        Grid::new(resolution, tilesize, pad)
    }
    pub fn resolution(&self) -> f64 {
        self.resolution
    }
    pub fn tilesize(&self) -> u32 {
        self.tilesize
    }
    pub fn pad(&self) -> u32 {
        self.pad
    }
    /// Pixel size of a tile raster, including padding
    pub fn tile_extent(&self) -> u32 {
        self.tilesize + 2 * self.pad
    }
    /// Size of a tile in meters, without padding (lattice step)
    pub fn utm_tilesize(&self) -> f64 {
        self.tilesize as f64 * self.resolution
    }
    /// Size of a tile in meters, including padding
    pub fn utm_tile_extent(&self) -> f64 {
        self.tile_extent() as f64 * self.resolution
    }
    /// Tile containing a WGS84 position
    pub fn tile_from_lonlat(&self, lon: f64, lat: f64) -> Result<Tile> {
        if !(lon >= UTM_MIN_LON && lon <= UTM_MAX_LON) {
            return Err(Error::lat_lon(format!(
                "Longitude must be between -180.0 and 180.0, got {}",
                lon
            )));
        }
        let zone = zone_for(lon, lat)?;
        let (x, y) = lonlat_to_utm(lon, lat, zone.zone);
        let ti = ((x - FALSE_EASTING) / self.utm_tilesize()).floor() as i64;
        let tj = (y / self.utm_tilesize()).floor() as i64;
        Ok(Tile::new(self.clone(), zone.zone, ti, tj))
    }
    /// Lazy iterator over all tiles intersecting `shape`.
    ///
    /// The shape is normalized and validated before this returns, an invalid part fails
    /// the whole call.
    pub fn tiles_from_shape<S: Into<Shape>>(&self, shape: S) -> Result<TileCoverage> {
        let polygons = shape.into().normalize()?;
        let ntiles = self.estimate_ntiles(&polygons);
        if ntiles > NTILES_WARNING_THRESHOLD {
            warn!(
                "Shape is covered by approximately {} tiles of grid {}",
                ntiles, self
            );
        }
        Ok(TileCoverage::new(self.clone(), polygons))
    }
    /// Fast approximation of the number of tiles covering `shape`
    pub fn estimate_ntiles_from_shape<S: Into<Shape>>(&self, shape: S) -> Result<u64> {
        let polygons = shape.into().normalize()?;
        Ok(self.estimate_ntiles(&polygons))
    }
    fn estimate_ntiles(&self, polygons: &[MultiPolygon<f64>]) -> u64 {
        let tile_area = self.utm_tilesize().powi(2);
        polygons
            .iter()
            .filter_map(|polygon| {
                let lat = polygon.centroid()?.y();
                let m2 = M2_PER_DEG2 * lat.to_radians().cos();
                Some((polygon.unsigned_area() * m2 / tile_area).floor() as u64)
            })
            .sum()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.tilesize,
            self.pad,
            format_resolution(self.resolution)
        )
    }
}
