//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Single tiles of a grid

use crate::error::{Error, Result};
use crate::footprint::utm_extent_to_lonlat;
use crate::grid::{Extent, Grid};
use crate::key::TileKey;
use crate::record::TileRecord;
use crate::utm::{
    epsg_code, lonlat_to_utm, utm_to_lonlat, Hemisphere, FALSE_EASTING, POLAR_LAT,
    SOUTH_FALSE_NORTHING, UTM_MAX_LAT, UTM_MIN_LAT,
};
use geo::{LineString, MultiPolygon, Point, Polygon};
use std::fmt;

/// Relative deviation tolerated when comparing tile footprints in meters
const FOOTPRINT_TOLERANCE: f64 = 1e-9;

/// A tile of a grid in a UTM zone.
///
/// `ti` counts tiles eastwards from the central meridian, `tj` northwards from the equator.
#[derive(PartialEq, Clone, Debug)]
pub struct Tile {
    grid: Grid,
    zone: u8,
    ti: i64,
    tj: i64,
}

impl Tile {
    pub(crate) fn new(grid: Grid, zone: u8, ti: i64, tj: i64) -> Tile {
        Tile { grid, zone, ti, tj }
    }

    pub fn from_key(key: &str) -> Result<Tile> {
        let key = TileKey::parse(key)?;
        let grid = Grid::new(key.resolution, key.tilesize, key.pad)?;
        Ok(Tile::new(grid, key.zone, key.ti, key.tj))
    }

    pub fn key(&self) -> String {
        self.tile_key().to_string()
    }

    pub fn tile_key(&self) -> TileKey {
        TileKey {
            tilesize: self.grid.tilesize(),
            pad: self.grid.pad(),
            resolution: self.grid.resolution(),
            zone: self.zone,
            ti: self.ti,
            tj: self.tj,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn resolution(&self) -> f64 {
        self.grid.resolution()
    }
    pub fn tilesize(&self) -> u32 {
        self.grid.tilesize()
    }
    pub fn pad(&self) -> u32 {
        self.grid.pad()
    }
    pub fn zone(&self) -> u8 {
        self.zone
    }
    pub fn ti(&self) -> i64 {
        self.ti
    }
    pub fn tj(&self) -> i64 {
        self.tj
    }
    pub fn tile_extent(&self) -> u32 {
        self.grid.tile_extent()
    }
    pub fn utm_tilesize(&self) -> f64 {
        self.grid.utm_tilesize()
    }
    pub fn utm_tile_extent(&self) -> f64 {
        self.grid.utm_tile_extent()
    }

    /// Lattice cell in northern UTM coordinates (no false northing)
    pub fn utm_bounds_unpadded(&self) -> Extent {
        let size = self.utm_tilesize();
        Extent {
            minx: FALSE_EASTING + self.ti as f64 * size,
            miny: self.tj as f64 * size,
            maxx: FALSE_EASTING + (self.ti as f64 + 1.0) * size,
            maxy: (self.tj as f64 + 1.0) * size,
        }
    }

    /// Raster extent in northern UTM coordinates (no false northing)
    pub fn utm_bounds(&self) -> Extent {
        self.utm_bounds_unpadded()
            .buffered(self.pad() as f64 * self.resolution())
    }

    pub fn hemisphere(&self) -> Hemisphere {
        if self.tj >= 0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }

    fn false_northing(&self) -> f64 {
        match self.hemisphere() {
            Hemisphere::North => 0.0,
            Hemisphere::South => SOUTH_FALSE_NORTHING,
        }
    }

    /// Raster extent in the coordinate system given by `cs_code`
    pub fn bounds(&self) -> Extent {
        self.utm_bounds().shifted_north(self.false_northing())
    }

    pub fn epsg(&self) -> u32 {
        epsg_code(self.zone, self.hemisphere())
    }

    /// Coordinate system code like `EPSG:32615`
    pub fn cs_code(&self) -> String {
        format!("EPSG:{}", self.epsg())
    }

    pub fn proj4(&self) -> String {
        let south = match self.hemisphere() {
            Hemisphere::North => "",
            Hemisphere::South => " +south",
        };
        format!(
            "+proj=utm +zone={}{} +datum=WGS84 +units=m +no_defs",
            self.zone, south
        )
    }

    pub fn wkt(&self) -> String {
        let hemisphere = match self.hemisphere() {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        };
        format!(
            concat!(
                "PROJCS[\"WGS 84 / UTM zone {zone}{hemisphere}\",",
                "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",",
                "SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],",
                "AUTHORITY[\"EPSG\",\"6326\"]],",
                "PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],",
                "UNIT[\"degree\",0.0174532925199433,AUTHORITY[\"EPSG\",\"9122\"]],",
                "AUTHORITY[\"EPSG\",\"4326\"]],",
                "PROJECTION[\"Transverse_Mercator\"],",
                "PARAMETER[\"latitude_of_origin\",0],",
                "PARAMETER[\"central_meridian\",{meridian}],",
                "PARAMETER[\"scale_factor\",0.9996],",
                "PARAMETER[\"false_easting\",500000],",
                "PARAMETER[\"false_northing\",{false_northing}],",
                "UNIT[\"metre\",1,AUTHORITY[\"EPSG\",\"9001\"]],",
                "AXIS[\"Easting\",EAST],AXIS[\"Northing\",NORTH],",
                "AUTHORITY[\"EPSG\",\"{epsg}\"]]"
            ),
            zone = self.zone,
            hemisphere = hemisphere,
            meridian = self.zone as i32 * 6 - 183,
            false_northing = self.false_northing(),
            epsg = self.epsg(),
        )
    }

    /// GDAL style geotransform `(left, resolution, 0, top, 0, -resolution)`
    pub fn geotrans(&self) -> [f64; 6] {
        let bounds = self.bounds();
        [
            bounds.minx,
            self.resolution(),
            0.0,
            bounds.maxy,
            0.0,
            -self.resolution(),
        ]
    }

    /// Raster outline in WGS84
    pub fn polygon(&self) -> Polygon<f64> {
        self.lonlat_polygon(&self.utm_bounds())
    }

    /// Lattice cell outline in WGS84
    pub fn polygon_unpadded(&self) -> Polygon<f64> {
        self.lonlat_polygon(&self.utm_bounds_unpadded())
    }

    fn lonlat_polygon(&self, extent: &Extent) -> Polygon<f64> {
        let ring: Vec<(f64, f64)> = extent
            .corners()
            .iter()
            .map(|&(x, y)| utm_to_lonlat(x, y, self.zone))
            .collect();
        Polygon::new(LineString::from(ring), vec![])
    }

    /// Raster outline in WGS84, split at the antimeridian and extended to a pole if needed
    pub fn footprint(&self) -> MultiPolygon<f64> {
        utm_extent_to_lonlat(&self.utm_bounds(), self.zone)
    }

    /// WGS84 position of the tile center
    pub fn center(&self) -> Point<f64> {
        let bounds = self.utm_bounds_unpadded();
        let (lon, lat) = utm_to_lonlat(
            (bounds.minx + bounds.maxx) / 2.0,
            (bounds.miny + bounds.maxy) / 2.0,
            self.zone,
        );
        Point::new(lon, lat)
    }

    /// Tile center beyond ±80° latitude
    pub fn is_polar(&self) -> bool {
        self.center().y().abs() > POLAR_LAT
    }

    fn min_col(&self) -> f64 {
        self.tilesize() as f64 * self.ti as f64 - self.pad() as f64
    }

    fn max_row(&self) -> f64 {
        self.tilesize() as f64 * (self.tj as f64 + 1.0) + self.pad() as f64
    }

    /// WGS84 position of the center of a pixel
    pub fn rowcol_to_lonlat(&self, row: f64, col: f64) -> Result<(f64, f64)> {
        if !row.is_finite() || !col.is_finite() {
            return Err(Error::row_col(format!(
                "Row and column must be finite, got ({}, {})",
                row, col
            )));
        }
        let resolution = self.resolution();
        let easting = (col + self.min_col() + 0.5) * resolution + FALSE_EASTING;
        let northing = (self.max_row() - row - 0.5) * resolution;
        let (lon, lat) = utm_to_lonlat(easting, northing, self.zone);
        if !lon.is_finite() || !lat.is_finite() {
            return Err(Error::lat_lon(format!(
                "Pixel ({}, {}) is not transformable to lat/lon",
                row, col
            )));
        }
        Ok((lon, lat))
    }

    /// Pixel containing a WGS84 position
    pub fn lonlat_to_rowcol(&self, lon: f64, lat: f64) -> Result<(i64, i64)> {
        if !lon.is_finite() {
            return Err(Error::lat_lon(format!(
                "Longitude must be finite, got {}",
                lon
            )));
        }
        if !(lat >= UTM_MIN_LAT && lat <= UTM_MAX_LAT) {
            return Err(Error::lat_lon(format!(
                "Latitude must be between -90 and 90, got {}",
                lat
            )));
        }
        let resolution = self.resolution();
        let (easting, northing) = lonlat_to_utm(lon, lat, self.zone);
        let row = (self.max_row() - northing / resolution).floor();
        let col = ((easting - FALSE_EASTING) / resolution - self.min_col()).floor();
        if !row.is_finite() || !col.is_finite() {
            return Err(Error::lat_lon(format!(
                "({}, {}) is not transformable to zone {}",
                lon, lat, self.zone
            )));
        }
        Ok((row as i64, col as i64))
    }

    pub fn rowcols_to_lonlats(&self, rows: &[f64], cols: &[f64]) -> Result<Vec<(f64, f64)>> {
        if rows.len() != cols.len() {
            return Err(Error::row_col(format!(
                "Got {} rows but {} columns",
                rows.len(),
                cols.len()
            )));
        }
        rows.iter()
            .zip(cols)
            .map(|(&row, &col)| self.rowcol_to_lonlat(row, col))
            .collect()
    }

    pub fn lonlats_to_rowcols(&self, lons: &[f64], lats: &[f64]) -> Result<Vec<(i64, i64)>> {
        if lons.len() != lats.len() {
            return Err(Error::row_col(format!(
                "Got {} longitudes but {} latitudes",
                lons.len(),
                lats.len()
            )));
        }
        lons.iter()
            .zip(lats)
            .map(|(&lon, &lat)| self.lonlat_to_rowcol(lon, lat))
            .collect()
    }

    fn subtile_grid(
        &self,
        subdivide: u32,
        new_resolution: Option<f64>,
        new_pad: Option<u32>,
    ) -> Result<Grid> {
        if subdivide == 0 || self.tilesize() % subdivide != 0 {
            return Err(Error::tile(format!(
                "Subdivide ratio {} must evenly divide the tilesize {}",
                subdivide,
                self.tilesize()
            )));
        }
        let resolution = new_resolution.unwrap_or_else(|| self.resolution());
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(Error::tile(format!(
                "Resolution must be greater than zero, got {}",
                resolution
            )));
        }
        let tilesize = self.utm_tilesize() / (subdivide as f64 * resolution);
        let rounded = tilesize.round();
        if rounded < 1.0 || (tilesize - rounded).abs() > FOOTPRINT_TOLERANCE * rounded {
            return Err(Error::tile(format!(
                "Resolution {} does not evenly divide the subtile footprint of {} m",
                resolution,
                self.utm_tilesize() / subdivide as f64
            )));
        }
        Grid::new(
            resolution,
            rounded as u32,
            new_pad.unwrap_or_else(|| self.pad()),
        )
    }

    /// Split into `subdivide` x `subdivide` tiles, row by row from the upper left
    pub fn subtile(
        &self,
        subdivide: u32,
        new_resolution: Option<f64>,
        new_pad: Option<u32>,
    ) -> Result<Subtiles> {
        let grid = self.subtile_grid(subdivide, new_resolution, new_pad)?;
        let (ul_ti, ul_tj) = self.subtile_origin(subdivide)?;
        Ok(Subtiles {
            grid,
            zone: self.zone,
            ul_ti,
            ul_tj,
            subdivide,
            index: 0,
        })
    }

    /// Single subtile at `row`, `col` counted from the upper left
    pub fn subtile_at(
        &self,
        subdivide: u32,
        row: u32,
        col: u32,
        new_resolution: Option<f64>,
        new_pad: Option<u32>,
    ) -> Result<Tile> {
        let grid = self.subtile_grid(subdivide, new_resolution, new_pad)?;
        if row >= subdivide || col >= subdivide {
            return Err(Error::row_col(format!(
                "Subtile ({}, {}) is outside of the {}x{} subdivision",
                row, col, subdivide, subdivide
            )));
        }
        let (ul_ti, ul_tj) = self.subtile_origin(subdivide)?;
        Ok(Tile::new(
            grid,
            self.zone,
            ul_ti + col as i64,
            ul_tj - row as i64,
        ))
    }

    /// Indices of the upper left subtile. All subtile indices must fit into `i64`.
    fn subtile_origin(&self, subdivide: u32) -> Result<(i64, i64)> {
        let n = subdivide as i64;
        let scaled = |index: i64| {
            index
                .checked_mul(n)
                .and_then(|min| min.checked_add(n - 1).map(|max| (min, max)))
        };
        match (scaled(self.ti), scaled(self.tj)) {
            (Some((ul_ti, _)), Some((_, ul_tj))) => Ok((ul_ti, ul_tj)),
            _ => Err(Error::tile(format!(
                "Tile indices of {} are out of range for subdivide ratio {}",
                self, subdivide
            ))),
        }
    }

    /// Same lattice cell with other raster parameters.
    ///
    /// When both `resolution` and `tilesize` are given, they must span the current footprint.
    pub fn assign(
        &self,
        resolution: Option<f64>,
        tilesize: Option<u32>,
        pad: Option<u32>,
    ) -> Result<Tile> {
        let grid = Grid::new(
            resolution.unwrap_or_else(|| self.resolution()),
            tilesize.unwrap_or_else(|| self.tilesize()),
            pad.unwrap_or_else(|| self.pad()),
        )?;
        if resolution.is_some() && tilesize.is_some() {
            let footprint = grid.utm_tilesize();
            if (footprint - self.utm_tilesize()).abs() > FOOTPRINT_TOLERANCE * self.utm_tilesize()
            {
                return Err(Error::tile(format!(
                    "Resolution {} and tilesize {} span {} m instead of {} m",
                    grid.resolution(),
                    grid.tilesize(),
                    footprint,
                    self.utm_tilesize()
                )));
            }
        }
        Ok(Tile::new(grid, self.zone, self.ti, self.tj))
    }

    pub fn record(&self) -> TileRecord {
        TileRecord::from_tile(self)
    }

    /// GeoJSON feature with the tile outline and its record as properties
    pub fn feature(&self) -> geojson::Feature {
        self.record().to_feature()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tile_key())
    }
}

/// Iterator over the subtiles of a tile
#[derive(Clone, Debug)]
pub struct Subtiles {
    grid: Grid,
    zone: u8,
    ul_ti: i64,
    ul_tj: i64,
    subdivide: u32,
    index: u64,
}

impl Subtiles {
    fn count_total(&self) -> u64 {
        self.subdivide as u64 * self.subdivide as u64
    }
}

impl Iterator for Subtiles {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.index >= self.count_total() {
            return None;
        }
        let n = self.subdivide as u64;
        let row = (self.index / n) as i64;
        let col = (self.index % n) as i64;
        self.index += 1;
        Some(Tile::new(
            self.grid.clone(),
            self.zone,
            self.ul_ti + col,
            self.ul_tj - row,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count_total() - self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Subtiles {}
