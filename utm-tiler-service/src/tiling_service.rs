//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use pbr::ProgressBar;
use std::io::{self, stderr, Stderr, Write};
use thiserror::Error;
use utm_grid::{Grid, Shape, Tile, TileRecord};
use utm_tiler_core::core::config::{ApplicationCfg, TilingCfg};
use utm_tiler_core::core::shape_source::read_shape;
use utm_tiler_core::core::Config;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Grid(#[from] utm_grid::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Config(String),
}

/// Summary of a `cover` run
#[derive(Serialize, PartialEq, Clone, Debug, Default)]
pub struct CoverStats {
    /// Tiles enumerated, including the ones of other nodes
    pub tiles: u64,
    /// Tiles written by this node
    pub written: u64,
    /// Tile estimate of the shape
    pub estimate: u64,
}

/// Tile lookups and shape coverage on a configured grid
#[derive(Clone, Debug)]
pub struct TilingService {
    pub grid: Grid,
    pub tiling: TilingCfg,
}

impl TilingService {
    pub fn new(grid: Grid) -> TilingService {
        TilingService {
            grid,
            tiling: TilingCfg::default(),
        }
    }
    /// Record of the tile containing a WGS84 position
    pub fn tile_at(&self, lon: f64, lat: f64) -> Result<TileRecord, ServiceError> {
        let tile = self.grid.tile_from_lonlat(lon, lat)?;
        debug!("({}, {}) is in tile {}", lon, lat, tile);
        Ok(tile.record())
    }
    /// Record of a tile key
    pub fn tile(&self, key: &str) -> Result<TileRecord, ServiceError> {
        Ok(Tile::from_key(key)?.record())
    }
    pub fn subtiles(
        &self,
        key: &str,
        subdivide: u32,
        resolution: Option<f64>,
        pad: Option<u32>,
    ) -> Result<Vec<Tile>, ServiceError> {
        let tile = Tile::from_key(key)?;
        Ok(tile.subtile(subdivide, resolution, pad)?.collect())
    }
    /// Shape given on the command line or the configured default
    pub fn shape(&self, source: Option<&str>) -> Result<Shape, ServiceError> {
        match source.or_else(|| self.tiling.shape.as_deref()) {
            Some(source) => read_shape(source).map_err(ServiceError::Config),
            None => Err(ServiceError::Config(
                "Either 'shape' or a [tiling] shape in the configuration is required".to_string(),
            )),
        }
    }
    /// Write a tile as JSON line, or its key only
    pub fn write_tile<W: Write>(&self, tile: &Tile, out: &mut W) -> Result<(), ServiceError> {
        if self.tiling.keys_only {
            writeln!(out, "{}", tile.key())?;
        } else {
            serde_json::to_writer(&mut *out, &tile.record())?;
            writeln!(out)?;
        }
        Ok(())
    }
    /// Progress bar on stderr, if requested
    pub(crate) fn progress_bar(
        &self,
        progress: bool,
        msg: &str,
        total: u64,
    ) -> Option<ProgressBar<Stderr>> {
        if !progress {
            return None;
        }
        let mut pb = ProgressBar::on(stderr(), total);
        pb.message(msg);
        pb.show_speed = false;
        pb.show_percent = false;
        pb.show_time_left = false;
        Some(pb)
    }
    /// Stream the tiles covering `shape`.
    ///
    /// With `nodes`, tile number `n` is written by node `n % nodes` only.
    pub fn cover<W: Write>(
        &self,
        shape: Shape,
        out: &mut W,
        nodes: Option<u8>,
        nodeno: Option<u8>,
        progress: bool,
    ) -> Result<CoverStats, ServiceError> {
        let nodes = nodes.unwrap_or(1).max(1) as u64;
        let nodeno = nodeno.unwrap_or(0) as u64;
        if nodeno >= nodes {
            return Err(ServiceError::Config(format!(
                "Node number {} must be lower than the number of nodes {}",
                nodeno, nodes
            )));
        }
        let polygons = shape.normalize()?;
        let estimate = self
            .grid
            .estimate_ntiles_from_shape(Shape::from(polygons.clone()))?;
        info!("Covering shape with grid {}, estimated {} tiles", self.grid, estimate);
        let coverage = self.grid.tiles_from_shape(Shape::from(polygons))?;

        let mut stats = CoverStats {
            estimate,
            ..Default::default()
        };
        let mut pb = self.progress_bar(progress, "Tile ", estimate);
        for tile in coverage {
            if let Some(max_tiles) = self.tiling.max_tiles {
                if stats.written >= max_tiles {
                    warn!("Stopping after {} tiles", max_tiles);
                    break;
                }
            }
            let skip = stats.tiles % nodes != nodeno;
            stats.tiles += 1;
            if let Some(pb) = pb.as_mut() {
                pb.inc();
            }
            if skip {
                continue;
            }
            self.write_tile(&tile, out)?;
            stats.written += 1;
        }
        if let Some(mut pb) = pb {
            pb.finish_println("");
        }
        info!("{} of {} tiles written", stats.written, stats.tiles);
        Ok(stats)
    }
    /// Records of the tiles containing a list of positions
    pub fn drilldown(
        &self,
        points: &[(f64, f64)],
        progress: bool,
    ) -> Result<Vec<TileRecord>, ServiceError> {
        let mut pb = self.progress_bar(progress, "Point ", points.len() as u64);
        let mut records = Vec::with_capacity(points.len());
        for &(lon, lat) in points {
            records.push(self.tile_at(lon, lat)?);
            if let Some(pb) = pb.as_mut() {
                pb.inc();
            }
        }
        if let Some(mut pb) = pb {
            pb.finish_println("");
        }
        Ok(records)
    }
}

impl<'a> Config<'a, ApplicationCfg> for TilingService {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let grid = Grid::from_config(&config.grid)?;
        Ok(TilingService {
            grid,
            tiling: config.tiling.clone(),
        })
    }
    fn gen_config() -> String {
        let mut config = String::new();
        config.push_str(TOML_HEADER);
        config.push_str(&Grid::gen_config());
        config.push_str(TOML_TILING);
        config
    }
    fn gen_runtime_config(&self) -> String {
        let mut config = String::new();
        config.push_str(TOML_HEADER);
        config.push_str(&self.grid.gen_runtime_config());
        config.push_str(&format!(
            r#"
[tiling]
{}keys_only = {}
{}
"#,
            match self.tiling.shape {
                Some(ref shape) => format!("shape = {:?}\n", shape),
                None => String::new(),
            },
            self.tiling.keys_only,
            match self.tiling.max_tiles {
                Some(max_tiles) => format!("max_tiles = {}", max_tiles),
                None => "#max_tiles = 100000".to_string(),
            }
        ));
        config
    }
}

const TOML_HEADER: &'static str = "# utm-tiler configuration\n";

const TOML_TILING: &'static str = r#"
[tiling]
# Default area of interest (GeoJSON)
#shape = "aoi.geojson"
# Output tile keys instead of tile records
keys_only = false
# Stop after this number of tiles
#max_tiles = 100000
"#;
