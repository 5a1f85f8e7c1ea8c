//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! A library for padded UTM tile grid calculations
//!
//! Every UTM zone is divided into square tiles of `tilesize * resolution` meters, with the
//! lattice origin at the zone's central meridian on the equator. Tiles are identified by
//! string keys `tilesize:pad:resolution:zone:ti:tj`.
//!
//! ## Tiles by key or position
//!
//! ```rust
//! use utm_grid::{Extent, Grid, Tile};
//!
//! let tile = Tile::from_key("2048:16:30.0:15:3:80").unwrap();
//! assert_eq!(tile.cs_code(), "EPSG:32615");
//! assert_eq!(
//!     tile.bounds(),
//!     Extent {
//!         minx: 683840.0,
//!         miny: 4914720.0,
//!         maxx: 746240.0,
//!         maxy: 4977120.0,
//!     }
//! );
//!
//! let grid = Grid::new(10.0, 2, 49).unwrap();
//! let tile = grid.tile_from_lonlat(31.2089, 30.0131).unwrap();
//! assert_eq!(tile.key(), "2:49:10.0:36:-8637:166079");
//! ```
//!
//! ## Tile coverage
//!
//! ```rust
//! use utm_grid::Grid;
//!
//! let shape = r#"{"type": "Polygon", "coordinates": [[
//!     [-122.51140471760839, 37.77130087547876], [-122.45475646845254, 37.77475476721895],
//!     [-122.45303985468301, 37.76657207194229], [-122.51057242081689, 37.763446782666094],
//!     [-122.51140471760839, 37.77130087547876]]]}"#;
//! let grid = Grid::new(1.0, 500, 0).unwrap();
//! for key in grid.tiles_from_shape(shape).unwrap().keys() {
//!     println!("{}", key);
//! }
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod coverage;
mod error;
mod footprint;
mod grid;
mod key;
mod record;
mod shape;
mod tile;
#[cfg(test)]
mod tile_test;
pub mod utm;

pub use coverage::TileCoverage;
pub use error::{Error, Result};
pub use footprint::utm_extent_to_lonlat;
pub use grid::{Extent, Grid, NTILES_WARNING_THRESHOLD};
pub use key::{format_resolution, TileKey};
pub use record::TileRecord;
pub use shape::{GeoInterface, Shape};
pub use tile::{Subtiles, Tile};
pub use utm::{Hemisphere, UtmZone};
