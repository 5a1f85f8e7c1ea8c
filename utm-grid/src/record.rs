//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::tile::Tile;
use geojson::{Feature, JsonObject};
use serde_json::Value;

/// Flat description of a tile, as consumed by raster warping and JSON output
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct TileRecord {
    pub key: String,
    pub resolution: f64,
    pub tilesize: u32,
    pub pad: u32,
    pub cs_code: String,
    /// `[minx, miny, maxx, maxy]` in `cs_code` coordinates
    #[serde(rename = "outputBounds")]
    pub output_bounds: [f64; 4],
    /// Raster width and height in pixels
    pub size: [u32; 2],
    pub zone: u8,
    pub ti: i64,
    pub tj: i64,
    pub geotrans: [f64; 6],
    pub proj4: String,
    pub wkt: String,
    /// Raster outline in WGS84
    pub geometry: geojson::Geometry,
}

impl TileRecord {
    pub fn from_tile(tile: &Tile) -> TileRecord {
        let extent = tile.tile_extent();
        TileRecord {
            key: tile.key(),
            resolution: tile.resolution(),
            tilesize: tile.tilesize(),
            pad: tile.pad(),
            cs_code: tile.cs_code(),
            output_bounds: tile.bounds().to_array(),
            size: [extent, extent],
            zone: tile.zone(),
            ti: tile.ti(),
            tj: tile.tj(),
            geotrans: tile.geotrans(),
            proj4: tile.proj4(),
            wkt: tile.wkt(),
            geometry: geojson::Geometry::new(geojson::Value::from(&tile.polygon())),
        }
    }

    /// All members except the geometry
    pub fn properties(&self) -> JsonObject {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut properties)) => {
                properties.remove("geometry");
                properties
            }
            _ => JsonObject::new(),
        }
    }

    pub fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: Some(geojson::feature::Id::String(self.key.clone())),
            properties: Some(self.properties()),
            foreign_members: None,
        }
    }
}
