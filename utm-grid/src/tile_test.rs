//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::error::Error;
use crate::grid::{Extent, Grid};
use crate::tile::Tile;
use crate::utm::Hemisphere;
use assert_approx_eq::assert_approx_eq;
use geo::{Contains, Point};

#[test]
fn test_from_key() {
    let key = "2048:16:30.0:15:3:80";
    let tile = Tile::from_key(key).unwrap();
    assert_eq!(tile.key(), key);
    assert_eq!(tile.to_string(), key);
    assert_eq!(tile.tilesize(), 2048);
    assert_eq!(tile.pad(), 16);
    assert_eq!(tile.resolution(), 30.0);
    assert_eq!(tile.zone(), 15);
    assert_eq!(tile.ti(), 3);
    assert_eq!(tile.tj(), 80);
    assert_eq!(tile.tile_extent(), 2080);
    assert_eq!(tile.utm_tilesize(), 61440.0);
    assert_eq!(tile.utm_tile_extent(), 62400.0);
    assert_eq!(tile.hemisphere(), Hemisphere::North);
    assert_eq!(tile.epsg(), 32615);
    assert_eq!(tile.cs_code(), "EPSG:32615");
    assert_eq!(
        tile.bounds(),
        Extent {
            minx: 683840.0,
            miny: 4914720.0,
            maxx: 746240.0,
            maxy: 4977120.0,
        }
    );
    assert_eq!(tile.bounds(), tile.utm_bounds());
    assert_eq!(
        tile.utm_bounds_unpadded(),
        Extent {
            minx: 684320.0,
            miny: 4915200.0,
            maxx: 745760.0,
            maxy: 4976640.0,
        }
    );
    assert_eq!(
        tile.geotrans(),
        [683840.0, 30.0, 0.0, 4977120.0, 0.0, -30.0]
    );
}

#[test]
fn test_from_key_2() {
    let key = "2048:16:30.2:15:3:80";
    let tile = Tile::from_key(key).unwrap();
    assert_eq!(tile.key(), key);
    assert_eq!(tile.resolution(), 30.2);
    let geotrans = tile.geotrans();
    let bounds = tile.bounds();
    assert_eq!(geotrans[0], bounds.minx);
    assert_eq!(geotrans[3], bounds.maxy);
    assert_approx_eq!(bounds.width(), tile.utm_tile_extent(), 1e-6);
    assert_approx_eq!(bounds.height(), tile.utm_tile_extent(), 1e-6);
}

#[test]
fn test_key_roundtrip() {
    for key in &[
        "1:0:0.5:01:0:0",
        "128:8:1.0:10:-30:-4000",
        "4096:0:960.0:60:5:-1",
        "2:49:10.0:36:-8637:166079",
        "1000:0:1000.0:31:0:9",
    ] {
        assert_eq!(Tile::from_key(key).unwrap().key(), *key);
    }
    // zone is normalized to two digits
    assert_eq!(Tile::from_key("2048:16:30:5:3:80").unwrap().key(), "2048:16:30.0:05:3:80");
}

#[test]
fn test_key_normalization_negative_index() {
    let tile = Tile::from_key("2048:16:30:15:-5:15").unwrap();
    assert_eq!(tile.key(), "2048:16:30.0:15:-5:15");
    assert_eq!(tile.resolution(), 30.0);
    assert_eq!(tile.ti(), -5);
    assert_eq!(tile.tj(), 15);
    // west of the central meridian
    let bounds = tile.utm_bounds_unpadded();
    assert_eq!(bounds.minx, 500000.0 - 5.0 * 61440.0);
    assert_eq!(bounds.maxx, 500000.0 - 4.0 * 61440.0);
    assert_eq!(Tile::from_key(&tile.key()), Ok(tile));
}

#[test]
fn test_oversized_pad() {
    assert!(matches!(
        Tile::from_key("1:4294967295:1.0:15:0:0"),
        Err(Error::InvalidTile(_))
    ));
    assert!(matches!(
        Tile::from_key("2:2147483647:1.0:15:0:0"),
        Err(Error::InvalidTile(_))
    ));
    let tile = Tile::from_key("1:2147483647:1.0:15:0:0").unwrap();
    assert_eq!(tile.tile_extent(), u32::MAX);
    assert!(matches!(
        Grid::new(1.0, 1, u32::MAX),
        Err(Error::InvalidTile(_))
    ));
}

#[test]
fn test_invalid_keys() {
    for key in &[
        "2048:16:30.0:15:3",
        "blah:16:30.0:1:3:80",
        "2048:16.4:30.0:15:3:80",
        "2048:16:30.0:0:3:80",
        "2048:16:30.0:15:3.0:80",
        "",
    ] {
        assert!(
            matches!(Tile::from_key(key), Err(Error::InvalidTile(_))),
            "{}",
            key
        );
    }
}

#[test]
fn test_southern_tile() {
    let tile = Tile::from_key("2048:16:30.0:15:3:-80").unwrap();
    assert_eq!(tile.hemisphere(), Hemisphere::South);
    assert_eq!(tile.cs_code(), "EPSG:32715");
    assert_eq!(
        tile.utm_bounds(),
        Extent {
            minx: 683840.0,
            miny: -4915680.0,
            maxx: 746240.0,
            maxy: -4853280.0,
        }
    );
    assert_eq!(
        tile.bounds(),
        Extent {
            minx: 683840.0,
            miny: 5084320.0,
            maxx: 746240.0,
            maxy: 5146720.0,
        }
    );
    assert_eq!(tile.geotrans()[3], 5146720.0);
    assert!(tile.proj4().contains("+south"));
    assert!(tile.wkt().contains("UTM zone 15S"));
    assert!(tile.wkt().contains("\"false_northing\",10000000]"));
    assert!(tile.wkt().contains("\"EPSG\",\"32715\"]]"));
    assert!(tile.center().y() < 0.0);
}

#[test]
fn test_crs_descriptions() {
    let tile = Tile::from_key("2048:16:30.0:15:3:80").unwrap();
    assert_eq!(
        tile.proj4(),
        "+proj=utm +zone=15 +datum=WGS84 +units=m +no_defs"
    );
    let wkt = tile.wkt();
    assert!(wkt.starts_with("PROJCS[\"WGS 84 / UTM zone 15N\""));
    assert!(wkt.contains("\"central_meridian\",-93]"));
    assert!(wkt.contains("\"false_northing\",0]"));
    assert!(wkt.ends_with("AUTHORITY[\"EPSG\",\"32615\"]]"));
}

#[test]
fn test_polygons() {
    let tile = Tile::from_key("2048:16:30.0:15:3:80").unwrap();
    let polygon = tile.polygon();
    let unpadded = tile.polygon_unpadded();
    assert_eq!(polygon.exterior().0.len(), 5);
    assert!(polygon.contains(&unpadded));
    assert!(unpadded.contains(&tile.center()));
    let footprint = tile.footprint();
    assert_eq!(footprint.0.len(), 1);
    assert_eq!(footprint.0[0], polygon);
    assert!(!tile.is_polar());
}

#[test]
fn test_rowcol_conversions() {
    let tile = Tile::from_key("1000:0:1000.0:31:0:9").unwrap();
    let (lon, lat) = tile.rowcol_to_lonlat(567.0, 133.0).unwrap();
    assert_eq!(tile.lonlat_to_rowcol(lon, lat), Ok((567, 133)));

    let tile = Tile::from_key("2048:16:30.0:15:3:80").unwrap();
    let rows = [0.0, 16.0, 1000.0, 2079.0];
    let cols = [0.0, 2063.0, 7.0, 2079.0];
    let lonlats = tile.rowcols_to_lonlats(&rows, &cols).unwrap();
    let lons: Vec<f64> = lonlats.iter().map(|p| p.0).collect();
    let lats: Vec<f64> = lonlats.iter().map(|p| p.1).collect();
    let rowcols = tile.lonlats_to_rowcols(&lons, &lats).unwrap();
    for (i, &(row, col)) in rowcols.iter().enumerate() {
        assert_eq!(row as f64, rows[i]);
        assert_eq!(col as f64, cols[i]);
    }

    // upper left pixel center lies inside the raster outline
    let (lon, lat) = tile.rowcol_to_lonlat(0.0, 0.0).unwrap();
    assert!(tile.polygon().contains(&Point::new(lon, lat)));
    // and pixel (pad, pad) is the first one of the lattice cell
    let (lon, lat) = tile.rowcol_to_lonlat(16.0, 16.0).unwrap();
    assert!(tile.polygon_unpadded().contains(&Point::new(lon, lat)));
}

#[test]
fn test_invalid_rowcol() {
    let tile = Tile::from_key("2048:16:30.0:15:3:80").unwrap();
    assert!(matches!(
        tile.rowcols_to_lonlats(&[1.0, 1.0, 2.0, 3.0, 5.0], &[42.0]),
        Err(Error::InvalidRowCol(_))
    ));
    assert!(matches!(
        tile.rowcol_to_lonlat(f64::NAN, 1.0),
        Err(Error::InvalidRowCol(_))
    ));
    assert!(matches!(
        tile.lonlats_to_rowcols(&[1.0], &[]),
        Err(Error::InvalidRowCol(_))
    ));
    assert!(matches!(
        tile.lonlat_to_rowcol(-93.0, 91.0),
        Err(Error::InvalidLatLon(_))
    ));
}

#[test]
fn test_subtile() {
    let grid = Grid::new(1.0, 1024, 0).unwrap();
    let tile = grid.tile_from_lonlat(-105.944183, 35.691544).unwrap();
    let subtiles: Vec<Tile> = tile.subtile(8, None, None).unwrap().collect();
    assert_eq!(subtiles.len(), 64);
    for subtile in &subtiles {
        assert_eq!(subtile.tilesize(), 128);
        assert_eq!(subtile.pad(), 0);
        assert_eq!(subtile.resolution(), 1.0);
        assert_eq!(subtile.zone(), tile.zone());
    }

    // row by row from the upper left
    let parent = tile.utm_bounds_unpadded();
    let first = subtiles[0].utm_bounds_unpadded();
    assert_eq!(first.minx, parent.minx);
    assert_eq!(first.maxy, parent.maxy);
    let last = subtiles[63].utm_bounds_unpadded();
    assert_eq!(last.maxx, parent.maxx);
    assert_eq!(last.miny, parent.miny);
    assert_eq!(subtiles[1].ti(), subtiles[0].ti() + 1);
    assert_eq!(subtiles[8].tj(), subtiles[0].tj() - 1);

    // exact partition of the parent cell
    let area: f64 = subtiles
        .iter()
        .map(|t| {
            let b = t.utm_bounds_unpadded();
            b.width() * b.height()
        })
        .sum();
    assert_eq!(area, parent.width() * parent.height());
    for subtile in &subtiles {
        let b = subtile.utm_bounds_unpadded();
        assert!(b.minx >= parent.minx && b.maxx <= parent.maxx);
        assert!(b.miny >= parent.miny && b.maxy <= parent.maxy);
    }
}

#[test]
fn test_subtile_with_params() {
    let grid = Grid::new(1.0, 1024, 0).unwrap();
    let tile = grid.tile_from_lonlat(-105.944183, 35.691544).unwrap();
    let subtiles = tile.subtile(4, Some(2.0), Some(13)).unwrap();
    assert_eq!(subtiles.len(), 16);
    for subtile in subtiles {
        assert_eq!(subtile.tilesize(), 128);
        assert_eq!(subtile.pad(), 13);
        assert_eq!(subtile.resolution(), 2.0);
    }
}

#[test]
fn test_bad_subtile() {
    let grid = Grid::new(1.0, 1024, 0).unwrap();
    let tile = grid.tile_from_lonlat(-105.944183, 35.691544).unwrap();
    assert!(matches!(
        tile.subtile(11, None, None),
        Err(Error::InvalidTile(_))
    ));
    assert!(matches!(
        tile.subtile(8, Some(13.0), None),
        Err(Error::InvalidTile(_))
    ));
    assert!(matches!(
        tile.subtile(0, None, None),
        Err(Error::InvalidTile(_))
    ));
}

#[test]
fn test_subtile_index_range() {
    let key = format!("1024:0:1.0:13:{}:{}", i64::MAX / 2, i64::MIN / 2);
    let tile = Tile::from_key(&key).unwrap();
    assert!(matches!(
        tile.subtile(4, None, None),
        Err(Error::InvalidTile(_))
    ));
    assert!(matches!(
        tile.subtile_at(4, 0, 0, None, None),
        Err(Error::InvalidTile(_))
    ));
    let tile = Tile::from_key(&format!("1024:0:1.0:13:0:{}", i64::MAX / 2)).unwrap();
    assert_eq!(tile.subtile(2, None, None).unwrap().len(), 4);
    let last = tile.subtile_at(2, 0, 1, None, None).unwrap();
    assert_eq!(last.ti(), 1);
    assert_eq!(last.tj(), i64::MAX);
    assert!(last.utm_bounds_unpadded().maxy > 0.0);
}

#[test]
fn test_subtile_at() {
    let tile = Tile::from_key("1024:0:1.0:13:-7:387").unwrap();
    let subtiles: Vec<Tile> = tile.subtile(8, None, None).unwrap().collect();
    assert_eq!(tile.subtile_at(8, 0, 0, None, None), Ok(subtiles[0].clone()));
    assert_eq!(tile.subtile_at(8, 2, 5, None, None), Ok(subtiles[21].clone()));
    assert_eq!(tile.subtile_at(8, 7, 7, None, None), Ok(subtiles[63].clone()));
    assert!(matches!(
        tile.subtile_at(8, 8, 0, None, None),
        Err(Error::InvalidRowCol(_))
    ));
}

#[test]
fn test_subtile_size_hint() {
    let tile = Tile::from_key("1024:0:1.0:13:-7:387").unwrap();
    let mut subtiles = tile.subtile(2, None, None).unwrap();
    assert_eq!(subtiles.len(), 4);
    subtiles.next();
    assert_eq!(subtiles.len(), 3);
    assert_eq!(subtiles.count(), 3);
}

#[test]
fn test_assign() {
    let tile = Tile::from_key("2048:16:0.2:15:3:80").unwrap();
    let other = tile.assign(Some(1.0), None, None).unwrap();
    assert_eq!(other.key(), "2048:16:1.0:15:3:80");

    let other = tile.assign(Some(0.1), Some(4096), Some(0)).unwrap();
    assert_eq!(other.key(), "4096:0:0.1:15:3:80");
    assert_eq!(other.utm_bounds_unpadded(), tile.utm_bounds_unpadded());

    let other = tile.assign(None, None, Some(32)).unwrap();
    assert_eq!(other.key(), "2048:32:0.2:15:3:80");
}

#[test]
fn test_bad_assign() {
    let tile = Tile::from_key("2048:16:0.2:15:3:80").unwrap();
    assert!(matches!(
        tile.assign(Some(1.0), Some(512), None),
        Err(Error::InvalidTile(_))
    ));
    assert!(matches!(
        tile.assign(Some(-1.0), None, None),
        Err(Error::InvalidTile(_))
    ));
}

#[test]
fn test_record() {
    let tile = Tile::from_key("2048:16:30.0:15:3:80").unwrap();
    let record = tile.record();
    assert_eq!(record.key, tile.key());
    assert_eq!(record.size, [2080, 2080]);
    assert_eq!(record.output_bounds, [683840.0, 4914720.0, 746240.0, 4977120.0]);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["key"], "2048:16:30.0:15:3:80");
    assert_eq!(json["cs_code"], "EPSG:32615");
    assert_eq!(json["outputBounds"][2], 746240.0);
    assert_eq!(json["geometry"]["type"], "Polygon");
    assert_eq!(json["zone"], 15);
    assert_eq!(json["tj"], 80);

    let parsed: crate::record::TileRecord = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, record);
}

#[test]
fn test_feature() {
    let tile = Tile::from_key("128:8:1.0:10:-30:4000").unwrap();
    let feature = tile.feature();
    assert!(feature.geometry.is_some());
    let properties = feature.properties.unwrap();
    assert_eq!(properties["key"], "128:8:1.0:10:-30:4000");
    assert!(!properties.contains_key("geometry"));
}
