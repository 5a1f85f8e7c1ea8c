//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::args::{config_from_args, gen_config, service_from_args};
use crate::tiling_service::{ServiceError, TilingService};
use clap::{App, ArgMatches};
use utm_grid::{Grid, Shape};
use utm_tiler_core::core::{parse_config, read_config, ApplicationCfg, Config};

const AOI: &str = "src/test/aoi.geojson";

fn service() -> TilingService {
    TilingService::new(Grid::new(1.0, 500, 0).unwrap())
}

fn arg_matches(argv: &[&str]) -> ArgMatches<'static> {
    App::new("test")
        .args_from_usage(
            "-c, --config=[FILE] 'Load from custom config file'
             --resolution=[RESOLUTION] 'Pixel size in meters'
             --tilesize=[TILESIZE] 'Tile size in pixels'
             --pad=[PAD] 'Overlap pixels'
             --max-tiles=[N] 'Maximal number of tiles'
             --keys-only 'Output keys only'",
        )
        .get_matches_from(argv)
}

fn output_lines(out: Vec<u8>) -> Vec<String> {
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn test_tile_at() {
    let service = TilingService::new(Grid::new(10.0, 2, 49).unwrap());
    let record = service.tile_at(31.2089, 30.0131).unwrap();
    assert_eq!(record.key, "2:49:10.0:36:-8637:166079");
    assert!(matches!(
        service.tile_at(212.723, 0.0),
        Err(ServiceError::Grid(utm_grid::Error::InvalidLatLon(_)))
    ));
}

#[test]
fn test_tile_by_key() {
    let record = service().tile("2048:16:30.0:15:3:80").unwrap();
    assert_eq!(record.cs_code, "EPSG:32615");
    assert!(service().tile("2048:16:30.0:15:3").is_err());
}

#[test]
fn test_subtiles() {
    let tiles = service()
        .subtiles("1024:0:1.0:13:-7:387", 4, Some(2.0), Some(13))
        .unwrap();
    assert_eq!(tiles.len(), 16);
    assert!(service().subtiles("1024:0:1.0:13:-7:387", 11, None, None).is_err());
}

#[test]
fn test_cover() {
    let service = service();
    let mut out = Vec::new();
    let shape = service.shape(Some(AOI)).unwrap();
    let stats = service.cover(shape, &mut out, None, None, false).unwrap();
    assert_eq!(stats.tiles, 31);
    assert_eq!(stats.written, 31);
    let lines = output_lines(out);
    assert_eq!(lines.len(), 31);
    let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record["key"], "500:0:1.0:10:94:8359");
    assert_eq!(record["cs_code"], "EPSG:32610");
}

#[test]
fn test_cover_keys_only() {
    let mut service = service();
    service.tiling.keys_only = true;
    service.tiling.max_tiles = Some(5);
    let mut out = Vec::new();
    let shape = service.shape(Some(AOI)).unwrap();
    let stats = service.cover(shape, &mut out, None, None, false).unwrap();
    assert_eq!(stats.written, 5);
    let lines = output_lines(out);
    assert_eq!(lines[0], "500:0:1.0:10:94:8359");
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_cover_nodes() {
    let mut service = service();
    service.tiling.keys_only = true;
    let mut all = Vec::new();
    for nodeno in 0..3 {
        let mut out = Vec::new();
        let shape = service.shape(Some(AOI)).unwrap();
        let stats = service
            .cover(shape, &mut out, Some(3), Some(nodeno), false)
            .unwrap();
        assert_eq!(stats.tiles, 31);
        all.extend(output_lines(out));
    }
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 31);

    let shape = service.shape(Some(AOI)).unwrap();
    assert!(matches!(
        service.cover(shape, &mut Vec::new(), Some(3), Some(3), false),
        Err(ServiceError::Config(_))
    ));
}

#[test]
fn test_cover_invalid_shape() {
    let shape = Shape::from(r#"{"type": "Point", "coordinates": [0, 0]}"#);
    assert!(matches!(
        service().cover(shape, &mut Vec::new(), None, None, false),
        Err(ServiceError::Grid(utm_grid::Error::InvalidShape(_)))
    ));
    assert!(matches!(
        service().shape(None),
        Err(ServiceError::Config(_))
    ));
}

#[test]
fn test_drilldown() {
    let records = service()
        .drilldown(&[(-122.48, 37.768), (7.44, 46.95)], false)
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].zone, 10);
    assert_eq!(records[1].zone, 32);
}

#[test]
fn test_service_from_config() {
    let config: ApplicationCfg = read_config("src/test/example.toml").unwrap();
    let service = TilingService::from_config(&config).unwrap();
    assert_eq!(service.grid, Grid::new(1.0, 500, 0).unwrap());
    assert!(service.tiling.keys_only);
    assert_eq!(service.tiling.max_tiles, Some(1000));
}

#[test]
fn test_gen_config() {
    let config: ApplicationCfg = parse_config(TilingService::gen_config(), "").unwrap();
    let service = TilingService::from_config(&config).unwrap();
    assert_eq!(service.grid.tilesize(), 2048);

    let mut service = service;
    service.tiling.shape = Some("aoi.geojson".to_string());
    service.tiling.max_tiles = Some(7);
    let config: ApplicationCfg = parse_config(service.gen_runtime_config(), "").unwrap();
    assert_eq!(config.tiling.shape, Some("aoi.geojson".to_string()));
    assert_eq!(config.tiling.max_tiles, Some(7));
}

#[test]
fn test_args() {
    let args = arg_matches(&["test", "--resolution=1", "--tilesize=128", "--pad=8", "--keys-only"]);
    let config = config_from_args(&args).unwrap();
    assert_eq!(config.grid.resolution, 1.0);
    assert_eq!(config.grid.tilesize, 128);
    assert_eq!(config.grid.pad, 8);
    assert!(config.tiling.keys_only);

    let args = arg_matches(&["test", "--config=src/test/example.toml", "--max-tiles=3"]);
    let service = service_from_args(&args).unwrap();
    assert_eq!(service.grid.tilesize(), 500);
    assert_eq!(service.tiling.max_tiles, Some(3));

    let args = arg_matches(&["test", "--tilesize=large"]);
    assert!(config_from_args(&args).is_err());
    let args = arg_matches(&["test", "--tilesize=0"]);
    assert!(service_from_args(&args).is_err());

    let args = arg_matches(&["test"]);
    assert_eq!(gen_config(&args), Ok(TilingService::gen_config()));
    let args = arg_matches(&["test", "--pad=3"]);
    assert!(gen_config(&args).unwrap().contains("pad = 3"));
}

#[test]
fn test_progress_bar_on_request() {
    let service = service();
    assert!(service.progress_bar(false, "Tile ", 31).is_none());
    let pb = service.progress_bar(true, "Tile ", 31).unwrap();
    assert_eq!(pb.total, 31);

    let records = service.drilldown(&[(7.44, 46.95)], true).unwrap();
    assert_eq!(records.len(), 1);
}
