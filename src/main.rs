//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;

use clap::{App, AppSettings, ArgMatches, SubCommand};
use dotenv::dotenv;
use env_logger::Builder;
use log::{error, Record};
use serde::Serialize;
use std::env;
use std::io::{self, Write};
use std::process;
use std::str::FromStr;
use time;
use utm_grid::Tile;
use utm_tiler_core::core::shape_source::parse_points;
use utm_tiler_service::args::{gen_config, service_from_args};

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        let timestamp = time::strftime("%Y-%m-%d %H:%M:%S", &t).unwrap_or_default();
        writeln!(
            buf,
            "{}.{:03} {} {}",
            timestamp,
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let rust_log = match (args.value_of("loglevel"), env::var("RUST_LOG")) {
        (None, Ok(rust_log_env)) => rust_log_env,
        (loglevel, _) => loglevel.unwrap_or("info").to_string(),
    };
    builder.parse_filters(&rust_log);

    builder.init();
}

fn parse_value<T: FromStr>(args: &ArgMatches<'_>, name: &str) -> Result<Option<T>, String> {
    args.value_of(name)
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| format!("Error parsing '{}' value '{}'", name, s))
        })
        .transpose()
}

fn required<T: FromStr>(args: &ArgMatches<'_>, name: &str) -> Result<T, String> {
    parse_value(args, name)?.ok_or_else(|| format!("Missing '{}'", name))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn tile(args: &ArgMatches<'_>) -> Result<(), String> {
    let service = service_from_args(args)?;
    let lon: f64 = required(args, "lon")?;
    let lat: f64 = required(args, "lat")?;
    let record = service.tile_at(lon, lat).map_err(|e| e.to_string())?;
    print_json(&record)
}

fn key(args: &ArgMatches<'_>) -> Result<(), String> {
    let key: String = required(args, "key")?;
    let tile = Tile::from_key(&key).map_err(|e| e.to_string())?;
    print_json(&tile.record())
}

fn subtile(args: &ArgMatches<'_>) -> Result<(), String> {
    let key: String = required(args, "key")?;
    let subdivide: u32 = required(args, "subdivide")?;
    let resolution = parse_value(args, "resolution")?;
    let pad = parse_value(args, "pad")?;
    let tile = Tile::from_key(&key).map_err(|e| e.to_string())?;
    let subtiles = tile
        .subtile(subdivide, resolution, pad)
        .map_err(|e| e.to_string())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for subtile in subtiles {
        let line = if args.is_present("keys-only") {
            subtile.key()
        } else {
            serde_json::to_string(&subtile.record()).map_err(|e| e.to_string())?
        };
        writeln!(out, "{}", line).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn cover(args: &ArgMatches<'_>) -> Result<(), String> {
    let service = service_from_args(args)?;
    let shape = service
        .shape(args.value_of("shape"))
        .map_err(|e| e.to_string())?;
    let nodes = parse_value::<u8>(args, "nodes")?;
    let nodeno = parse_value::<u8>(args, "nodeno")?;
    let progress = parse_value::<bool>(args, "progress")?.unwrap_or(false);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    service
        .cover(shape, &mut out, nodes, nodeno, progress)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn drilldown(args: &ArgMatches<'_>) -> Result<(), String> {
    let service = service_from_args(args)?;
    let points = args
        .value_of("points")
        .ok_or_else(|| "Missing 'points' list".to_string())
        .and_then(parse_points)?;
    let progress = parse_value::<bool>(args, "progress")?.unwrap_or(false);
    let records = service
        .drilldown(&points, progress)
        .map_err(|e| e.to_string())?;
    print_json(&records)
}

fn genconfig(args: &ArgMatches<'_>) -> Result<(), String> {
    println!("{}", gen_config(args)?);
    Ok(())
}

fn main() {
    dotenv().ok();
    // http://kbknapp.github.io/clap-rs/clap/
    let mut app = App::new("utm_tiler")
        .version(crate_version!())
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("UTM tile grid: tile keys, subdivision and shape coverage")
        .subcommand(SubCommand::with_name("genconfig")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --resolution=[METERS] 'Pixel size in meters'
                                              --tilesize=[PIXELS] 'Tile width and height in pixels'
                                              --pad=[PIXELS] 'Overlap pixels on each side'")
                        .about("Generate configuration template"))
        .subcommand(SubCommand::with_name("tile")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --resolution=[METERS] 'Pixel size in meters'
                                              --tilesize=[PIXELS] 'Tile width and height in pixels'
                                              --pad=[PIXELS] 'Overlap pixels on each side'
                                              --lon=<LON> 'Longitude'
                                              --lat=<LAT> 'Latitude'")
                        .about("Tile containing a position"))
        .subcommand(SubCommand::with_name("key")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("--loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --key=<KEY> 'Tile key tilesize:pad:resolution:zone:ti:tj'")
                        .about("Tile of a tile key"))
        .subcommand(SubCommand::with_name("subtile")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("--loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --key=<KEY> 'Tile key tilesize:pad:resolution:zone:ti:tj'
                                              --subdivide=<N> 'Number of subtiles per side'
                                              --resolution=[METERS] 'Pixel size of the subtiles'
                                              --pad=[PIXELS] 'Overlap pixels of the subtiles'
                                              --keys-only 'Output tile keys only'")
                        .about("Subdivide a tile"))
        .subcommand(SubCommand::with_name("cover")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --resolution=[METERS] 'Pixel size in meters'
                                              --tilesize=[PIXELS] 'Tile width and height in pixels'
                                              --pad=[PIXELS] 'Overlap pixels on each side'
                                              --shape=[FILE] 'GeoJSON area of interest (- for stdin)'
                                              --keys-only 'Output tile keys only'
                                              --max-tiles=[NUM] 'Stop after this number of tiles'
                                              --nodes=[NUM] 'Number of tiling nodes'
                                              --nodeno=[NUM] 'Number of this nodes (0 <= n < nodes)'
                                              --progress=[true|false] 'Show progress bar'")
                        .about("Tiles covering a shape, as JSON lines"))
        .subcommand(SubCommand::with_name("drilldown")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --resolution=[METERS] 'Pixel size in meters'
                                              --tilesize=[PIXELS] 'Tile width and height in pixels'
                                              --pad=[PIXELS] 'Overlap pixels on each side'
                                              --points=<x1,y1,x2,y2,..> 'Drilldown points'
                                              --progress=[true|false] 'Show progress bar'")
                        .about("Tiles containing a list of positions"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        Result::Err(e) => {
            println!("{}", e);
        }
        Result::Ok(matches) => {
            let result = match matches.subcommand() {
                ("genconfig", Some(sub_m)) => {
                    init_logger(sub_m);
                    genconfig(sub_m)
                }
                ("tile", Some(sub_m)) => {
                    init_logger(sub_m);
                    tile(sub_m)
                }
                ("key", Some(sub_m)) => {
                    init_logger(sub_m);
                    key(sub_m)
                }
                ("subtile", Some(sub_m)) => {
                    init_logger(sub_m);
                    subtile(sub_m)
                }
                ("cover", Some(sub_m)) => {
                    init_logger(sub_m);
                    cover(sub_m)
                }
                ("drilldown", Some(sub_m)) => {
                    init_logger(sub_m);
                    drilldown(sub_m)
                }
                _ => {
                    let _ = app.print_help();
                    println!("");
                    Ok(())
                }
            };
            if let Err(e) = result {
                error!("{}", e);
                process::exit(1);
            }
        }
    }
}
