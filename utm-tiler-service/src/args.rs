//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Service setup from command line arguments

use crate::tiling_service::TilingService;
use clap::ArgMatches;
use std::str::FromStr;
use utm_tiler_core::core::config::DEFAULT_CONFIG;
use utm_tiler_core::core::{parse_config, read_config, ApplicationCfg, Config};

fn parse_arg<T: FromStr>(args: &ArgMatches<'_>, name: &str) -> Result<Option<T>, String> {
    match args.value_of(name) {
        Some(value) => T::from_str(value)
            .map(Some)
            .map_err(|_| format!("Invalid value for '{}': {}", name, value)),
        None => Ok(None),
    }
}

/// Configuration file given with `--config`, or defaults overridden by grid arguments
pub fn config_from_args(args: &ArgMatches<'_>) -> Result<ApplicationCfg, String> {
    let mut config: ApplicationCfg = if let Some(cfgpath) = args.value_of("config") {
        info!("Reading configuration from '{}'", cfgpath);
        read_config(cfgpath).map_err(|err| format!("Error reading configuration - {}", err))?
    } else {
        parse_config(DEFAULT_CONFIG.to_string(), "")?
    };
    if let Some(resolution) = parse_arg(args, "resolution")? {
        config.grid.resolution = resolution;
    }
    if let Some(tilesize) = parse_arg(args, "tilesize")? {
        config.grid.tilesize = tilesize;
    }
    if let Some(pad) = parse_arg(args, "pad")? {
        config.grid.pad = pad;
    }
    if args.is_present("keys-only") {
        config.tiling.keys_only = true;
    }
    if let Some(max_tiles) = parse_arg(args, "max-tiles")? {
        config.tiling.max_tiles = Some(max_tiles);
    }
    Ok(config)
}

pub fn service_from_args(args: &ArgMatches<'_>) -> Result<TilingService, String> {
    let config = config_from_args(args)?;
    TilingService::from_config(&config)
}

pub fn gen_config(args: &ArgMatches<'_>) -> Result<String, String> {
    if args.value_of("config").is_some()
        || args.value_of("resolution").is_some()
        || args.value_of("tilesize").is_some()
        || args.value_of("pad").is_some()
    {
        let service = service_from_args(args)?;
        Ok(service.gen_runtime_config())
    } else {
        Ok(TilingService::gen_config())
    }
}
