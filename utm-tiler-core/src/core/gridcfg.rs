//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::GridCfg;
use crate::core::Config;
use utm_grid::Grid;

impl<'a> Config<'a, GridCfg> for Grid {
    fn from_config(grid_cfg: &GridCfg) -> Result<Self, String> {
        Grid::new(grid_cfg.resolution, grid_cfg.tilesize, grid_cfg.pad)
            .map_err(|e| format!("Invalid grid definition: {}", e))
    }
    fn gen_config() -> String {
        let toml = r#"
[grid]
resolution = 10.0  # Pixel size in meters
tilesize = 2048    # Tile width and height in pixels
pad = 16           # Overlap pixels on each side
"#;
        toml.to_string()
    }
    fn gen_runtime_config(&self) -> String {
        format!(
            r#"
[grid]
resolution = {:?}
tilesize = {}
pad = {}
"#,
            self.resolution(),
            self.tilesize(),
            self.pad()
        )
    }
}
