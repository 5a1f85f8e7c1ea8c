//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Area of interest input

use std::fs::File;
use std::io::{self, Read};
use utm_grid::Shape;

/// Read a GeoJSON shape.
///
/// `source` is a file path, `-` for stdin or an inline GeoJSON document.
pub fn read_shape(source: &str) -> Result<Shape, String> {
    let geojson = if source.trim_start().starts_with('{') {
        source.to_string()
    } else if source == "-" {
        let mut geojson = String::new();
        io::stdin()
            .read_to_string(&mut geojson)
            .map_err(|e| format!("Error while reading shape from stdin: [{}]", e))?;
        geojson
    } else {
        info!("Reading shape from {}", source);
        let mut file =
            File::open(source).map_err(|_| format!("Could not find shape file '{}'!", source))?;
        let mut geojson = String::new();
        file.read_to_string(&mut geojson)
            .map_err(|e| format!("Error while reading shape: [{}]", e))?;
        geojson
    };
    Ok(Shape::GeoJsonString(geojson))
}

/// Parse a point list `x1,y1,x2,y2,..`
pub fn parse_points(points: &str) -> Result<Vec<(f64, f64)>, String> {
    let coords = points
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid coordinate '{}'", v))
        })
        .collect::<Result<Vec<f64>, String>>()?;
    if coords.len() % 2 != 0 {
        return Err(format!(
            "Points need pairs of coordinates, got {} values",
            coords.len()
        ));
    }
    Ok(coords.chunks(2).map(|xy| (xy[0], xy[1])).collect())
}
