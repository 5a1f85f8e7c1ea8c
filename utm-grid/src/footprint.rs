//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Geographic footprint of projected boxes

use crate::grid::Extent;
use crate::utm::{
    utm_to_lonlat, FALSE_EASTING, UTM_MAX_LAT, UTM_MAX_LON, UTM_MAX_NORTH, UTM_MIN_LAT,
    UTM_MIN_LON, UTM_MIN_NORTH,
};
use geo::{BooleanOps, LineString, MultiPolygon, Polygon, Rect};
use std::cmp::Ordering;

/// Latitude of the cap closing a polygon around a pole, outside the valid range
const POLE_CAP_LAT: f64 = 91.0;

/// WGS84 polygon(s) covered by an extent projected in `zone`.
///
/// Extents touching a pole are turned into a polygon reaching the pole over the full
/// longitude range. Extents crossing the antimeridian are split into a western and an
/// eastern part, so every result lies within [-180, 180] x [-90, 90].
pub fn utm_extent_to_lonlat(extent: &Extent, zone: u8) -> MultiPolygon<f64> {
    let corners: Vec<(f64, f64)> = extent
        .corners()
        .iter()
        .map(|&(x, y)| utm_to_lonlat(x, y, zone))
        .collect();

    if extent.contains_point(FALSE_EASTING, UTM_MAX_NORTH) {
        return clip(&around_pole(corners, true), &world());
    }
    if extent.contains_point(FALSE_EASTING, UTM_MIN_NORTH) {
        return clip(&around_pole(corners, false), &world());
    }

    let (min_lon, max_lon) = corners
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(lon, _)| {
            (lo.min(lon), hi.max(lon))
        });
    if max_lon - min_lon > 180.0 {
        // corners on both sides of the antimeridian
        let western: Vec<(f64, f64)> = corners
            .iter()
            .map(|&(lon, lat)| if lon >= 0.0 { (lon - 360.0, lat) } else { (lon, lat) })
            .collect();
        let eastern: Vec<(f64, f64)> = corners
            .iter()
            .map(|&(lon, lat)| if lon < 0.0 { (lon + 360.0, lat) } else { (lon, lat) })
            .collect();
        let mut parts = clip(
            &polygon(western),
            &Rect::new((UTM_MIN_LON, UTM_MIN_LAT), (0.0, UTM_MAX_LAT)).to_polygon(),
        );
        let eastern = clip(
            &polygon(eastern),
            &Rect::new((0.0, UTM_MIN_LAT), (UTM_MAX_LON, UTM_MAX_LAT)).to_polygon(),
        );
        parts.0.extend(eastern.0);
        return parts;
    }

    MultiPolygon::new(vec![polygon(corners)])
}

fn polygon(points: Vec<(f64, f64)>) -> Polygon<f64> {
    Polygon::new(LineString::from(points), vec![])
}

fn world() -> Polygon<f64> {
    Rect::new((UTM_MIN_LON, UTM_MIN_LAT), (UTM_MAX_LON, UTM_MAX_LAT)).to_polygon()
}

fn clip(polygon: &Polygon<f64>, window: &Polygon<f64>) -> MultiPolygon<f64> {
    polygon.intersection(window)
}

// Corners ordered by longitude, repeated one turn east and west and closed with a
// cap beyond the pole.
fn around_pole(mut corners: Vec<(f64, f64)>, north: bool) -> Polygon<f64> {
    corners.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    let first = corners[0];
    let last = corners[corners.len() - 1];
    let mut ring = Vec::with_capacity(corners.len() + 4);
    if north {
        ring.push((last.0 - 360.0, last.1));
        ring.extend(corners.iter().cloned());
        ring.push((first.0 + 360.0, first.1));
        ring.push((first.0 + 360.0, POLE_CAP_LAT));
        ring.push((last.0 - 360.0, POLE_CAP_LAT));
    } else {
        ring.push((first.0 + 360.0, first.1));
        ring.extend(corners.iter().rev().cloned());
        ring.push((last.0 - 360.0, last.1));
        ring.push((last.0 - 360.0, -POLE_CAP_LAT));
        ring.push((first.0 + 360.0, -POLE_CAP_LAT));
    }
    polygon(ring)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utm::lonlat_to_utm;
    use assert_approx_eq::assert_approx_eq;
    use geo::BoundingRect;

    #[test]
    fn test_plain_extent() {
        let (x, y) = lonlat_to_utm(-93.0, 45.0, 15);
        let extent = Extent {
            minx: x - 1000.0,
            miny: y - 1000.0,
            maxx: x + 1000.0,
            maxy: y + 1000.0,
        };
        let footprint = utm_extent_to_lonlat(&extent, 15);
        assert_eq!(footprint.0.len(), 1);
        assert_eq!(footprint.0[0].exterior().0.len(), 5);
        let bbox = footprint.bounding_rect().unwrap();
        assert!(bbox.min().x < -93.0 && bbox.max().x > -93.0);
        assert!(bbox.min().y < 45.0 && bbox.max().y > 45.0);
    }

    #[test]
    fn test_antimeridian_split() {
        // zone 1 reaches past -180 at 60°N
        let (_, y) = lonlat_to_utm(-180.0, 60.0, 1);
        let extent = Extent {
            minx: FALSE_EASTING - 250000.0,
            miny: y - 10000.0,
            maxx: FALSE_EASTING - 100000.0,
            maxy: y + 10000.0,
        };
        let footprint = utm_extent_to_lonlat(&extent, 1);
        assert_eq!(footprint.0.len(), 2);
        let west = footprint.0[0].bounding_rect().unwrap();
        let east = footprint.0[1].bounding_rect().unwrap();
        assert!(west.max().x <= 0.0);
        assert_approx_eq!(west.min().x, -180.0, 1e-9);
        assert!(east.min().x >= 0.0);
        assert_approx_eq!(east.max().x, 180.0, 1e-9);
    }

    #[test]
    fn test_pole_extents() {
        let extent = Extent {
            minx: FALSE_EASTING - 100000.0,
            miny: UTM_MAX_NORTH - 100000.0,
            maxx: FALSE_EASTING + 100000.0,
            maxy: UTM_MAX_NORTH + 100000.0,
        };
        let bbox = utm_extent_to_lonlat(&extent, 31).bounding_rect().unwrap();
        assert_approx_eq!(bbox.min().x, -180.0, 1e-9);
        assert_approx_eq!(bbox.max().x, 180.0, 1e-9);
        assert_approx_eq!(bbox.max().y, 90.0, 1e-9);
        assert!(bbox.min().y > 88.0);

        let extent = Extent {
            minx: FALSE_EASTING - 100000.0,
            miny: UTM_MIN_NORTH - 100000.0,
            maxx: FALSE_EASTING + 100000.0,
            maxy: UTM_MIN_NORTH + 100000.0,
        };
        let bbox = utm_extent_to_lonlat(&extent, 31).bounding_rect().unwrap();
        assert_approx_eq!(bbox.min().x, -180.0, 1e-9);
        assert_approx_eq!(bbox.max().x, 180.0, 1e-9);
        assert_approx_eq!(bbox.min().y, -90.0, 1e-9);
        assert!(bbox.max().y < -88.0);
    }
}
