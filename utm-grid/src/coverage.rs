//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile coverage iterators
//!
//! A shape is clipped to each UTM zone it touches. Within a zone, the range of candidate
//! tiles is refined as a quadtree: quads outside the shape are pruned, quads within the
//! shape are yielded as a whole and small quads are tested tile by tile.

use crate::footprint::utm_extent_to_lonlat;
use crate::grid::{Extent, Grid};
use crate::tile::Tile;
use crate::utm::{
    lonlat_to_utm, FALSE_EASTING, MAX_ZONE, MIN_ZONE, UTM_MAX_EAST, UTM_MAX_LAT, UTM_MIN_EAST,
    UTM_MIN_LAT, ZONE_WIDTH_LON,
};
use geo::{
    BooleanOps, BoundingRect, Contains, Coord, Intersects, MapCoords, MultiPolygon, Rect,
};
use std::collections::{HashSet, VecDeque};

/// Quads up to this number of tiles along both axes are tested tile by tile
const EXHAUSTIVE_QUAD_SIZE: i64 = 3;

/// Margin in meters per degree latitude of the shape, covering curved tile edges
const MARGIN_PER_DEGREE: f64 = 2000.0;

/// Tile index range, max exclusive
#[derive(PartialEq, Clone, Copy, Debug)]
struct TileRange {
    min_ti: i64,
    min_tj: i64,
    max_ti: i64,
    max_tj: i64,
}

impl TileRange {
    fn width(&self) -> i64 {
        self.max_ti - self.min_ti
    }
    fn height(&self) -> i64 {
        self.max_tj - self.min_tj
    }
    fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
    fn utm_extent(&self, step: f64) -> Extent {
        Extent {
            minx: FALSE_EASTING + self.min_ti as f64 * step,
            miny: self.min_tj as f64 * step,
            maxx: FALSE_EASTING + self.max_ti as f64 * step,
            maxy: self.max_tj as f64 * step,
        }
    }
    /// Children in the order they are pushed on the quad stack
    fn split(&self) -> Vec<TileRange> {
        let mid_ti = (self.min_ti + self.max_ti).div_euclid(2);
        let mid_tj = (self.min_tj + self.max_tj).div_euclid(2);
        if self.height() <= 1 {
            vec![
                TileRange {
                    max_ti: mid_ti,
                    ..*self
                },
                TileRange {
                    min_ti: mid_ti,
                    ..*self
                },
            ]
        } else if self.width() <= 1 {
            vec![
                TileRange {
                    max_tj: mid_tj,
                    ..*self
                },
                TileRange {
                    min_tj: mid_tj,
                    ..*self
                },
            ]
        } else {
            vec![
                TileRange {
                    min_ti: self.min_ti,
                    min_tj: mid_tj,
                    max_ti: mid_ti,
                    max_tj: self.max_tj,
                },
                TileRange {
                    min_ti: mid_ti,
                    min_tj: mid_tj,
                    max_ti: self.max_ti,
                    max_tj: self.max_tj,
                },
                TileRange {
                    min_ti: self.min_ti,
                    min_tj: self.min_tj,
                    max_ti: mid_ti,
                    max_tj: mid_tj,
                },
                TileRange {
                    min_ti: mid_ti,
                    min_tj: self.min_tj,
                    max_ti: self.max_ti,
                    max_tj: mid_tj,
                },
            ]
        }
    }
}

/// Row-by-row iterator over a tile range, south to north
struct RangeIterator {
    range: TileRange,
    ti: i64,
    tj: i64,
}

impl RangeIterator {
    fn new(range: TileRange) -> RangeIterator {
        RangeIterator {
            range,
            ti: range.min_ti,
            tj: range.min_tj,
        }
    }
}

impl Iterator for RangeIterator {
    /// `(ti, tj)`
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.range.is_empty() || self.tj >= self.range.max_tj {
            return None;
        }
        let current = (self.ti, self.tj);
        if self.ti < self.range.max_ti - 1 {
            self.ti += 1;
        } else {
            self.ti = self.range.min_ti;
            self.tj += 1;
        }
        Some(current)
    }
}

/// Quadtree walk over the tiles of a single zone
struct ZoneWalker {
    zone: u8,
    step: f64,
    min_lon: f64,
    max_lon: f64,
    /// Shape clipped to the zone, WGS84
    polygon: MultiPolygon<f64>,
    /// Shape clipped to the zone, projected
    polygon_utm: MultiPolygon<f64>,
    margin: f64,
    quads: Vec<TileRange>,
    checked: VecDeque<(i64, i64)>,
    accepted: Option<RangeIterator>,
}

impl ZoneWalker {
    fn new(polygon: MultiPolygon<f64>, zone: u8, step: f64) -> Option<ZoneWalker> {
        let bbox = polygon.bounding_rect()?;
        let margin = MARGIN_PER_DEGREE * (bbox.max().y - bbox.min().y).abs();
        let polygon_utm = polygon.map_coords(move |c| {
            let (x, y) = lonlat_to_utm(c.x, c.y, zone);
            Coord { x, y }
        });
        let bbox_utm = polygon_utm.bounding_rect()?;
        let min_east = (bbox_utm.min().x - margin).max(UTM_MIN_EAST);
        let max_east = (bbox_utm.max().x + margin).min(UTM_MAX_EAST);
        let min_north = bbox_utm.min().y - margin;
        let max_north = bbox_utm.max().y + margin;
        let range = TileRange {
            min_ti: ((min_east - FALSE_EASTING) / step).floor() as i64,
            min_tj: (min_north / step).floor() as i64,
            max_ti: ((max_east - FALSE_EASTING) / step).ceil() as i64,
            max_tj: (max_north / step).ceil() as i64,
        };
        debug!("Walking zone {} over tile range {:?}", zone, range);
        let (min_lon, max_lon) = zone_lon_range(zone);
        Some(ZoneWalker {
            zone,
            step,
            min_lon,
            max_lon,
            polygon,
            polygon_utm,
            margin,
            quads: vec![range],
            checked: VecDeque::new(),
            accepted: None,
        })
    }

    fn cell_intersects(&self, ti: i64, tj: i64) -> bool {
        let cell = TileRange {
            min_ti: ti,
            min_tj: tj,
            max_ti: ti + 1,
            max_tj: tj + 1,
        };
        utm_extent_to_lonlat(&cell.utm_extent(self.step), self.zone)
            .iter()
            .any(|part| self.polygon.intersects(part))
    }

    fn visit(&mut self, quad: TileRange) {
        let extent = quad.utm_extent(self.step);
        let footprint = utm_extent_to_lonlat(&extent, self.zone);
        let bbox = match footprint.bounding_rect() {
            Some(bbox) => bbox,
            None => return,
        };
        if bbox.min().x > self.max_lon || bbox.max().x < self.min_lon {
            return;
        }
        if quad.width() <= EXHAUSTIVE_QUAD_SIZE && quad.height() <= EXHAUSTIVE_QUAD_SIZE {
            for (ti, tj) in RangeIterator::new(quad) {
                if self.cell_intersects(ti, tj) {
                    self.checked.push_back((ti, tj));
                }
            }
        } else if self.polygon.contains(&footprint) {
            self.accepted = Some(RangeIterator::new(quad));
        } else if self
            .polygon_utm
            .intersects(&extent.buffered(self.margin).to_polygon())
        {
            self.quads.extend(quad.split());
        }
    }
}

impl Iterator for ZoneWalker {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cell) = self.checked.pop_front() {
                return Some(cell);
            }
            if let Some(cell) = self.accepted.as_mut().and_then(|cells| cells.next()) {
                return Some(cell);
            }
            self.accepted = None;
            let quad = self.quads.pop()?;
            self.visit(quad);
        }
    }
}

/// Longitude range of a zone
fn zone_lon_range(zone: u8) -> (f64, f64) {
    let min_lon = zone as f64 * ZONE_WIDTH_LON - 186.0;
    (min_lon, min_lon + ZONE_WIDTH_LON)
}

/// Zones of a polygon, visited from west to east
struct ZoneSweep {
    polygon: MultiPolygon<f64>,
    bbox: Rect<f64>,
    next_zone: u8,
    max_zone: u8,
}

impl ZoneSweep {
    fn new(polygon: MultiPolygon<f64>) -> Option<ZoneSweep> {
        let bbox = polygon.bounding_rect()?;
        let zone_of = |lon: f64| 1 + ((lon + 180.0) / ZONE_WIDTH_LON).floor() as i64;
        let min_zone = zone_of(bbox.min().x).max(MIN_ZONE as i64);
        let max_zone = zone_of(bbox.max().x).min(MAX_ZONE as i64);
        Some(ZoneSweep {
            polygon,
            bbox,
            next_zone: min_zone as u8,
            max_zone: max_zone as u8,
        })
    }

    fn next_walker(&mut self, step: f64) -> Option<ZoneWalker> {
        while self.next_zone <= self.max_zone {
            let zone = self.next_zone;
            self.next_zone += 1;
            let (min_lon, max_lon) = zone_lon_range(zone);
            let clipped = if self.bbox.min().x >= min_lon && self.bbox.max().x <= max_lon {
                self.polygon.clone()
            } else {
                let band = Rect::new((min_lon, UTM_MIN_LAT), (max_lon, UTM_MAX_LAT));
                self.polygon
                    .intersection(&MultiPolygon::new(vec![band.to_polygon()]))
            };
            if clipped.0.is_empty() {
                continue;
            }
            if let Some(walker) = ZoneWalker::new(clipped, zone, step) {
                return Some(walker);
            }
        }
        None
    }
}

/// Lazy iterator over the tiles of a grid intersecting a list of polygons.
///
/// Every tile is yielded once, even when it is covered by several polygons or zones.
pub struct TileCoverage {
    grid: Grid,
    polygons: std::vec::IntoIter<MultiPolygon<f64>>,
    sweep: Option<ZoneSweep>,
    walker: Option<ZoneWalker>,
    seen: HashSet<(u8, i64, i64)>,
}

impl TileCoverage {
    pub(crate) fn new(grid: Grid, polygons: Vec<MultiPolygon<f64>>) -> TileCoverage {
        TileCoverage {
            grid,
            polygons: polygons.into_iter(),
            sweep: None,
            walker: None,
            seen: HashSet::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Keys instead of tiles
    pub fn keys(self) -> impl Iterator<Item = String> {
        self.map(|tile| tile.key())
    }
}

impl Iterator for TileCoverage {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        loop {
            if let Some(walker) = self.walker.as_mut() {
                match walker.next() {
                    Some((ti, tj)) => {
                        let zone = walker.zone;
                        if self.seen.insert((zone, ti, tj)) {
                            return Some(Tile::new(self.grid.clone(), zone, ti, tj));
                        }
                    }
                    None => self.walker = None,
                }
                continue;
            }
            if let Some(sweep) = self.sweep.as_mut() {
                match sweep.next_walker(self.grid.utm_tilesize()) {
                    Some(walker) => self.walker = Some(walker),
                    None => self.sweep = None,
                }
                continue;
            }
            let polygon = self.polygons.next()?;
            self.sweep = ZoneSweep::new(polygon);
        }
    }
}
