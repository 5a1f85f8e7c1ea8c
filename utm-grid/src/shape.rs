//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Input shapes of tile coverage
//!
//! Every accepted representation is reduced to a list of WGS84 (multi)polygons.

use crate::error::{Error, Result};
use crate::utm::{UTM_MAX_LAT, UTM_MAX_LON, UTM_MIN_LAT, UTM_MIN_LON};
use geo::{BoundingRect, Geometry, MultiPolygon, Polygon};
use geojson::GeoJson;
use serde_json::Value;
use std::convert::TryFrom;
use std::fmt;

/// Objects exposing a GeoJSON representation of themselves
pub trait GeoInterface {
    fn geo_interface(&self) -> GeoJson;
}

/// Anything describing an area on the globe in WGS84 coordinates
pub enum Shape {
    /// Serialized GeoJSON geometry, feature or feature collection
    GeoJsonString(String),
    GeoJson(GeoJson),
    /// GeoJSON like mapping. Objects without `type` are looked up for `geometry` or `features`.
    Json(Value),
    Geometry(Geometry<f64>),
    GeoInterface(Box<dyn GeoInterface>),
    Collection(Vec<Shape>),
}

impl Shape {
    pub fn from_geo_interface<G: GeoInterface + 'static>(object: G) -> Shape {
        Shape::GeoInterface(Box::new(object))
    }

    /// Polygonal parts of this shape, each one checked to lie within the WGS84 bounds
    pub fn normalize(self) -> Result<Vec<MultiPolygon<f64>>> {
        let mut polygons = Vec::new();
        self.collect_polygons(&mut polygons)?;
        for polygon in &polygons {
            check_bounds(polygon)?;
        }
        Ok(polygons)
    }

    fn collect_polygons(self, polygons: &mut Vec<MultiPolygon<f64>>) -> Result<()> {
        match self {
            Shape::GeoJsonString(s) => {
                let geojson = s
                    .parse::<GeoJson>()
                    .map_err(|e| Error::shape(format!("Invalid GeoJSON: {}", e)))?;
                Shape::GeoJson(geojson).collect_polygons(polygons)
            }
            Shape::GeoJson(GeoJson::Geometry(geometry)) => {
                polygons.push(geojson_polygon(geometry)?);
                Ok(())
            }
            Shape::GeoJson(GeoJson::Feature(feature)) => {
                let geometry = feature
                    .geometry
                    .ok_or_else(|| Error::shape("Feature without geometry"))?;
                polygons.push(geojson_polygon(geometry)?);
                Ok(())
            }
            Shape::GeoJson(GeoJson::FeatureCollection(collection)) => {
                for feature in collection.features {
                    Shape::GeoJson(GeoJson::Feature(feature)).collect_polygons(polygons)?;
                }
                Ok(())
            }
            Shape::Json(value) => json_shape(value)?.collect_polygons(polygons),
            Shape::Geometry(geometry) => {
                polygons.push(native_polygon(geometry)?);
                Ok(())
            }
            Shape::GeoInterface(object) => {
                Shape::GeoJson(object.geo_interface()).collect_polygons(polygons)
            }
            Shape::Collection(shapes) => {
                for shape in shapes {
                    shape.collect_polygons(polygons)?;
                }
                Ok(())
            }
        }
    }
}

fn json_shape(value: Value) -> Result<Shape> {
    if value.get("type").is_some() {
        let geojson = GeoJson::from_json_value(value)
            .map_err(|e| Error::shape(format!("Invalid GeoJSON: {}", e)))?;
        return Ok(Shape::GeoJson(geojson));
    }
    match value {
        Value::Object(mut object) => {
            if let Some(geometry) = object.remove("geometry") {
                Ok(Shape::Json(geometry))
            } else if let Some(Value::Array(features)) = object.remove("features") {
                Ok(Shape::Collection(
                    features.into_iter().map(Shape::Json).collect(),
                ))
            } else {
                Err(Error::shape(
                    "Mapping needs a `type`, `geometry` or `features` member",
                ))
            }
        }
        other => Err(Error::shape(format!("Not a GeoJSON object: {}", other))),
    }
}

fn geojson_polygon(geometry: geojson::Geometry) -> Result<MultiPolygon<f64>> {
    match geometry.value {
        geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_) => {
            let geometry = Geometry::<f64>::try_from(geometry)
                .map_err(|e| Error::shape(format!("Invalid GeoJSON geometry: {}", e)))?;
            native_polygon(geometry)
        }
        ref other => Err(Error::shape(format!(
            "Geometries must be Polygon or MultiPolygon, got {}",
            geojson_type_name(other)
        ))),
    }
}

fn native_polygon(geometry: Geometry<f64>) -> Result<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(polygons) => Ok(polygons),
        Geometry::Rect(rect) => Ok(MultiPolygon::new(vec![rect.to_polygon()])),
        Geometry::Triangle(triangle) => Ok(MultiPolygon::new(vec![triangle.to_polygon()])),
        other => Err(Error::shape(format!(
            "Geometries must be Polygon or MultiPolygon, got {}",
            geometry_type_name(&other)
        ))),
    }
}

fn check_bounds(polygon: &MultiPolygon<f64>) -> Result<()> {
    if let Some(bbox) = polygon.bounding_rect() {
        let (min, max) = (bbox.min(), bbox.max());
        if min.x < UTM_MIN_LON || max.x > UTM_MAX_LON || min.y < UTM_MIN_LAT || max.y > UTM_MAX_LAT
        {
            return Err(Error::shape(format!(
                "Shape bounds ({}, {}, {}, {}) exceed the WGS84 range",
                min.x, min.y, max.x, max.y
            )));
        }
    }
    Ok(())
}

fn geojson_type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::GeoJsonString(s) => f.debug_tuple("GeoJsonString").field(s).finish(),
            Shape::GeoJson(g) => f.debug_tuple("GeoJson").field(g).finish(),
            Shape::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Shape::Geometry(g) => f.debug_tuple("Geometry").field(g).finish(),
            Shape::GeoInterface(_) => f.write_str("GeoInterface(..)"),
            Shape::Collection(shapes) => f.debug_tuple("Collection").field(shapes).finish(),
        }
    }
}

impl From<&str> for Shape {
    fn from(s: &str) -> Shape {
        Shape::GeoJsonString(s.to_string())
    }
}

impl From<String> for Shape {
    fn from(s: String) -> Shape {
        Shape::GeoJsonString(s)
    }
}

impl From<GeoJson> for Shape {
    fn from(geojson: GeoJson) -> Shape {
        Shape::GeoJson(geojson)
    }
}

impl From<geojson::Geometry> for Shape {
    fn from(geometry: geojson::Geometry) -> Shape {
        Shape::GeoJson(GeoJson::Geometry(geometry))
    }
}

impl From<geojson::Feature> for Shape {
    fn from(feature: geojson::Feature) -> Shape {
        Shape::GeoJson(GeoJson::Feature(feature))
    }
}

impl From<geojson::FeatureCollection> for Shape {
    fn from(collection: geojson::FeatureCollection) -> Shape {
        Shape::GeoJson(GeoJson::FeatureCollection(collection))
    }
}

impl From<Value> for Shape {
    fn from(value: Value) -> Shape {
        Shape::Json(value)
    }
}

impl From<Geometry<f64>> for Shape {
    fn from(geometry: Geometry<f64>) -> Shape {
        Shape::Geometry(geometry)
    }
}

impl From<Polygon<f64>> for Shape {
    fn from(polygon: Polygon<f64>) -> Shape {
        Shape::Geometry(Geometry::Polygon(polygon))
    }
}

impl From<MultiPolygon<f64>> for Shape {
    fn from(polygons: MultiPolygon<f64>) -> Shape {
        Shape::Geometry(Geometry::MultiPolygon(polygons))
    }
}

impl From<Box<dyn GeoInterface>> for Shape {
    fn from(object: Box<dyn GeoInterface>) -> Shape {
        Shape::GeoInterface(object)
    }
}

impl<S: Into<Shape>> From<Vec<S>> for Shape {
    fn from(shapes: Vec<S>) -> Shape {
        Shape::Collection(shapes.into_iter().map(Into::into).collect())
    }
}
