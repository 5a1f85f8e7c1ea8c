//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile key codec
//!
//! A tile key is `tilesize:pad:resolution:zone:ti:tj`, e.g. `2048:16:30.0:15:3:80`.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Number of fields of a tile key
const KEY_FIELDS: usize = 6;

/// Parsed tile key
#[derive(PartialEq, Clone, Debug)]
pub struct TileKey {
    pub tilesize: u32,
    pub pad: u32,
    pub resolution: f64,
    pub zone: u8,
    pub ti: i64,
    pub tj: i64,
}

impl TileKey {
    pub fn parse(key: &str) -> Result<TileKey> {
        let fields: Vec<&str> = key.split(':').collect();
        if fields.len() != KEY_FIELDS {
            return Err(Error::tile(format!(
                "Key '{}' has {} fields, expected {}",
                key,
                fields.len(),
                KEY_FIELDS
            )));
        }
        let tilesize = parse_tilesize(fields[0])?;
        let pad = parse_pad(fields[1])?;
        let resolution = parse_resolution(fields[2])?;
        let zone = parse_zone(fields[3])?;
        let ti = parse_int(fields[4], "ti")?;
        let tj = parse_int(fields[5], "tj")?;
        Ok(TileKey {
            tilesize,
            pad,
            resolution,
            zone,
            ti,
            tj,
        })
    }
}

impl FromStr for TileKey {
    type Err = Error;

    fn from_str(key: &str) -> Result<TileKey> {
        TileKey::parse(key)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{:02}:{}:{}",
            self.tilesize,
            self.pad,
            format_resolution(self.resolution),
            self.zone,
            self.ti,
            self.tj
        )
    }
}

/// Shortest exact decimal representation with at least one fractional digit
pub fn format_resolution(resolution: f64) -> String {
    let mut res = resolution.to_string();
    if !res.contains('.') {
        res.push_str(".0");
    }
    res
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `-?[0-9]+`
fn parse_int(field: &str, name: &str) -> Result<i64> {
    let digits = field.strip_prefix('-').unwrap_or(field);
    if !is_digits(digits) {
        return Err(Error::tile(format!(
            "{} must be an integer, got '{}'",
            name, field
        )));
    }
    field
        .parse::<i64>()
        .map_err(|_| Error::tile(format!("{} is out of range, got '{}'", name, field)))
}

pub(crate) fn parse_tilesize(field: &str) -> Result<u32> {
    let tilesize = parse_int(field, "tilesize")?;
    if tilesize <= 0 || tilesize > u32::MAX as i64 {
        return Err(Error::tile(format!(
            "tilesize must be greater than zero, got {}",
            tilesize
        )));
    }
    Ok(tilesize as u32)
}

pub(crate) fn parse_pad(field: &str) -> Result<u32> {
    let pad = parse_int(field, "pad")?;
    if pad < 0 || pad > u32::MAX as i64 {
        return Err(Error::tile(format!("pad must be non-negative, got {}", pad)));
    }
    Ok(pad as u32)
}

/// `[0-9]+(\.[0-9]+)?`
pub(crate) fn parse_resolution(field: &str) -> Result<f64> {
    let decimal = match field.split_once('.') {
        Some((int, frac)) => is_digits(int) && is_digits(frac),
        None => is_digits(field),
    };
    if !decimal {
        return Err(Error::tile(format!(
            "resolution must be a decimal number, got '{}'",
            field
        )));
    }
    let resolution = field
        .parse::<f64>()
        .map_err(|_| Error::tile(format!("resolution must be a number, got '{}'", field)))?;
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(Error::tile(format!(
            "resolution must be greater than zero, got {}",
            field
        )));
    }
    Ok(resolution)
}

fn parse_zone(field: &str) -> Result<u8> {
    let zone = parse_int(field, "zone")?;
    if zone < 1 || zone > 60 {
        return Err(Error::tile(format!(
            "zone must be between 1 and 60, got {}",
            zone
        )));
    }
    Ok(zone as u8)
}

#[test]
fn test_format_resolution() {
    assert_eq!(format_resolution(30.0), "30.0");
    assert_eq!(format_resolution(30.2), "30.2");
    assert_eq!(format_resolution(0.2), "0.2");
    assert_eq!(format_resolution(0.0000001), "0.0000001");
    assert_eq!(format_resolution(1e21), "1000000000000000000000.0");
}

#[test]
fn test_key_fields() {
    let key = TileKey::parse("2048:16:30.2:15:3:80").unwrap();
    assert_eq!(
        key,
        TileKey {
            tilesize: 2048,
            pad: 16,
            resolution: 30.2,
            zone: 15,
            ti: 3,
            tj: 80
        }
    );
    assert_eq!(key.to_string(), "2048:16:30.2:15:3:80");

    let key: TileKey = "128:0:960:5:-1:-37".parse().unwrap();
    assert_eq!(key.zone, 5);
    assert_eq!(key.ti, -1);
    assert_eq!(key.tj, -37);
    assert_eq!(key.to_string(), "128:0:960.0:05:-1:-37");
    assert_eq!(TileKey::parse(&key.to_string()), Ok(key));
}

#[test]
fn test_invalid_keys() {
    for key in &[
        "2048:16:30.0:15:3",        // too few fields
        "2048:16:30.0:15:3:80:1",   // too many fields
        "blah:16:30.0:1:3:80",      // tilesize type
        "0:16:30.0:1:3:80",         // tilesize zero
        "2048:16.4:30.0:15:3:80",   // pad must be int
        "2048:-1:30.0:15:3:80",     // negative pad
        "2048:16:abc:15:3:80",      // resolution type
        "2048:16:-30.0:15:3:80",    // negative resolution
        "2048:16:0.0:15:3:80",      // zero resolution
        "2048:16:inf:15:3:80",      // infinite resolution
        "2048:16:30.0:0:3:80",      // zone 0
        "2048:16:30.0:61:3:80",     // zone 61
        "2048:16:30.0:15:3.5:80",   // ti type
        "2048:16:30.0:15:3:north",  // tj type
        "2048:16:30.0:15:+3:80",    // sign prefix
        "2048:16:30.0:15: 3:80",    // whitespace
        "2048:16:30.0:15:3:80 ",    // trailing whitespace
        "2048:16:3e1:15:3:80",      // exponent
        "2048:16:.5:15:3:80",       // missing integer part
        "2048:16:30.:15:3:80",      // missing fraction
        "2048:16:30.0:15:-:80",     // sign only
        "2048:16:30.0:15:3:99999999999999999999", // tj out of range
    ] {
        match TileKey::parse(key) {
            Err(Error::InvalidTile(_)) => {}
            other => panic!("{} parsed as {:?}", key, other),
        }
    }
}

#[test]
fn test_error_names_field() {
    let err = TileKey::parse("2048:16.4:30.0:15:3:80").unwrap_err();
    assert!(err.to_string().contains("pad"));
    let err = TileKey::parse("2048:16:30.0:15:x:80").unwrap_err();
    assert!(err.to_string().contains("ti"));
}
