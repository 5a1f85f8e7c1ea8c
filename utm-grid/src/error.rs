//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Error kinds of grid and tile operations

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Latitude/longitude out of range or not transformable
    #[error("Invalid lat/lon: {0}")]
    InvalidLatLon(String),
    /// Mismatched or out of range pixel coordinates
    #[error("Invalid row/col: {0}")]
    InvalidRowCol(String),
    /// Malformed key or inconsistent tile parameters
    #[error("Invalid tile: {0}")]
    InvalidTile(String),
    /// Shape which can't be reduced to polygons
    #[error("Invalid shape: {0}")]
    InvalidShape(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn lat_lon<S: Into<String>>(msg: S) -> Error {
        Error::InvalidLatLon(msg.into())
    }
    pub(crate) fn row_col<S: Into<String>>(msg: S) -> Error {
        Error::InvalidRowCol(msg.into())
    }
    pub(crate) fn tile<S: Into<String>>(msg: S) -> Error {
        Error::InvalidTile(msg.into())
    }
    pub(crate) fn shape<S: Into<String>>(msg: S) -> Error {
        Error::InvalidShape(msg.into())
    }
}
