//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod args;
pub mod tiling_service;
#[cfg(test)]
mod tiling_service_test;

pub use tiling_service::{CoverStats, ServiceError, TilingService};
