//! Domain types for diachi.
//!
//! - [`AdminUnit`]: a province, district or ward with its human-readable name
//! - [`GeoCoordinates`]: a geocoded point
//! - [`BoundingBox`]: the search window for street lookups
//! - [`StreetQuery`]: an autocomplete request scoped by division codes

mod admin;
mod geo;
mod street;

pub use admin::*;
pub use geo::*;
pub use street::*;
