//! # Diachi Geo
//!
//! Upstream geodata clients and the street autocomplete orchestrator.
//!
//! - [`ProvincesClient`]: administrative divisions (passthrough + name lookups)
//! - [`AdminNameResolver`]: cached code → name resolution
//! - [`GeocodeClient`]: address → coordinates
//! - [`NominatimClient`] / [`OverpassClient`]: bounding box and street lookups
//! - [`StreetAutocomplete`]: debounced, cached, retrying street suggestions
//! - [`VietmapSuggester`]: alternative suggestion source

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod autocomplete;
mod debounce;
mod geocode;
mod http;
mod names;
mod nominatim;
mod overpass;
mod provinces;
mod retry;
mod vietmap;

pub use autocomplete::{sanitize_query, AutocompleteConfig, StreetAutocomplete};
pub use debounce::{Debounced, Debouncer};
pub use geocode::{GeocodeClient, GeocodeConfig};
pub use names::AdminNameResolver;
pub use nominatim::{NominatimClient, NominatimConfig};
pub use overpass::{build_street_query, OverpassClient, OverpassConfig};
pub use provinces::{ProvincesClient, ProvincesConfig};
pub use retry::RetryPolicy;
pub use vietmap::{VietmapConfig, VietmapSuggester};
