//! # Diachi Core
//!
//! Core types, errors, and traits for the diachi address service.
//!
//! This crate provides the building blocks shared by every other diachi crate:
//!
//! - **Types**: administrative units, coordinates, bounding boxes
//! - **Errors**: the geodata error taxonomy
//! - **Constants**: provider endpoints, cache lifetimes, autocomplete limits
//! - **Traits**: the seams between the orchestration core and upstream providers
//!
//! ## Example
//!
//! ```rust
//! use diachi_core::BoundingBox;
//!
//! let bbox = BoundingBox::new(20.5, 105.3, 22.5, 105.6).clamped(0.5);
//! assert!((bbox.lat_span() - 0.5).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{GeoError, Result};
pub use traits::*;
pub use types::*;
