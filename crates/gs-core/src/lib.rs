//! Geometry model, normalization, bounds and grid transforms for geoscii.
//!
//! This crate holds every type shared across the workspace: the GeoJSON
//! model, the error enum, and render configuration.

pub mod bounds;
pub mod config;
pub mod error;
pub mod geometry;
pub mod normalize;
pub mod transform;

pub use bounds::Bounds;
pub use config::{RenderConfig, RenderOptions};
pub use error::{CoreError, Result};
pub use geometry::{Feature, GeoInterface, Geometry, Position};
pub use normalize::{GeoInput, GeoSource, Stream};
pub use transform::GridTransform;
