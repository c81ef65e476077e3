// src/lib.rs
//! Screen-space grid aggregation for instanced heatmap overlays.
//!
//! Geo points are projected through a host-supplied [`Projector`], binned
//! into a uniform grid that covers the viewport, and accumulated into dense
//! `f32` attribute arrays (cell position, intensity color, optional picking
//! color). The [`GridLayer`] driver decides per update whether the grid has
//! to be relaid out or only re-aggregated, and exposes the buffers plus the
//! uniforms a renderer needs to draw one instance per cell.

pub mod config;
pub mod error;
pub mod grid;
pub mod layer;
pub mod projector;
pub mod types;

// Re-export commonly used types for convenience.
pub use self::config::GridConfig;
pub use self::error::{GridError, Result};
pub use self::grid::{AggregateBuffers, GridGeometry, PassStats, Viewport};
pub use self::layer::{GridLayer, PickedCell, UpdateOutcome};
pub use self::projector::{GeoPoint, Point, Projector};
pub use self::types::{AttributeView, DrawMode, GridUniforms, InstancePrimitive};
