// src/grid/mod.rs
//! Grid binning core.
//!
//! - `geometry`: grid dimensions from viewport and unit size, cell mapping.
//! - `aggregate`: per-pass binning of projected points into color channels.
//! - `buffers`: dense per-instance attribute arrays and their fill routines.
//! - `picking`: per-cell picking color encoding.

pub mod aggregate;
pub mod buffers;
pub mod geometry;
pub mod picking;

pub use self::aggregate::{aggregate, PassStats};
pub use self::buffers::AggregateBuffers;
pub use self::geometry::{GridGeometry, Viewport};
