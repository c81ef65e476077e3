//! Error taxonomy for grid layout and buffer allocation.
//!
//! Points that fall outside the grid are not errors; they are counted in
//! [`PassStats::dropped`](crate::grid::PassStats).

use std::collections::TryReserveError;
use thiserror::Error;

pub type Result<T, E = GridError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum GridError {
    /// Unit size, viewport extent or picking range is unusable. The pass is
    /// aborted and any previously built buffers stay in place.
    ///
    /// Also covers grids whose cell count, or `3 * cells` buffer length,
    /// overflows `usize`: that size is a property of the requested layout,
    /// not of available memory, and there is no reservation to fail.
    #[error("invalid grid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The host could not provide memory for a new set of cell buffers.
    #[error("failed to allocate buffers for {cells} grid cells")]
    AllocationFailure {
        cells: usize,
        #[source]
        source: TryReserveError,
    },
}

impl GridError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
