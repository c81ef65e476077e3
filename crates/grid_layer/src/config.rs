use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

pub const DEFAULT_UNIT_SIZE: f64 = 100.0;

/// Host-facing options of a grid layer.
///
/// Field names follow the host's camelCase option names, and every field is
/// optional in a serialized document: missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Width of one cell in screen units.
    pub unit_width: f64,
    /// Height of one cell in screen units.
    pub unit_height: f64,
    /// Whether a per-cell picking color buffer is produced.
    pub picking_enabled: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            unit_width: DEFAULT_UNIT_SIZE,
            unit_height: DEFAULT_UNIT_SIZE,
            picking_enabled: false,
        }
    }
}

impl GridConfig {
    pub fn with_unit_size(mut self, unit_width: f64, unit_height: f64) -> Self {
        self.unit_width = unit_width;
        self.unit_height = unit_height;
        self
    }

    pub fn with_picking(mut self, enabled: bool) -> Self {
        self.picking_enabled = enabled;
        self
    }

    /// Both unit dimensions must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        check_unit("unit_width", self.unit_width)?;
        check_unit("unit_height", self.unit_height)
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GridError::invalid(format!("{name} must be > 0, got {value}")))
    }
}
