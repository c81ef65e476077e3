use glam::{DVec2, Vec3};

use crate::config::GridConfig;
use crate::error::{GridError, Result};

/// Half-extents of the drawable area. The grid covers
/// `[-width, width] x [-height, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn validate(&self) -> Result<()> {
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(GridError::invalid(format!(
                    "viewport {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Cell layout for one viewport / unit size combination.
///
/// Cells are addressed row-major: `index = col + row * num_col`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub unit_width: f64,
    pub unit_height: f64,
    pub num_col: usize,
    pub num_row: usize,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl GridGeometry {
    /// Lays out the grid: `num_col = ceil(2 * width / unit_width)` and the
    /// same for rows.
    pub fn new(viewport: Viewport, config: &GridConfig) -> Result<Self> {
        config.validate()?;
        viewport.validate()?;

        let num_col = cell_count("columns", 2.0 * viewport.width / config.unit_width)?;
        let num_row = cell_count("rows", 2.0 * viewport.height / config.unit_height)?;
        if num_col.checked_mul(num_row).is_none() {
            return Err(GridError::invalid(format!(
                "{num_col} x {num_row} cells overflow the cell index"
            )));
        }

        Ok(Self {
            unit_width: config.unit_width,
            unit_height: config.unit_height,
            num_col,
            num_row,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
        })
    }

    /// Number of cells, i.e. rendered instances. Cannot overflow: `new`
    /// rejects grids whose product does not fit in `usize`.
    #[inline]
    pub fn num_instances(&self) -> usize {
        self.num_col * self.num_row
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    /// Column and row containing a screen coordinate, or `None` when the
    /// coordinate is off-grid. Cells are half-open, so a coordinate exactly on
    /// the far edge of the last column/row is off-grid.
    pub fn cell_at(&self, screen: DVec2) -> Option<(usize, usize)> {
        let col = ((screen.x + self.viewport_width) / self.unit_width).floor();
        let row = ((screen.y + self.viewport_height) / self.unit_height).floor();

        // Negated comparisons also reject NaN.
        if !(col >= 0.0 && col < self.num_col as f64) || !(row >= 0.0 && row < self.num_row as f64) {
            return None;
        }
        Some((col as usize, row as usize))
    }

    #[inline]
    pub fn cell_index(&self, screen: DVec2) -> Option<usize> {
        self.cell_at(screen).map(|(col, row)| col + row * self.num_col)
    }

    /// Inverse of the row-major addressing.
    pub fn cell_of(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.num_instances() {
            return None;
        }
        Some((index % self.num_col, index / self.num_col))
    }

    /// Instance anchor of a cell: its lower-left corner in grid screen space,
    /// on the `z = 0` plane.
    #[doc(alias = "cell_center")]
    pub fn cell_origin(&self, index: usize) -> Vec3 {
        let col = (index % self.num_col.max(1)) as f64;
        let row = (index / self.num_col.max(1)) as f64;
        Vec3::new(
            (col * self.unit_width - self.viewport_width) as f32,
            (row * self.unit_height - self.viewport_height) as f32,
            0.0,
        )
    }
}

/// `ceil(span)` as a count; `usize::MAX as f64` is 2^64, so anything at or
/// above it does not fit.
fn cell_count(axis: &str, span: f64) -> Result<usize> {
    let count = span.ceil();
    if count >= usize::MAX as f64 {
        return Err(GridError::invalid(format!("{count} grid {axis} do not fit in usize")));
    }
    Ok(count as usize)
}
