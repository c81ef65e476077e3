//! Dense per-instance attribute arrays.
//!
//! Every array holds three `f32` per cell. Positions and picking colors are
//! written once per allocation (or relayout); colors are rewritten on every
//! aggregation pass.

use crate::error::{GridError, Result};
use crate::grid::geometry::GridGeometry;
use crate::grid::picking::{self, MAX_PICKABLE_CELLS};

pub const COMPONENTS: usize = 3;

#[derive(Debug, Clone)]
pub struct AggregateBuffers {
    pub(crate) positions: Vec<f32>,
    pub(crate) colors: Vec<f32>,
    pub(crate) picking_colors: Option<Vec<f32>>,
    pub(crate) max_count: f32,
    pub(crate) generation: u64,
    pub(crate) pass: u64,
}

impl AggregateBuffers {
    /// Allocates zeroed arrays for `cells` instances, plus picking colors
    /// when `picking` is set. Nothing is filled yet.
    pub fn allocate(cells: usize, picking: bool) -> Result<Self> {
        if picking && cells > MAX_PICKABLE_CELLS {
            return Err(GridError::invalid(format!(
                "{cells} cells exceed the {MAX_PICKABLE_CELLS} distinct picking colors"
            )));
        }
        let len = cells
            .checked_mul(COMPONENTS)
            .ok_or_else(|| GridError::invalid(format!("{cells} cells overflow buffer length")))?;

        let picking_colors = if picking {
            Some(zeroed(len, cells)?)
        } else {
            None
        };

        Ok(Self {
            positions: zeroed(len, cells)?,
            colors: zeroed(len, cells)?,
            picking_colors,
            max_count: 0.0,
            generation: 0,
            pass: 0,
        })
    }

    /// Writes the instance position of every cell.
    pub fn fill_positions(&mut self, geometry: &GridGeometry) {
        debug_assert_eq!(self.positions.len(), geometry.num_instances() * COMPONENTS);
        for (i, slot) in self.positions.chunks_exact_mut(COMPONENTS).enumerate() {
            slot.copy_from_slice(&geometry.cell_origin(i).to_array());
        }
    }

    /// Writes the picking color of every cell. No-op without a picking array.
    pub fn fill_picking_colors(&mut self) {
        if let Some(picking_colors) = self.picking_colors.as_mut() {
            for (i, slot) in picking_colors.chunks_exact_mut(COMPONENTS).enumerate() {
                slot.copy_from_slice(&picking::encode(i));
            }
        }
    }

    #[inline]
    pub fn num_instances(&self) -> usize {
        self.colors.len() / COMPONENTS
    }

    #[inline]
    pub fn has_picking(&self) -> bool {
        self.picking_colors.is_some()
    }

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    #[inline]
    pub fn picking_colors(&self) -> Option<&[f32]> {
        self.picking_colors.as_deref()
    }

    /// Largest channel-0 accumulation of the last pass.
    #[inline]
    pub fn max_count(&self) -> f32 {
        self.max_count
    }

    /// Bumped whenever the arrays are reallocated; a renderer recreates its
    /// GPU buffers when this changes.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of aggregation passes run into these arrays.
    #[inline]
    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub fn positions_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn colors_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn picking_colors_bytes(&self) -> Option<&[u8]> {
        self.picking_colors.as_deref().map(bytemuck::cast_slice)
    }

    /// Color triple of one cell.
    pub fn color(&self, index: usize) -> Option<[f32; 3]> {
        let start = index.checked_mul(COMPONENTS)?;
        let c = self.colors.get(start..start + COMPONENTS)?;
        Some([c[0], c[1], c[2]])
    }
}

fn zeroed(len: usize, cells: usize) -> Result<Vec<f32>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|source| GridError::AllocationFailure { cells, source })?;
    v.resize(len, 0.0);
    Ok(v)
}
