//! GPU-facing data types handed to the rendering backend.

use glam::Vec3;

/// Inset applied on each side of a cell so neighbours render with a gap.
pub const CELL_MARGIN: f32 = 2.0;

/// Per-layer uniforms, laid out for a single 16-byte uniform slot.
/// `scale` stretches the unit square to the inset cell size; `max_count`
/// normalizes the color channel in the shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridUniforms {
    pub scale: Vec3,    // 12 B
    pub max_count: f32, // +4 -> 16
}

// Compile-time safety check: must stay one vec4 in the shader.
const _: [(); 16] = [(); core::mem::size_of::<GridUniforms>()];

impl GridUniforms {
    pub fn new(unit_width: f64, unit_height: f64, max_count: f32) -> Self {
        Self {
            scale: Vec3::new(
                unit_width as f32 - CELL_MARGIN * 2.0,
                unit_height as f32 - CELL_MARGIN * 2.0,
                1.0,
            ),
            max_count,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DrawMode {
    TriangleFan,
}

#[rustfmt::skip]
const UNIT_SQUARE_VERTICES: [f32; 12] = [
    0.0, 0.0, 0.0,
    1.0, 0.0, 0.0,
    1.0, 1.0, 0.0,
    0.0, 1.0, 0.0,
];

/// Template geometry repeated once per cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InstancePrimitive {
    pub draw_mode: DrawMode,
    pub vertices: &'static [f32],
    pub instanced: bool,
}

impl InstancePrimitive {
    /// Unit square anchored at the origin, drawn as a fan of four corners.
    pub const UNIT_SQUARE: Self = Self {
        draw_mode: DrawMode::TriangleFan,
        vertices: &UNIT_SQUARE_VERTICES,
        instanced: true,
    };

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// One per-instance vertex attribute borrowed from the layer's buffers.
#[derive(Copy, Clone, Debug)]
pub struct AttributeView<'a> {
    pub name: &'static str,
    pub values: &'a [f32],
    /// Components per instance.
    pub size: u32,
    /// Instances per attribute element; 1 means one value per cell.
    pub divisor: u32,
}

impl<'a> AttributeView<'a> {
    pub(crate) fn per_instance(name: &'static str, values: &'a [f32]) -> Self {
        Self {
            name,
            values,
            size: 3,
            divisor: 1,
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.values)
    }
}
