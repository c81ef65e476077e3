//! Picking colors: one unique RGB triple per cell.
//!
//! A cell's id is `index + 1` spread little-endian over the three channels
//! as byte values (`0..=255` stored as `f32`). Id 0, i.e. black, is left
//! free so a renderer can clear its picking target to "no cell".

/// Largest cell count that still gets collision-free picking colors.
pub const MAX_PICKABLE_CELLS: usize = (1 << 24) - 1;

#[inline]
pub fn encode(index: usize) -> [f32; 3] {
    let id = index + 1;
    [
        (id & 0xff) as f32,
        ((id >> 8) & 0xff) as f32,
        ((id >> 16) & 0xff) as f32,
    ]
}

/// Cell index for a color read back from the picking target.
pub fn decode(rgb: [u8; 3]) -> Option<usize> {
    let id = rgb[0] as usize | (rgb[1] as usize) << 8 | (rgb[2] as usize) << 16;
    id.checked_sub(1)
}
