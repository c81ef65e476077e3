//! Binning of projected points into per-cell color channels.

use crate::grid::buffers::{AggregateBuffers, COMPONENTS};
use crate::grid::geometry::GridGeometry;
use crate::projector::{GeoPoint, Projector};

/// Added to a cell's (R, G, B) for every point binned into it.
pub const CHANNEL_WEIGHTS: [f32; 3] = [1.0, 5.0, 1.0];

/// Counters of one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Points read from the source.
    pub points: usize,
    /// Points that landed in a cell.
    pub binned: usize,
    /// Points projected off-grid and skipped.
    pub dropped: usize,
}

/// Zeroes the color array, bins every point and recomputes `max_count`.
///
/// Positions and picking colors are not touched. Running the same points
/// twice over the same geometry yields identical colors.
pub fn aggregate<P, I>(
    geometry: &GridGeometry,
    projector: &P,
    points: I,
    buffers: &mut AggregateBuffers,
) -> PassStats
where
    P: Projector + ?Sized,
    I: IntoIterator,
    I::Item: GeoPoint,
{
    buffers.colors.fill(0.0);

    let mut stats = PassStats::default();
    for point in points {
        stats.points += 1;
        let screen = projector.project(point.position());

        let slot = geometry.cell_index(screen).and_then(|i| {
            let start = i.checked_mul(COMPONENTS)?;
            buffers.colors.get_mut(start..start.checked_add(COMPONENTS)?)
        });
        match slot {
            Some(rgb) => {
                for (c, w) in rgb.iter_mut().zip(CHANNEL_WEIGHTS) {
                    *c += w;
                }
                stats.binned += 1;
            }
            None => stats.dropped += 1,
        }
    }

    buffers.max_count = buffers
        .colors
        .chunks_exact(COMPONENTS)
        .map(|rgb| rgb[0])
        .fold(0.0, f32::max);
    buffers.pass += 1;

    log::trace!(
        "aggregation pass {}: points={}, binned={}, dropped={}, max_count={}",
        buffers.pass,
        stats.points,
        stats.binned,
        stats.dropped,
        buffers.max_count
    );

    stats
}
