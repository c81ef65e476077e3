//! The layer driver: owns the grid and its buffers, and decides per update
//! whether to relay out the grid or only re-aggregate.

use log::{debug, warn};

use crate::config::GridConfig;
use crate::error::Result;
use crate::grid::{aggregate, picking, AggregateBuffers, GridGeometry, PassStats, Viewport};
use crate::projector::{GeoPoint, Projector};
use crate::types::{AttributeView, GridUniforms, InstancePrimitive};

/// What an [`GridLayer::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// New buffers were allocated (first update, cell count or picking changed).
    Reallocated,
    /// Geometry changed but the cell count did not; positions were refilled
    /// in the existing buffers.
    Relaid,
    /// Only the points changed; colors were re-aggregated in place.
    Reaggregated,
    /// Nothing was dirty.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickedCell {
    pub index: usize,
    pub col: usize,
    pub row: usize,
}

#[derive(Debug)]
struct Ready {
    geometry: GridGeometry,
    buffers: AggregateBuffers,
}

/// Grid aggregation layer.
///
/// Setters only record what changed; all work happens in [`update`](Self::update).
/// A failed update leaves the previous geometry and buffers in place and
/// keeps the dirty flags raised.
#[derive(Debug)]
pub struct GridLayer {
    config: GridConfig,
    viewport: Viewport,
    ready: Option<Ready>,
    geometry_dirty: bool,
    data_dirty: bool,
    last_stats: PassStats,
}

impl GridLayer {
    pub fn new(config: GridConfig, viewport: Viewport) -> Self {
        Self {
            config,
            viewport,
            ready: None,
            geometry_dirty: true,
            data_dirty: true,
            last_stats: PassStats::default(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_some()
    }

    pub fn geometry_dirty(&self) -> bool {
        self.geometry_dirty
    }

    pub fn data_dirty(&self) -> bool {
        self.data_dirty
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.geometry_dirty = true;
        }
    }

    pub fn set_unit_size(&mut self, unit_width: f64, unit_height: f64) {
        self.set_config(self.config.with_unit_size(unit_width, unit_height));
    }

    pub fn set_picking_enabled(&mut self, enabled: bool) {
        self.set_config(self.config.with_picking(enabled));
    }

    pub fn set_config(&mut self, config: GridConfig) {
        if config != self.config {
            self.config = config;
            self.geometry_dirty = true;
        }
    }

    /// The point set changed; the next update re-aggregates.
    pub fn mark_data_changed(&mut self) {
        self.data_dirty = true;
    }

    /// Brings the buffers up to date with the current config, viewport and
    /// `points`.
    ///
    /// `points` is only read when something is dirty.
    pub fn update<P, I>(&mut self, projector: &P, points: I) -> Result<UpdateOutcome>
    where
        P: Projector + ?Sized,
        I: IntoIterator,
        I::Item: GeoPoint,
    {
        if self.geometry_dirty || self.ready.is_none() {
            let outcome = self.relayout(projector, points).map_err(|err| {
                warn!("grid layout failed, keeping previous buffers: {err}");
                err
            })?;
            self.geometry_dirty = false;
            self.data_dirty = false;
            return Ok(outcome);
        }

        if !self.data_dirty {
            return Ok(UpdateOutcome::Unchanged);
        }

        if let Some(ready) = self.ready.as_mut() {
            self.last_stats = aggregate(&ready.geometry, projector, points, &mut ready.buffers);
        }
        self.data_dirty = false;
        Ok(UpdateOutcome::Reaggregated)
    }

    fn relayout<P, I>(&mut self, projector: &P, points: I) -> Result<UpdateOutcome>
    where
        P: Projector + ?Sized,
        I: IntoIterator,
        I::Item: GeoPoint,
    {
        let geometry = GridGeometry::new(self.viewport, &self.config)?;
        let cells = geometry.num_instances();
        let picking = self.config.picking_enabled;

        let reusable = self
            .ready
            .as_mut()
            .filter(|r| r.buffers.num_instances() == cells && r.buffers.has_picking() == picking);
        if let Some(ready) = reusable {
            debug!(
                "grid relaid: {}x{} cells of {}x{}",
                geometry.num_col, geometry.num_row, geometry.unit_width, geometry.unit_height
            );
            // Picking colors depend on the cell index only and stay valid.
            ready.buffers.fill_positions(&geometry);
            ready.geometry = geometry;
            self.last_stats = aggregate(&ready.geometry, projector, points, &mut ready.buffers);
            return Ok(UpdateOutcome::Relaid);
        }

        let generation = self.ready.as_ref().map_or(0, |r| r.buffers.generation() + 1);
        let mut buffers = AggregateBuffers::allocate(cells, picking)?;
        buffers.generation = generation;
        buffers.fill_positions(&geometry);
        buffers.fill_picking_colors();
        debug!(
            "grid buffers allocated: {}x{} cells ({} instances), picking={}, generation={}",
            geometry.num_col, geometry.num_row, cells, picking, generation
        );

        self.last_stats = aggregate(&geometry, projector, points, &mut buffers);
        self.ready = Some(Ready { geometry, buffers });
        Ok(UpdateOutcome::Reallocated)
    }

    /// Geometry of the last successful layout.
    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.ready.as_ref().map(|r| &r.geometry)
    }

    pub fn buffers(&self) -> Option<&AggregateBuffers> {
        self.ready.as_ref().map(|r| &r.buffers)
    }

    pub fn max_count(&self) -> f32 {
        self.buffers().map_or(0.0, AggregateBuffers::max_count)
    }

    pub fn uniforms(&self) -> Option<GridUniforms> {
        self.ready.as_ref().map(|r| {
            GridUniforms::new(r.geometry.unit_width, r.geometry.unit_height, r.buffers.max_count())
        })
    }

    /// Per-instance attributes in binding order. `pickingColors` is only
    /// listed when picking is enabled.
    pub fn attributes(&self) -> Vec<AttributeView<'_>> {
        let Some(ready) = self.ready.as_ref() else {
            return Vec::new();
        };
        let b = &ready.buffers;
        let mut attrs = vec![
            AttributeView::per_instance("positions", b.positions()),
            AttributeView::per_instance("colors", b.colors()),
        ];
        if let Some(picking_colors) = b.picking_colors() {
            attrs.push(AttributeView::per_instance("pickingColors", picking_colors));
        }
        attrs
    }

    pub fn primitive(&self) -> InstancePrimitive {
        InstancePrimitive::UNIT_SQUARE
    }

    /// Number of instances to draw.
    pub fn instance_count(&self) -> usize {
        self.geometry().map_or(0, GridGeometry::num_instances)
    }

    /// Counters of the most recent aggregation pass.
    pub fn last_stats(&self) -> PassStats {
        self.last_stats
    }

    /// Resolves a color read back from the picking target to a cell.
    pub fn pick(&self, rgb: [u8; 3]) -> Option<PickedCell> {
        let ready = self.ready.as_ref()?;
        if !ready.buffers.has_picking() {
            return None;
        }
        let index = picking::decode(rgb)?;
        let (col, row) = ready.geometry.cell_of(index)?;
        Some(PickedCell { index, col, row })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::projector::Point;
    use glam::{DVec2, Vec3};

    fn identity(p: DVec2) -> DVec2 {
        p
    }

    fn layer() -> GridLayer {
        GridLayer::new(GridConfig::default(), Viewport::new(150.0, 150.0))
    }

    #[test]
    fn starts_uninitialized_and_dirty() {
        let l = layer();
        assert!(!l.is_ready());
        assert!(l.geometry_dirty() && l.data_dirty());
        assert!(l.buffers().is_none());
        assert!(l.uniforms().is_none());
        assert!(l.attributes().is_empty());
        assert_eq!(l.max_count(), 0.0);
    }

    #[test]
    fn first_update_allocates_and_cleans() {
        let mut l = layer();
        let outcome = l.update(&identity, [Point::new(0.0, 0.0)]).unwrap();
        assert_eq!(outcome, UpdateOutcome::Reallocated);
        assert!(l.is_ready());
        assert!(!l.geometry_dirty() && !l.data_dirty());
        assert_eq!(l.instance_count(), 9);
        assert_eq!(l.buffers().unwrap().generation(), 0);
        assert_eq!(l.max_count(), 1.0);
    }

    #[test]
    fn clean_update_touches_nothing() {
        let mut l = layer();
        l.update(&identity, [Point::new(0.0, 0.0)]).unwrap();
        let outcome = l.update(&identity, [Point::new(-140.0, -140.0)]).unwrap();
        assert_eq!(outcome, UpdateOutcome::Unchanged);
        assert_eq!(l.buffers().unwrap().color(4), Some([1.0, 5.0, 1.0]));
        assert_eq!(l.buffers().unwrap().pass(), 1);
    }

    #[test]
    fn data_change_reaggregates_in_place() {
        let mut l = layer();
        l.update(&identity, [Point::new(0.0, 0.0)]).unwrap();
        let positions = l.buffers().unwrap().positions().to_vec();

        l.mark_data_changed();
        let outcome = l.update(&identity, [Point::new(-140.0, -140.0)]).unwrap();
        assert_eq!(outcome, UpdateOutcome::Reaggregated);

        let b = l.buffers().unwrap();
        assert_eq!(b.generation(), 0);
        assert_eq!(b.pass(), 2);
        assert_eq!(b.positions(), positions.as_slice());
        assert_eq!(b.color(0), Some([1.0, 5.0, 1.0]));
        assert_eq!(b.color(4), Some([0.0; 3]));
    }

    #[test]
    fn same_viewport_does_not_dirty_geometry() {
        let mut l = layer();
        l.update(&identity, Vec::<Point>::new()).unwrap();
        l.set_viewport(Viewport::new(150.0, 150.0));
        l.set_unit_size(100.0, 100.0);
        assert!(!l.geometry_dirty());
    }

    #[test]
    fn resize_with_same_cell_count_refills_positions() {
        let mut l = layer();
        l.update(&identity, Vec::<Point>::new()).unwrap();

        // ceil(280 / 100) is still 3 columns and rows.
        l.set_viewport(Viewport::new(140.0, 140.0));
        let outcome = l.update(&identity, [Point::new(0.0, 0.0)]).unwrap();
        assert_eq!(outcome, UpdateOutcome::Relaid);

        let b = l.buffers().unwrap();
        assert_eq!(b.generation(), 0);
        assert_eq!(&b.positions()[..3], &[-140.0, -140.0, 0.0]);
        assert_eq!(b.color(4), Some([1.0, 5.0, 1.0]));
    }

    #[test]
    fn unit_change_reallocates() {
        let mut l = layer();
        l.update(&identity, Vec::<Point>::new()).unwrap();

        l.set_unit_size(50.0, 75.0);
        let outcome = l.update(&identity, Vec::<Point>::new()).unwrap();
        assert_eq!(outcome, UpdateOutcome::Reallocated);

        let g = l.geometry().unwrap();
        assert_eq!((g.num_col, g.num_row), (6, 4));
        let b = l.buffers().unwrap();
        assert_eq!(b.generation(), 1);
        assert_eq!(b.positions().len(), 24 * 3);
        assert_eq!(&b.positions()[3..6], &[-100.0, -150.0, 0.0]);
        assert_eq!(l.uniforms().unwrap().scale, Vec3::new(46.0, 71.0, 1.0));
    }

    #[test]
    fn invalid_units_keep_previous_buffers() {
        let mut l = layer();
        l.update(&identity, [Point::new(0.0, 0.0)]).unwrap();

        l.set_unit_size(0.0, 100.0);
        let err = l.update(&identity, Vec::<Point>::new()).unwrap_err();
        assert!(matches!(err, GridError::InvalidConfig { .. }));

        assert!(l.geometry_dirty());
        assert_eq!(l.instance_count(), 9);
        assert_eq!(l.max_count(), 1.0);
        assert_eq!(l.uniforms().unwrap().scale, Vec3::new(96.0, 96.0, 1.0));

        l.set_unit_size(100.0, 100.0);
        assert_eq!(l.update(&identity, Vec::<Point>::new()).unwrap(), UpdateOutcome::Relaid);
        assert_eq!(l.max_count(), 0.0);
    }

    #[test]
    fn failed_reallocation_keeps_previous_buffers() {
        let mut l = layer();
        l.update(&identity, [Point::new(0.0, 0.0)]).unwrap();
        l.set_unit_size(50.0, 50.0);
        l.update(&identity, [Point::new(0.0, 0.0)]).unwrap();
        let positions = l.buffers().unwrap().positions().to_vec();
        let colors = l.buffers().unwrap().colors().to_vec();
        assert_eq!(l.buffers().unwrap().generation(), 1);

        // 2^32 x 2^30 cells: a valid layout whose buffers cannot be reserved.
        l.set_unit_size(1.0, 1.0);
        l.set_viewport(Viewport::new(2f64.powi(31), 2f64.powi(29)));
        let err = l.update(&identity, Vec::<Point>::new()).unwrap_err();
        assert!(matches!(err, GridError::AllocationFailure { cells, .. } if cells == 1 << 62));

        assert!(l.geometry_dirty());
        let b = l.buffers().unwrap();
        assert_eq!(b.generation(), 1);
        assert_eq!(b.positions(), positions.as_slice());
        assert_eq!(b.colors(), colors.as_slice());
        assert_eq!(l.max_count(), 1.0);
        assert_eq!(l.instance_count(), 36);
        assert_eq!(l.uniforms().unwrap().scale, Vec3::new(46.0, 46.0, 1.0));
    }

    #[test]
    fn invalid_units_before_first_layout_stay_uninitialized() {
        let mut l = GridLayer::new(
            GridConfig::default().with_unit_size(-5.0, 10.0),
            Viewport::new(10.0, 10.0),
        );
        assert!(l.update(&identity, Vec::<Point>::new()).is_err());
        assert!(!l.is_ready());
    }

    #[test]
    fn picking_toggle_reallocates_and_lists_attribute() {
        let mut l = layer();
        l.update(&identity, Vec::<Point>::new()).unwrap();
        let names: Vec<_> = l.attributes().iter().map(|a| a.name).collect();
        assert_eq!(names, ["positions", "colors"]);
        assert_eq!(l.pick([5, 0, 0]), None);

        l.set_picking_enabled(true);
        assert_eq!(l.update(&identity, Vec::<Point>::new()).unwrap(), UpdateOutcome::Reallocated);
        let attrs = l.attributes();
        let names: Vec<_> = attrs.iter().map(|a| a.name).collect();
        assert_eq!(names, ["positions", "colors", "pickingColors"]);
        assert!(attrs.iter().all(|a| a.size == 3 && a.divisor == 1 && a.values.len() == 27));
        assert_eq!(attrs[1].bytes().len(), 27 * 4);

        assert_eq!(l.pick([5, 0, 0]), Some(PickedCell { index: 4, col: 1, row: 1 }));
        assert_eq!(l.pick([0, 0, 0]), None);
        assert_eq!(l.pick([10, 0, 0]), None);
    }

    #[test]
    fn stats_track_last_pass() {
        let mut l = layer();
        l.update(&identity, [(0.0, 0.0), (500.0, 0.0)]).unwrap();
        assert_eq!(l.last_stats(), PassStats { points: 2, binned: 1, dropped: 1 });
    }
}
