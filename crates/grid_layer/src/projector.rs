//! Boundary traits: the host's projection and its point records.

use glam::DVec2;

/// Maps a world/geo coordinate to grid screen space, where the grid spans
/// `[-width, width] x [-height, height]` around the viewport center.
///
/// Must be pure; it is called once per point on every aggregation pass.
pub trait Projector {
    fn project(&self, world: DVec2) -> DVec2;
}

impl<F> Projector for F
where
    F: Fn(DVec2) -> DVec2,
{
    #[inline]
    fn project(&self, world: DVec2) -> DVec2 {
        self(world)
    }
}

/// Anything carrying a two-component world position.
pub trait GeoPoint {
    fn position(&self) -> DVec2;
}

/// The minimal input record: a world position and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub position: DVec2,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
        }
    }
}

impl GeoPoint for Point {
    #[inline]
    fn position(&self) -> DVec2 {
        self.position
    }
}

impl GeoPoint for DVec2 {
    #[inline]
    fn position(&self) -> DVec2 {
        *self
    }
}

impl GeoPoint for [f64; 2] {
    #[inline]
    fn position(&self) -> DVec2 {
        DVec2::from(*self)
    }
}

impl GeoPoint for (f64, f64) {
    #[inline]
    fn position(&self) -> DVec2 {
        DVec2::new(self.0, self.1)
    }
}

impl<T: GeoPoint + ?Sized> GeoPoint for &T {
    #[inline]
    fn position(&self) -> DVec2 {
        (**self).position()
    }
}
