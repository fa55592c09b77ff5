use core::ops::Range;
use crate::index_space::{range2d, IndexSpace};




/// Type alias for a 2d range
pub type Rectangle<T> = (Range<T>, Range<T>);




/// A uniform rectilinear structured mesh, surrounded by `num_guard` layers of
/// guard (ghost) zones on each side. Interior cells have indexes `(0..ni,
/// 0..nj)`; guard zones have negative indexes, or indexes past the interior
/// extent.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub area: Rectangle<f64>,
    pub size: (i64, i64),
    pub num_guard: i64,
}

impl Mesh {
    pub fn cell_spacing(&self) -> (f64, f64) {
        let d0 = (self.area.0.end - self.area.0.start) / self.size.0 as f64;
        let d1 = (self.area.1.end - self.area.1.start) / self.size.1 as f64;
        (d0, d1)
    }

    pub fn cell_center(&self, index: (i64, i64)) -> (f64, f64) {
        let (d0, d1) = self.cell_spacing();
        let x0 = self.area.0.start + d0 * (index.0 as f64 + 0.5);
        let x1 = self.area.1.start + d1 * (index.1 as f64 + 0.5);
        (x0, x1)
    }

    pub fn total_zones(&self) -> i64 {
        self.size.0 * self.size.1
    }

    /// The index space of the real (non-guard) cells.
    pub fn interior(&self) -> IndexSpace {
        range2d(0..self.size.0, 0..self.size.1)
    }

    /// The index space of the real cells plus the guard zones.
    pub fn extended(&self) -> IndexSpace {
        self.interior().extend_all(self.num_guard)
    }
}
