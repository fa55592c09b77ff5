//! Piecewise-linear reconstruction of cell-centered data.
//!
//! Slopes are the undivided differences `delta` across a cell, so the
//! boundary-extrapolated values are `U -/+ delta / 2`.

use rayon::prelude::*;
use crate::index_space::Axis;
use crate::patch::Patch;




/**
 * Method used to estimate the slope of each field in each cell. The limited
 * method is the TVD family of Toro (2009) section 14.4: `beta = 1` is the
 * minmod limiter and `beta = 2` is superbee. The unlimited method is the
 * weighted-center estimate `(1 + omega) / 2 * delta_minus + (1 - omega) / 2 *
 * delta_plus`; it does not prevent new extrema and is meant for smooth
 * problems.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reconstruction {
    Limited { beta: f64 },
    Unlimited { omega: f64 },
}




// ============================================================================
impl Default for Reconstruction {
    fn default() -> Self {
        Reconstruction::Limited { beta: 1.0 }
    }
}

impl Reconstruction {

    /// The slope of a single field, given the backward difference `dm = U(i)
    /// - U(i - 1)` and the forward difference `dp = U(i + 1) - U(i)`.
    pub fn slope(&self, dm: f64, dp: f64) -> f64 {
        match *self {
            Reconstruction::Limited { beta } => limited_slope(dm, dp, beta),
            Reconstruction::Unlimited { omega } => unlimited_slope(dm, dp, omega),
        }
    }

    /// Write the slopes of every field of cell `u`, given its neighbors `um`
    /// and `up` along one axis.
    pub fn slope_into(&self, um: &[f64], u: &[f64], up: &[f64], delta: &mut [f64]) {
        for (n, d) in delta.iter_mut().enumerate() {
            *d = self.slope(u[n] - um[n], up[n] - u[n])
        }
    }

    /**
     * Compute the slopes along both axes, for every cell in the index space
     * of `slope_i` (which must equal that of `slope_j`). The state patch must
     * contain the cells one index beyond that space on each side.
     */
    pub fn compute_slopes(&self, state: &Patch, slope_i: &mut Patch, slope_j: &mut Patch) {
        let space = slope_i.index_space().clone();
        let nq = state.num_fields();

        assert_eq!(&space, slope_j.index_space(), "slope patches must cover the same cells");
        assert!(slope_i.num_fields() == nq && slope_j.num_fields() == nq);
        assert!(state.index_space().contains_space(&space.extend_all(1)), "state lacks guard zones for slopes");

        let js = space.range(Axis::J);

        slope_i.par_rows_mut().zip(slope_j.par_rows_mut()).for_each(|((i, row_i), (_, row_j))| {
            let cells = row_i.chunks_exact_mut(nq).zip(row_j.chunks_exact_mut(nq));

            for (j, (di, dj)) in js.clone().zip(cells) {
                let u = state.get_slice((i, j));
                self.slope_into(state.get_slice((i - 1, j)), u, state.get_slice((i + 1, j)), di);
                self.slope_into(state.get_slice((i, j - 1)), u, state.get_slice((i, j + 1)), dj);
            }
        });
    }
}




// ============================================================================
pub fn limited_slope(dm: f64, dp: f64, beta: f64) -> f64 {
    if dp > 0.0 {
        f64::max(0.0, f64::max(f64::min(beta * dm, dp), f64::min(dm, beta * dp)))
    } else {
        f64::min(0.0, f64::min(f64::max(beta * dm, dp), f64::max(dm, beta * dp)))
    }
}

pub fn unlimited_slope(dm: f64, dp: f64, omega: f64) -> f64 {
    0.5 * (1.0 + omega) * dm + 0.5 * (1.0 - omega) * dp
}
