use rayon::prelude::*;
use crate::boundary::Boundaries;
use crate::hydro::euler2d::{Conserved, NUM_FIELDS};
use crate::hydro::geometry::Direction;
use crate::hydro::reconstruct::Reconstruction;
use crate::hydro::riemann::solve_riemann;
use crate::hydro::Error;
use crate::index_space::{Axis, IndexSpace};
use crate::mesh::Mesh;
use crate::patch::Patch;




/**
 * Return the largest stable time step for the given state: `cfl` times the
 * smaller cell spacing, divided by the fastest signal speed `max(|u|, |v|) +
 * a` over the interior cells. The reduction over rows runs in parallel. A
 * cell with negative density or pressure is an error, as is a maximum signal
 * speed that is zero or not finite.
 */
pub fn calculate_timestep(state: &Patch, mesh: &Mesh, cfl: f64, gamma_law_index: f64) -> Result<f64, Error> {
    let interior = mesh.interior();
    let is = interior.range(Axis::I);
    let js = interior.range(Axis::J);

    let row_maxima = state
        .par_rows()
        .filter(|(i, _)| is.contains(i))
        .map(|(i, _)| {
            js.clone().try_fold(0.0, |a: f64, j| -> Result<f64, Error> {
                let p = Conserved::from(state.get_slice((i, j))).to_primitive(gamma_law_index)?;
                Ok(a.max(p.max_signal_speed(gamma_law_index)))
            })
        })
        .collect::<Result<Vec<f64>, Error>>()?;

    let max_signal_speed = row_maxima.into_iter().fold(0.0, f64::max);

    if !(max_signal_speed.is_finite() && max_signal_speed > 0.0) {
        return Err(Error::NonPhysicalWaveSpeed(max_signal_speed))
    }
    let (dx, dy) = mesh.cell_spacing();
    Ok(cfl * dx.min(dy) / max_signal_speed)
}




/**
 * The MUSCL-Hancock scheme for the 2D Euler equations. Each step fills the
 * guard zones, reconstructs limited slopes, evolves the boundary-extrapolated
 * states by half a time step, solves the Riemann problem at every face, and
 * applies the conservative update to the interior cells.
 *
 * The scratch patches are allocated once, when the scheme is created, and
 * reused on every step. The slopes and extrapolated states cover the
 * interior plus one cell on each side; the faces on each axis are indexed by
 * the cell above them.
 */
pub struct MusclHancock {
    mesh: Mesh,
    gamma_law_index: f64,
    reconstruction: Reconstruction,
    boundaries: Boundaries,
    slope_i: Patch,
    slope_j: Patch,
    lower_i: Patch,
    upper_i: Patch,
    lower_j: Patch,
    upper_j: Patch,
    flux_i: Patch,
    flux_j: Patch,
}




// ============================================================================
impl MusclHancock {

    pub fn new(mesh: Mesh, gamma_law_index: f64, reconstruction: Reconstruction, boundaries: Boundaries) -> Self {
        let interior = mesh.interior();
        let stencil = interior.extend_all(1);
        let scratch = || Patch::zeros(NUM_FIELDS, stencil.clone());

        Self {
            slope_i: scratch(),
            slope_j: scratch(),
            lower_i: scratch(),
            upper_i: scratch(),
            lower_j: scratch(),
            upper_j: scratch(),
            flux_i: Patch::zeros(NUM_FIELDS, interior.extend_upper(1, Axis::I)),
            flux_j: Patch::zeros(NUM_FIELDS, interior.extend_upper(1, Axis::J)),
            mesh,
            gamma_law_index,
            reconstruction,
            boundaries,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn interior(&self) -> IndexSpace {
        self.mesh.interior()
    }

    /// Fill the guard zones of the state according to the boundary conditions.
    pub fn apply_boundaries(&self, state: &mut Patch) {
        self.boundaries.apply(state, &self.mesh.interior())
    }


    /**
     * Advance the state, which must cover the mesh's extended index space,
     * by the time step `dt`.
     */
    pub fn advance(&mut self, state: &mut Patch, dt: f64) {
        assert_eq!(state.index_space(), &self.mesh.extended(), "state must cover the extended mesh");
        assert_eq!(state.num_fields(), NUM_FIELDS);

        self.apply_boundaries(state);
        self.reconstruction.compute_slopes(state, &mut self.slope_i, &mut self.slope_j);
        self.predict(state, dt);
        solve_riemann(&self.upper_i, &self.lower_i, Axis::I, self.gamma_law_index, &mut self.flux_i);
        solve_riemann(&self.upper_j, &self.lower_j, Axis::J, self.gamma_law_index, &mut self.flux_j);
        self.update(state, dt);
    }


    /**
     * Extrapolate each cell to its four faces and evolve the face values by
     * half a time step, using the flux differences of both axes.
     */
    fn predict(&mut self, state: &Patch, dt: f64) {
        let Self { mesh, gamma_law_index, slope_i, slope_j, lower_i, upper_i, lower_j, upper_j, .. } = self;

        let g = *gamma_law_index;
        let (dx, dy) = mesh.cell_spacing();
        let js = slope_i.index_space().range(Axis::J);
        let nq = NUM_FIELDS;
        let slope_i = &*slope_i;
        let slope_j = &*slope_j;

        lower_i.par_rows_mut()
            .zip(upper_i.par_rows_mut())
            .zip(lower_j.par_rows_mut())
            .zip(upper_j.par_rows_mut())
            .for_each(|((((i, li), (_, ui)), (_, lj)), (_, uj))| {
                let faces = li.chunks_exact_mut(nq)
                    .zip(ui.chunks_exact_mut(nq))
                    .zip(lj.chunks_exact_mut(nq))
                    .zip(uj.chunks_exact_mut(nq));

                for (j, (((li, ui), lj), uj)) in js.clone().zip(faces) {
                    let u = Conserved::from(state.get_slice((i, j)));
                    let di = Conserved::from(slope_i.get_slice((i, j))) * 0.5;
                    let dj = Conserved::from(slope_j.get_slice((i, j))) * 0.5;

                    let (uil, uir) = (u - di, u + di);
                    let (ujl, ujr) = (u - dj, u + dj);

                    let du = (uil.flux_vector(Direction::X, g) - uir.flux_vector(Direction::X, g)) * (0.5 * dt / dx)
                           + (ujl.flux_vector(Direction::Y, g) - ujr.flux_vector(Direction::Y, g)) * (0.5 * dt / dy);

                    (uil + du).write_to_slice(li);
                    (uir + du).write_to_slice(ui);
                    (ujl + du).write_to_slice(lj);
                    (ujr + du).write_to_slice(uj);
                }
            });
    }


    /**
     * Apply the conservative update to the interior cells.
     */
    fn update(&self, state: &mut Patch, dt: f64) {
        let interior = self.mesh.interior();
        let (dx, dy) = self.mesh.cell_spacing();
        let is = interior.range(Axis::I);
        let js = interior.range(Axis::J);
        let j0 = state.index_space().start().1;
        let nq = NUM_FIELDS;
        let (flux_i, flux_j) = (&self.flux_i, &self.flux_j);

        state.par_rows_mut()
            .filter(|(i, _)| is.contains(i))
            .for_each(|(i, row)| {
                for j in js.clone() {
                    let n = (j - j0) as usize * nq;
                    let u = &mut row[n..n + nq];
                    let fim = flux_i.get_slice((i, j));
                    let fip = flux_i.get_slice((i + 1, j));
                    let fjm = flux_j.get_slice((i, j));
                    let fjp = flux_j.get_slice((i, j + 1));

                    for (q, u) in u.iter_mut().enumerate() {
                        *u -= (fip[q] - fim[q]) * dt / dx + (fjp[q] - fjm[q]) * dt / dy;
                    }
                }
            });
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::boundary::BoundaryCondition::*;
    use crate::hydro::euler2d::Primitive;

    const GAMMA: f64 = 1.4;

    fn mesh(n: i64) -> Mesh {
        Mesh { area: (0.0..1.0, 0.0..1.0), size: (n, n), num_guard: 2 }
    }

    fn state_from<F>(mesh: &Mesh, f: F) -> Patch
    where
        F: Fn((f64, f64)) -> Primitive,
    {
        Patch::from_slice_function(mesh.extended(), NUM_FIELDS, |index, u| {
            f(mesh.cell_center(index)).to_conserved(GAMMA).write_to_slice(u)
        })
    }

    fn scheme(mesh: &Mesh) -> MusclHancock {
        MusclHancock::new(mesh.clone(), GAMMA, Reconstruction::default(), Boundaries::periodic())
    }

    #[test]
    fn timestep_matches_the_cfl_bound() {
        let mesh = mesh(64);
        let state = state_from(&mesh, |_| Primitive::new(1.4, 2.0, 0.0, 1.0));
        let (dx, _) = mesh.cell_spacing();
        let dt = calculate_timestep(&state, &mesh, 0.4, GAMMA).unwrap();

        assert!((dt - 0.4 * dx / 3.0).abs() < 1e-12 * dt);
        assert!(dt > 0.0 && dt <= dx / 3.0);
    }

    #[test]
    fn timestep_uses_the_smaller_spacing_and_faster_axis() {
        // dx1 = 0.2 and dx2 = 0.1: the step is limited by dx2, half of what
        // dx1 alone would allow
        let mesh = Mesh { area: (0.0..2.0, 0.0..1.0), size: (10, 10), num_guard: 2 };
        let state = state_from(&mesh, |_| Primitive::new(1.4, 0.5, -2.0, 1.0));
        let dt = calculate_timestep(&state, &mesh, 1.0, GAMMA).unwrap();
        assert!((dt - 0.1 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn timestep_rejects_negative_pressure() {
        let mesh = mesh(8);
        let mut state = state_from(&mesh, |_| Primitive::new(1.0, 0.0, 0.0, 1.0));
        Conserved::new(1.0, 0.0, 0.0, -1.0).write_to_slice(state.get_slice_mut((3, 3)));
        assert!(matches!(calculate_timestep(&state, &mesh, 0.4, GAMMA), Err(Error::NegativeGasPressure(_))));
    }

    #[test]
    fn timestep_rejects_a_state_with_no_signal_speed() {
        let mesh = mesh(4);
        let state = state_from(&mesh, |_| Primitive::new(1.0, 0.0, 0.0, 0.0));
        assert!(matches!(calculate_timestep(&state, &mesh, 0.4, GAMMA), Err(Error::NonPhysicalWaveSpeed(_))));
    }

    #[test]
    fn timestep_ignores_guard_zones() {
        let mesh = mesh(8);
        let mut state = state_from(&mesh, |_| Primitive::new(1.4, 0.0, 0.0, 1.0));
        Conserved::new(1.0, 0.0, 0.0, -1.0).write_to_slice(state.get_slice_mut((-1, 3)));
        assert!(calculate_timestep(&state, &mesh, 0.4, GAMMA).is_ok());
    }

    #[test]
    fn uniform_state_is_unchanged() {
        let mesh = mesh(16);
        let mut state = state_from(&mesh, |_| Primitive::new(1.0, 0.3, -0.2, 1.0));
        let initial = state.clone();
        let mut scheme = scheme(&mesh);
        let dt = calculate_timestep(&state, &mesh, 0.4, GAMMA).unwrap();

        scheme.advance(&mut state, dt);

        for index in mesh.interior().iter() {
            for q in 0..NUM_FIELDS {
                assert!((state.get(index, q) - initial.get(index, q)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn periodic_step_conserves_totals() {
        let mesh = mesh(32);
        let mut state = state_from(&mesh, |(x, y)| {
            let d = 1.0 + 0.5 * (2.0 * std::f64::consts::PI * (x + y)).sin();
            Primitive::new(d, 0.4, 0.1, 1.0 + if x < 0.5 { 0.5 } else { 0.0 })
        });
        let before = state.totals(mesh.interior());
        let mut scheme = scheme(&mesh);

        for _ in 0..3 {
            let dt = calculate_timestep(&state, &mesh, 0.4, GAMMA).unwrap();
            scheme.advance(&mut state, dt);
        }
        let after = state.totals(mesh.interior());

        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-10 * a.abs().max(1.0), "{} != {}", a, b);
        }
    }

    #[test]
    fn walled_box_conserves_mass_and_energy() {
        let mesh = mesh(32);
        let mut state = state_from(&mesh, |(x, y)| {
            let r2 = (x - 0.5).powi(2) + (y - 0.5).powi(2);
            Primitive::new(1.0, 0.0, 0.0, if r2 < 0.01 { 10.0 } else { 1.0 })
        });
        let boundaries = Boundaries::new(Wall, Wall, Wall, Wall).unwrap();
        let mut scheme = MusclHancock::new(mesh.clone(), GAMMA, Reconstruction::default(), boundaries);
        let before = state.totals(mesh.interior());

        for _ in 0..50 {
            let dt = calculate_timestep(&state, &mesh, 0.4, GAMMA).unwrap();
            scheme.advance(&mut state, dt);
        }
        let after = state.totals(mesh.interior());

        for q in [0, 3] {
            assert!((before[q] - after[q]).abs() < 1e-10 * before[q].abs(), "{} != {}", before[q], after[q]);
        }
        let (dmin, _) = state.field_range(mesh.interior(), 0);
        assert!(dmin > 0.0);
    }

    #[test]
    fn sod_problem_stays_positive_and_bounded() {
        let mesh = mesh(32);
        let mut state = state_from(&mesh, |(x, _)| {
            if x < 0.5 { Primitive::new(1.0, 0.0, 0.0, 1.0) } else { Primitive::new(0.125, 0.0, 0.0, 0.1) }
        });
        let boundaries = Boundaries::new(Transmissive, Transmissive, Periodic, Periodic).unwrap();
        let mut scheme = MusclHancock::new(mesh.clone(), GAMMA, Reconstruction::default(), boundaries);

        for _ in 0..10 {
            let dt = calculate_timestep(&state, &mesh, 0.4, GAMMA).unwrap();
            scheme.advance(&mut state, dt);
        }
        let (dmin, dmax) = state.field_range(mesh.interior(), 0);
        assert!(dmin > 0.1 && dmax < 1.05);

        for index in mesh.interior().iter() {
            assert!(Conserved::from(state.get_slice(index)).to_primitive(GAMMA).is_ok());
            assert!(state.get(index, 2).abs() < 1e-12);
        }
    }

    #[test]
    #[should_panic]
    fn state_without_guard_zones_panics() {
        let mesh = mesh(8);
        let mut state = Patch::zeros(NUM_FIELDS, mesh.interior());
        scheme(&mesh).advance(&mut state, 0.01);
    }
}
