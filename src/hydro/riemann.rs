//! HLLC approximate Riemann solver for the 2D Euler equations, following
//! Toro (2009) chapters 9 and 10.
//!
//! The solver never fails. Pressures and sound speeds recovered from the
//! left and right states are floored, which guards against small negative
//! pressures from reconstruction overshoot; a zero density still produces
//! non-finite fluxes.

use rayon::prelude::*;
use crate::index_space::Axis;
use crate::patch::Patch;
use super::eos;
use super::euler2d::Conserved;
use super::geometry::Direction;




pub const PRESSURE_FLOOR: f64 = 1e-5;
pub const SOUND_SPEED_FLOOR: f64 = 1e-5;

/// Pressure ratio above which the primitive-variable pressure estimate is
/// replaced by a two-rarefaction or two-shock estimate, if it lies outside
/// the range of the left and right pressures.
pub const PRESSURE_RATIO_THRESHOLD: f64 = 2.0;




/**
 * One side of a Riemann problem, decomposed in the frame of the interface:
 * the normal velocity is along the sweep direction and the tangential
 * velocity is across it.
 */
#[derive(Clone, Copy, Debug)]
pub struct SideState {
    pub mass_density: f64,
    pub normal_velocity: f64,
    pub tangential_velocity: f64,
    pub energy_density: f64,
    pub gas_pressure: f64,
    pub sound_speed: f64,
}




// ============================================================================
impl SideState {

    pub fn from_conserved(u: Conserved, direction: Direction, gamma_law_index: f64) -> Self {
        let u = u.rotate(direction);
        let d = u.mass_density();
        let un = u.momentum_1() / d;
        let ut = u.momentum_2() / d;
        let e = u.energy_density();
        let ei = e / d - 0.5 * (un * un + ut * ut);
        let pg = eos::pressure_from_density_energy(d, ei, gamma_law_index).max(PRESSURE_FLOOR);
        let cs = eos::sound_speed(d, pg, gamma_law_index).max(SOUND_SPEED_FLOOR);

        Self {
            mass_density: d,
            normal_velocity: un,
            tangential_velocity: ut,
            energy_density: e,
            gas_pressure: pg,
            sound_speed: cs,
        }
    }

    /// The conserved state, in the frame of the interface.
    fn conserved(&self) -> Conserved {
        let d = self.mass_density;
        Conserved::new(d, d * self.normal_velocity, d * self.tangential_velocity, self.energy_density)
    }

    /// The Euler flux through the interface, in the frame of the interface.
    fn flux(&self) -> Conserved {
        let d = self.mass_density;
        let un = self.normal_velocity;
        let pg = self.gas_pressure;

        Conserved::new(
            d * un,
            d * un * un + pg,
            d * un * self.tangential_velocity,
            un * (self.energy_density + pg))
    }

    /// The HLLC star state (Toro 10.39) behind a wave of speed `s`, given
    /// the contact speed `s_star`.
    fn star_state(&self, s: f64, s_star: f64) -> Conserved {
        let d = self.mass_density;
        let un = self.normal_velocity;
        let factor = d * (s - un) / (s - s_star);
        let specific_energy = self.energy_density / d
            + (s_star - un) * (s_star + self.gas_pressure / (d * (s - un)));

        Conserved::new(
            factor,
            factor * s_star,
            factor * self.tangential_velocity,
            factor * specific_energy)
    }

    /// The factor `q` multiplying the sound speed in the wave speed estimate
    /// (Toro 10.59 - 10.60): one for a rarefaction, larger for a shock.
    fn wave_speed_factor(&self, p_star: f64, gamma_law_index: f64) -> f64 {
        if p_star <= self.gas_pressure {
            1.0
        } else {
            let g = (gamma_law_index + 1.0) / (2.0 * gamma_law_index);
            (1.0 + g * (p_star / self.gas_pressure - 1.0)).sqrt()
        }
    }
}




// ============================================================================
/// Primitive-variable (linearised) estimate of the star-region pressure,
/// Toro 9.20. Not floored.
pub fn pressure_pvrs(l: &SideState, r: &SideState) -> f64 {
    let d_bar = 0.5 * (l.mass_density + r.mass_density);
    let a_bar = 0.5 * (l.sound_speed + r.sound_speed);
    0.5 * (l.gas_pressure + r.gas_pressure)
        - 0.5 * (r.normal_velocity - l.normal_velocity) * d_bar * a_bar
}

/// Two-rarefaction estimate of the star-region pressure, Toro 9.32.
pub fn pressure_trrs(l: &SideState, r: &SideState, gamma_law_index: f64) -> f64 {
    let z = (gamma_law_index - 1.0) / (2.0 * gamma_law_index);
    let num = l.sound_speed + r.sound_speed
        - 0.5 * (gamma_law_index - 1.0) * (r.normal_velocity - l.normal_velocity);
    let den = l.sound_speed / l.gas_pressure.powf(z) + r.sound_speed / r.gas_pressure.powf(z);
    (num.max(0.0) / den).powf(1.0 / z)
}

/// Two-shock estimate of the star-region pressure, Toro 9.42, with the
/// functions `g_K` evaluated at the pressure guess `p0`.
pub fn pressure_tsrs(l: &SideState, r: &SideState, p0: f64, gamma_law_index: f64) -> f64 {
    let g = |s: &SideState| {
        let a = 2.0 / ((gamma_law_index + 1.0) * s.mass_density);
        let b = (gamma_law_index - 1.0) / (gamma_law_index + 1.0) * s.gas_pressure;
        (a / (p0 + b)).sqrt()
    };
    let gl = g(l);
    let gr = g(r);
    let p = (gl * l.gas_pressure + gr * r.gas_pressure - (r.normal_velocity - l.normal_velocity)) / (gl + gr);
    p.max(0.0)
}

/**
 * Adaptive star-region pressure. The primitive-variable estimate is used
 * unless the pressure ratio across the interface exceeds
 * `PRESSURE_RATIO_THRESHOLD` and the estimate falls outside the range of the
 * left and right pressures; then it is replaced by the two-rarefaction
 * estimate (below the range) or the two-shock estimate (above it).
 */
pub fn star_pressure(l: &SideState, r: &SideState, gamma_law_index: f64) -> f64 {
    let p_min = l.gas_pressure.min(r.gas_pressure);
    let p_max = l.gas_pressure.max(r.gas_pressure);
    let p_pv = pressure_pvrs(l, r).max(0.0);
    let q = p_max / p_min;

    if q > PRESSURE_RATIO_THRESHOLD && (p_pv < p_min || p_pv > p_max) {
        if p_pv < p_min {
            pressure_trrs(l, r, gamma_law_index)
        } else {
            pressure_tsrs(l, r, p_pv, gamma_law_index)
        }
    } else {
        p_pv
    }
}

/// Estimates of the left, contact, and right wave speeds.
pub fn wave_speeds(l: &SideState, r: &SideState, gamma_law_index: f64) -> (f64, f64, f64) {
    let p_star = star_pressure(l, r, gamma_law_index);
    let s_l = l.normal_velocity - l.sound_speed * l.wave_speed_factor(p_star, gamma_law_index);
    let s_r = r.normal_velocity + r.sound_speed * r.wave_speed_factor(p_star, gamma_law_index);

    let dl = l.mass_density * (s_l - l.normal_velocity);
    let dr = r.mass_density * (s_r - r.normal_velocity);
    let s_c = (r.gas_pressure - l.gas_pressure + l.normal_velocity * dl - r.normal_velocity * dr) / (dl - dr);

    (s_l, s_c, s_r)
}




// ============================================================================
/**
 * Compute the HLLC flux at an interface normal to the given direction, from
 * the conserved states on its left and right. The returned flux has the
 * component order of `Conserved`, in the lab frame.
 */
pub fn riemann_hllc(ul: Conserved, ur: Conserved, direction: Direction, gamma_law_index: f64) -> Conserved {
    let l = SideState::from_conserved(ul, direction, gamma_law_index);
    let r = SideState::from_conserved(ur, direction, gamma_law_index);
    let (s_l, s_c, s_r) = wave_speeds(&l, &r, gamma_law_index);

    let flux = if s_r <= 0.0 {
        r.flux()
    } else if s_c <= 0.0 {
        r.flux() + (r.star_state(s_r, s_c) - r.conserved()) * s_r
    } else if s_l < 0.0 {
        l.flux() + (l.star_state(s_l, s_c) - l.conserved()) * s_l
    } else {
        l.flux()
    };
    flux.rotate(direction)
}

/**
 * Solve the Riemann problem at every face in the index space of `flux`.
 * Faces are indexed by the cell on their upper side along the axis, so the
 * face at index `(i, j)` on axis `I` takes its left state from `left` at
 * `(i - 1, j)` and its right state from `right` at `(i, j)`.
 */
pub fn solve_riemann(left: &Patch, right: &Patch, axis: Axis, gamma_law_index: f64, flux: &mut Patch) {
    let faces = flux.index_space().clone();
    let nq = flux.num_fields();

    assert!(left.num_fields() == nq && right.num_fields() == nq);
    assert!(left.index_space().contains_space(&faces.translate(-1, axis)), "left states do not cover the faces");
    assert!(right.index_space().contains_space(&faces), "right states do not cover the faces");

    let direction = Direction::from(axis);
    let (si, sj) = match axis {
        Axis::I => (1, 0),
        Axis::J => (0, 1),
    };
    let js = faces.range(Axis::J);

    flux.par_rows_mut().for_each(|(i, row)| {
        for (j, f) in js.clone().zip(row.chunks_exact_mut(nq)) {
            let ul = Conserved::from(left.get_slice((i - si, j - sj)));
            let ur = Conserved::from(right.get_slice((i, j)));
            riemann_hllc(ul, ur, direction, gamma_law_index).write_to_slice(f)
        }
    });
}
