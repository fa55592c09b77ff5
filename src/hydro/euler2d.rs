use std::ops::{Add, Sub, Mul, Div};
use crate::patch::Patch;
use super::eos;
use super::error::Error;
use super::geometry::Direction;




/// Number of conserved (and primitive) fields of the 2D Euler equations.
pub const NUM_FIELDS: usize = 4;




// ============================================================================
/// Conserved variables: mass density, the two momentum densities, and the
/// total energy density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conserved(f64, f64, f64, f64);

/// Primitive variables: mass density, the two velocity components, and the
/// gas pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Primitive(f64, f64, f64, f64);




// ============================================================================
impl Conserved {

    pub fn new(mass_density: f64, momentum_1: f64, momentum_2: f64, energy_density: f64) -> Self {
        Self(mass_density, momentum_1, momentum_2, energy_density)
    }

    pub fn write_to_slice(&self, cons: &mut [f64]) {
        cons[0] = self.0;
        cons[1] = self.1;
        cons[2] = self.2;
        cons[3] = self.3;
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.0, self.1, self.2, self.3]
    }

    pub fn mass_density(&self) -> f64 {
        self.0
    }

    pub fn momentum_1(&self) -> f64 {
        self.1
    }

    pub fn momentum_2(&self) -> f64 {
        self.2
    }

    pub fn energy_density(&self) -> f64 {
        self.3
    }

    pub fn momentum(&self, direction: Direction) -> f64 {
        match direction {
            Direction::X => self.momentum_1(),
            Direction::Y => self.momentum_2(),
        }
    }

    pub fn momentum_squared(&self) -> f64 {
        self.1 * self.1 + self.2 * self.2
    }

    /// Gas pressure from the ideal gas law, `p = rho (gamma - 1) e` with `e =
    /// E / rho - (u^2 + v^2) / 2`. Not checked for positivity.
    pub fn gas_pressure(&self, gamma_law_index: f64) -> f64 {
        let d = self.mass_density();
        let e = self.energy_density() / d - 0.5 * self.momentum_squared() / (d * d);
        eos::pressure_from_density_energy(d, e, gamma_law_index)
    }

    /// Recover primitive variables without any validation. A zero density
    /// produces non-finite velocities.
    pub fn primitive_unchecked(&self, gamma_law_index: f64) -> Primitive {
        let d = self.mass_density();
        Primitive(
            d,
            self.momentum_1() / d,
            self.momentum_2() / d,
            self.gas_pressure(gamma_law_index))
    }

    pub fn to_primitive(&self, gamma_law_index: f64) -> Result<Primitive, Error> {
        let prim = self.primitive_unchecked(gamma_law_index);

        if !(self.mass_density() > 0.0) {
            Err(Error::NegativeMassDensity(self.mass_density()))
        } else if !(prim.gas_pressure() >= 0.0) {
            Err(Error::NegativeGasPressure(prim.gas_pressure()))
        } else {
            Ok(prim)
        }
    }

    /// The Euler flux of this state through a face normal to the given
    /// direction.
    pub fn flux_vector(&self, direction: Direction, gamma_law_index: f64) -> Conserved {
        let pg = self.gas_pressure(gamma_law_index);
        let vn = self.momentum(direction) / self.mass_density();

        Conserved(
            self.0 * vn,
            self.1 * vn + pg * direction.along(Direction::X),
            self.2 * vn + pg * direction.along(Direction::Y),
            self.3 * vn + pg * vn)
    }

    /// Mirror the momentum component along the given direction.
    pub fn reflect(&self, direction: Direction) -> Conserved {
        match direction {
            Direction::X => Conserved(self.0, -self.1, self.2, self.3),
            Direction::Y => Conserved(self.0, self.1, -self.2, self.3),
        }
    }

    /// Exchange the two momentum components if the direction is `Y`. This
    /// maps a state into the frame where the first momentum component is
    /// normal to the face, and (being an involution) back again.
    pub fn rotate(&self, direction: Direction) -> Conserved {
        match direction {
            Direction::X => *self,
            Direction::Y => Conserved(self.0, self.2, self.1, self.3),
        }
    }
}

impl From<&[f64]> for Conserved {
    fn from(cons: &[f64]) -> Self {
        Self(cons[0], cons[1], cons[2], cons[3])
    }
}




// ============================================================================
impl Primitive {

    pub fn new(mass_density: f64, velocity_1: f64, velocity_2: f64, gas_pressure: f64) -> Self {
        Self(mass_density, velocity_1, velocity_2, gas_pressure)
    }

    pub fn write_to_slice(&self, prim: &mut [f64]) {
        prim[0] = self.0;
        prim[1] = self.1;
        prim[2] = self.2;
        prim[3] = self.3;
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.0, self.1, self.2, self.3]
    }

    pub fn mass_density(&self) -> f64 {
        self.0
    }

    pub fn velocity_1(&self) -> f64 {
        self.1
    }

    pub fn velocity_2(&self) -> f64 {
        self.2
    }

    pub fn gas_pressure(&self) -> f64 {
        self.3
    }

    pub fn velocity(&self, direction: Direction) -> f64 {
        match direction {
            Direction::X => self.velocity_1(),
            Direction::Y => self.velocity_2(),
        }
    }

    pub fn velocity_squared(&self) -> f64 {
        self.1 * self.1 + self.2 * self.2
    }

    pub fn sound_speed(&self, gamma_law_index: f64) -> f64 {
        eos::sound_speed(self.mass_density(), self.gas_pressure(), gamma_law_index)
    }

    pub fn specific_internal_energy(&self, gamma_law_index: f64) -> f64 {
        eos::internal_energy_from_density_pressure(self.mass_density(), self.gas_pressure(), gamma_law_index)
    }

    /// The largest of `|u| + a` and `|v| + a`, which bounds the signal
    /// speed along either grid axis.
    pub fn max_signal_speed(&self, gamma_law_index: f64) -> f64 {
        let cs = self.sound_speed(gamma_law_index);
        self.velocity_1().abs().max(self.velocity_2().abs()) + cs
    }

    pub fn to_conserved(&self, gamma_law_index: f64) -> Conserved {
        let d   = self.mass_density();
        let e   = self.specific_internal_energy(gamma_law_index);
        let vsq = self.velocity_squared();

        Conserved(
            d,
            d * self.velocity_1(),
            d * self.velocity_2(),
            d * (e + 0.5 * vsq))
    }

    pub fn flux_vector(&self, direction: Direction, gamma_law_index: f64) -> Conserved {
        self.to_conserved(gamma_law_index).flux_vector(direction, gamma_law_index)
    }

}

impl From<&[f64]> for Primitive {
    fn from(prim: &[f64]) -> Self {
        Self(prim[0], prim[1], prim[2], prim[3])
    }
}




// ============================================================================
impl Add<Conserved> for Conserved {
    type Output = Conserved;
    fn add(self, u: Self) -> Conserved {
        Conserved(self.0 + u.0, self.1 + u.1, self.2 + u.2, self.3 + u.3)
    }
}

impl Sub<Conserved> for Conserved {
    type Output = Self;
    fn sub(self, u: Self) -> Self {
        Self(self.0 - u.0, self.1 - u.1, self.2 - u.2, self.3 - u.3)
    }
}

impl Mul<f64> for Conserved {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self(self.0 * a, self.1 * a, self.2 * a, self.3 * a)
    }
}

impl Div<f64> for Conserved {
    type Output = Self;
    fn div(self, a: f64) -> Self {
        Self(self.0 / a, self.1 / a, self.2 / a, self.3 / a)
    }
}




// ============================================================================
/// Convert a patch of conserved variables to a patch of primitive variables
/// on the same index space. Fails on the first cell with a negative density
/// or pressure.
pub fn primitive_from_conserved(conserved: &Patch, gamma_law_index: f64) -> Result<Patch, Error> {
    assert_eq!(conserved.num_fields(), NUM_FIELDS);

    conserved.try_map(NUM_FIELDS, |u, p| {
        Conserved::from(u).to_primitive(gamma_law_index)?.write_to_slice(p);
        Ok(())
    })
}

pub fn conserved_from_primitive(primitive: &Patch, gamma_law_index: f64) -> Patch {
    assert_eq!(primitive.num_fields(), NUM_FIELDS);

    primitive.map(NUM_FIELDS, |p, u| {
        Primitive::from(p).to_conserved(gamma_law_index).write_to_slice(u)
    })
}

/// Evaluate the Euler flux of every cell of a patch of conserved variables.
pub fn flux_field(conserved: &Patch, gamma_law_index: f64, direction: Direction) -> Patch {
    assert_eq!(conserved.num_fields(), NUM_FIELDS);

    conserved.map(NUM_FIELDS, |u, f| {
        Conserved::from(u).flux_vector(direction, gamma_law_index).write_to_slice(f)
    })
}
