use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use crate::config::Parameters;
use crate::error::Error;
use crate::hydro::euler2d::Primitive;
use crate::index_space::Axis;
use crate::mesh::Mesh;
use crate::patch::Patch;




/**
 * Interface for a type that fills a conserved state patch with initial
 * conditions. The patch covers the mesh's extended index space, guard zones
 * included.
 */
pub trait ProblemGenerator {
    fn name(&self) -> &str;
    fn generate(&self, mesh: &Mesh, gamma_law_index: f64, state: &mut Patch);
}




/**
 * Look up the problem generator with the given name, reading its own
 * parameters from the input file.
 */
pub fn problem_from_name(name: &str, parameters: &Parameters) -> Result<Box<dyn ProblemGenerator>, Error> {
    match name {
        "kh" => Ok(Box::new(KelvinHelmholtz::from_parameters(parameters)?)),
        _ => Err(Error::UnknownProblem(name.to_string())),
    }
}




/**
 * Two shearing layers: the outer layer (|y| >= 0.25) has density `rho1`,
 * x-velocity `u1` and pressure `p1`, and the inner layer has `rho0`, `u0`
 * and `p0`. The rows of cells adjacent to the interfaces are given a random
 * y-velocity of up to `pert_amp`, one draw per column, to seed the
 * instability. Draws come from a generator seeded with `seed`, so the
 * initial condition is reproducible.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct KelvinHelmholtz {
    pub rho0: f64,
    pub rho1: f64,
    pub p0: f64,
    pub p1: f64,
    pub u0: f64,
    pub u1: f64,
    pub pert_amp: f64,
    pub seed: u64,
}

const INTERFACE: f64 = 0.25;




// ============================================================================
impl KelvinHelmholtz {
    pub fn from_parameters(p: &Parameters) -> Result<Self, Error> {
        let seed = p.integer_or("seed", 0)?;

        if seed < 0 {
            return Err(Error::invalid("seed", "must not be negative"))
        }
        let problem = Self {
            rho0: p.float("rho0")?,
            rho1: p.float("rho1")?,
            p0: p.float("p0")?,
            p1: p.float("p1")?,
            u0: p.float("u0")?,
            u1: p.float("u1")?,
            pert_amp: p.float_or("pert_amp", 0.0)?,
            seed: seed as u64,
        };

        for (key, value) in [("rho0", problem.rho0), ("rho1", problem.rho1), ("p0", problem.p0), ("p1", problem.p1)] {
            if value <= 0.0 {
                return Err(Error::invalid(key, "must be positive"))
            }
        }
        if problem.pert_amp < 0.0 {
            return Err(Error::invalid("pert_amp", "must not be negative"))
        }
        Ok(problem)
    }

    fn primitive_at(&self, y: f64, dy: f64, kick: f64) -> Primitive {
        let v = if (y.abs() - INTERFACE).abs() < dy { self.pert_amp * kick } else { 0.0 };

        if y.abs() >= INTERFACE {
            Primitive::new(self.rho1, self.u1, v, self.p1)
        } else {
            Primitive::new(self.rho0, self.u0, v, self.p0)
        }
    }
}

impl ProblemGenerator for KelvinHelmholtz {
    fn name(&self) -> &str {
        "kh"
    }

    fn generate(&self, mesh: &Mesh, gamma_law_index: f64, state: &mut Patch) {
        let (_, dy) = mesh.cell_spacing();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let i0 = state.index_space().start().0;
        let kicks: Vec<f64> = state.index_space().range(Axis::I).map(|_| rng.gen::<f64>()).collect();

        state.fill_with(|(i, j), u| {
            let (_, y) = mesh.cell_center((i, j));
            let kick = kicks[(i - i0) as usize];
            self.primitive_at(y, dy, kick).to_conserved(gamma_law_index).write_to_slice(u)
        });
    }
}
