//! Physics of the 2D Euler equations for an ideal gas: the equation of
//! state, conversions between conserved and primitive variables, slope
//! reconstruction, and the HLLC Riemann solver.

pub mod eos;
pub mod error;
pub mod euler2d;
pub mod geometry;
pub mod reconstruct;
pub mod riemann;

pub use error::Error;
