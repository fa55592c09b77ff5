use std::error;
use std::fmt;




#[derive(Clone, Debug, PartialEq)]


/**
 * Error to represent invalid hydrodynamics data, or a failure to recover
 * primitive variables from conserved ones.
 */
pub enum Error {
    NegativeGasPressure(f64),
    NegativeMassDensity(f64),
    InvalidGammaLawIndex(f64),
    NonPhysicalWaveSpeed(f64),
}




// ============================================================================
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            NegativeGasPressure(p) => write!(fmt, "negative gas pressure: {}", p),
            NegativeMassDensity(d) => write!(fmt, "negative mass density: {}", d),
            InvalidGammaLawIndex(g) => write!(fmt, "gamma law index must exceed one: {}", g),
            NonPhysicalWaveSpeed(a) => write!(fmt, "non-physical maximum wave speed: {}", a),
        }
    }
}

impl error::Error for Error {}
