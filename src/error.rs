use std::error;
use std::fmt;
use std::io;
use crate::hydro;




#[derive(Debug)]


/**
 * Error to represent a failure to configure, run, or save a simulation.
 * Configuration errors are raised at setup, before any time step is taken.
 */
pub enum Error {
    MissingParameter(String),
    MalformedParameter { key: String, value: String },
    InvalidParameter { key: String, reason: String },
    UnknownProblem(String),
    UnknownBoundaryCondition(String),
    UnpairedPeriodicBoundary(&'static str),
    UnknownOutputVariable(String),
    UnknownFileType(String),
    InvalidState(&'static str),
    Hydro(hydro::Error),
    Io(io::Error),
    Encode(String),
    WriterThread,
}




// ============================================================================
impl Error {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter { key: key.to_string(), reason: reason.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            MissingParameter(key) => write!(fmt, "missing required parameter: {}", key),
            MalformedParameter { key, value } => write!(fmt, "malformed value for {}: '{}'", key, value),
            InvalidParameter { key, reason } => write!(fmt, "invalid parameter {}: {}", key, reason),
            UnknownProblem(name) => write!(fmt, "unknown problem: {}", name),
            UnknownBoundaryCondition(name) => write!(fmt, "unknown boundary condition: {}", name),
            UnpairedPeriodicBoundary(axis) => write!(fmt, "periodic boundary on the {} axis must be set on both sides", axis),
            UnknownOutputVariable(name) => write!(fmt, "unknown output variable: {}", name),
            UnknownFileType(name) => write!(fmt, "unknown data file type: {}", name),
            InvalidState(reason) => write!(fmt, "invalid simulation state: {}", reason),
            Hydro(e) => write!(fmt, "{}", e),
            Io(e) => write!(fmt, "{}", e),
            Encode(e) => write!(fmt, "failed to encode snapshot: {}", e),
            WriterThread => write!(fmt, "the output writer thread exited unexpectedly"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Hydro(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<hydro::Error> for Error {
    fn from(e: hydro::Error) -> Self {
        Error::Hydro(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
