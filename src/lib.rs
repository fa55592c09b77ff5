//! Hancock is a solver for the two-dimensional compressible Euler equations
//! of gas dynamics on a uniform rectilinear grid. It uses the MUSCL-Hancock
//! finite-volume scheme: limited piecewise-linear reconstruction, a half
//! time step predictor, and the HLLC approximate Riemann solver. The
//! conserved state is stored on a single patch surrounded by two layers of
//! guard zones, which are filled from periodic, transmissive, or reflecting
//! boundary conditions before each step. The stencil stages run in parallel
//! over grid rows.
//!
//! The library also reads line-oriented input files, generates the initial
//! conditions of the Kelvin-Helmholtz instability, and writes snapshots of
//! the primitive variables in text, CSV, CBOR, or MessagePack formats.

pub mod boundary;
pub mod config;
pub mod error;
pub mod hydro;
pub mod index_space;
pub mod mesh;
pub mod output;
pub mod patch;
pub mod problem;
pub mod simulation;
pub mod solvers;

pub use error::Error;
