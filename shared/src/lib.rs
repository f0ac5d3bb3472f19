//! Shared types for the Funhouse falling-sand sandbox.
//!
//! The simulation grid itself lives outside the command pipeline. This crate
//! only defines the boundary the pipeline talks to:
//!
//! - [`Material`] - what a grid cell contains
//! - [`Grid`] - the handful of calls commands are allowed to make
//! - [`VecGrid`] - a plain in-memory grid for headless hosts and tests

mod grid;
mod material;

pub use grid::{Grid, VecGrid};
pub use material::{MATERIAL_PROPERTIES, Material, MaterialProperties, UnknownMaterial};
