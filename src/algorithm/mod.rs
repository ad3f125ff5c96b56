//! # Algorithms
//!
//! The matrix representations a simplex driver works with, and the interface through which they
//! see the driver.
pub mod gub;
pub mod matrix;
pub mod model;
