//! # Fixtures shared by the unit tests.
//!
//! * `model`: a driver state that is nothing more than its arrays.
//! * `problem`: random problems with sets and a driver pivoting on them at random.
pub mod model;
pub mod problem;
