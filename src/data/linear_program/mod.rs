//! # Representing linear programs
//!
//! Building blocks shared between the matrix representations and the algorithms that drive them.
pub mod elements;
