//! # Linear algebra primitives
//!
//! Sparse column-major matrix storage and the two work vector layouts used by the simplex
//! machinery: indexed (dense storage with a list of touched indices) and packed (index, value
//! pairs).

pub mod matrix;
pub mod vector;

/// Index and value of a nonzero.
pub type SparseTuple<F> = (usize, F);
