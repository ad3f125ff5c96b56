//! # Work vectors
//!
//! The simplex driver moves columns and rows around in two layouts. An `IndexedVector` keeps a
//! dense array next to the list of indices that were touched, such that clearing is proportional
//! to the number of nonzeros. A `PackedVector` only keeps `(index, value)` pairs; it is the layout
//! of an updated column, which can grow extra entries while the basis is extended.

pub use indexed::IndexedVector;
pub use packed::PackedVector;

mod indexed;
mod packed;

/// Marker stored when a value cancels exactly, so that the index stays registered.
pub const TINY_ELEMENT: f64 = 1e-100;
