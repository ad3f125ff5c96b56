//! # Packed vectors
use crate::data::linear_algebra::SparseTuple;

/// Sequence of `(index, value)` pairs without a dense backing array.
///
/// Indices are not required to be sorted, but they should be unique.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct PackedVector {
    entries: Vec<SparseTuple<f64>>,
}

impl PackedVector {
    /// Create an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pairs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a pair.
    pub fn push(&mut self, index: usize, value: f64) {
        debug_assert!(self.entries.iter().all(|&(i, _)| i != index));

        self.entries.push((index, value));
    }

    /// The pair at a position.
    #[must_use]
    pub fn get(&self, position: usize) -> SparseTuple<f64> {
        self.entries[position]
    }

    /// Mutable access to the value at a position.
    pub fn value_mut(&mut self, position: usize) -> &mut f64 {
        &mut self.entries[position].1
    }

    /// Position of an index, if it is stored.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<usize> {
        self.entries.iter().position(|&(i, _)| i == index)
    }

    /// Iterate over the pairs.
    pub fn iter(&self) -> impl Iterator<Item = &SparseTuple<f64>> {
        self.entries.iter()
    }

    /// Keep only the first `len` pairs.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Remove all pairs.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The stored pairs.
    #[must_use]
    pub fn entries(&self) -> &[SparseTuple<f64>] {
        &self.entries
    }
}

impl From<Vec<SparseTuple<f64>>> for PackedVector {
    fn from(entries: Vec<SparseTuple<f64>>) -> Self {
        Self { entries }
    }
}
