//! # Indexed vectors
//!
//! Dense storage together with the indices of the (possibly) nonzero values.
use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::TINY_ELEMENT;

/// Dense vector that remembers which indices it touched.
///
/// An index is registered when a nonzero value is first written to it. When a later addition
/// cancels the value exactly, `TINY_ELEMENT` is stored instead, such that the index list and the
/// dense values stay in agreement.
#[derive(PartialEq, Clone, Debug)]
pub struct IndexedVector {
    elements: Vec<f64>,
    indices: Vec<usize>,
}

impl IndexedVector {
    /// Create a vector of zeros.
    ///
    /// # Arguments
    ///
    /// * `len`: Dimension of the vector.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            elements: vec![0_f64; len],
            indices: Vec::new(),
        }
    }

    /// Dimension of the vector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the vector has dimension zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of registered indices.
    #[must_use]
    pub fn nr_elements(&self) -> usize {
        self.indices.len()
    }

    /// Add a value to the value at an index.
    pub fn add(&mut self, i: usize, value: f64) {
        debug_assert!(i < self.len());

        if self.elements[i] != 0_f64 {
            let new = self.elements[i] + value;
            self.elements[i] = if new == 0_f64 { TINY_ELEMENT } else { new };
        } else if value != 0_f64 {
            self.indices.push(i);
            self.elements[i] = value;
        }
    }

    /// Value at an index, zero when the index was never touched.
    #[must_use]
    pub fn get(&self, i: usize) -> f64 {
        self.elements[i]
    }

    /// The registered indices, in order of first insertion.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The dense values.
    #[must_use]
    pub fn dense(&self) -> &[f64] {
        &self.elements
    }

    /// Iterate over the registered `(index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = SparseTuple<f64>> + '_ {
        self.indices.iter().map(move |&i| (i, self.elements[i]))
    }

    /// Reset all registered values to zero.
    pub fn clear(&mut self) {
        for i in self.indices.drain(..) {
            self.elements[i] = 0_f64;
        }
    }

    /// Whether the vector holds no values at all.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.indices.is_empty() && self.elements.iter().all(|&v| v == 0_f64)
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_algebra::vector::{IndexedVector, TINY_ELEMENT};

    #[test]
    fn cancellation_keeps_index() {
        let mut v = IndexedVector::new(4);
        v.add(2, 1.5);
        v.add(2, -1.5);
        assert_eq!(v.nr_elements(), 1);
        assert_eq!(v.get(2), TINY_ELEMENT);

        v.clear();
        assert!(v.is_clear());
    }

    #[test]
    fn clear() {
        let mut v = IndexedVector::new(5);
        v.add(0, 1_f64);
        v.add(4, -3_f64);
        v.add(0, 2_f64);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(0, 3_f64), (4, -3_f64)]);

        v.clear();
        assert!(v.is_clear());
        assert_eq!(v, IndexedVector::new(5));
    }
}
