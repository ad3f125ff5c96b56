//! # Extra rows
//!
//! While a pivot is being computed, a set whose members appear in the updated column gets a
//! temporary row of its own. The arena maps sets to slots and back; it is filled by one extension
//! of an updated column and emptied when that column is restored.
use std::ops::{Deref, DerefMut};

/// Temporary rows, at most one per set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtraRows {
    slot_of_set: Vec<Option<usize>>,
    set_of_slot: Vec<usize>,
}

impl ExtraRows {
    /// Create an empty arena for a number of sets.
    #[must_use]
    pub fn new(nr_sets: usize) -> Self {
        Self {
            slot_of_set: vec![None; nr_sets],
            set_of_slot: Vec::new(),
        }
    }

    /// Give a set a slot.
    ///
    /// # Panics
    ///
    /// When the set already has a slot.
    pub fn insert(&mut self, set: usize) -> usize {
        assert!(self.slot_of_set[set].is_none(), "set {set} already has an extra row");

        let slot = self.set_of_slot.len();
        self.slot_of_set[set] = Some(slot);
        self.set_of_slot.push(set);
        slot
    }

    /// Slot of a set, if it has one.
    #[must_use]
    pub fn slot(&self, set: usize) -> Option<usize> {
        self.slot_of_set[set]
    }

    /// Set occupying a slot.
    #[must_use]
    pub fn set(&self, slot: usize) -> Option<usize> {
        self.set_of_slot.get(slot).copied()
    }

    /// Sets with a slot, in order of their slots.
    #[must_use]
    pub fn sets(&self) -> &[usize] {
        &self.set_of_slot
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.set_of_slot.len()
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_of_slot.is_empty()
    }

    /// Release all slots, returning the sets that had one.
    pub fn clear(&mut self) -> Vec<usize> {
        for &set in &self.set_of_slot {
            self.slot_of_set[set] = None;
        }
        let sets = std::mem::take(&mut self.set_of_slot);

        debug_assert!(self.slot_of_set.iter().all(Option::is_none));
        sets
    }
}

/// Work array that is zero whenever it is not checked out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scratch {
    values: Vec<f64>,
}

impl Scratch {
    /// Create a zeroed array.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { values: vec![0_f64; len] }
    }

    /// Borrow the array; it is zeroed again when the guard is dropped.
    pub fn check_out(&mut self) -> ScratchGuard<'_> {
        debug_assert!(self.values.iter().all(|&v| v == 0_f64), "scratch array was not returned clean");

        ScratchGuard { values: &mut self.values }
    }
}

/// Borrowed scratch array.
#[derive(Debug)]
pub struct ScratchGuard<'a> {
    values: &'a mut [f64],
}

impl Deref for ScratchGuard<'_> {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.values
    }
}

impl DerefMut for ScratchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.values
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        self.values.fill(0_f64);
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::gub::extra_rows::{ExtraRows, Scratch};

    #[test]
    fn slots() {
        let mut rows = ExtraRows::new(4);
        assert_eq!(rows.insert(2), 0);
        assert_eq!(rows.insert(0), 1);
        assert_eq!(rows.slot(2), Some(0));
        assert_eq!(rows.set(1), Some(0));
        assert_eq!(rows.set(2), None);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows.clear(), vec![2, 0]);
        assert!(rows.is_empty());
        assert_eq!(rows.slot(2), None);
    }

    #[test]
    #[should_panic]
    fn one_row_per_set() {
        let mut rows = ExtraRows::new(2);
        rows.insert(1);
        rows.insert(1);
    }

    #[test]
    fn scratch_is_cleared() {
        let mut scratch = Scratch::new(3);
        {
            let mut values = scratch.check_out();
            values[1] = 4_f64;
            assert_eq!(values[1], 4_f64);
        }
        assert!(scratch.check_out().iter().all(|&v| v == 0_f64));
    }
}
