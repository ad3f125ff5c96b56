//! # Set table
//!
//! Each set is a contiguous range of columns with a bound on the sum of their values. Sets are
//! ordered and don't overlap; columns between and around them are ordinary columns.
use std::ops::Range;

use enum_map::{EnumMap, enum_map};
use itertools::{Itertools, izip};

use crate::data::linear_program::elements::BoundDirection;
use crate::error::GubError;

/// Input describing the sets of a matrix.
///
/// All vectors should have the same length, one value per set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetDescription {
    /// First column of each set.
    pub starts: Vec<usize>,
    /// One past the last column of each set.
    pub ends: Vec<usize>,
    /// Lower bound on the sum of the members, may be `f64::NEG_INFINITY`.
    pub lower: Vec<f64>,
    /// Upper bound on the sum of the members, may be `f64::INFINITY`.
    pub upper: Vec<f64>,
}

/// A single set.
#[derive(Clone, Debug, PartialEq)]
pub struct GubSet {
    start: usize,
    end: usize,
    bounds: EnumMap<BoundDirection, f64>,
}

impl GubSet {
    /// Create a new instance.
    #[must_use]
    pub fn new(columns: Range<usize>, lower: f64, upper: f64) -> Self {
        debug_assert!(!columns.is_empty());
        debug_assert!(lower <= upper);

        Self {
            start: columns.start,
            end: columns.end,
            bounds: enum_map! {
                BoundDirection::Lower => lower,
                BoundDirection::Upper => upper,
            },
        }
    }

    /// Columns of the set.
    #[must_use]
    pub fn columns(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of columns in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the set has no columns, which a validated set never has.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Bound on the sum of the members.
    #[must_use]
    pub fn bound(&self, direction: BoundDirection) -> f64 {
        self.bounds[direction]
    }

    /// Lower bound on the sum of the members.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.bounds[BoundDirection::Lower]
    }

    /// Upper bound on the sum of the members.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.bounds[BoundDirection::Upper]
    }

    /// Whether the sum is fixed to a single value.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.lower() == self.upper()
    }
}

/// All sets of a matrix, together with the map from column to set.
#[derive(Clone, Debug, PartialEq)]
pub struct SetTable {
    sets: Vec<GubSet>,
    backward: Vec<Option<usize>>,
    contiguous: bool,
}

impl SetTable {
    /// Validate a description and build the table.
    ///
    /// # Arguments
    ///
    /// * `nr_columns`: Number of columns of the matrix the sets refer to.
    /// * `description`: Column ranges and bounds of the sets.
    ///
    /// # Errors
    ///
    /// When the arrays differ in length, a range falls outside of the matrix or is empty, sets
    /// overlap or are out of order, or the bounds of a set are inverted or both infinite.
    pub fn new(nr_columns: usize, description: &SetDescription) -> Result<Self, GubError> {
        let SetDescription { starts, ends, lower, upper } = description;
        if starts.len() != ends.len() || starts.len() != lower.len() || starts.len() != upper.len() {
            return Err(GubError::LengthMismatch {
                starts: starts.len(),
                ends: ends.len(),
                lower: lower.len(),
                upper: upper.len(),
            });
        }

        let mut sets = Vec::with_capacity(starts.len());
        let mut last_end = 0;
        for (set, (&start, &end, &lower, &upper)) in izip!(starts, ends, lower, upper).enumerate() {
            if start >= nr_columns || end > nr_columns {
                return Err(GubError::IndexOutOfRange { set, start, end, nr_columns });
            }
            if end <= start {
                return Err(GubError::EmptySet { set, start, end });
            }
            if start < last_end {
                return Err(GubError::Overlapping { set });
            }
            if lower > upper {
                return Err(GubError::InvertedBounds { set, lower, upper });
            }
            if lower == f64::NEG_INFINITY && upper == f64::INFINITY {
                return Err(GubError::FreeSet { set });
            }

            last_end = end;
            sets.push(GubSet::new(start..end, lower, upper));
        }

        Ok(Self::from_sets(nr_columns, sets))
    }

    fn from_sets(nr_columns: usize, sets: Vec<GubSet>) -> Self {
        let mut backward = vec![None; nr_columns];
        for (i, set) in sets.iter().enumerate() {
            for j in set.columns() {
                backward[j] = Some(i);
            }
        }
        let contiguous = sets.iter().tuple_windows().all(|(first, second)| first.end == second.start);

        Self { sets, backward, contiguous }
    }

    /// Build the table for a selection of columns.
    ///
    /// Consecutive selected columns of one set form a set in the new table, with the bounds of the
    /// original set. Selecting a column more than once is allowed.
    ///
    /// # Arguments
    ///
    /// * `which_columns`: Original indices of the columns to keep, in their new order.
    ///
    /// # Errors
    ///
    /// If a selected column is out of range, a set appears again after columns of another set or
    /// of no set, or sets appear out of order.
    pub fn subset(&self, which_columns: &[usize]) -> Result<Self, GubError> {
        let mut sets: Vec<GubSet> = Vec::new();
        let mut last_set = None;
        let mut current: Option<(usize, usize)> = None;

        for (new, &old) in which_columns.iter().enumerate() {
            let set = *self.backward.get(old)
                .ok_or(GubError::ColumnOutOfRange { column: old, nr_columns: self.nr_columns() })?;
            match (current, set) {
                (Some((active, _)), Some(set)) if active == set => {},
                (_, Some(set)) => {
                    if last_set.is_some_and(|last| set <= last) {
                        return Err(GubError::Overlapping { set });
                    }
                    if let Some((active, start)) = current {
                        sets.push(self.renumbered(active, start..new));
                    }
                    current = Some((set, new));
                    last_set = Some(set);
                },
                (Some((active, start)), None) => {
                    sets.push(self.renumbered(active, start..new));
                    current = None;
                },
                (None, None) => {},
            }
        }
        if let Some((active, start)) = current {
            sets.push(self.renumbered(active, start..which_columns.len()));
        }

        Ok(Self::from_sets(which_columns.len(), sets))
    }

    fn renumbered(&self, set: usize, columns: Range<usize>) -> GubSet {
        GubSet::new(columns, self.sets[set].lower(), self.sets[set].upper())
    }

    /// Number of sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether there are no sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// A set by index.
    #[must_use]
    pub fn get(&self, set: usize) -> &GubSet {
        &self.sets[set]
    }

    /// Iterate over all sets.
    pub fn iter(&self) -> impl Iterator<Item = &GubSet> {
        self.sets.iter()
    }

    /// Set of a column, if it belongs to one.
    #[must_use]
    pub fn set_of(&self, column: usize) -> Option<usize> {
        self.backward[column]
    }

    /// Number of columns the table was built for.
    #[must_use]
    pub fn nr_columns(&self) -> usize {
        self.backward.len()
    }

    /// Columns from the first column of the first set up to the last column of the last set.
    #[must_use]
    pub fn gub_columns(&self) -> Range<usize> {
        match (self.sets.first(), self.sets.last()) {
            (Some(first), Some(last)) => first.start..last.end,
            _ => 0..0,
        }
    }

    /// Whether every column in `gub_columns` belongs to a set.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.contiguous
    }
}
