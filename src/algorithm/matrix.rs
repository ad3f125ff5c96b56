//! # Matrix capabilities needed by a simplex driver
//!
//! A driver talks to its constraint matrix through `SimplexMatrix`. The plain `PackedMatrix`
//! implements it directly; `GubMatrix` implements it on top of a packed matrix, taking the key
//! variables of its sets into account. Which of the two is used is decided once, at construction
//! of a `Matrix`.
use std::ops::Range;

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::gub::set::SetDescription;
use crate::algorithm::model::Model;
use crate::data::linear_algebra::matrix::PackedMatrix;
use crate::data::linear_algebra::vector::{IndexedVector, PackedVector};
use crate::data::linear_program::elements::VariableStatus;
use crate::error::GubError;

/// Free and superbasic candidates are only considered when their reduced cost exceeds the
/// tolerance by this factor.
pub const FREE_ACCEPT: f64 = 1e2;
/// Free and superbasic candidates that are accepted are favored by this factor.
pub const FREE_BIAS: f64 = 1e1;

/// How free and superbasic variables are weighed against variables at a bound when pricing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PricingBias {
    /// Multiple of the dual tolerance a free candidate needs to exceed.
    pub accept: f64,
    /// Multiplier applied to accepted free candidates.
    pub bias: f64,
}

impl Default for PricingBias {
    fn default() -> Self {
        Self {
            accept: FREE_ACCEPT,
            bias: FREE_BIAS,
        }
    }
}

/// What the driver should do with its factorization after the updated column was restored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PivotAction {
    /// Replace the column in the factorization as usual.
    Replace,
    /// Replace, after which a basic member of the leaving set becomes its key.
    SwapKey,
    /// The entering set slack becomes the key of its set.
    SlackBecomesKey,
    /// The key of a set changes without changing the factorization.
    KeyFlip,
    /// The key of a set changes, while the set has other basic members that need updating.
    KeyFlipWithBasics,
}

/// One nonzero of the basis matrix handed to the factorization.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BasisElement {
    /// Row index.
    pub row: usize,
    /// Position of the column in the basis.
    pub column: usize,
    /// Value.
    pub value: f64,
}

/// Operations a simplex driver performs on its constraint matrix.
///
/// The hooks at the end have neutral default implementations; they only do something for matrices
/// that keep additional structure, such as sets with key variables.
pub trait SimplexMatrix {
    /// Number of rows.
    fn nr_rows(&self) -> usize;
    /// Number of structural columns.
    fn nr_columns(&self) -> usize;

    /// Write the column of a variable into an empty indexed vector.
    fn unpack<M: Model>(&self, model: &M, vector: &mut IndexedVector, sequence: usize);
    /// Write the column of a variable into an empty packed vector.
    fn unpack_packed<M: Model>(&self, model: &M, vector: &mut PackedVector, sequence: usize);
    /// Add a multiple of a column to an indexed vector.
    fn add<M: Model>(&self, model: &M, vector: &mut IndexedVector, column: usize, multiplier: f64);
    /// Add a multiple of a column to a dense array indexed by row.
    fn add_dense<M: Model>(&self, model: &M, array: &mut [f64], column: usize, multiplier: f64);
    /// Compute `y += scalar * A x`.
    fn times(&self, scalar: f64, x: &[f64], y: &mut [f64]);
    /// Compute `z += scalar * x^T A`.
    ///
    /// # Errors
    ///
    /// When the matrix can't compute the product while keeping its structure into account.
    fn transpose_times(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) -> Result<(), GubError>;
    /// Compute `z += scalar * x^T A` using a row-wise traversal.
    ///
    /// # Errors
    ///
    /// When the matrix can't compute the product while keeping its structure into account.
    fn transpose_times_by_row(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) -> Result<(), GubError>;
    /// Compute `z[k] = scalar * x^T A_{columns[k]}`.
    ///
    /// # Errors
    ///
    /// When the matrix can't compute the product while keeping its structure into account.
    fn subset_transpose_times(
        &self,
        scalar: f64,
        x: &IndexedVector,
        columns: &[usize],
        z: &mut [f64],
    ) -> Result<(), GubError>;
    /// Nonzeros of the basis matrix formed by the given basic columns.
    fn fill_basis<M: Model>(&mut self, model: &M, basic_columns: &[usize]) -> Vec<BasisElement>;
    /// Look for an attractive entering variable within a range of columns.
    ///
    /// # Arguments
    ///
    /// * `model`: Driver state; the reduced cost of the best candidate is written into it.
    /// * `range`: Columns to consider.
    /// * `best`: Best candidate so far, updated when a better one is found.
    /// * `nr_wanted`: Decremented for every acceptable candidate; the search stops at zero.
    fn partial_pricing<M: Model>(
        &mut self,
        model: &mut M,
        range: Range<usize>,
        best: &mut Option<usize>,
        nr_wanted: &mut usize,
    );

    /// Extend an updated column with the extra rows needed for the current pivot.
    ///
    /// # Return value
    ///
    /// Number of entries added.
    fn extend_updated<M: Model>(&mut self, _model: &mut M, _update: &mut PackedVector) -> usize {
        0
    }
    /// Remove the entries added by `extend_updated` and decide how to update the factorization.
    fn restore_updated<M: Model>(&mut self, _model: &mut M, _update: &mut PackedVector) -> PivotAction {
        PivotAction::Replace
    }
    /// Bring the matrix's own bookkeeping up to date after the driver committed a pivot.
    fn update_pivot<M: Model>(&mut self, _model: &mut M, _old_in_value: f64, _old_out_value: f64) {
    }
    /// Right-hand side for the basic variables, if the matrix maintains one.
    fn effective_rhs<M: Model>(&mut self, _model: &M, _force_refresh: bool, _check: bool) -> Option<&[f64]> {
        None
    }
}

/// Price a range of columns without any set structure.
pub(crate) fn price_columns<M: Model>(
    matrix: &PackedMatrix,
    model: &mut M,
    range: Range<usize>,
    best: &mut Option<usize>,
    nr_wanted: &mut usize,
    bias: PricingBias,
) {
    if range.is_empty() || *nr_wanted == 0 {
        return;
    }

    let tolerance = model.current_dual_tolerance();
    let sequence_out = model.sequence_out();
    let mut best_dj = best.map_or(tolerance, |j| model.reduced_costs()[j].abs());
    let mut best_value = None;

    for j in range {
        if j == sequence_out {
            continue;
        }

        let dj = model.cost()[j] - matrix.inner_product(j, model.duals());
        let value = match model.status(j) {
            VariableStatus::Basic | VariableStatus::Fixed => continue,
            VariableStatus::Free | VariableStatus::SuperBasic => {
                if dj.abs() > bias.accept * tolerance {
                    dj.abs() * bias.bias
                } else {
                    continue
                }
            },
            VariableStatus::AtUpperBound => dj,
            VariableStatus::AtLowerBound => -dj,
        };

        if value > tolerance && !model.is_flagged(j) {
            *nr_wanted = nr_wanted.saturating_sub(1);
            if value > best_dj {
                best_dj = value;
                best_value = Some((j, dj));
            }
        }
        if *nr_wanted == 0 {
            break;
        }
    }

    if let Some((j, dj)) = best_value {
        model.reduced_costs_mut()[j] = dj;
        *best = Some(j);
    }
}

impl SimplexMatrix for PackedMatrix {
    fn nr_rows(&self) -> usize {
        PackedMatrix::nr_rows(self)
    }

    fn nr_columns(&self) -> usize {
        PackedMatrix::nr_columns(self)
    }

    fn unpack<M: Model>(&self, _model: &M, vector: &mut IndexedVector, sequence: usize) {
        PackedMatrix::unpack(self, vector, sequence);
    }

    fn unpack_packed<M: Model>(&self, _model: &M, vector: &mut PackedVector, sequence: usize) {
        PackedMatrix::unpack_packed(self, vector, sequence);
    }

    fn add<M: Model>(&self, _model: &M, vector: &mut IndexedVector, column: usize, multiplier: f64) {
        PackedMatrix::add(self, vector, column, multiplier);
    }

    fn add_dense<M: Model>(&self, _model: &M, array: &mut [f64], column: usize, multiplier: f64) {
        PackedMatrix::add_dense(self, array, column, multiplier);
    }

    fn times(&self, scalar: f64, x: &[f64], y: &mut [f64]) {
        PackedMatrix::times(self, scalar, x, y);
    }

    fn transpose_times(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) -> Result<(), GubError> {
        PackedMatrix::transpose_times(self, scalar, x, z);
        Ok(())
    }

    fn transpose_times_by_row(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) -> Result<(), GubError> {
        // No row copy is kept, the column-wise product gives the same result.
        PackedMatrix::transpose_times(self, scalar, x, z);
        Ok(())
    }

    fn subset_transpose_times(
        &self,
        scalar: f64,
        x: &IndexedVector,
        columns: &[usize],
        z: &mut [f64],
    ) -> Result<(), GubError> {
        PackedMatrix::subset_transpose_times(self, scalar, x, columns, z);
        Ok(())
    }

    fn fill_basis<M: Model>(&mut self, _model: &M, basic_columns: &[usize]) -> Vec<BasisElement> {
        basic_columns.iter()
            .enumerate()
            .flat_map(|(position, &j)| self.column(j)
                .map(move |(row, value)| BasisElement { row, column: position, value }))
            .collect()
    }

    fn partial_pricing<M: Model>(
        &mut self,
        model: &mut M,
        range: Range<usize>,
        best: &mut Option<usize>,
        nr_wanted: &mut usize,
    ) {
        price_columns(self, model, range, best, nr_wanted, PricingBias::default());
    }
}

/// Constraint matrix of a driver, with or without sets.
#[derive(Debug)]
pub enum Matrix {
    /// No sets.
    Packed(PackedMatrix),
    /// Columns grouped in sets with an implicit bound on their sum.
    Gub(GubMatrix),
}

impl Matrix {
    /// Create a new instance.
    ///
    /// # Arguments
    ///
    /// * `matrix`: Constraint matrix.
    /// * `sets`: Description of the sets, if any.
    ///
    /// # Errors
    ///
    /// If the set description is invalid for the matrix.
    pub fn new(matrix: PackedMatrix, sets: Option<SetDescription>) -> Result<Self, GubError> {
        match sets {
            None => Ok(Self::Packed(matrix)),
            Some(sets) => GubMatrix::new(matrix, sets).map(Self::Gub),
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $matrix:ident => $body:expr) => {
        match $self {
            Matrix::Packed($matrix) => $body,
            Matrix::Gub($matrix) => $body,
        }
    };
}

impl SimplexMatrix for Matrix {
    fn nr_rows(&self) -> usize {
        dispatch!(self, m => SimplexMatrix::nr_rows(m))
    }

    fn nr_columns(&self) -> usize {
        dispatch!(self, m => SimplexMatrix::nr_columns(m))
    }

    fn unpack<M: Model>(&self, model: &M, vector: &mut IndexedVector, sequence: usize) {
        dispatch!(self, m => SimplexMatrix::unpack(m, model, vector, sequence))
    }

    fn unpack_packed<M: Model>(&self, model: &M, vector: &mut PackedVector, sequence: usize) {
        dispatch!(self, m => SimplexMatrix::unpack_packed(m, model, vector, sequence))
    }

    fn add<M: Model>(&self, model: &M, vector: &mut IndexedVector, column: usize, multiplier: f64) {
        dispatch!(self, m => SimplexMatrix::add(m, model, vector, column, multiplier))
    }

    fn add_dense<M: Model>(&self, model: &M, array: &mut [f64], column: usize, multiplier: f64) {
        dispatch!(self, m => SimplexMatrix::add_dense(m, model, array, column, multiplier))
    }

    fn times(&self, scalar: f64, x: &[f64], y: &mut [f64]) {
        dispatch!(self, m => SimplexMatrix::times(m, scalar, x, y))
    }

    fn transpose_times(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) -> Result<(), GubError> {
        dispatch!(self, m => SimplexMatrix::transpose_times(m, scalar, x, z))
    }

    fn transpose_times_by_row(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) -> Result<(), GubError> {
        dispatch!(self, m => SimplexMatrix::transpose_times_by_row(m, scalar, x, z))
    }

    fn subset_transpose_times(
        &self,
        scalar: f64,
        x: &IndexedVector,
        columns: &[usize],
        z: &mut [f64],
    ) -> Result<(), GubError> {
        dispatch!(self, m => SimplexMatrix::subset_transpose_times(m, scalar, x, columns, z))
    }

    fn fill_basis<M: Model>(&mut self, model: &M, basic_columns: &[usize]) -> Vec<BasisElement> {
        dispatch!(self, m => SimplexMatrix::fill_basis(m, model, basic_columns))
    }

    fn partial_pricing<M: Model>(
        &mut self,
        model: &mut M,
        range: Range<usize>,
        best: &mut Option<usize>,
        nr_wanted: &mut usize,
    ) {
        dispatch!(self, m => SimplexMatrix::partial_pricing(m, model, range, best, nr_wanted))
    }

    fn extend_updated<M: Model>(&mut self, model: &mut M, update: &mut PackedVector) -> usize {
        dispatch!(self, m => SimplexMatrix::extend_updated(m, model, update))
    }

    fn restore_updated<M: Model>(&mut self, model: &mut M, update: &mut PackedVector) -> PivotAction {
        dispatch!(self, m => SimplexMatrix::restore_updated(m, model, update))
    }

    fn update_pivot<M: Model>(&mut self, model: &mut M, old_in_value: f64, old_out_value: f64) {
        dispatch!(self, m => SimplexMatrix::update_pivot(m, model, old_in_value, old_out_value))
    }

    fn effective_rhs<M: Model>(&mut self, model: &M, force_refresh: bool, check: bool) -> Option<&[f64]> {
        dispatch!(self, m => SimplexMatrix::effective_rhs(m, model, force_refresh, check))
    }
}
