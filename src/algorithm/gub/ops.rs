//! # Matrix operations as seen by the driver
//!
//! A member of a set with a structural key is presented as `a_j - a_key`. The key itself, and
//! columns outside of the sets, are presented unchanged.
use std::ops::Range;

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::matrix::{BasisElement, PivotAction, SimplexMatrix};
use crate::algorithm::model::{Model, Sequence};
use crate::data::linear_algebra::vector::{IndexedVector, PackedVector};
use crate::error::GubError;

/// Basis elements with a smaller magnitude are dropped.
const BASIS_ELEMENT_TOLERANCE: f64 = 1e-20;

impl GubMatrix {
    /// Key to subtract from a column: the structural key of its set, unless it is the key itself.
    pub(crate) fn adjusting_key(&self, column: usize) -> Option<usize> {
        self.sets.set_of(column)
            .and_then(|set| self.keys.key_column(set))
            .filter(|&key| key != column)
    }

    /// Structural column that represents a variable, and the key to subtract from it.
    fn represented_column<M: Model>(&self, model: &M, sequence: usize) -> (Option<usize>, Option<usize>) {
        match model.layout().classify(sequence) {
            Sequence::Column(j) => (Some(j), self.adjusting_key(j)),
            Sequence::EnteringSetSlack => (self.entering_slack.and_then(|set| self.keys.key_column(set)), None),
            Sequence::RowLogical(_) | Sequence::Extra(_) => {
                panic!("variable {sequence} has no column in the matrix")
            },
        }
    }

    fn unsupported(&self, operation: &'static str) -> Result<(), GubError> {
        if self.sets.is_empty() {
            Ok(())
        } else {
            Err(GubError::Unsupported { operation })
        }
    }
}

impl SimplexMatrix for GubMatrix {
    fn nr_rows(&self) -> usize {
        self.matrix.nr_rows()
    }

    fn nr_columns(&self) -> usize {
        self.matrix.nr_columns()
    }

    fn unpack<M: Model>(&self, model: &M, vector: &mut IndexedVector, sequence: usize) {
        let (column, key) = self.represented_column(model, sequence);
        if let Some(column) = column {
            self.matrix.unpack(vector, column);
        }
        if let Some(key) = key {
            self.matrix.add(vector, key, -1_f64);
        }
    }

    fn unpack_packed<M: Model>(&self, model: &M, vector: &mut PackedVector, sequence: usize) {
        let (column, key) = self.represented_column(model, sequence);
        match (column, key) {
            (Some(column), None) => self.matrix.unpack_packed(vector, column),
            (Some(column), Some(key)) => {
                let mut dense = IndexedVector::new(self.matrix.nr_rows());
                self.matrix.unpack(&mut dense, column);
                self.matrix.add(&mut dense, key, -1_f64);
                for (row, value) in dense.iter() {
                    vector.push(row, value);
                }
            },
            (None, _) => {},
        }
    }

    fn add<M: Model>(&self, _model: &M, vector: &mut IndexedVector, column: usize, multiplier: f64) {
        self.matrix.add(vector, column, multiplier);
        if let Some(key) = self.adjusting_key(column) {
            self.matrix.add(vector, key, -multiplier);
        }
    }

    fn add_dense<M: Model>(&self, _model: &M, array: &mut [f64], column: usize, multiplier: f64) {
        self.matrix.add_dense(array, column, multiplier);
        if let Some(key) = self.adjusting_key(column) {
            self.matrix.add_dense(array, key, -multiplier);
        }
    }

    fn times(&self, scalar: f64, x: &[f64], y: &mut [f64]) {
        self.matrix.times(scalar, x, y);
    }

    fn transpose_times(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) -> Result<(), GubError> {
        self.unsupported("transpose_times")?;
        self.matrix.transpose_times(scalar, x, z);
        Ok(())
    }

    fn transpose_times_by_row(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) -> Result<(), GubError> {
        self.unsupported("transpose_times_by_row")?;
        self.matrix.transpose_times(scalar, x, z);
        Ok(())
    }

    fn subset_transpose_times(
        &self,
        scalar: f64,
        x: &IndexedVector,
        columns: &[usize],
        z: &mut [f64],
    ) -> Result<(), GubError> {
        self.unsupported("subset_transpose_times")?;
        self.matrix.subset_transpose_times(scalar, x, columns, z);
        Ok(())
    }

    fn fill_basis<M: Model>(&mut self, _model: &M, basic_columns: &[usize]) -> Vec<BasisElement> {
        let mut elements = Vec::new();

        for (position, &j) in basic_columns.iter().enumerate() {
            match self.adjusting_key(j) {
                None => elements.extend(self.matrix.column(j)
                    .filter(|&(_, value)| value.abs() > BASIS_ELEMENT_TOLERANCE)
                    .map(|(row, value)| BasisElement { row, column: position, value })),
                Some(key) => {
                    let mut work = self.scratch.check_out();
                    for (row, value) in self.matrix.column(j) {
                        work[row] += value;
                    }
                    for (row, value) in self.matrix.column(key) {
                        work[row] -= value;
                    }

                    let rows = self.matrix.column_indices(j).iter()
                        .chain(self.matrix.column_indices(key));
                    for &row in rows {
                        let value = work[row];
                        if value.abs() > BASIS_ELEMENT_TOLERANCE {
                            elements.push(BasisElement { row, column: position, value });
                        }
                        work[row] = 0_f64;
                    }
                },
            }
        }

        elements
    }

    fn partial_pricing<M: Model>(
        &mut self,
        model: &mut M,
        range: Range<usize>,
        best: &mut Option<usize>,
        nr_wanted: &mut usize,
    ) {
        self.price(model, range, best, nr_wanted);
    }

    fn extend_updated<M: Model>(&mut self, model: &mut M, update: &mut PackedVector) -> usize {
        self.extend_column(model, update)
    }

    fn restore_updated<M: Model>(&mut self, model: &mut M, update: &mut PackedVector) -> PivotAction {
        self.restore_column(model, update)
    }

    fn update_pivot<M: Model>(&mut self, model: &mut M, old_in_value: f64, _old_out_value: f64) {
        self.commit_pivot(model, old_in_value);
    }

    fn effective_rhs<M: Model>(&mut self, model: &M, force_refresh: bool, check: bool) -> Option<&[f64]> {
        self.effective_rhs_values(model, force_refresh, check)
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::gub::GubMatrix;
    use crate::algorithm::gub::key::Member;
    use crate::algorithm::gub::set::SetDescription;
    use crate::algorithm::gub::status::SetStatus;
    use crate::algorithm::matrix::{Matrix, SimplexMatrix};
    use crate::algorithm::model::Model;
    use crate::data::linear_algebra::matrix::PackedMatrix;
    use crate::data::linear_algebra::vector::{IndexedVector, PackedVector};
    use crate::data::linear_program::elements::VariableStatus;
    use crate::error::GubError;
    use crate::tests::model::TestModel;

    /// Two rows, a free column followed by a set of three members with the middle one as key.
    fn keyed() -> (TestModel, GubMatrix) {
        let matrix = PackedMatrix::from_data(vec![
            vec![1_f64, 2_f64, 3_f64, 0_f64],
            vec![0_f64, 1_f64, 1_f64, 5_f64],
        ]);
        let mut gub = GubMatrix::new(matrix, SetDescription {
            starts: vec![1],
            ends: vec![4],
            lower: vec![1_f64],
            upper: vec![1_f64],
        }).unwrap()
            .with_statuses(&[SetStatus::Fixed]);

        let mut model = TestModel::new(2, 4);
        model.status[2] = VariableStatus::Basic;
        gub.relink(&model, 0, Member::Column(2));

        (model, gub)
    }

    #[test]
    fn adjusted_columns() {
        let (model, gub) = keyed();

        let mut vector = IndexedVector::new(2);
        gub.unpack(&model, &mut vector, 1);
        assert_abs_diff_eq!(vector.get(0), -1_f64);
        // Exact cancellation is kept as a tiny element.
        assert!(vector.get(1).abs() < 1e-50);
        assert_eq!(vector.nr_elements(), 2);

        let mut vector = IndexedVector::new(2);
        gub.unpack(&model, &mut vector, 2);
        assert_abs_diff_eq!(vector.get(0), 3_f64);
        assert_abs_diff_eq!(vector.get(1), 1_f64);

        let mut vector = IndexedVector::new(2);
        gub.unpack(&model, &mut vector, 0);
        assert_abs_diff_eq!(vector.get(0), 1_f64);
        assert_eq!(vector.nr_elements(), 1);

        let mut packed = PackedVector::new();
        gub.unpack_packed(&model, &mut packed, 3);
        let mut entries = packed.entries().to_vec();
        entries.sort_by_key(|&(row, _)| row);
        assert_eq!(entries.len(), 2);
        assert_abs_diff_eq!(entries[0].1, -3_f64);
        assert_abs_diff_eq!(entries[1].1, 4_f64);
    }

    #[test]
    fn unpack_then_add_back() {
        let (model, gub) = keyed();

        for j in 0..4 {
            let mut vector = IndexedVector::new(2);
            gub.unpack(&model, &mut vector, j);
            gub.add(&model, &mut vector, j, -1_f64);
            for row in 0..2 {
                assert_abs_diff_eq!(vector.get(row), 0_f64, epsilon = 1e-12);
            }

            let mut dense = vec![0_f64; 2];
            gub.add_dense(&model, &mut dense, j, 2_f64);
            gub.add_dense(&model, &mut dense, j, -2_f64);
            assert_abs_diff_eq!(dense[0], 0_f64, epsilon = 1e-12);
            assert_abs_diff_eq!(dense[1], 0_f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn entering_slack_is_the_key_column() {
        let (mut model, mut gub) = keyed();
        let sequence = gub.select_set_slack(&mut model, 0, 1_f64);
        assert_eq!(sequence, model.layout().entering_set_slack());

        let mut packed = PackedVector::new();
        gub.unpack_packed(&model, &mut packed, sequence);
        assert_eq!(packed.entries(), &[(0, 3_f64), (1, 1_f64)]);
    }

    #[test]
    fn basis() {
        let (model, mut gub) = keyed();
        let elements = gub.fill_basis(&model, &[0, 3]);

        let column_0 = elements.iter().filter(|e| e.column == 0).collect::<Vec<_>>();
        assert_eq!(column_0.len(), 1);
        assert_abs_diff_eq!(column_0[0].value, 1_f64);

        let mut column_1 = elements.iter().filter(|e| e.column == 1).map(|e| (e.row, e.value)).collect::<Vec<_>>();
        column_1.sort_by_key(|&(row, _)| row);
        assert_eq!(column_1, vec![(0, -3_f64), (1, 4_f64)]);

        // Exactly cancelling entries are dropped.
        let elements = gub.fill_basis(&model, &[1]);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].row, 0);
        assert_abs_diff_eq!(elements[0].value, -1_f64);
    }

    #[test]
    fn transpose_products() {
        let (_, gub) = keyed();
        let x = IndexedVector::new(2);
        let mut z = IndexedVector::new(4);
        assert_eq!(
            gub.transpose_times(1_f64, &x, &mut z),
            Err(GubError::Unsupported { operation: "transpose_times" }),
        );
        assert!(gub.subset_transpose_times(1_f64, &x, &[0], &mut [0_f64]).is_err());

        let mut plain = Matrix::new(PackedMatrix::from_data(vec![vec![1_f64]]), None).unwrap();
        assert!(plain.transpose_times(1_f64, &IndexedVector::new(1), &mut IndexedVector::new(1)).is_ok());
        assert!(plain.effective_rhs(&TestModel::new(1, 1), false, false).is_none());
    }
}
