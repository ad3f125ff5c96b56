//! # Packed column-major matrix
//!
//! Storage of the constraint matrix that the simplex machinery reads column by column. Column `j`
//! occupies positions `starts[j]..starts[j] + lengths[j]` of the index and element arrays; row
//! indices within a column are sorted.
use itertools::izip;

use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::{IndexedVector, PackedVector};

/// Sparse matrix stored by column.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedMatrix {
    nr_rows: usize,
    starts: Vec<usize>,
    lengths: Vec<usize>,
    indices: Vec<usize>,
    elements: Vec<f64>,
}

impl PackedMatrix {
    /// Create a matrix from sparse columns.
    ///
    /// # Arguments
    ///
    /// * `nr_rows`: Number of rows.
    /// * `columns`: For each column, `(row, value)` pairs sorted by row. Zero values are dropped.
    #[must_use]
    pub fn from_columns(nr_rows: usize, columns: Vec<Vec<SparseTuple<f64>>>) -> Self {
        let mut starts = Vec::with_capacity(columns.len());
        let mut lengths = Vec::with_capacity(columns.len());
        let mut indices = Vec::new();
        let mut elements = Vec::new();

        for column in columns {
            debug_assert!(column.windows(2).all(|w| w[0].0 < w[1].0));
            debug_assert!(column.iter().all(|&(i, _)| i < nr_rows));

            starts.push(indices.len());
            let mut length = 0;
            for (i, value) in column {
                if value != 0_f64 {
                    indices.push(i);
                    elements.push(value);
                    length += 1;
                }
            }
            lengths.push(length);
        }

        Self { nr_rows, starts, lengths, indices, elements }
    }

    /// Create a matrix from dense rows.
    ///
    /// All rows should have equal length.
    #[must_use]
    pub fn from_data(data: Vec<Vec<f64>>) -> Self {
        let (nr_rows, nr_columns) = get_data_dimensions(&data);

        let columns = (0..nr_columns)
            .map(|j| data.iter()
                .enumerate()
                .filter(|&(_, row)| row[j] != 0_f64)
                .map(|(i, row)| (i, row[j]))
                .collect())
            .collect();

        Self::from_columns(nr_rows, columns)
    }

    /// Number of rows.
    #[must_use]
    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    /// Number of columns.
    #[must_use]
    pub fn nr_columns(&self) -> usize {
        self.starts.len()
    }

    /// Number of nonzeros in a column.
    #[must_use]
    pub fn column_length(&self, j: usize) -> usize {
        self.lengths[j]
    }

    /// Row indices of a column.
    #[must_use]
    pub fn column_indices(&self, j: usize) -> &[usize] {
        let start = self.starts[j];
        &self.indices[start..start + self.lengths[j]]
    }

    /// Values of a column, aligned with `column_indices`.
    #[must_use]
    pub fn column_elements(&self, j: usize) -> &[f64] {
        let start = self.starts[j];
        &self.elements[start..start + self.lengths[j]]
    }

    /// Iterate over the `(row, value)` pairs of a column.
    pub fn column(&self, j: usize) -> impl Iterator<Item = SparseTuple<f64>> + '_ {
        debug_assert!(j < self.nr_columns());

        izip!(self.column_indices(j), self.column_elements(j)).map(|(&i, &v)| (i, v))
    }

    /// Inner product of a column with a dense vector indexed by row.
    #[must_use]
    pub fn inner_product(&self, j: usize, dense: &[f64]) -> f64 {
        self.column(j).map(|(i, v)| v * dense[i]).sum()
    }

    /// Write a column into an empty indexed vector.
    pub fn unpack(&self, vector: &mut IndexedVector, j: usize) {
        self.add(vector, j, 1_f64);
    }

    /// Write a column into an empty packed vector.
    pub fn unpack_packed(&self, vector: &mut PackedVector, j: usize) {
        debug_assert!(vector.is_empty());

        for (i, v) in self.column(j) {
            vector.push(i, v);
        }
    }

    /// Add a multiple of a column to an indexed vector.
    pub fn add(&self, vector: &mut IndexedVector, j: usize, multiplier: f64) {
        for (i, v) in self.column(j) {
            vector.add(i, multiplier * v);
        }
    }

    /// Add a multiple of a column to a dense array indexed by row.
    pub fn add_dense(&self, array: &mut [f64], j: usize, multiplier: f64) {
        for (i, v) in self.column(j) {
            array[i] += multiplier * v;
        }
    }

    /// Compute `y += scalar * A x`.
    ///
    /// # Arguments
    ///
    /// * `x`: Dense vector with one value per column.
    /// * `y`: Dense vector with one value per row.
    pub fn times(&self, scalar: f64, x: &[f64], y: &mut [f64]) {
        debug_assert!(x.len() >= self.nr_columns());
        debug_assert!(y.len() >= self.nr_rows);

        for (j, &value) in x.iter().take(self.nr_columns()).enumerate() {
            if value != 0_f64 {
                self.add_dense(y, j, scalar * value);
            }
        }
    }

    /// Compute `z += scalar * x^T A` for all columns.
    ///
    /// # Arguments
    ///
    /// * `x`: Indexed vector over the rows.
    /// * `z`: Indexed vector over the columns.
    pub fn transpose_times(&self, scalar: f64, x: &IndexedVector, z: &mut IndexedVector) {
        for j in 0..self.nr_columns() {
            let value = self.inner_product(j, x.dense());
            if value != 0_f64 {
                z.add(j, scalar * value);
            }
        }
    }

    /// Compute `z[k] = scalar * x^T A_{columns[k]}` for a selection of columns.
    pub fn subset_transpose_times(&self, scalar: f64, x: &IndexedVector, columns: &[usize], z: &mut [f64]) {
        debug_assert!(z.len() >= columns.len());

        for (target, &j) in z.iter_mut().zip(columns) {
            *target = scalar * self.inner_product(j, x.dense());
        }
    }

    /// Select rows and columns.
    ///
    /// # Arguments
    ///
    /// * `which_rows`: Rows to keep, in their new order. Each row at most once.
    /// * `which_columns`: Columns to keep, in their new order. Duplicates are allowed.
    #[must_use]
    pub fn subset(&self, which_rows: &[usize], which_columns: &[usize]) -> Self {
        let mut new_index = vec![None; self.nr_rows];
        for (new, &old) in which_rows.iter().enumerate() {
            debug_assert!(new_index[old].is_none());
            new_index[old] = Some(new);
        }

        let columns = which_columns.iter()
            .map(|&j| {
                let mut column = self.column(j)
                    .filter_map(|(i, v)| new_index[i].map(|new| (new, v)))
                    .collect::<Vec<_>>();
                column.sort_unstable_by_key(|&(i, _)| i);
                column
            })
            .collect();

        Self::from_columns(which_rows.len(), columns)
    }
}

/// If all row sizes agree, return the dimensions of the vector `data`.
fn get_data_dimensions(data: &[Vec<f64>]) -> (usize, usize) {
    let nr_rows = data.len();
    let nr_columns = data.first().map_or(0, Vec::len);

    debug_assert!(
        data.iter().all(|row| row.len() == nr_columns),
        "Row lengths not equal: first row has length {nr_columns}",
    );

    (nr_rows, nr_columns)
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::data::linear_algebra::matrix::PackedMatrix;
    use crate::data::linear_algebra::vector::{IndexedVector, PackedVector};

    fn test_matrix() -> PackedMatrix {
        PackedMatrix::from_data(vec![
            vec![1_f64, 2_f64, 0_f64],
            vec![0_f64, 5_f64, 6_f64],
        ])
    }

    #[test]
    fn from_data() {
        let m = test_matrix();
        assert_eq!(m.nr_rows(), 2);
        assert_eq!(m.nr_columns(), 3);
        assert_eq!(m.column(1).collect::<Vec<_>>(), vec![(0, 2_f64), (1, 5_f64)]);
        assert_eq!(m.column_length(0), 1);
        assert_eq!(m.column_indices(2), &[1]);
    }

    #[test]
    fn times() {
        let m = test_matrix();
        let mut y = vec![1_f64, 1_f64];
        m.times(-1_f64, &[1_f64, 1_f64, 2_f64], &mut y);
        assert_abs_diff_eq!(y[0], -2_f64);
        assert_abs_diff_eq!(y[1], -16_f64);
    }

    #[test]
    fn transpose_times() {
        let m = test_matrix();
        let mut x = IndexedVector::new(2);
        x.add(1, 2_f64);
        let mut z = IndexedVector::new(3);
        m.transpose_times(1_f64, &x, &mut z);
        assert_eq!(z.iter().collect::<Vec<_>>(), vec![(1, 10_f64), (2, 12_f64)]);
    }

    #[test]
    fn unpack_and_add() {
        let m = test_matrix();
        let mut v = IndexedVector::new(2);
        m.unpack(&mut v, 1);
        m.add(&mut v, 1, -1_f64);
        assert!(v.iter().all(|(_, value)| value.abs() < 1e-12));

        let mut packed = PackedVector::new();
        m.unpack_packed(&mut packed, 2);
        assert_eq!(packed.entries(), &[(1, 6_f64)]);
    }

    #[test]
    fn subset() {
        let m = test_matrix();
        let s = m.subset(&[1], &[2, 0, 2]);
        assert_eq!(s.nr_rows(), 1);
        assert_eq!(s.nr_columns(), 3);
        assert_eq!(s.column(0).collect::<Vec<_>>(), vec![(0, 6_f64)]);
        assert_eq!(s.column_length(1), 0);
    }
}
