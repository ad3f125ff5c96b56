//! # The simplex driver as seen by the matrix
//!
//! The matrix representations in this crate don't run the simplex method themselves. They read
//! and modify the state of a driver through the `Model` trait: the statuses, values, bounds and
//! costs of all variables, the basis heading and the pivot currently being performed.
//!
//! Variables are indexed in one flat space, see `Layout`.
use crate::data::linear_program::elements::VariableStatus;

/// Positions of the different kinds of variables in the flat index space of a driver.
///
/// | Variables           | Range                      |
/// |---------------------|----------------------------|
/// | Structural columns  | `0..nc`                    |
/// | Row logicals        | `nc..nc + nr`              |
/// | Extra row variables | `nc + nr..nc + 2 nr + 1`   |
/// | Entering set slack  | `nc + 2 nr + 1`            |
///
/// The basis heading has `nr` regular rows followed by at most `nr + 1` extra rows.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    nr_columns: usize,
    nr_rows: usize,
}

/// What an index in the flat space refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Sequence {
    /// A structural column.
    Column(usize),
    /// The logical of a row.
    RowLogical(usize),
    /// The variable made basic in an extra row.
    Extra(usize),
    /// The slack of a set entering the basis.
    EnteringSetSlack,
}

impl Layout {
    /// Create a new instance.
    #[must_use]
    pub fn new(nr_columns: usize, nr_rows: usize) -> Self {
        Self { nr_columns, nr_rows }
    }

    /// Number of structural and logical variables together.
    #[must_use]
    pub fn nr_regular(&self) -> usize {
        self.nr_columns + self.nr_rows
    }

    /// Maximum number of extra rows that can be active at once.
    #[must_use]
    pub fn max_extra_rows(&self) -> usize {
        self.nr_rows + 1
    }

    /// Index of the logical of a row.
    #[must_use]
    pub fn row_logical(&self, row: usize) -> usize {
        debug_assert!(row < self.nr_rows);

        self.nr_columns + row
    }

    /// Index of the variable that is basic in an extra row.
    #[must_use]
    pub fn extra_variable(&self, slot: usize) -> usize {
        debug_assert!(slot < self.max_extra_rows());

        self.nr_regular() + slot
    }

    /// Index of the virtual variable describing a set slack that enters the basis.
    #[must_use]
    pub fn entering_set_slack(&self) -> usize {
        self.nr_regular() + self.max_extra_rows()
    }

    /// Length of the variable arrays of a driver.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entering_set_slack() + 1
    }

    /// Length of the basis heading, including the extra rows.
    #[must_use]
    pub fn heading_len(&self) -> usize {
        self.nr_rows + self.max_extra_rows()
    }

    /// Classify an index.
    #[must_use]
    pub fn classify(&self, sequence: usize) -> Sequence {
        debug_assert!(sequence < self.len());

        if sequence < self.nr_columns {
            Sequence::Column(sequence)
        } else if sequence < self.nr_regular() {
            Sequence::RowLogical(sequence - self.nr_columns)
        } else if sequence < self.entering_set_slack() {
            Sequence::Extra(sequence - self.nr_regular())
        } else {
            Sequence::EnteringSetSlack
        }
    }
}

/// Sum and count of infeasibilities, as reported back to the driver.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InfeasibilitySummary {
    /// Sum of the infeasibilities.
    pub sum: f64,
    /// Number of infeasible variables.
    pub number: usize,
    /// Sum of the infeasibilities beyond a relaxed tolerance.
    pub relaxed_sum: f64,
}

impl InfeasibilitySummary {
    /// Register an infeasibility.
    ///
    /// # Arguments
    ///
    /// * `amount`: Positive distance to feasibility.
    /// * `tolerance`: Distances at or below this are not counted.
    /// * `relaxed_tolerance`: Only the part beyond this is added to `relaxed_sum`.
    pub fn register(&mut self, amount: f64, tolerance: f64, relaxed_tolerance: f64) {
        if amount > tolerance {
            self.sum += amount;
            self.number += 1;
            if amount > relaxed_tolerance {
                self.relaxed_sum += amount - relaxed_tolerance;
            }
        }
    }
}

/// State of a simplex driver.
///
/// All slices returned are indexed according to `Layout` and have length `layout().len()`,
/// except `duals` (one value per row) and `pivot_variables` (length `layout().heading_len()`).
///
/// For a pivot on a regular row, the driver writes `sequence_in` into the heading at the pivot
/// row and commits the new statuses and values before calling `update_pivot` on the matrix. For a
/// pivot on an extra row, the heading is left to the matrix.
pub trait Model {
    /// Number of rows, excluding extra rows.
    fn nr_rows(&self) -> usize;
    /// Number of structural columns.
    fn nr_columns(&self) -> usize;
    /// Positions of the variables.
    fn layout(&self) -> Layout {
        Layout::new(self.nr_columns(), self.nr_rows())
    }

    /// Status of a variable.
    fn status(&self, sequence: usize) -> VariableStatus;
    /// Change the status of a variable.
    fn set_status(&mut self, sequence: usize, status: VariableStatus);
    /// Whether a variable was excluded from entering, to avoid cycling.
    fn is_flagged(&self, sequence: usize) -> bool;

    /// Values of all variables.
    fn solution(&self) -> &[f64];
    /// Mutable values of all variables.
    fn solution_mut(&mut self) -> &mut [f64];
    /// Lower bounds of all variables.
    fn lower(&self) -> &[f64];
    /// Mutable lower bounds of all variables.
    fn lower_mut(&mut self) -> &mut [f64];
    /// Upper bounds of all variables.
    fn upper(&self) -> &[f64];
    /// Mutable upper bounds of all variables.
    fn upper_mut(&mut self) -> &mut [f64];
    /// Costs of all variables, as currently used by the driver.
    fn cost(&self) -> &[f64];
    /// Mutable costs of all variables.
    fn cost_mut(&mut self) -> &mut [f64];
    /// Reduced costs of all variables.
    fn reduced_costs(&self) -> &[f64];
    /// Mutable reduced costs of all variables.
    fn reduced_costs_mut(&mut self) -> &mut [f64];
    /// Dual values, one per row.
    fn duals(&self) -> &[f64];

    /// Basis heading: the variable that is basic in each row.
    fn pivot_variables(&self) -> &[usize];
    /// Mutable basis heading.
    fn pivot_variables_mut(&mut self) -> &mut [usize];

    /// Variable entering the basis in the current iteration.
    fn sequence_in(&self) -> usize;
    /// Variable leaving the basis in the current iteration.
    fn sequence_out(&self) -> usize;
    /// Row of the current pivot, if any. A bound flip has no pivot row.
    fn pivot_row(&self) -> Option<usize>;
    /// Step length of the current iteration.
    fn theta(&self) -> f64;
    /// Value at which the leaving variable leaves.
    fn value_out(&self) -> f64;

    /// Primal feasibility tolerance.
    fn primal_tolerance(&self) -> f64;
    /// Dual feasibility tolerance.
    fn dual_tolerance(&self) -> f64;
    /// Dual tolerance currently in use for pricing, which may be relaxed.
    fn current_dual_tolerance(&self) -> f64 {
        self.dual_tolerance()
    }
    /// Largest primal error measured after the last factorization.
    fn largest_primal_error(&self) -> f64;
    /// Largest dual error measured after the last factorization.
    fn largest_dual_error(&self) -> f64;
    /// Weight of infeasibilities in the composite objective.
    fn infeasibility_cost(&self) -> f64;
    /// Number of iterations performed so far.
    fn nr_iterations(&self) -> usize;
    /// Whether the primal (rather than the dual) algorithm is running.
    fn is_primal(&self) -> bool;

    /// Set the value of a variable, letting the driver update a piecewise linear cost.
    fn set_one(&mut self, sequence: usize, value: f64);
    /// Set the value and the bounds of a variable, letting the driver update a piecewise linear
    /// cost.
    fn set_one_with_bounds(&mut self, sequence: usize, value: f64, lower: f64, upper: f64);

    /// Add primal infeasibilities found by the matrix to the driver's totals.
    fn add_primal_infeasibilities(&mut self, summary: &InfeasibilitySummary);
    /// Add dual infeasibilities found by the matrix to the driver's totals.
    fn add_dual_infeasibilities(&mut self, summary: &InfeasibilitySummary);
}

#[cfg(test)]
mod test {
    use crate::algorithm::model::{InfeasibilitySummary, Layout, Sequence};

    #[test]
    fn classify() {
        let layout = Layout::new(4, 2);
        assert_eq!(layout.classify(3), Sequence::Column(3));
        assert_eq!(layout.classify(5), Sequence::RowLogical(1));
        assert_eq!(layout.classify(6), Sequence::Extra(0));
        assert_eq!(layout.classify(8), Sequence::Extra(2));
        assert_eq!(layout.entering_set_slack(), 9);
        assert_eq!(layout.classify(9), Sequence::EnteringSetSlack);
        assert_eq!(layout.len(), 10);
        assert_eq!(layout.heading_len(), 5);
    }

    #[test]
    fn register() {
        let mut summary = InfeasibilitySummary::default();
        summary.register(1e-9, 1e-7, 1e-3);
        summary.register(0.5, 1e-7, 0.1);
        assert_eq!(summary.number, 1);
        assert_eq!(summary.sum, 0.5);
        assert!((summary.relaxed_sum - 0.4).abs() < 1e-12);
    }
}
