//! Random problems with sets, and a driver that pivots on them without solving anything.
//!
//! The driver picks entering variables and pivot rows at random, but commits every pivot the way
//! a real driver would: statuses, values and the heading are updated before the matrix is told.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::gub::set::SetDescription;
use crate::algorithm::gub::status::SetStatus;
use crate::algorithm::matrix::SimplexMatrix;
use crate::algorithm::model::{Model, Sequence};
use crate::data::linear_algebra::matrix::PackedMatrix;
use crate::data::linear_algebra::vector::PackedVector;
use crate::data::linear_program::elements::VariableStatus;
use crate::tests::model::TestModel;

pub const NR_ROWS: usize = 10;
pub const NR_COLUMNS: usize = 20;
pub const NR_SETS: usize = 5;

const ROW_BOUND: f64 = 100_f64;
const MEMBER_UPPER: f64 = 3_f64;
const OTHER_UPPER: f64 = 5_f64;

fn nonzero(rng: &mut StdRng) -> f64 {
    let value = rng.random_range(0.5_f64..5_f64);
    if rng.random_bool(0.5) { value } else { -value }
}

/// Constraint matrix without empty columns.
fn random_matrix(rng: &mut StdRng) -> PackedMatrix {
    let mut columns = Vec::with_capacity(NR_COLUMNS);
    for _ in 0..NR_COLUMNS {
        let mut column = Vec::new();
        for row in 0..NR_ROWS {
            if rng.random_bool(0.3) {
                column.push((row, nonzero(rng)));
            }
        }
        if column.is_empty() {
            let row = rng.random_range(0..NR_ROWS);
            column.push((row, nonzero(rng)));
        }
        columns.push(column);
    }

    PackedMatrix::from_columns(NR_ROWS, columns)
}

/// Sets of two or three members starting at column 2, with a gap after the second set.
fn random_sets(rng: &mut StdRng) -> SetDescription {
    let mut description = SetDescription {
        starts: Vec::new(),
        ends: Vec::new(),
        lower: Vec::new(),
        upper: Vec::new(),
    };

    let mut start = 2;
    for set in 0..NR_SETS {
        if set == 2 {
            start += 1;
        }
        let size = rng.random_range(2..=3);
        let lower = rng.random_range(0..=2);
        let upper = rng.random_range(lower + 1..=4);

        description.starts.push(start);
        description.ends.push(start + size);
        description.lower.push(f64::from(lower));
        description.upper.push(f64::from(upper));
        start += size;
    }

    description
}

/// Random problem after the crash, pivoted on at random.
pub struct SyntheticDriver {
    pub model: TestModel,
    pub gub: GubMatrix,
    rng: StdRng,
}

impl SyntheticDriver {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let matrix = random_matrix(&mut rng);
        let description = random_sets(&mut rng);
        let mut gub = GubMatrix::new(matrix, description).unwrap();

        let mut model = TestModel::new(NR_ROWS, NR_COLUMNS);
        for j in 0..NR_COLUMNS {
            let upper = if gub.sets().set_of(j).is_some() { MEMBER_UPPER } else { OTHER_UPPER };
            let cost = rng.random_range(-1_f64..1_f64);
            model.set_column(j, 0_f64, upper, cost, 0_f64, VariableStatus::AtLowerBound);
        }
        for row in 0..NR_ROWS {
            let logical = model.layout().row_logical(row);
            model.lower[logical] = -ROW_BOUND;
            model.upper[logical] = ROW_BOUND;
        }

        gub.use_effective_rhs(&mut model, false);

        Self { model, gub, rng }
    }

    /// Perform one random iteration.
    ///
    /// # Return value
    ///
    /// Whether a pivot or bound flip was committed.
    pub fn step(&mut self) -> bool {
        let layout = self.model.layout();

        let slack_sets = (0..self.gub.sets().len())
            .filter(|&set| matches!(
                self.gub.state(set).status,
                SetStatus::AtLowerBound | SetStatus::AtUpperBound,
            ))
            .collect::<Vec<_>>();
        let sequence_in = if !slack_sets.is_empty() && self.rng.random_bool(0.2) {
            let set = slack_sets[self.rng.random_range(0..slack_sets.len())];
            self.gub.select_set_slack(&mut self.model, set, 0_f64)
        } else {
            let candidates = (0..layout.nr_regular())
                .filter(|&j| !self.model.status[j].is_basic())
                .collect::<Vec<_>>();
            candidates[self.rng.random_range(0..candidates.len())]
        };
        self.model.sequence_in = sequence_in;
        let old_in_value = self.model.solution[sequence_in];

        if self.rng.random_bool(0.2) {
            return self.flip(sequence_in, old_in_value);
        }

        let mut update = PackedVector::new();
        for row in 0..NR_ROWS {
            if self.rng.random_bool(0.4) {
                let alpha = nonzero(&mut self.rng);
                update.push(row, alpha);
            }
        }
        self.gub.extend_updated(&mut self.model, &mut update);

        let candidates = update.iter()
            .filter(|&&(_, alpha)| alpha.abs() > 1e-9)
            .map(|&(row, _)| row)
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            self.model.pivot_row = None;
            self.gub.restore_updated(&mut self.model, &mut update);
            return false;
        }

        let row = candidates[self.rng.random_range(0..candidates.len())];
        let sequence_out = self.model.pivot_variables[row];
        self.model.pivot_row = Some(row);
        self.model.sequence_out = sequence_out;
        let value_out = match layout.classify(sequence_out) {
            Sequence::Extra(slot) => {
                let set = self.gub.extra_row_set(slot).unwrap();
                let gub_set = self.gub.sets().get(set);
                if self.rng.random_bool(0.5) { gub_set.lower() } else { gub_set.upper() }
            },
            _ => {
                if self.rng.random_bool(0.5) {
                    self.model.lower[sequence_out]
                } else {
                    self.model.upper[sequence_out]
                }
            },
        };
        self.model.value_out = value_out;
        self.gub.restore_updated(&mut self.model, &mut update);

        self.model.status[sequence_in] = VariableStatus::Basic;
        self.model.solution[sequence_in] = old_in_value + self.rng.random_range(-0.5_f64..0.5_f64);
        if sequence_out < layout.nr_regular() {
            let (lower, upper) = (self.model.lower[sequence_out], self.model.upper[sequence_out]);
            self.model.solution[sequence_out] = value_out;
            self.model.status[sequence_out] = if lower == upper {
                VariableStatus::Fixed
            } else if value_out == lower {
                VariableStatus::AtLowerBound
            } else {
                VariableStatus::AtUpperBound
            };
        }
        if row < NR_ROWS {
            self.model.pivot_variables[row] = sequence_in;
        }

        self.gub.update_pivot(&mut self.model, old_in_value, value_out);
        self.model.nr_iterations += 1;
        true
    }

    fn flip(&mut self, sequence: usize, old_value: f64) -> bool {
        let (lower, upper) = (self.model.lower[sequence], self.model.upper[sequence]);
        if lower == upper {
            return false;
        }

        let (value, status) = match self.model.status[sequence] {
            VariableStatus::AtUpperBound => (lower, VariableStatus::AtLowerBound),
            _ => (upper, VariableStatus::AtUpperBound),
        };
        self.model.sequence_out = sequence;
        self.model.pivot_row = None;
        self.model.value_out = value;
        self.model.solution[sequence] = value;
        self.model.status[sequence] = status;

        self.gub.update_pivot(&mut self.model, old_value, old_value);
        self.model.nr_iterations += 1;
        true
    }

    /// Basic regular variables other than the keys, sorted.
    pub fn expected_heading(&self) -> Vec<usize> {
        (0..self.model.layout().nr_regular())
            .filter(|&j| self.model.status[j].is_basic())
            .filter(|&j| match self.model.layout().classify(j) {
                Sequence::Column(j) => match self.gub.sets().set_of(j) {
                    Some(set) => !self.gub.keys().is_key(set, j),
                    None => true,
                },
                _ => true,
            })
            .collect()
    }

    /// The regular rows of the heading, sorted.
    pub fn heading(&self) -> Vec<usize> {
        let mut heading = self.model.pivot_variables[..NR_ROWS].to_vec();
        heading.sort_unstable();
        heading
    }
}
