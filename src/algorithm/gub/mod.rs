//! # Generalized upper bounds
//!
//! A generalized upper bound (GUB) set is a group of columns with a bound on the sum of their
//! values, `lower <= sum_{j in S} x_j <= upper`. Rather than adding a row for each set, one member
//! of every set is its key variable: it is always basic and absorbs the degree of freedom of the
//! set. Its column is subtracted from the columns of the other members, such that the simplex
//! driver works with a basis that has one row per constraint only.
//!
//! Only while a pivot is computed, when two members of a set are basic in the updated column, a
//! temporary extra row for that set is added. It is removed again before the pivot is committed.
//!
//! The crash (`use_effective_rhs`) assigns the first keys. After that, the driver calls the hooks
//! of `SimplexMatrix` during every iteration, and this module keeps the keys, the lists of basic
//! members and the effective right-hand side up to date.
use std::ops::Range;

use crate::algorithm::gub::config::GubConfig;
use crate::algorithm::gub::effective_rhs::EffectiveRhs;
use crate::algorithm::gub::extra_rows::{ExtraRows, Scratch};
use crate::algorithm::gub::key::{KeyAssignment, Member};
use crate::algorithm::gub::set::{SetDescription, SetTable};
use crate::algorithm::gub::status::{SetState, SetStatus};
use crate::algorithm::model::{InfeasibilitySummary, Model};
use crate::data::linear_algebra::matrix::PackedMatrix;
use crate::error::{GubError, InvariantViolation};

pub mod config;
pub mod crash;
pub mod effective_rhs;
pub mod expand;
pub mod extend;
pub mod extra_rows;
pub mod key;
pub mod ops;
pub mod pivot;
pub mod price;
pub mod set;
pub mod status;


/// Packed matrix with generalized upper bound sets.
#[derive(Clone, Debug)]
pub struct GubMatrix {
    matrix: PackedMatrix,
    sets: SetTable,
    states: Vec<SetState>,
    keys: KeyAssignment,
    /// Whether the crash assigned the keys.
    crashed: bool,
    effective_rhs: Option<EffectiveRhs>,

    extra_rows: ExtraRows,
    /// Length of the updated column before it was extended.
    saved_length: usize,
    /// Set owning the extra row of the pivot in progress.
    pivot_set: Option<usize>,
    /// Heading row of the basic member that replaces a leaving key.
    possible_pivot_key: Option<usize>,
    /// Set whose slack was selected to enter the basis.
    entering_slack: Option<usize>,
    /// Sets that had an extra row during the last pivot.
    recently_extended: Vec<usize>,

    /// No member has a bound other than zero or infinity, detected by the crash.
    no_column_bounds: bool,
    primal_infeasibilities: InfeasibilitySummary,
    dual_infeasibilities: InfeasibilitySummary,
    scratch: Scratch,
    config: GubConfig,
}

impl GubMatrix {
    /// Create a new instance.
    ///
    /// All set slacks start out basic, and therefore as keys.
    ///
    /// # Arguments
    ///
    /// * `matrix`: Constraint matrix, including the columns of the sets.
    /// * `description`: Column ranges and bounds of the sets.
    ///
    /// # Errors
    ///
    /// If the description is invalid, see `SetTable::new`.
    pub fn new(matrix: PackedMatrix, description: SetDescription) -> Result<Self, GubError> {
        let sets = SetTable::new(matrix.nr_columns(), &description)?;

        Ok(Self::from_table(matrix, sets, None))
    }

    fn from_table(matrix: PackedMatrix, sets: SetTable, states: Option<Vec<SetState>>) -> Self {
        let nr_sets = sets.len();
        let nr_rows = matrix.nr_rows();

        Self {
            matrix,
            states: states.unwrap_or_else(|| vec![SetState::default(); nr_sets]),
            keys: KeyAssignment::slack_keys(nr_sets),
            crashed: false,
            effective_rhs: None,
            extra_rows: ExtraRows::new(nr_sets),
            saved_length: 0,
            pivot_set: None,
            possible_pivot_key: None,
            entering_slack: None,
            recently_extended: Vec::new(),
            no_column_bounds: false,
            primal_infeasibilities: InfeasibilitySummary::default(),
            dual_infeasibilities: InfeasibilitySummary::default(),
            scratch: Scratch::new(nr_rows),
            config: GubConfig::default(),
            sets,
        }
    }

    /// Use different settings.
    #[must_use]
    pub fn with_config(mut self, config: GubConfig) -> Self {
        self.config = config;
        self
    }

    /// Start with the given statuses of the set slacks.
    ///
    /// # Panics
    ///
    /// If the number of statuses differs from the number of sets.
    #[must_use]
    pub fn with_statuses(mut self, statuses: &[SetStatus]) -> Self {
        assert_eq!(statuses.len(), self.sets.len());

        self.states = statuses.iter().map(|&status| SetState::new(status)).collect();
        self
    }

    /// Select rows and columns.
    ///
    /// The sets are rebuilt for the selected columns, see `SetTable::subset`. States of the sets
    /// carry over; keys are assigned again by the next crash.
    ///
    /// # Errors
    ///
    /// If a selected row or column is out of range, or the column selection breaks the order of
    /// the sets.
    pub fn subset(&self, which_rows: &[usize], which_columns: &[usize]) -> Result<Self, GubError> {
        let nr_rows = self.matrix.nr_rows();
        if let Some(&row) = which_rows.iter().find(|&&row| row >= nr_rows) {
            return Err(GubError::RowOutOfRange { row, nr_rows });
        }
        let sets = self.sets.subset(which_columns)?;
        let states = which_columns.iter()
            .filter_map(|&j| self.sets.set_of(j))
            .fold(Vec::<usize>::new(), |mut order, set| {
                if order.last() != Some(&set) {
                    order.push(set);
                }
                order
            })
            .into_iter()
            .map(|set| self.states[set])
            .collect::<Vec<_>>();
        debug_assert_eq!(states.len(), sets.len());

        let matrix = self.matrix.subset(which_rows, which_columns);
        Ok(Self::from_table(matrix, sets, Some(states)).with_config(self.config))
    }

    /// The underlying matrix, without the key columns subtracted.
    #[must_use]
    pub fn packed(&self) -> &PackedMatrix {
        &self.matrix
    }

    /// Whether the last crash found that no member has a bound other than zero or infinity. The
    /// sums of the sets then only need the basic members.
    #[must_use]
    pub fn has_no_column_bounds(&self) -> bool {
        self.no_column_bounds
    }

    /// The sets.
    #[must_use]
    pub fn sets(&self) -> &SetTable {
        &self.sets
    }

    /// State of a set.
    #[must_use]
    pub fn state(&self, set: usize) -> &SetState {
        &self.states[set]
    }

    /// Exclude the slack of a set from entering, or allow it again.
    pub fn set_flagged(&mut self, set: usize, flagged: bool) {
        self.states[set].flagged = flagged;
    }

    /// Keys and basic members of all sets.
    #[must_use]
    pub fn keys(&self) -> &KeyAssignment {
        &self.keys
    }

    /// Whether the crash still has to assign the keys.
    #[must_use]
    pub fn needs_crash(&self) -> bool {
        !self.crashed
    }

    /// Settings.
    #[must_use]
    pub fn config(&self) -> &GubConfig {
        &self.config
    }

    /// Set owning an extra row during the pivot in progress.
    ///
    /// # Arguments
    ///
    /// * `slot`: Index of the extra row, relative to the first extra row.
    #[must_use]
    pub fn extra_row_set(&self, slot: usize) -> Option<usize> {
        self.extra_rows.set(slot)
    }

    /// Set whose slack was selected to enter the basis, if any.
    #[must_use]
    pub fn entering_slack(&self) -> Option<usize> {
        self.entering_slack
    }

    /// Sum of the values of the members of a set.
    pub(crate) fn member_sum<M: Model>(&self, model: &M, set: usize) -> f64 {
        self.sets.get(set).columns().map(|j| model.solution()[j]).sum()
    }

    /// Structural columns of a set that are basic according to the model.
    pub(crate) fn basic_columns<'a, M: Model>(&self, model: &'a M, set: usize) -> impl Iterator<Item = usize> + use<'a, M> {
        self.sets.get(set).columns().filter(move |&j| model.status(j).is_basic())
    }

    /// Rebuild the list of basic members of a set with a given key.
    pub(crate) fn relink<M: Model>(&mut self, model: &M, set: usize, key: Member) {
        let columns: Range<usize> = self.sets.get(set).columns();
        self.keys.relink(set, key, columns.filter(|&j| model.status(j).is_basic()));
    }

    /// Check that every set has one basic key and that the lists of basic members agree with the
    /// statuses in the model.
    ///
    /// # Errors
    ///
    /// The first violation found.
    pub fn verify_keys<M: Model>(&self, model: &M) -> Result<(), InvariantViolation> {
        for set in 0..self.sets.len() {
            let state = &self.states[set];
            match self.keys.key(set) {
                Member::Column(key) => {
                    if !model.status(key).is_basic() {
                        return Err(InvariantViolation::KeyNotBasic { set, key });
                    }
                    if state.status == SetStatus::Basic {
                        return Err(InvariantViolation::BasicSlackNotKey { set, key });
                    }
                },
                Member::Slack => {
                    if state.status != SetStatus::Basic {
                        return Err(InvariantViolation::SlackKeyNotBasic { set });
                    }
                },
            }

            let key = self.keys.key(set);
            let mut listed = self.keys.members(set).others().to_vec();
            listed.sort_unstable();
            let actual = self.basic_columns(model, set)
                .filter(|&j| Member::Column(j) != key)
                .collect::<Vec<_>>();
            if listed != actual {
                return Err(InvariantViolation::MembershipMismatch { set, listed, actual });
            }
        }

        Ok(())
    }
}
