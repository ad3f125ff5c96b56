//! # Extending updated columns
//!
//! The driver computes updated columns for the rows it knows about. When two members of a set are
//! basic, or when the entering variable belongs to a set, the key of that set changes along with
//! them. An extra row is appended for every such set, with the key (or, when the slack is the
//! key, a variable standing in for the member sum) as its basic variable. The extra rows only
//! exist between `extend_column` and `restore_column`.
use log::{debug, trace};

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::gub::key::Member;
use crate::algorithm::gub::status::Feasibility;
use crate::algorithm::matrix::PivotAction;
use crate::algorithm::model::{Model, Sequence};
use crate::data::linear_algebra::vector::PackedVector;

impl GubMatrix {
    /// Set of the variable entering the basis, if any.
    pub(crate) fn entering_set<M: Model>(&self, model: &M) -> Option<usize> {
        match model.layout().classify(model.sequence_in()) {
            Sequence::Column(j) => self.sets.set_of(j),
            Sequence::EnteringSetSlack => self.entering_slack,
            Sequence::RowLogical(_) | Sequence::Extra(_) => None,
        }
    }

    /// Append an extra row for every set with basic members in the updated column, and for the
    /// set of the entering variable.
    ///
    /// The entry of an extra row is the rate at which its basic variable decreases when the
    /// entering variable increases, like the other entries of the updated column.
    ///
    /// # Arguments
    ///
    /// * `model`: Driver state. The heading of the extra rows is written, as are the values of
    /// structural keys and the values, bounds and costs of the variables standing in for slack
    /// keys.
    /// * `update`: Updated column indexed by heading row.
    ///
    /// # Return value
    ///
    /// Number of extra rows appended.
    pub(crate) fn extend_column<M: Model>(&mut self, model: &mut M, update: &mut PackedVector) -> usize {
        assert!(self.extra_rows.is_empty(), "updated column was extended twice");

        let nr_columns = self.matrix.nr_columns();
        let set_in = self.entering_set(model);
        self.saved_length = update.len();

        for position in 0..self.saved_length {
            let (row, alpha) = update.get(position);
            let variable = model.pivot_variables()[row];
            if variable >= nr_columns {
                continue;
            }
            let Some(set) = self.sets.set_of(variable) else {
                continue;
            };

            let slot = match self.extra_rows.slot(set) {
                Some(slot) => slot,
                None => self.open_extra_row(model, update, set, set_in),
            };
            // The variable in the extra row of a slack key is the member sum, which moves with
            // the member rather than against it.
            let sign = if self.keys.key_column(set).is_some() { 1_f64 } else { -1_f64 };
            *update.value_mut(self.saved_length + slot) -= sign * alpha;
        }

        if let Some(set) = set_in {
            if self.extra_rows.slot(set).is_none() {
                self.open_extra_row(model, update, set, set_in);
            }
        }

        update.len() - self.saved_length
    }

    /// Allocate an extra row for a set and initialize its entry and basic variable.
    fn open_extra_row<M: Model>(
        &mut self,
        model: &mut M,
        update: &mut PackedVector,
        set: usize,
        set_in: Option<usize>,
    ) -> usize {
        let layout = model.layout();
        let slot = self.extra_rows.insert(set);
        let row = self.matrix.nr_rows() + slot;
        let entering = set_in == Some(set);
        let gub_set = self.sets.get(set);

        match self.keys.key(set) {
            Member::Column(key) => {
                let slack_in = layout.classify(model.sequence_in()) == Sequence::EnteringSetSlack;
                let value = match (entering, slack_in) {
                    (false, _) => 0_f64,
                    (true, false) => 1_f64,
                    (true, true) => -1_f64,
                };
                update.push(row, value);
                model.pivot_variables_mut()[row] = key;

                let others = gub_set.columns()
                    .filter(|&j| j != key)
                    .map(|j| model.solution()[j])
                    .sum::<f64>();
                let key_value = self.states[set].nonbasic_value(gub_set) - others;
                trace!("key {key} of set {set} has value {key_value}");
                model.solution_mut()[key] = key_value;
                if model.is_primal() {
                    model.set_one(key, key_value);
                }
            },
            Member::Slack => {
                update.push(row, if entering { -1_f64 } else { 0_f64 });
                let variable = layout.extra_variable(slot);
                model.pivot_variables_mut()[row] = variable;

                let sum = self.member_sum(model, set);
                model.solution_mut()[variable] = sum;
                if model.is_primal() {
                    model.set_one_with_bounds(variable, sum, gub_set.lower(), gub_set.upper());
                }

                let feasibility = Feasibility::of(sum, gub_set, model.primal_tolerance());
                self.states[set].feasibility = feasibility;
                let (lower, upper) = feasibility.slack_bounds(gub_set);
                model.lower_mut()[variable] = lower;
                model.upper_mut()[variable] = upper;
                model.cost_mut()[variable] = feasibility.weight() * model.infeasibility_cost();
            },
        }

        slot
    }

    /// Remove the extra rows from an updated column after the pivot row was chosen.
    ///
    /// # Return value
    ///
    /// What the driver should do with its factorization.
    ///
    /// # Panics
    ///
    /// When an extra row was chosen as pivot row, but no member of its set can take over as key.
    pub(crate) fn restore_column<M: Model>(&mut self, model: &mut M, update: &mut PackedVector) -> PivotAction {
        self.pivot_set = None;
        self.possible_pivot_key = None;

        let action = if update.len() > self.saved_length {
            let nr_rows = self.matrix.nr_rows();
            match model.pivot_row() {
                Some(row) if row >= nr_rows => self.classify_extra_row_pivot(model, update, row - nr_rows),
                _ => match model.layout().classify(model.sequence_in()) {
                    Sequence::EnteringSetSlack => PivotAction::SlackBecomesKey,
                    _ => PivotAction::Replace,
                },
            }
        } else {
            PivotAction::Replace
        };

        update.truncate(self.saved_length);
        self.recently_extended = self.extra_rows.clear();
        debug!("released extra rows of sets {:?}, {action:?}", self.recently_extended);

        action
    }

    fn classify_extra_row_pivot<M: Model>(&mut self, model: &M, update: &PackedVector, slot: usize) -> PivotAction {
        let Some(pivot_set) = self.extra_rows.set(slot) else {
            panic!("pivot on extra row {slot}, which is not in use");
        };
        debug_assert!(match model.layout().classify(model.sequence_out()) {
            Sequence::Column(j) => self.keys.is_key(pivot_set, j),
            Sequence::Extra(_) => true,
            _ => false,
        });
        self.pivot_set = Some(pivot_set);

        let nr_columns = self.matrix.nr_columns();
        let mut shortest: Option<(usize, usize)> = None;
        for &(row, _) in &update.entries()[..self.saved_length] {
            let variable = model.pivot_variables()[row];
            if variable < nr_columns && self.sets.set_of(variable) == Some(pivot_set) {
                let length = self.matrix.column_length(variable);
                if shortest.is_none_or(|(_, best)| length < best) {
                    shortest = Some((row, length));
                }
            }
        }
        self.possible_pivot_key = shortest.map(|(row, _)| row);

        if self.possible_pivot_key.is_some() {
            PivotAction::SwapKey
        } else if self.entering_set(model) == Some(pivot_set) {
            self.key_flip_kind(model, pivot_set)
        } else {
            panic!("no basic member of set {pivot_set} can replace its key");
        }
    }

    /// Whether a key changing within a set leaves other basic members to update.
    pub(crate) fn key_flip_kind<M: Model>(&self, model: &M, set: usize) -> PivotAction {
        let sequence_out = model.sequence_out();
        let key = self.keys.key(set);
        let has_others = self.basic_columns(model, set)
            .any(|j| j != sequence_out && Member::Column(j) != key);

        if has_others { PivotAction::KeyFlipWithBasics } else { PivotAction::KeyFlip }
    }
}
