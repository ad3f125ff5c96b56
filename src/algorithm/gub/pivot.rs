//! # Committing a pivot
//!
//! After the driver changed statuses and values, the keys, the lists of basic members, the set
//! statuses and the effective right-hand side are brought in line with the new basis.
use itertools::Itertools;
use log::debug;

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::gub::effective_rhs::View;
use crate::algorithm::gub::key::Member;
use crate::algorithm::gub::status::{Feasibility, SetStatus};
use crate::algorithm::model::{Model, Sequence};
use crate::data::linear_program::elements::{BoundDirection, VariableStatus};

impl GubMatrix {
    /// Update the bookkeeping after the driver committed a pivot or a bound flip.
    ///
    /// # Arguments
    ///
    /// * `model`: Driver state after the pivot. For a pivot on a regular row, the entering
    /// variable is already in the heading.
    /// * `old_in_value`: Value of the entering variable before the iteration.
    pub(crate) fn commit_pivot<M: Model>(&mut self, model: &mut M, old_in_value: f64) {
        if model.sequence_in() == model.sequence_out() {
            self.commit_bound_flip(model, old_in_value);
        } else {
            self.commit_basis_change(model, old_in_value);
        }

        self.entering_slack = None;
        self.pivot_set = None;
        self.possible_pivot_key = None;
        debug_assert_eq!(self.verify_keys(model), Ok(()));
    }

    fn commit_bound_flip<M: Model>(&mut self, model: &M, old_value: f64) {
        let sequence = model.sequence_in();
        let new_value = model.solution()[sequence];

        match model.layout().classify(sequence) {
            Sequence::Column(j) => self.patch_effective_rhs(|gub, rhs| {
                gub.add_member_column(rhs, j, old_value - new_value);
            }),
            Sequence::RowLogical(row) => self.patch_effective_rhs(|_, rhs| rhs[row] += new_value - old_value),
            Sequence::EnteringSetSlack => {
                let Some(set) = self.entering_slack else {
                    panic!("set slack flipped without being selected");
                };
                let before = self.key_contribution(model, set, View::Current);
                self.states[set].status = match model.status(sequence) {
                    VariableStatus::AtLowerBound => SetStatus::at(BoundDirection::Lower, self.sets.get(set)),
                    VariableStatus::AtUpperBound => SetStatus::at(BoundDirection::Upper, self.sets.get(set)),
                    VariableStatus::Fixed => SetStatus::Fixed,
                    status => panic!("set slack flipped to {status:?}"),
                };
                let after = self.key_contribution(model, set, View::Current);
                debug!("slack of set {set} flipped to {:?}", self.states[set].status);
                self.patch_effective_rhs(|gub, rhs| gub.move_contributions(rhs, &[before], &[after]));
            },
            Sequence::Extra(slot) => panic!("variable of extra row {slot} can't flip"),
        }
    }

    fn commit_basis_change<M: Model>(&mut self, model: &mut M, old_in_value: f64) {
        let layout = model.layout();
        let nr_rows = self.matrix.nr_rows();
        let sequence_in = model.sequence_in();
        let sequence_out = model.sequence_out();
        let slack_in = layout.classify(sequence_in) == Sequence::EnteringSetSlack;
        let set_in = self.entering_set(model);
        let set_out = match layout.classify(sequence_out) {
            Sequence::Column(j) => self.sets.set_of(j),
            _ => None,
        };

        let affected = [set_in, set_out, self.pivot_set].into_iter()
            .flatten()
            .unique()
            .collect::<Vec<_>>();
        let view = View::BeforePivot { sequence_in, old_in_value, sequence_out };
        let before = affected.iter()
            .map(|&set| self.key_contribution(model, set, view))
            .collect::<Vec<_>>();

        let in_row = match model.pivot_row() {
            Some(row) if row >= nr_rows => self.swap_key(model, set_in, slack_in),
            Some(row) => {
                if let Some(set) = set_out {
                    self.relink(model, set, self.keys.key(set));
                }
                Some(row)
            },
            None => panic!("basis change without a pivot row"),
        };

        if let (Some(set), Some(row)) = (set_in, in_row) {
            if slack_in {
                let Some(old_key) = self.keys.key_column(set) else {
                    panic!("slack of set {set} entered while being the key");
                };
                model.pivot_variables_mut()[row] = old_key;
                self.states[set].status = SetStatus::Basic;
                self.relink(model, set, Member::Slack);
                debug!("slack of set {set} replaces key {old_key}");
            } else {
                self.relink(model, set, self.keys.key(set));
            }
        }

        let tolerance = model.primal_tolerance();
        for &set in &affected {
            if self.keys.key(set) == Member::Slack {
                let sum = self.member_sum(model, set);
                self.states[set].feasibility = Feasibility::of(sum, self.sets.get(set), tolerance);
            }
        }

        let after = affected.iter()
            .map(|&set| self.key_contribution(model, set, View::Current))
            .collect::<Vec<_>>();
        let out_value = model.solution()[sequence_out];
        self.patch_effective_rhs(|gub, rhs| {
            match layout.classify(sequence_in) {
                Sequence::Column(j) => gub.matrix.add_dense(rhs, j, old_in_value),
                Sequence::RowLogical(row) => rhs[row] -= old_in_value,
                Sequence::Extra(_) | Sequence::EnteringSetSlack => {},
            }
            match layout.classify(sequence_out) {
                Sequence::Column(j) => gub.matrix.add_dense(rhs, j, -out_value),
                Sequence::RowLogical(row) => rhs[row] += out_value,
                Sequence::Extra(_) | Sequence::EnteringSetSlack => {},
            }
            gub.move_contributions(rhs, &before, &after);
        });
    }

    /// Pivot on the extra row of `pivot_set`: its key, or the variable standing in for its slack,
    /// leaves.
    ///
    /// # Return value
    ///
    /// Heading row where the entering variable was placed, `None` when it became the key of the
    /// pivot set.
    fn swap_key<M: Model>(&mut self, model: &mut M, set_in: Option<usize>, slack_in: bool) -> Option<usize> {
        let Some(pivot_set) = self.pivot_set else {
            panic!("pivot on an extra row that was not restored");
        };
        let sequence_in = model.sequence_in();

        if let Sequence::Extra(_) = model.layout().classify(model.sequence_out()) {
            let gub_set = self.sets.get(pivot_set);
            let value = model.value_out();
            let direction = if value == gub_set.upper() {
                BoundDirection::Upper
            } else if value == gub_set.lower() {
                BoundDirection::Lower
            } else if (value - gub_set.upper()).abs() < (value - gub_set.lower()).abs() {
                BoundDirection::Upper
            } else {
                BoundDirection::Lower
            };
            self.states[pivot_set].status = SetStatus::at(direction, gub_set);
            self.states[pivot_set].feasibility = Feasibility::Feasible;
        }

        if set_in == Some(pivot_set) {
            let key = if slack_in {
                self.states[pivot_set].status = SetStatus::Basic;
                Member::Slack
            } else {
                Member::Column(sequence_in)
            };
            debug!("key of set {pivot_set} becomes {key:?}");
            self.relink(model, pivot_set, key);
            None
        } else {
            let Some(row) = self.possible_pivot_key else {
                panic!("no basic member of set {pivot_set} can replace its key");
            };
            let heading = model.pivot_variables_mut();
            let new_key = heading[row];
            heading[row] = sequence_in;
            debug!("key of set {pivot_set} becomes {new_key}, {sequence_in} takes row {row}");
            self.relink(model, pivot_set, Member::Column(new_key));
            Some(row)
        }
    }

    /// Apply a change to the effective right-hand side, if it is allocated.
    fn patch_effective_rhs(&mut self, patch: impl FnOnce(&Self, &mut [f64])) {
        if let Some(mut cache) = self.effective_rhs.take() {
            patch(self, &mut cache.values);
            self.effective_rhs = Some(cache);
        }
    }

    /// Add a multiple of a member's column as seen by the driver, `a_j - a_key`.
    fn add_member_column(&self, rhs: &mut [f64], column: usize, multiplier: f64) {
        self.matrix.add_dense(rhs, column, multiplier);
        if let Some(key) = self.adjusting_key(column) {
            self.matrix.add_dense(rhs, key, -multiplier);
        }
    }

    /// Replace old key contributions by new ones.
    fn move_contributions(&self, rhs: &mut [f64], before: &[Option<(usize, f64)>], after: &[Option<(usize, f64)>]) {
        for &(key, value) in before.iter().flatten() {
            self.matrix.add_dense(rhs, key, value);
        }
        for &(key, value) in after.iter().flatten() {
            self.matrix.add_dense(rhs, key, -value);
        }
    }
}
