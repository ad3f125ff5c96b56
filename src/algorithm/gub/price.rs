//! # Pricing with sets
//!
//! The reduced cost of a member is taken relative to the key of its set: `c_j - c_key - pi (a_j -
//! a_key)`. For all members of a set, the part coming from the key is the same and is computed
//! once per set. The slack of a set with a structural key may enter as well; its reduced cost is
//! the negated key part.
use std::ops::Range;

use log::trace;

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::gub::key::Member;
use crate::algorithm::gub::status::{Feasibility, SetStatus};
use crate::algorithm::matrix::{PricingBias, price_columns};
use crate::algorithm::model::Model;
use crate::data::linear_algebra::vector::IndexedVector;
use crate::data::linear_program::elements::VariableStatus;

/// Best candidate found while scanning the columns of the sets.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Candidate {
    Column { column: usize, dj: f64 },
    Slack { set: usize, dj: f64 },
}

impl GubMatrix {
    /// Look for an entering variable, including the slacks of the sets.
    ///
    /// Columns before and after the sets are priced without modification. When a set slack is the
    /// best candidate, `best` becomes the index of the entering set slack, see `select_set_slack`.
    pub(crate) fn price<M: Model>(
        &mut self,
        model: &mut M,
        range: Range<usize>,
        best: &mut Option<usize>,
        nr_wanted: &mut usize,
    ) {
        let bias = self.config.pricing;
        let gub_columns = self.sets.gub_columns();

        let before = range.start..range.end.min(gub_columns.start);
        price_columns(&self.matrix, model, before, best, nr_wanted, bias);
        let within = range.start.max(gub_columns.start)..range.end.min(gub_columns.end);
        self.price_sets(model, within, best, nr_wanted, bias);
        let after = range.start.max(gub_columns.end)..range.end;
        price_columns(&self.matrix, model, after, best, nr_wanted, bias);

        if *best != Some(model.layout().entering_set_slack()) {
            self.entering_slack = None;
        }
    }

    /// Key part of the reduced costs of the members of a set.
    fn key_reduced_cost<M: Model>(&self, model: &M, set: usize) -> f64 {
        match self.keys.key(set) {
            Member::Column(key) => {
                debug_assert!(model.status(key).is_basic());
                model.cost()[key] - self.matrix.inner_product(key, model.duals())
            },
            Member::Slack => -self.states[set].weight() * model.infeasibility_cost(),
        }
    }

    fn price_sets<M: Model>(
        &mut self,
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
        let mut candidate = None;
        let mut current: Option<(usize, f64)> = None;

        for j in range {
            let dj_mod = match self.sets.set_of(j) {
                None => 0_f64,
                Some(set) => match current {
                    Some((current_set, dj_mod)) if current_set == set => dj_mod,
                    _ => {
                        let dj_mod = self.key_reduced_cost(model, set);
                        current = Some((set, dj_mod));

                        let state = &self.states[set];
                        let value = match state.status {
                            SetStatus::AtLowerBound => -dj_mod,
                            SetStatus::AtUpperBound => dj_mod,
                            SetStatus::Basic | SetStatus::Fixed => f64::NEG_INFINITY,
                        };
                        if value > tolerance && !state.flagged {
                            *nr_wanted = nr_wanted.saturating_sub(1);
                            if value > best_dj {
                                best_dj = value;
                                candidate = Some(Candidate::Slack { set, dj: dj_mod });
                            }
                        }
                        dj_mod
                    },
                },
            };

            if j != sequence_out {
                let dj = model.cost()[j] - dj_mod - self.matrix.inner_product(j, model.duals());
                let value = match model.status(j) {
                    VariableStatus::Basic | VariableStatus::Fixed => f64::NEG_INFINITY,
                    VariableStatus::Free | VariableStatus::SuperBasic => {
                        if dj.abs() > bias.accept * tolerance {
                            dj.abs() * bias.bias
                        } else {
                            f64::NEG_INFINITY
                        }
                    },
                    VariableStatus::AtUpperBound => dj,
                    VariableStatus::AtLowerBound => -dj,
                };

                if value > tolerance && !model.is_flagged(j) {
                    *nr_wanted = nr_wanted.saturating_sub(1);
                    if value > best_dj {
                        best_dj = value;
                        candidate = Some(Candidate::Column { column: j, dj });
                    }
                }
            }

            if *nr_wanted == 0 {
                break;
            }
        }

        match candidate {
            Some(Candidate::Column { column, dj }) => {
                model.reduced_costs_mut()[column] = dj;
                self.entering_slack = None;
                *best = Some(column);
            },
            Some(Candidate::Slack { set, dj }) => *best = Some(self.select_set_slack(model, set, dj)),
            None => {},
        }
    }

    /// Make the slack of a set the entering candidate.
    ///
    /// The slack is presented to the driver as the variable at `Layout::entering_set_slack`, with
    /// the status, value and bounds of the slack and a zero cost.
    ///
    /// # Arguments
    ///
    /// * `model`: Driver state, the entering slot is written.
    /// * `set`: Set with a nonbasic slack.
    /// * `reduced_cost`: Reduced cost of the slack.
    ///
    /// # Return value
    ///
    /// Index of the entering slot.
    pub fn select_set_slack<M: Model>(&mut self, model: &mut M, set: usize, reduced_cost: f64) -> usize {
        let gub_set = self.sets.get(set);
        let status = self.states[set].status;
        let sequence = model.layout().entering_set_slack();

        model.set_status(sequence, status.into());
        model.solution_mut()[sequence] = self.states[set].nonbasic_value(gub_set);
        model.lower_mut()[sequence] = gub_set.lower();
        model.upper_mut()[sequence] = gub_set.upper();
        model.cost_mut()[sequence] = 0_f64;
        model.reduced_costs_mut()[sequence] = reduced_cost;
        trace!("slack of set {set} selected to enter with reduced cost {reduced_cost}");

        self.entering_slack = Some(set);
        sequence
    }

    /// Apply cost changes of the sets that had an extra row during the last pivot to a vector
    /// indexed by heading row.
    ///
    /// The keys of those sets are recomputed, after which the sets are forgotten. A structural key
    /// may change cost through `Model::set_one`, a slack key through a change in the feasibility
    /// of its set. The change is added for every basic member in the heading.
    pub fn modify_costs_after_pricing<M: Model>(&mut self, model: &mut M, array: &mut IndexedVector) {
        let tolerance = model.primal_tolerance();
        let infeasibility_cost = model.infeasibility_cost();

        let mut changes = Vec::new();
        for set in std::mem::take(&mut self.recently_extended) {
            let gub_set = self.sets.get(set);
            let key = self.keys.key(set);
            let others = gub_set.columns()
                .filter(|&j| Member::Column(j) != key)
                .map(|j| model.solution()[j])
                .sum::<f64>();

            let change = match key {
                Member::Column(key) => {
                    let value = self.states[set].nonbasic_value(gub_set) - others;
                    model.solution_mut()[key] = value;
                    let old_cost = model.cost()[key];
                    model.set_one(key, value);
                    model.cost()[key] - old_cost
                },
                Member::Slack => {
                    let old_weight = self.states[set].weight();
                    let feasibility = Feasibility::of(others, gub_set, tolerance);
                    self.states[set].feasibility = feasibility;
                    (feasibility.weight() - old_weight) * infeasibility_cost
                },
            };
            if change != 0_f64 {
                changes.push((set, change));
            }
        }

        if changes.is_empty() {
            return;
        }

        let nr_rows = self.matrix.nr_rows();
        let nr_columns = self.matrix.nr_columns();
        for row in 0..nr_rows {
            let variable = model.pivot_variables()[row];
            if variable >= nr_columns {
                continue;
            }
            if let Some(set) = self.sets.set_of(variable) {
                if let Some(&(_, change)) = changes.iter().find(|&&(changed, _)| changed == set) {
                    array.add(row, change);
                }
            }
        }
    }
}
