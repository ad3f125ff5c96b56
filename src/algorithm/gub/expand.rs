//! # Expansion hooks
//!
//! Operations the driver calls at fixed points of its primal and dual iterations, and while it
//! refactorizes, to take the keys into account: the keys are not part of the heading, their values
//! follow from the set bounds and their costs enter the duals of the rows of their basic members.
use log::trace;

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::gub::key::Member;
use crate::algorithm::gub::status::{Feasibility, SetStatus};
use crate::algorithm::matrix::PivotAction;
use crate::algorithm::model::{InfeasibilitySummary, Model, Sequence};
use crate::data::linear_algebra::vector::IndexedVector;
use crate::data::linear_program::elements::VariableStatus;

/// Errors in the primal or dual values beyond this are not trusted when relaxing tolerances.
const RELAXATION_LIMIT: f64 = 1e-3;

impl GubMatrix {
    /// Append the basic structural columns other than the keys to a heading being built.
    ///
    /// Crashes first when no keys were assigned yet.
    pub fn fill_pivot_variables<M: Model>(&mut self, model: &mut M, heading: &mut Vec<usize>) {
        if !self.crashed {
            debug_assert!(self.effective_rhs.is_none());
            self.use_effective_rhs(model, self.config.cheapest_crash);
        }

        heading.extend((0..self.matrix.nr_columns())
            .filter(|&j| model.status(j).is_basic())
            .filter(|&j| self.sets.set_of(j).is_none_or(|set| !self.keys.is_key(set, j))));
    }

    /// Give every structural key a basic status in the driver.
    pub fn make_keys_basic<M: Model>(&self, model: &mut M) {
        for set in 0..self.sets.len() {
            if let Some(key) = self.keys.key_column(set) {
                model.set_status(key, VariableStatus::Basic);
            }
        }
    }

    /// Room the driver needs to reserve.
    ///
    /// # Return value
    ///
    /// The maximum number of extra rows, and the maximum number of basic variables.
    #[must_use]
    pub fn extra_rows_needed(&self) -> (usize, usize) {
        (self.matrix.nr_rows() + 1, self.matrix.nr_rows() + self.sets.len())
    }

    /// How to replace a column in the factorization, asked before the replacement.
    ///
    /// # Arguments
    ///
    /// * `extended`: Whether the updated column of this pivot had extra rows.
    ///
    /// # Return value
    ///
    /// `None` for a bound flip, which replaces nothing.
    #[must_use]
    pub fn before_replace_column<M: Model>(&self, model: &M, extended: bool) -> Option<PivotAction> {
        if model.sequence_in() == model.sequence_out() {
            return None;
        }

        let action = if extended {
            match (self.possible_pivot_key, self.pivot_set) {
                (Some(_), _) => PivotAction::SwapKey,
                (None, Some(set)) if self.entering_set(model) == Some(set) => self.key_flip_kind(model, set),
                _ => PivotAction::Replace,
            }
        } else if model.layout().classify(model.sequence_in()) == Sequence::EnteringSetSlack {
            PivotAction::SlackBecomesKey
        } else {
            PivotAction::Replace
        };

        Some(action)
    }

    /// Whether more work is needed after the column was replaced in the factorization.
    ///
    /// # Return value
    ///
    /// `None` for a bound flip.
    #[must_use]
    pub fn after_replace_column<M: Model>(&self, model: &M) -> Option<PivotAction> {
        if model.sequence_in() == model.sequence_out() {
            return None;
        }

        let action = if self.possible_pivot_key.is_some() {
            PivotAction::SwapKey
        } else if let Some(set) = self.pivot_set.filter(|&set| self.entering_set(model) == Some(set)) {
            self.key_flip_kind(model, set)
        } else if model.layout().classify(model.sequence_in()) == Sequence::EnteringSetSlack {
            PivotAction::SlackBecomesKey
        } else {
            PivotAction::Replace
        };

        Some(action)
    }

    /// Write the bound at which the slack sits into the value of each structural key, such that
    /// computing the basic values includes the right-hand side of the sets.
    pub fn slot_set_bounds_into_keys<M: Model>(&self, model: &mut M) {
        for set in 0..self.sets.len() {
            if let Some(key) = self.keys.key_column(set) {
                model.solution_mut()[key] = self.states[set].nonbasic_value(self.sets.get(set));
            }
        }
    }

    /// Compute the values of the structural keys from the other members, and the feasibility of
    /// sets with a slack key.
    ///
    /// The primal infeasibilities of slack keys are collected, to be reported with
    /// `report_primal_infeasibilities`.
    pub fn compute_key_values<M: Model>(&mut self, model: &mut M) {
        let tolerance = model.primal_tolerance();
        let relaxed_tolerance = RELAXATION_LIMIT.min(model.largest_primal_error());
        self.primal_infeasibilities = InfeasibilitySummary::default();

        for set in 0..self.sets.len() {
            let gub_set = self.sets.get(set);
            let key = self.keys.key(set);
            let others = if self.no_column_bounds {
                self.keys.members(set).others().iter().map(|&j| model.solution()[j]).sum::<f64>()
            } else {
                gub_set.columns()
                    .filter(|&j| Member::Column(j) != key)
                    .map(|j| model.solution()[j])
                    .sum::<f64>()
            };

            match key {
                Member::Column(key) => {
                    let value = self.states[set].nonbasic_value(gub_set) - others;
                    trace!("key {key} of set {set} has value {value}");
                    model.solution_mut()[key] = value;
                },
                Member::Slack => {
                    debug_assert_eq!(self.states[set].status, SetStatus::Basic);
                    let feasibility = Feasibility::of(others, gub_set, tolerance);
                    let infeasibility = match feasibility {
                        Feasibility::Above => others - gub_set.upper() - tolerance,
                        Feasibility::Below => gub_set.lower() - others - tolerance,
                        Feasibility::Feasible => 0_f64,
                    };
                    trace!("slack key of set {set} has value {others}");
                    self.states[set].feasibility = feasibility;
                    self.primal_infeasibilities.register(infeasibility, 0_f64, relaxed_tolerance);
                },
            }
        }
    }

    /// Add the infeasibilities found by `compute_key_values` to the driver's totals.
    pub fn report_primal_infeasibilities<M: Model>(&self, model: &mut M) {
        model.add_primal_infeasibilities(&self.primal_infeasibilities);
    }

    /// Subtract the cost of the key from the cost of each heading row holding a member of a set,
    /// before the driver solves for the duals.
    ///
    /// # Arguments
    ///
    /// * `model`: Driver state.
    /// * `array`: Costs indexed by heading row.
    pub fn modify_costs_before_duals<M: Model>(&mut self, model: &M, array: &mut IndexedVector) {
        self.recently_extended.clear();

        let nr_columns = self.matrix.nr_columns();
        let infeasibility_cost = model.infeasibility_cost();
        for (row, &variable) in model.pivot_variables()[..self.matrix.nr_rows()].iter().enumerate() {
            if variable >= nr_columns {
                continue;
            }
            if let Some(set) = self.sets.set_of(variable) {
                let cost = match self.keys.key(set) {
                    Member::Column(key) => model.cost()[key],
                    Member::Slack => self.states[set].weight() * infeasibility_cost,
                };
                array.add(row, -cost);
            }
        }
    }

    /// Make the reduced cost of each key zero by shifting the reduced costs of the other basic
    /// members of its set.
    pub fn compute_key_duals<M: Model>(&self, model: &mut M) {
        let infeasibility_cost = model.infeasibility_cost();

        for set in 0..self.sets.len() {
            let members = self.keys.members(set);
            let value = match members.key() {
                Member::Column(key) => {
                    let value = model.reduced_costs()[key];
                    model.reduced_costs_mut()[key] = 0_f64;
                    value
                },
                Member::Slack => -self.states[set].weight() * infeasibility_cost,
            };

            if value != 0_f64 {
                for &j in members.others() {
                    model.reduced_costs_mut()[j] -= value;
                }
            }
        }
    }

    /// Shift the reduced costs of all members by the key part of their set, and collect the dual
    /// infeasibilities of nonbasic set slacks.
    ///
    /// The infeasibilities are reported with `report_dual_infeasibilities`.
    pub fn compute_reduced_costs<M: Model>(&mut self, model: &mut M) {
        let tolerance = model.dual_tolerance();
        let relaxed_tolerance = RELAXATION_LIMIT.min(model.largest_dual_error());
        let infeasibility_cost = model.infeasibility_cost();
        self.dual_infeasibilities = InfeasibilitySummary::default();

        for set in 0..self.sets.len() {
            let state = self.states[set];
            let value = match self.keys.key(set) {
                Member::Column(key) => {
                    let value = model.cost()[key] - self.matrix.inner_product(key, model.duals());
                    let infeasibility = match state.status {
                        SetStatus::AtLowerBound if value < -tolerance => -value - tolerance,
                        SetStatus::AtUpperBound if value > tolerance => value - tolerance,
                        _ => 0_f64,
                    };
                    self.dual_infeasibilities.register(infeasibility, 0_f64, relaxed_tolerance);
                    value
                },
                Member::Slack => -state.weight() * infeasibility_cost,
            };

            if value != 0_f64 {
                for j in self.sets.get(set).columns() {
                    model.reduced_costs_mut()[j] -= value;
                }
            }
        }
    }

    /// Add the infeasibilities found by `compute_reduced_costs` to the driver's totals.
    pub fn report_dual_infeasibilities<M: Model>(&self, model: &mut M) {
        model.add_dual_infeasibilities(&self.dual_infeasibilities);
    }
}
