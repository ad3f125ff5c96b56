//! # Crash
//!
//! Assigns the first keys. For every set, the members and the slack are moved such that the set is
//! feasible, and one basic variable is designated as key. A set that can't be fixed by moving its
//! single basic member to a bound solves a small problem: the cheapest feasible combination of its
//! members, subject to their bounds and the bounds of the set.
use log::debug;

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::gub::key::Member;
use crate::algorithm::gub::set::GubSet;
use crate::algorithm::gub::status::{Feasibility, SetStatus};
use crate::algorithm::model::Model;
use crate::data::linear_program::elements::{BoundDirection, VariableStatus};

/// Bounds at or beyond this magnitude are treated as infinite.
const INFINITE_BOUND: f64 = 1e20;

impl GubMatrix {
    /// Assign keys, make every set feasible where possible and compute the effective right-hand
    /// side.
    ///
    /// # Arguments
    ///
    /// * `model`: Driver state; statuses and values of set members may change.
    /// * `cheapest`: Always look for the cheapest key, rather than keeping the slack as key when
    /// the member sum is within the bounds of the set.
    ///
    /// # Panics
    ///
    /// When the members of a set can't reach a feasible sum, or the small problem of a set is
    /// unbounded.
    pub fn use_effective_rhs<M: Model>(&mut self, model: &mut M, cheapest: bool) {
        let tolerance = model.primal_tolerance();
        self.no_column_bounds = self.detect_no_column_bounds(model);
        debug!("members without bounds of their own: {}", self.no_column_bounds);

        for set in 0..self.sets.len() {
            self.crash_set(model, set, cheapest, tolerance);
        }
        for set in 0..self.sets.len() {
            self.assign_key(model, set, tolerance);
        }

        self.crashed = true;
        self.refresh_effective_rhs(model);
    }

    /// Whether every member has only zero or infinite bounds, such that nonbasic members don't
    /// contribute to the sum of a set.
    fn detect_no_column_bounds<M: Model>(&self, model: &M) -> bool {
        let is_plain = |bound: f64| bound == 0_f64 || bound.abs() >= INFINITE_BOUND;

        self.sets.iter()
            .flat_map(GubSet::columns)
            .all(|j| is_plain(model.lower()[j]) && is_plain(model.upper()[j]))
    }

    fn crash_set<M: Model>(&mut self, model: &mut M, set: usize, cheapest: bool, tolerance: f64) {
        let gub_set = self.sets.get(set).clone();

        let mut nr_basic = 0;
        let mut shortest: Option<usize> = None;
        for j in gub_set.columns() {
            if model.status(j).is_basic() {
                nr_basic += 1;
                if shortest.is_none_or(|s| self.matrix.column_length(j) < self.matrix.column_length(s)) {
                    shortest = Some(j);
                }
            }
        }
        let sum = self.member_sum(model, set);
        let slack_basic = self.states[set].status == SetStatus::Basic;

        if nr_basic > 1 || (nr_basic == 1 && slack_basic) {
            debug!("set {set} has {nr_basic} basic members, key chosen later");
            return;
        }

        if let (1, Some(basic)) = (nr_basic, shortest) {
            if self.move_single_basic(model, set, &gub_set, basic, tolerance) {
                return;
            }
        }

        if !cheapest && gub_set.lower() - tolerance <= sum && sum <= gub_set.upper() + tolerance {
            debug!("set {set} is feasible with sum {sum}, slack becomes key");
            self.states[set].status = SetStatus::Basic;
            return;
        }

        if let Some(basic) = shortest {
            model.set_status(basic, VariableStatus::AtLowerBound);
        }
        self.solve_set_problem(model, set, &gub_set, sum, tolerance);
    }

    /// Try to make a set feasible by moving its only basic member, with the slack at a bound.
    ///
    /// # Return value
    ///
    /// Whether a bound of the set could be reached within the bounds of the member.
    fn move_single_basic<M: Model>(
        &mut self,
        model: &mut M,
        set: usize,
        gub_set: &GubSet,
        basic: usize,
        tolerance: f64,
    ) -> bool {
        let (lower, upper) = (model.lower()[basic], model.upper()[basic]);
        let value = model.solution()[basic].clamp(lower, upper);
        model.solution_mut()[basic] = value;
        let sum = self.member_sum(model, set);
        let cost = model.cost()[basic];

        let mut best: Option<(BoundDirection, f64, f64)> = None;
        for direction in [BoundDirection::Upper, BoundDirection::Lower] {
            let bound = gub_set.bound(direction);
            if !bound.is_finite() {
                continue;
            }

            let new_value = value + bound - sum;
            if new_value >= lower - tolerance && new_value <= upper + tolerance {
                let key_cost = if (sum - bound).abs() < tolerance { f64::NEG_INFINITY } else { new_value * cost };
                if best.is_none_or(|(_, _, best_cost)| key_cost < best_cost) {
                    best = Some((direction, new_value, key_cost));
                }
            }
        }

        match best {
            Some((direction, new_value, _)) => {
                debug!("set {set}: basic member {basic} moves to {new_value}, slack at {direction:?} bound");
                model.solution_mut()[basic] = new_value;
                self.states[set].status = SetStatus::at(direction, gub_set);
                true
            },
            None => false,
        }
    }

    /// Solve the problem of a single set: minimize the cost of the members subject to their bounds
    /// and the bounds on their sum.
    ///
    /// The row is `sum_j x_j + s = 0` with `s` the negated sum, bounded by `[-upper, -lower]`. A
    /// first phase minimizes the infeasibility of `s`, a second phase the costs of the members. The
    /// variable that is basic at the end becomes the key.
    fn solve_set_problem<M: Model>(&mut self, model: &mut M, set: usize, gub_set: &GubSet, sum: f64, tolerance: f64) {
        let members = gub_set.columns().collect::<Vec<_>>();
        let slack = members.len();

        let mut problem = SetProblem {
            lower: members.iter().map(|&j| model.lower()[j]).chain([-gub_set.upper()]).collect(),
            upper: members.iter().map(|&j| model.upper()[j]).chain([-gub_set.lower()]).collect(),
            solution: members.iter().map(|&j| model.solution()[j]).chain([-sum]).collect(),
            basic: slack,
            tolerance,
            dual_tolerance: model.dual_tolerance(),
        };

        if !problem.is_feasible(slack) {
            let mut cost = vec![0_f64; slack + 1];
            cost[slack] = if sum < gub_set.lower() { 1_f64 } else { -1_f64 };
            problem.optimize(&cost, true);
            assert!(problem.is_feasible(slack), "members of set {set} can't reach a feasible sum");
        }
        let objective = members.iter().map(|&j| model.cost()[j]).chain([0_f64]).collect::<Vec<_>>();
        problem.optimize(&objective, false);

        for (i, &j) in members.iter().enumerate() {
            let value = problem.solution[i];
            model.solution_mut()[j] = value;
            let status = if i == problem.basic {
                VariableStatus::Basic
            } else if problem.lower[i] == problem.upper[i] {
                VariableStatus::Fixed
            } else if value == problem.upper[i] {
                VariableStatus::AtUpperBound
            } else if value == problem.lower[i] {
                VariableStatus::AtLowerBound
            } else {
                VariableStatus::SuperBasic
            };
            model.set_status(j, status);
        }

        self.states[set].status = if problem.basic == slack {
            SetStatus::Basic
        } else {
            // The slack is the negated sum: its upper bound is the lower bound of the set.
            let s = problem.solution[slack];
            let direction = if (s - problem.upper[slack]).abs() <= (s - problem.lower[slack]).abs() {
                BoundDirection::Lower
            } else {
                BoundDirection::Upper
            };
            SetStatus::at(direction, gub_set)
        };
        debug!(
            "set {set} solved, basic {:?}, slack {:?}",
            members.get(problem.basic), self.states[set].status,
        );
    }

    /// Choose the key of a set from the statuses in the model and rebuild its list.
    fn assign_key<M: Model>(&mut self, model: &M, set: usize, tolerance: f64) {
        let gub_set = self.sets.get(set);

        if self.states[set].status != SetStatus::Basic {
            if gub_set.is_fixed() {
                self.states[set].status = SetStatus::Fixed;
            }

            let mut shortest: Option<usize> = None;
            for j in self.basic_columns(model, set) {
                if shortest.is_none_or(|s| self.matrix.column_length(j) < self.matrix.column_length(s)) {
                    shortest = Some(j);
                }
            }
            match shortest {
                Some(key) => {
                    self.relink(model, set, Member::Column(key));
                    return;
                },
                None => {
                    debug!("set {set} has no basic member, slack becomes key");
                    self.states[set].status = SetStatus::Basic;
                },
            }
        }

        let sum = self.member_sum(model, set);
        self.states[set].feasibility = Feasibility::of(sum, self.sets.get(set), tolerance);
        self.relink(model, set, Member::Slack);
    }
}

/// Bounded problem with a single row with all coefficients equal to one.
struct SetProblem {
    lower: Vec<f64>,
    upper: Vec<f64>,
    solution: Vec<f64>,
    basic: usize,
    tolerance: f64,
    dual_tolerance: f64,
}

impl SetProblem {
    fn is_feasible(&self, i: usize) -> bool {
        self.solution[i] >= self.lower[i] - self.tolerance && self.solution[i] <= self.upper[i] + self.tolerance
    }

    /// Distance a basic variable can move before it hits a bound, and that bound.
    ///
    /// An infeasible variable stops at the bound it violates.
    fn basic_limit(&self, increasing: bool) -> (f64, f64) {
        let (value, lower, upper) = (self.solution[self.basic], self.lower[self.basic], self.upper[self.basic]);
        if increasing {
            let target = if value < lower { lower } else { upper };
            (target - value, target)
        } else {
            let target = if value > upper { upper } else { lower };
            (value - target, target)
        }
    }

    /// Primal simplex with bound flips on the single row.
    ///
    /// # Arguments
    ///
    /// * `cost`: Costs of all variables, including the slack.
    /// * `until_feasible`: Stop as soon as the slack is within its bounds.
    fn optimize(&mut self, cost: &[f64], until_feasible: bool) {
        let slack = self.solution.len() - 1;
        let max_iterations = 100 * self.solution.len();

        for _ in 0..max_iterations {
            if until_feasible && self.is_feasible(slack) {
                return;
            }

            // All coefficients are one, so the dual is the cost of the basic variable.
            let dual = cost[self.basic];
            let mut best = 0_f64;
            let mut chosen = None;
            for i in 0..self.solution.len() {
                if i == self.basic {
                    continue;
                }

                let dj = cost[i] - dual;
                let improvement = if dj > self.dual_tolerance && self.solution[i] > self.lower[i] {
                    dj * (self.solution[i] - self.lower[i])
                } else if dj < -self.dual_tolerance && self.solution[i] < self.upper[i] {
                    dj * (self.solution[i] - self.upper[i])
                } else {
                    continue
                };
                if improvement > best {
                    best = improvement;
                    chosen = Some((i, if dj > 0_f64 { -1_f64 } else { 1_f64 }));
                }
            }

            let Some((chosen, way)) = chosen else {
                return;
            };
            let chosen_distance = if way > 0_f64 {
                self.upper[chosen] - self.solution[chosen]
            } else {
                self.solution[chosen] - self.lower[chosen]
            };
            let (basic_distance, target) = self.basic_limit(way < 0_f64);
            assert!(
                chosen_distance.min(basic_distance) < f64::INFINITY,
                "problem of a single set is unbounded",
            );

            if chosen_distance > basic_distance {
                self.solution[chosen] += way * basic_distance;
                self.solution[self.basic] = target;
                self.basic = chosen;
            } else {
                self.solution[chosen] = if way > 0_f64 { self.upper[chosen] } else { self.lower[chosen] };
                self.solution[self.basic] -= way * chosen_distance;
            }
        }

        panic!("problem of a single set did not terminate");
    }
}
