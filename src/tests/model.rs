//! A driver state that is nothing more than its arrays.
use crate::algorithm::model::{InfeasibilitySummary, Layout, Model};
use crate::data::linear_program::elements::VariableStatus;

/// Plain implementation of `Model` for tests.
#[derive(Clone, Debug)]
pub struct TestModel {
    pub nr_rows: usize,
    pub nr_columns: usize,
    pub status: Vec<VariableStatus>,
    pub flagged: Vec<bool>,
    pub solution: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub cost: Vec<f64>,
    pub reduced_costs: Vec<f64>,
    pub duals: Vec<f64>,
    pub pivot_variables: Vec<usize>,
    pub sequence_in: usize,
    pub sequence_out: usize,
    pub pivot_row: Option<usize>,
    pub theta: f64,
    pub value_out: f64,
    pub primal_tolerance: f64,
    pub dual_tolerance: f64,
    pub largest_primal_error: f64,
    pub largest_dual_error: f64,
    pub infeasibility_cost: f64,
    pub nr_iterations: usize,
    pub primal: bool,
    pub primal_infeasibilities: InfeasibilitySummary,
    pub dual_infeasibilities: InfeasibilitySummary,
}

impl TestModel {
    /// All columns nonbasic at zero with bounds `[0, inf)` and zero cost, all row logicals basic
    /// and free.
    pub fn new(nr_rows: usize, nr_columns: usize) -> Self {
        let layout = Layout::new(nr_columns, nr_rows);
        let len = layout.len();

        let mut status = vec![VariableStatus::AtLowerBound; len];
        let mut lower = vec![0_f64; len];
        let mut upper = vec![f64::INFINITY; len];
        for row in 0..nr_rows {
            let logical = layout.row_logical(row);
            status[logical] = VariableStatus::Basic;
            lower[logical] = f64::NEG_INFINITY;
        }
        let mut pivot_variables = vec![0; layout.heading_len()];
        for (row, variable) in pivot_variables.iter_mut().take(nr_rows).enumerate() {
            *variable = layout.row_logical(row);
        }

        Self {
            nr_rows,
            nr_columns,
            status,
            flagged: vec![false; len],
            solution: vec![0_f64; len],
            lower,
            upper,
            cost: vec![0_f64; len],
            reduced_costs: vec![0_f64; len],
            duals: vec![0_f64; nr_rows],
            pivot_variables,
            sequence_in: 0,
            sequence_out: 0,
            pivot_row: None,
            theta: 0_f64,
            value_out: 0_f64,
            primal_tolerance: 1e-7,
            dual_tolerance: 1e-7,
            largest_primal_error: 0_f64,
            largest_dual_error: 0_f64,
            infeasibility_cost: 1e3,
            nr_iterations: 0,
            primal: true,
            primal_infeasibilities: InfeasibilitySummary::default(),
            dual_infeasibilities: InfeasibilitySummary::default(),
        }
    }

    /// Overwrite the data of a single variable.
    pub fn set_column(&mut self, j: usize, lower: f64, upper: f64, cost: f64, value: f64, status: VariableStatus) {
        self.lower[j] = lower;
        self.upper[j] = upper;
        self.cost[j] = cost;
        self.solution[j] = value;
        self.status[j] = status;
    }
}

impl Model for TestModel {
    fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    fn nr_columns(&self) -> usize {
        self.nr_columns
    }

    fn status(&self, sequence: usize) -> VariableStatus {
        self.status[sequence]
    }

    fn set_status(&mut self, sequence: usize, status: VariableStatus) {
        self.status[sequence] = status;
    }

    fn is_flagged(&self, sequence: usize) -> bool {
        self.flagged[sequence]
    }

    fn solution(&self) -> &[f64] {
        &self.solution
    }

    fn solution_mut(&mut self) -> &mut [f64] {
        &mut self.solution
    }

    fn lower(&self) -> &[f64] {
        &self.lower
    }

    fn lower_mut(&mut self) -> &mut [f64] {
        &mut self.lower
    }

    fn upper(&self) -> &[f64] {
        &self.upper
    }

    fn upper_mut(&mut self) -> &mut [f64] {
        &mut self.upper
    }

    fn cost(&self) -> &[f64] {
        &self.cost
    }

    fn cost_mut(&mut self) -> &mut [f64] {
        &mut self.cost
    }

    fn reduced_costs(&self) -> &[f64] {
        &self.reduced_costs
    }

    fn reduced_costs_mut(&mut self) -> &mut [f64] {
        &mut self.reduced_costs
    }

    fn duals(&self) -> &[f64] {
        &self.duals
    }

    fn pivot_variables(&self) -> &[usize] {
        &self.pivot_variables
    }

    fn pivot_variables_mut(&mut self) -> &mut [usize] {
        &mut self.pivot_variables
    }

    fn sequence_in(&self) -> usize {
        self.sequence_in
    }

    fn sequence_out(&self) -> usize {
        self.sequence_out
    }

    fn pivot_row(&self) -> Option<usize> {
        self.pivot_row
    }

    fn theta(&self) -> f64 {
        self.theta
    }

    fn value_out(&self) -> f64 {
        self.value_out
    }

    fn primal_tolerance(&self) -> f64 {
        self.primal_tolerance
    }

    fn dual_tolerance(&self) -> f64 {
        self.dual_tolerance
    }

    fn largest_primal_error(&self) -> f64 {
        self.largest_primal_error
    }

    fn largest_dual_error(&self) -> f64 {
        self.largest_dual_error
    }

    fn infeasibility_cost(&self) -> f64 {
        self.infeasibility_cost
    }

    fn nr_iterations(&self) -> usize {
        self.nr_iterations
    }

    fn is_primal(&self) -> bool {
        self.primal
    }

    fn set_one(&mut self, sequence: usize, value: f64) {
        self.solution[sequence] = value;
    }

    fn set_one_with_bounds(&mut self, sequence: usize, value: f64, lower: f64, upper: f64) {
        self.solution[sequence] = value;
        self.lower[sequence] = lower;
        self.upper[sequence] = upper;
    }

    fn add_primal_infeasibilities(&mut self, summary: &InfeasibilitySummary) {
        self.primal_infeasibilities.sum += summary.sum;
        self.primal_infeasibilities.number += summary.number;
        self.primal_infeasibilities.relaxed_sum += summary.relaxed_sum;
    }

    fn add_dual_infeasibilities(&mut self, summary: &InfeasibilitySummary) {
        self.dual_infeasibilities.sum += summary.sum;
        self.dual_infeasibilities.number += summary.number;
        self.dual_infeasibilities.relaxed_sum += summary.relaxed_sum;
    }
}
