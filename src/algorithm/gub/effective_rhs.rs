//! # Effective right-hand side
//!
//! The right-hand side of the basic variables other than the keys, after substituting every
//! structural key by the bound of its set minus the other members:
//!
//! `rhs = s_N - A_N x_N - sum_{S with structural key k} a_k b_S`,
//! `b_S = bound(S) - sum_{j in S nonbasic} x_j`,
//!
//! where `s_N` are the values of the nonbasic row logicals. It is cached, patched after every
//! pivot, and recomputed from scratch on demand or periodically.
use log::warn;

use crate::algorithm::gub::GubMatrix;
use crate::algorithm::model::Model;

/// Cached effective right-hand side.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveRhs {
    pub(crate) values: Vec<f64>,
    last_refresh: usize,
}

/// A row where the cached value differs from a recomputation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RhsDivergence {
    /// Row index.
    pub row: usize,
    /// Value in the cache.
    pub cached: f64,
    /// Value recomputed from scratch.
    pub computed: f64,
}

/// Which statuses and values to use when computing the contribution of a key.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum View {
    /// As currently recorded in the model.
    Current,
    /// As before the pivot the model just committed.
    BeforePivot {
        sequence_in: usize,
        old_in_value: f64,
        sequence_out: usize,
    },
}

impl GubMatrix {
    /// Value the key of a set takes when all other basic members are zero, together with the
    /// column of the key. `None` when the slack is the key.
    pub(crate) fn key_contribution<M: Model>(&self, model: &M, set: usize, view: View) -> Option<(usize, f64)> {
        let key = self.keys.key_column(set)?;
        let gub_set = self.sets.get(set);
        let bound = self.states[set].nonbasic_value(gub_set);

        let nonbasic_sum = gub_set.columns()
            .filter(|&j| j != key)
            .filter_map(|j| match view {
                View::Current => (!model.status(j).is_basic()).then(|| model.solution()[j]),
                View::BeforePivot { sequence_in, old_in_value, sequence_out } => {
                    if j == sequence_in {
                        Some(old_in_value)
                    } else if j != sequence_out && !model.status(j).is_basic() {
                        Some(model.solution()[j])
                    } else {
                        None
                    }
                },
            })
            .sum::<f64>();

        Some((key, bound - nonbasic_sum))
    }

    /// Compute the effective right-hand side from scratch.
    #[must_use]
    pub fn compute_effective_rhs<M: Model>(&self, model: &M) -> Vec<f64> {
        let layout = model.layout();
        let nr_rows = self.matrix.nr_rows();
        let nr_columns = self.matrix.nr_columns();

        let mut rhs = (0..nr_rows)
            .map(|i| {
                let logical = layout.row_logical(i);
                if model.status(logical).is_basic() { 0_f64 } else { model.solution()[logical] }
            })
            .collect::<Vec<_>>();

        let nonbasic = (0..nr_columns)
            .map(|j| if model.status(j).is_basic() { 0_f64 } else { model.solution()[j] })
            .collect::<Vec<_>>();
        self.matrix.times(-1_f64, &nonbasic, &mut rhs);

        for set in 0..self.sets.len() {
            if let Some((key, b)) = self.key_contribution(model, set, View::Current) {
                self.matrix.add_dense(&mut rhs, key, -b);
            }
        }

        rhs
    }

    /// Allocate the cache and fill it.
    pub(crate) fn refresh_effective_rhs<M: Model>(&mut self, model: &M) {
        let values = self.compute_effective_rhs(model);
        self.effective_rhs = Some(EffectiveRhs { values, last_refresh: model.nr_iterations() });
    }

    /// Compare the cache with a recomputation.
    ///
    /// # Return value
    ///
    /// Rows where the two differ by more than the configured check tolerance. Empty when there is
    /// no cache.
    #[must_use]
    pub fn check_effective_rhs<M: Model>(&self, model: &M) -> Vec<RhsDivergence> {
        let Some(cache) = &self.effective_rhs else {
            return Vec::new();
        };

        self.compute_effective_rhs(model).into_iter()
            .zip(&cache.values)
            .enumerate()
            .filter(|&(_, (computed, &cached))| (computed - cached).abs() > self.config.check_tolerance)
            .map(|(row, (computed, &cached))| RhsDivergence { row, cached, computed })
            .collect()
    }

    /// The cached effective right-hand side, refreshed when forced or when due.
    ///
    /// # Arguments
    ///
    /// * `model`: Current state of the driver.
    /// * `force_refresh`: Recompute from scratch regardless of the refresh frequency.
    /// * `check`: In debug builds, log rows where the cache differs from a recomputation.
    ///
    /// # Return value
    ///
    /// `None` before the crash allocated the cache.
    pub fn effective_rhs_values<M: Model>(&mut self, model: &M, force_refresh: bool, check: bool) -> Option<&[f64]> {
        let frequency = self.config.refresh_frequency;
        let due = match &self.effective_rhs {
            None => return None,
            Some(cache) => {
                force_refresh
                    || (frequency > 0 && model.nr_iterations() >= cache.last_refresh + frequency)
            },
        };

        if check && cfg!(debug_assertions) {
            for RhsDivergence { row, cached, computed } in self.check_effective_rhs(model) {
                warn!("effective rhs of row {row} is {cached}, recomputed {computed}");
            }
        }
        if due {
            self.refresh_effective_rhs(model);
        }

        self.effective_rhs.as_ref().map(|cache| cache.values.as_slice())
    }
}
