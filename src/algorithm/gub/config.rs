//! # Settings
use crate::algorithm::matrix::PricingBias;

/// Differences between the cached and the recomputed effective right-hand side beyond this are
/// reported.
pub const CHECK_TOLERANCE: f64 = 1e-3;

/// Settings of a `GubMatrix`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GubConfig {
    /// Recompute the effective right-hand side from scratch every this many iterations. Zero
    /// disables the periodic recomputation.
    pub refresh_frequency: usize,
    /// Weighing of free and superbasic variables while pricing, shared with the plain columns.
    pub pricing: PricingBias,
    /// Let the crash always solve the small problem of each set for the cheapest key, rather than
    /// keeping the slack as key when the member sum is feasible.
    pub cheapest_crash: bool,
    /// See `CHECK_TOLERANCE`.
    pub check_tolerance: f64,
}

impl GubConfig {
    /// Change the refresh frequency.
    #[must_use]
    pub fn with_refresh_frequency(mut self, refresh_frequency: usize) -> Self {
        self.refresh_frequency = refresh_frequency;
        self
    }

    /// Change the pricing bias.
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingBias) -> Self {
        self.pricing = pricing;
        self
    }

    /// Change the crash mode.
    #[must_use]
    pub fn with_cheapest_crash(mut self, cheapest_crash: bool) -> Self {
        self.cheapest_crash = cheapest_crash;
        self
    }
}

impl Default for GubConfig {
    fn default() -> Self {
        Self {
            refresh_frequency: 0,
            pricing: PricingBias::default(),
            cheapest_crash: false,
            check_tolerance: CHECK_TOLERANCE,
        }
    }
}
