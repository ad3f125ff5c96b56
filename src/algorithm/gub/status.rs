//! # State of a set
//!
//! The slack of a set is a simplex variable of its own: it is basic (and then the key of the set)
//! or sits at one of the bounds of the set. When the slack is the key, the sum of the members may
//! violate the bounds; the direction of that violation is kept as the feasibility of the set.
use crate::algorithm::gub::set::GubSet;
use crate::data::linear_program::elements::{BoundDirection, VariableStatus};

/// Simplex status of the slack of a set.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SetStatus {
    Basic,
    AtLowerBound,
    AtUpperBound,
    Fixed,
}

impl SetStatus {
    /// Bound at which a nonbasic slack sits, `None` when the slack is basic.
    #[must_use]
    pub fn bound_direction(self) -> Option<BoundDirection> {
        match self {
            Self::Basic => None,
            Self::AtLowerBound | Self::Fixed => Some(BoundDirection::Lower),
            Self::AtUpperBound => Some(BoundDirection::Upper),
        }
    }

    /// Status of a slack that is nonbasic at a bound of a set.
    #[must_use]
    pub fn at(direction: BoundDirection, set: &GubSet) -> Self {
        if set.is_fixed() {
            Self::Fixed
        } else {
            match direction {
                BoundDirection::Lower => Self::AtLowerBound,
                BoundDirection::Upper => Self::AtUpperBound,
            }
        }
    }
}

impl From<SetStatus> for VariableStatus {
    fn from(status: SetStatus) -> Self {
        match status {
            SetStatus::Basic => Self::Basic,
            SetStatus::AtLowerBound => Self::AtLowerBound,
            SetStatus::AtUpperBound => Self::AtUpperBound,
            SetStatus::Fixed => Self::Fixed,
        }
    }
}

/// Position of the member sum relative to the bounds of a set.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Feasibility {
    Below,
    Feasible,
    Above,
}

impl Feasibility {
    /// Classify a member sum.
    #[must_use]
    pub fn of(sum: f64, set: &GubSet, tolerance: f64) -> Self {
        if sum > set.upper() + tolerance {
            Self::Above
        } else if sum < set.lower() - tolerance {
            Self::Below
        } else {
            Self::Feasible
        }
    }

    /// Sign of the infeasibility: `-1` below, `0` feasible, `+1` above.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Self::Below => -1_f64,
            Self::Feasible => 0_f64,
            Self::Above => 1_f64,
        }
    }

    /// Bounds of the slack variable as seen by the driver when the slack is basic.
    ///
    /// An infeasible slack is allowed to move further away from the violated bound only.
    #[must_use]
    pub fn slack_bounds(self, set: &GubSet) -> (f64, f64) {
        match self {
            Self::Below => (f64::NEG_INFINITY, set.lower()),
            Self::Feasible => (set.lower(), set.upper()),
            Self::Above => (set.upper(), f64::INFINITY),
        }
    }
}

/// Complete state of a set.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SetState {
    /// Status of the slack.
    pub status: SetStatus,
    /// Position of the member sum, only meaningful when the slack is the key.
    pub feasibility: Feasibility,
    /// Excluded from entering, to avoid cycling.
    pub flagged: bool,
}

impl SetState {
    /// State with the slack at a given status.
    #[must_use]
    pub fn new(status: SetStatus) -> Self {
        Self {
            status,
            feasibility: Feasibility::Feasible,
            flagged: false,
        }
    }

    /// See `Feasibility::weight`.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.feasibility.weight()
    }

    /// Value of the slack of a set when it is nonbasic.
    ///
    /// # Panics
    ///
    /// When the slack is basic, it has no fixed value.
    #[must_use]
    pub fn nonbasic_value(&self, set: &GubSet) -> f64 {
        match self.status.bound_direction() {
            Some(direction) => set.bound(direction),
            None => panic!("basic set slack has no bound value"),
        }
    }
}

impl Default for SetState {
    fn default() -> Self {
        Self::new(SetStatus::Basic)
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::gub::set::GubSet;
    use crate::algorithm::gub::status::{Feasibility, SetState, SetStatus};
    use crate::data::linear_program::elements::BoundDirection;

    #[test]
    fn feasibility() {
        let set = GubSet::new(0..3, 2_f64, 5_f64);
        assert_eq!(Feasibility::of(1_f64, &set, 1e-7), Feasibility::Below);
        assert_eq!(Feasibility::of(2_f64 - 1e-9, &set, 1e-7), Feasibility::Feasible);
        assert_eq!(Feasibility::of(6_f64, &set, 1e-7), Feasibility::Above);
        assert_eq!(Feasibility::Below.weight(), -1_f64);
        assert_eq!(Feasibility::Above.weight(), 1_f64);
        assert_eq!(Feasibility::Above.slack_bounds(&set), (5_f64, f64::INFINITY));
    }

    #[test]
    fn nonbasic_value() {
        let set = GubSet::new(0..3, 2_f64, 5_f64);
        assert_eq!(SetState::new(SetStatus::AtUpperBound).nonbasic_value(&set), 5_f64);
        assert_eq!(SetState::new(SetStatus::at(BoundDirection::Lower, &set)).nonbasic_value(&set), 2_f64);

        let fixed = GubSet::new(0..3, 1_f64, 1_f64);
        assert_eq!(SetStatus::at(BoundDirection::Upper, &fixed), SetStatus::Fixed);
    }

    #[test]
    #[should_panic]
    fn basic_has_no_value() {
        let set = GubSet::new(0..1, 0_f64, 1_f64);
        let _ = SetState::default().nonbasic_value(&set);
    }
}
