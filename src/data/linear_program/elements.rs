//! # Building blocks to describe linear programs.
use enum_map::Enum;

/// Direction of a bound.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Enum)]
pub enum BoundDirection {
    /// In the case of a variable, x >= b.
    Lower,
    /// In the case of a variable, x <= b.
    Upper,
}

/// State of a variable in a simplex basis.
///
/// Nonbasic variables usually sit at one of their bounds. Free variables sit at zero, and a
/// superbasic variable is nonbasic but strictly between its bounds.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VariableStatus {
    Basic,
    AtLowerBound,
    AtUpperBound,
    Fixed,
    Free,
    SuperBasic,
}

impl VariableStatus {
    /// Whether the variable is in the basis.
    #[must_use]
    pub fn is_basic(self) -> bool {
        self == Self::Basic
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_program::elements::VariableStatus;

    #[test]
    fn basic() {
        assert!(VariableStatus::Basic.is_basic());
        assert!(!VariableStatus::SuperBasic.is_basic());
    }
}
