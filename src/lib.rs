//! # Generalized upper bounds for a simplex method
//!
//! A sparse constraint matrix extended with sets of columns whose sums are bounded, `lower <=
//! sum_{j in S} x_j <= upper`. The sets are handled implicitly through key variables, such that a
//! simplex driver works with a basis of the size of the number of constraint rows.
#![warn(missing_docs)]

pub mod algorithm;
pub mod data;
pub mod error;

#[cfg(test)]
mod tests;
