//! # Error reporting for building and operating on set structured matrices
//!
//! Construction errors are reported through `GubError`. Violations of the invariants that the
//! pivoting code maintains are not recoverable and panic instead.
use thiserror::Error;

/// A `GubError` is created when a set description is rejected, or when an operation is requested
/// that can't be performed while sets are active.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GubError {
    /// The arrays describing the sets don't have the same length.
    #[error("set description arrays differ in length: {starts} starts, {ends} ends, {lower} lower bounds, {upper} upper bounds")]
    LengthMismatch {
        /// Number of start indices.
        starts: usize,
        /// Number of end indices.
        ends: usize,
        /// Number of lower bounds.
        lower: usize,
        /// Number of upper bounds.
        upper: usize,
    },
    /// A set references a column outside of the matrix.
    #[error("set {set} covers columns {start}..{end}, but there are only {nr_columns} columns")]
    IndexOutOfRange {
        /// Index of the set.
        set: usize,
        /// First column of the set.
        start: usize,
        /// One past the last column of the set.
        end: usize,
        /// Number of columns of the matrix.
        nr_columns: usize,
    },
    /// A selection refers to a column outside of the matrix.
    #[error("column {column} was selected, but there are only {nr_columns} columns")]
    ColumnOutOfRange {
        /// Index of the selected column.
        column: usize,
        /// Number of columns of the matrix.
        nr_columns: usize,
    },
    /// A selection refers to a row outside of the matrix.
    #[error("row {row} was selected, but there are only {nr_rows} rows")]
    RowOutOfRange {
        /// Index of the selected row.
        row: usize,
        /// Number of rows of the matrix.
        nr_rows: usize,
    },
    /// A set contains no columns.
    #[error("set {set} is empty ({start}..{end})")]
    EmptySet {
        /// Index of the set.
        set: usize,
        /// First column of the set.
        start: usize,
        /// One past the last column of the set.
        end: usize,
    },
    /// A set starts before the previous set ended, or reappears after another set.
    #[error("set {set} overlaps with a previous set, or sets are not ordered")]
    Overlapping {
        /// Index of the offending set.
        set: usize,
    },
    /// The lower bound of a set exceeds its upper bound.
    #[error("set {set} has lower bound {lower} above upper bound {upper}")]
    InvertedBounds {
        /// Index of the set.
        set: usize,
        /// Lower bound on the sum of the members.
        lower: f64,
        /// Upper bound on the sum of the members.
        upper: f64,
    },
    /// Both bounds of a set are infinite.
    #[error("set {set} has no finite bound")]
    FreeSet {
        /// Index of the set.
        set: usize,
    },
    /// The operation can't take the sets into account.
    #[error("{operation} is not supported while generalized upper bound sets are active")]
    Unsupported {
        /// Name of the operation.
        operation: &'static str,
    },
}

/// A broken invariant of the key assignment, as found by `GubMatrix::verify_keys`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A structural key doesn't have basic status in the driver.
    #[error("key {key} of set {set} is not basic")]
    KeyNotBasic {
        /// Index of the set.
        set: usize,
        /// Column of the key.
        key: usize,
    },
    /// The slack is the key, but its status is not basic.
    #[error("slack of set {set} is the key, but is not basic")]
    SlackKeyNotBasic {
        /// Index of the set.
        set: usize,
    },
    /// The slack is basic, but a column is the key.
    #[error("slack of set {set} is basic, but column {key} is the key")]
    BasicSlackNotKey {
        /// Index of the set.
        set: usize,
        /// Column of the key.
        key: usize,
    },
    /// The list of basic members doesn't match the statuses in the driver.
    #[error("set {set} lists basic members {listed:?}, but {actual:?} are basic")]
    MembershipMismatch {
        /// Index of the set.
        set: usize,
        /// Members in the list, excluding the key.
        listed: Vec<usize>,
        /// Basic members according to the driver, excluding the key.
        actual: Vec<usize>,
    },
}
