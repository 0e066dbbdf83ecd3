use super::DataField;
use crate::algebra::SparseFormatError;
use crate::qdldl::QDLDLError;
use crate::solver::core::SettingsError;
use thiserror::Error;

/// Error type returned by solver construction, data and parameter
/// updates and result queries.
///
/// A failed update never modifies the solver.   Solve outcomes such as
/// infeasibility or iteration limits are not errors and are reported
/// through [`SolverStatus`](crate::solver::SolverStatus) instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// An update addressed an entry outside of the problem data,
    /// or one that is not part of a matrix sparsity pattern.
    #[error("Index {index} is out of range for field {field}")]
    InvalidIndex { field: DataField, index: usize },
    /// Update values do not have the expected length.
    #[error("Expected {expected} values but received {found}")]
    ParameterShape { expected: usize, found: usize },
    /// No parameter with this name was declared.
    #[error("Unknown parameter \"{0}\"")]
    UnknownParameter(String),
    /// Inconsistent problem data, cones or parameter declarations.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// A result was requested before any solve completed.
    #[error("No solution is available before the first solve")]
    NoSolution,
    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),
}

impl From<SparseFormatError> for SolverError {
    fn from(e: SparseFormatError) -> Self {
        SolverError::Configuration(e.to_string())
    }
}

impl From<QDLDLError> for SolverError {
    fn from(e: QDLDLError) -> Self {
        SolverError::Configuration(format!("KKT factorization failed ({e})"))
    }
}

#[test]
fn test_error_conversions() {
    let e: SolverError = SettingsError::BadFieldValue("rho").into();
    assert!(matches!(e, SolverError::Settings(_)));
    assert!(e.to_string().contains("rho"));

    let e: SolverError = SparseFormatError::BadRowval.into();
    assert!(matches!(e, SolverError::Configuration(_)));

    let e = SolverError::InvalidIndex {
        field: DataField::A,
        index: 7,
    };
    assert_eq!(e.to_string(), "Index 7 is out of range for field A");
}
