use crate::solver::implementations::default::DefaultSettings;
use thiserror::Error;

/// Solver general core settings are the same as in the default solver.
///
/// Go [here](crate::solver::implementations::default::DefaultSettings)
/// to view the complete list.
///
pub type CoreSettings<T> = DefaultSettings<T>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// A field holds a value outside of its legal range
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
    /// A field that can only be set when the solver is created was changed
    #[error("Field \"{0}\" can not be changed after initialization")]
    ImmutableSetting(&'static str),
}
