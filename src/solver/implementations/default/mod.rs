//! Default solver implementation for problems in the standard form
//! described in the top level [API page](crate).

#![allow(non_snake_case)]

mod data_updating;
mod equilibration;
mod errors;
mod info;
mod info_print;
mod kktsystem;
mod parameters;
mod polish;
mod problemdata;
mod residuals;
mod settings;
mod solution;
mod solver;
mod workspace;

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        mod json;
    }
}

//export flattened
pub use data_updating::*;
pub use equilibration::*;
pub use errors::*;
pub use info::*;
pub use kktsystem::*;
pub use parameters::*;
pub use problemdata::*;
pub use residuals::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
pub use workspace::*;
