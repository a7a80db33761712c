//! Implementation of the solver components for the standard problem
//! format described on the [main page](crate).

#![allow(non_snake_case)]

mod filter;
mod iterates;
mod iteration_output;
mod linesearch;
mod pdsystem;
mod problemdata;
mod quantities;
mod restoration;
mod settings;
mod solution;
mod solver;

// export flattened
pub use filter::*;
pub use iterates::{DefaultIterate, DefaultIterateData};
pub use linesearch::FilterLineSearch;
pub use pdsystem::DefaultPDSystem;
pub use problemdata::*;
pub use quantities::DefaultQuantities;
pub use restoration::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
