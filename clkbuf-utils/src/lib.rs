//! Shared utilities for the clkbuf pass and its surrounding tooling.
mod errors;
mod id;
mod namegenerator;
mod out_file;

pub use errors::{ClkbufResult, Error};
pub use id::{GSym, GetName, Id};
pub use namegenerator::NameGenerator;
pub use out_file::OutputFile;
