//! The clock-buffer insertion pass and the analyses it is built from.
//!
//! Mirrors `calyx-opt`'s split between `analysis` (data-independent queries
//! over the IR) and `passes` (the rewrites themselves), minus the generic
//! `PassManager`/`Visitor` machinery `calyx-opt` uses to host many
//! interchangeable named passes: there is exactly one pass here, so callers
//! invoke [`passes::clock_buffer_insertion::run`] directly.
mod analysis;
pub mod config;
pub mod passes;

pub use passes::clock_buffer_insertion::{run, PassSummary};
