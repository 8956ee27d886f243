//! In-memory netlist representation for the clock-buffer insertion pass.
//!
//! Mirrors the split `calyx-ir` uses for its own IR: plain data types in
//! [`structure`] and [`component`], a [`Design`] root analogous to
//! `calyx_ir::Context`, and a [`Builder`] for constructing new structure the
//! same way `calyx_ir::Builder` does.
mod attribute;
mod builder;
mod component;
mod context;
#[cfg(feature = "serialize")]
mod netlist_io;
mod structure;

pub use attribute::{AttrValue, Attribute, Attributes};
pub use builder::Builder;
pub use clkbuf_utils::{GetName, Id};
pub use component::{IdList, Module};
pub use context::Design;
#[cfg(feature = "serialize")]
pub use netlist_io::{read_design, write_design};
pub use structure::{Bit, Cell, Connect, SigSpec, Wire};
