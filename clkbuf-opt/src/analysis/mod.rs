//! Analyses consulted by the clock-buffer insertion pass. Mirrors
//! `calyx-opt`'s split between data-independent analyses (here:
//! [`canon`], [`catalogue`], [`hierarchy`]) and the pass that drives them
//! (`crate::passes::clock_buffer_insertion`).
mod canon;
mod catalogue;
mod hierarchy;

pub use canon::Canon;
pub use catalogue::{build_from_blackboxes, Catalogue, PortBit};
pub use hierarchy::post_order;
