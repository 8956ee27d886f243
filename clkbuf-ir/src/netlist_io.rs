//! JSON persistence for a [`crate::Design`].
//!
//! There is no host synthesis framework here to hand us an already-parsed
//! netlist, so this module is the concrete (if minimal) stand-in for it: a
//! `Design` serializes to a JSON object keyed by module name, each value
//! shaped like
//!
//! ```json
//! {
//!   "is_top": true,
//!   "is_blackbox": false,
//!   "ports": ["clk"],
//!   "wires": [
//!     {"Wire": ["clk", 0]}
//!   ],
//!   "cells": [
//!     {"name": "ff0", "cell_type": "DFFRE", "connections": {"C": [{"Wire": ["clk", 0]}]}, "attributes": {}}
//!   ],
//!   "connections": []
//! }
//! ```
//!
//! requires the `serialize` feature (mirrors `calyx_ir`'s own
//! `serialize` feature gating `Context`'s `Serialize` impl).
use crate::Design;
use clkbuf_utils::ClkbufResult;
use std::io::{Read, Write};

/// Parse a [`Design`] from a JSON reader.
pub fn read_design<R: Read>(r: R) -> ClkbufResult<Design> {
    Ok(serde_json::from_reader(r)?)
}

/// Serialize a [`Design`] as pretty-printed JSON.
pub fn write_design<W: Write>(design: &Design, w: W) -> ClkbufResult<()> {
    serde_json::to_writer_pretty(w, design)?;
    Ok(())
}
