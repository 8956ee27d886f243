//! Convenience methods for constructing new structure inside a [`Module`].
//!
//! Mirrors `calyx_ir::Builder`: holds a mutable reference to the module
//! being rewritten plus a name generator seeded with the names already in
//! use, so that cells and wires materialised by a pass never collide with
//! user-given names.
use crate::component::Module;
use crate::structure::{Cell, Wire};
use crate::{Attribute, GetName};
use clkbuf_utils::{Id, NameGenerator};
use std::collections::HashSet;

pub struct Builder<'a> {
    pub module: &'a mut Module,
    namegen: NameGenerator,
}

impl<'a> Builder<'a> {
    /// Build a [`Builder`] for `module`. The name generator is seeded with
    /// every wire and cell name already present so that freshly generated
    /// names never shadow user-given ones.
    pub fn new(module: &'a mut Module) -> Self {
        let prev: HashSet<Id> = module
            .wires
            .iter()
            .map(|w| w.name())
            .chain(module.cells.iter().map(|c| c.name()))
            .collect();
        Builder {
            module,
            namegen: NameGenerator::with_prev_defined_names(prev),
        }
    }

    /// Allocate a fresh wire named `prefix<n>`, mark it `@generated`, add it
    /// to the module, and return its name.
    pub fn add_wire(&mut self, prefix: impl Into<Id>, width: u32) -> Id {
        let name = self.namegen.gen_name(prefix);
        let mut wire = Wire::new(name, width);
        wire.attributes.set_flag(Attribute::Generated);
        self.module.wires.add(wire);
        name
    }

    /// Allocate a fresh cell of `cell_type` named `prefix<n>`, mark it
    /// `@generated`, add it to the module, and return its name.
    pub fn add_cell(&mut self, prefix: impl Into<Id>, cell_type: impl Into<Id>) -> Id {
        let name = self.namegen.gen_name(prefix);
        let mut cell = Cell::new(name, cell_type);
        cell.attributes.set_flag(Attribute::Generated);
        self.module.cells.add(cell);
        name
    }
}
