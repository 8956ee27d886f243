//! Attribute catalogue.
//!
//! Accumulated once per design, growing monotonically as the hierarchy
//! orderer feeds leaf modules through the classifier: blackbox ports seed
//! it directly from their `clkbuf_*` attributes, and a processed regular
//! module's own boundary ports are folded back in by the hierarchy-boundary
//! promoter so the module's instantiators see them.
use clkbuf_ir::{Attribute, Id, Module};
use std::collections::{HashMap, HashSet};

/// `(cell-type, port-name, bit-index)` — the key the catalogue is indexed
/// by throughout.
pub type PortBit = (Id, Id, u32);

#[derive(Default)]
pub struct Catalogue {
    sink_ports: HashSet<PortBit>,
    buf_ports: HashSet<PortBit>,
    inv_out: HashMap<PortBit, (Id, u32)>,
    inv_in: HashMap<PortBit, (Id, u32)>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the catalogue from a blackbox module's port wires.
    pub fn scan_blackbox(&mut self, module: &Module) {
        debug_assert!(module.is_blackbox);
        for wire in module.port_wires() {
            for i in 0..wire.width {
                if wire.attributes.has(Attribute::Driver) {
                    self.buf_ports.insert((module.name, wire.name, i));
                }
                if wire.attributes.has(Attribute::Sink) {
                    self.sink_ports.insert((module.name, wire.name, i));
                }
                if let Some(partner) = wire.attributes.partner(Attribute::Inv) {
                    self.inv_out.insert((module.name, wire.name, i), (partner, i));
                    self.inv_in.insert((module.name, partner, i), (wire.name, i));
                }
            }
        }
    }

    pub fn is_sink(&self, cell_type: Id, port: Id, bit: u32) -> bool {
        self.sink_ports.contains(&(cell_type, port, bit))
    }

    pub fn is_buf(&self, cell_type: Id, port: Id, bit: u32) -> bool {
        self.buf_ports.contains(&(cell_type, port, bit))
    }

    pub fn inv_out(&self, cell_type: Id, port: Id, bit: u32) -> Option<(Id, u32)> {
        self.inv_out.get(&(cell_type, port, bit)).copied()
    }

    pub fn inv_in(&self, cell_type: Id, port: Id, bit: u32) -> Option<(Id, u32)> {
        self.inv_in.get(&(cell_type, port, bit)).copied()
    }

    /// Elevate a module's own output port bit into `buf_ports` for its
    /// instantiators, once this module has itself been processed and that
    /// bit turned out to already be buffered.
    pub fn mark_buf(&mut self, module: Id, port: Id, bit: u32) {
        self.buf_ports.insert((module, port, bit));
    }

    /// Elevate a module's own input port bit into `sink_ports` for its
    /// instantiators, when this module has a sink on that bit but no local
    /// driver to buffer against.
    pub fn mark_sink(&mut self, module: Id, port: Id, bit: u32) {
        self.sink_ports.insert((module, port, bit));
    }

    /// True if `(cell_type, port)` carries `clkbuf_driver` on any bit — used
    /// to detect the input-pad-already-buffers case.
    pub fn driver_port_any_bit(&self, cell_type: Id, port: Id) -> bool {
        self.buf_ports
            .iter()
            .any(|(ct, p, _)| *ct == cell_type && *p == port)
    }
}

/// Build the initial catalogue by scanning every blackbox module in the
/// design. Regular modules contribute to the catalogue only as they are
/// processed by the pass, not up front.
pub fn build_from_blackboxes<'a>(modules: impl Iterator<Item = &'a Module>) -> Catalogue {
    let mut catalogue = Catalogue::new();
    for module in modules.filter(|m| m.is_blackbox) {
        catalogue.scan_blackbox(module);
    }
    catalogue
}

#[cfg(test)]
mod tests {
    use super::*;
    use clkbuf_ir::Wire;

    #[test]
    fn scans_driver_sink_and_inverter() {
        let mut ff = Module::blackbox("FF");
        let mut c = Wire::new("C", 1);
        c.is_input = true;
        c.attributes.set_flag(Attribute::Sink);
        ff.wires.add(c);
        ff.ports.push(Id::new("C"));

        let mut inv = Module::blackbox("INV");
        let mut a = Wire::new("A", 1);
        a.is_input = true;
        inv.wires.add(a);
        inv.ports.push(Id::new("A"));
        let mut y = Wire::new("Y", 1);
        y.is_output = true;
        y.attributes.set_partner(Attribute::Inv, Id::new("A"));
        inv.wires.add(y);
        inv.ports.push(Id::new("Y"));

        let catalogue = build_from_blackboxes([&ff, &inv].into_iter());
        assert!(catalogue.is_sink(Id::new("FF"), Id::new("C"), 0));
        assert_eq!(
            catalogue.inv_out(Id::new("INV"), Id::new("Y"), 0),
            Some((Id::new("A"), 0))
        );
        assert_eq!(
            catalogue.inv_in(Id::new("INV"), Id::new("A"), 0),
            Some((Id::new("Y"), 0))
        );
    }
}
