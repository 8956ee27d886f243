//! The clock-buffer insertion pass.
//!
//! Mirrors the shape of a `calyx-opt` `Visitor` implementation (collect
//! analyses, walk in dependency order, rewrite in place) without the trait
//! machinery of `calyx_opt::traversal`, since there is exactly one pass here
//! and no host framework to register it with.
use crate::analysis::{build_from_blackboxes, post_order, Canon, Catalogue};
use crate::config::{CellTypeConfig, PassConfig};
use clkbuf_ir::{Attribute, Bit, Connect, Design, Id, Module, SigSpec, Wire};
use clkbuf_ir::Builder;
use clkbuf_utils::{ClkbufResult, Error};
use std::collections::{HashMap, HashSet, VecDeque};

/// Summary returned once every selected module has been processed.
#[derive(Debug, Default)]
pub struct PassSummary {
    pub modules_processed: usize,
    pub generated_clocks: usize,
}

/// Run the pass over every regular module of `design`, leaves first.
pub fn run(
    design: &mut Design,
    config: &PassConfig,
    cell_types: &CellTypeConfig,
) -> ClkbufResult<PassSummary> {
    if config.buf.is_none() && config.inpad.is_none() {
        return Err(Error::configuration(
            "neither a buffer cell-type (`-buf`) nor an input-pad cell-type (`-inpad`) was configured",
        ));
    }

    let mut catalogue = build_from_blackboxes(design.modules.iter());

    // The input-pad cell itself may already emit a buffered clock (its
    // output port carries `clkbuf_driver` in the catalogue); when it does, a
    // separate buffer cell must not be stacked on top of it.
    let buffer_inputs = match config.inpad {
        Some(pad) => !catalogue.driver_port_any_bit(pad.cell_type, pad.out_port),
        None => true,
    };

    let order = post_order(design);
    log::debug!("clkbuf hierarchy order: {order:?}");

    let mut summary = PassSummary::default();
    for module_name in order {
        let generated = process_module(
            design,
            module_name,
            &mut catalogue,
            config,
            cell_types,
            buffer_inputs,
        )?;
        summary.generated_clocks += generated;
        summary.modules_processed += 1;
    }
    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
fn process_module(
    design: &mut Design,
    module_name: Id,
    catalogue: &mut Catalogue,
    config: &PassConfig,
    cell_types: &CellTypeConfig,
    buffer_inputs: bool,
) -> ClkbufResult<usize> {
    let mut module = design.modules.remove(module_name).ok_or_else(|| {
        Error::malformed_structure(format!(
            "module `{module_name}` disappeared between ordering and processing"
        ))
    })?;

    let is_top = module.is_top;
    let canon = Canon::build(&module);
    let mut classified = classify(&module, design, catalogue, &canon, cell_types);

    let (out_to_in, in_to_out) = build_inverter_edges(&module, catalogue, &canon);
    propagate_inverters(&mut classified, &out_to_in, &in_to_out);

    let insertion = insert_buffers(
        &mut module,
        is_top,
        &canon,
        &classified,
        config,
        cell_types,
        catalogue,
        buffer_inputs,
    );
    promote_ports(&module, &canon, &insertion.buffered_bits, catalogue);
    reroute_drivers(&mut module, design, &canon, &insertion.buffered_bits);
    swap_port_names(&mut module, &insertion.input_queue);
    reconnect_combinational(&mut module, design, &classified, &insertion.input_queue, config);

    design.modules.add(module);
    Ok(insertion.generated_clocks)
}

fn port_direction(design: &Design, cell_type: Id, port: Id) -> (bool, bool) {
    match design.find(cell_type).and_then(|m| m.wires.find(port)) {
        Some(w) => (w.is_input, w.is_output),
        None => (false, false),
    }
}

/// Per-module classifier state. `driven_wire_bits` and `i_buf_out`
/// intentionally hold *non-canonical* bits: see the note on
/// `driven_wire_bits` in the design ledger for why this repository keeps
/// that literal reading rather than canonicalising it.
pub struct Classified {
    pub sink_wire_bits: HashSet<Bit>,
    pub buf_wire_bits: HashSet<Bit>,
    pub driven_wire_bits: HashSet<Bit>,
    pub cells_with_sink_ports: HashSet<Id>,
    pub i_buf_out: HashSet<Bit>,
    pub generated_clk_bits: HashSet<Bit>,
}

fn classify(
    module: &Module,
    design: &Design,
    catalogue: &Catalogue,
    canon: &Canon,
    cell_types: &CellTypeConfig,
) -> Classified {
    let mut sink_wire_bits = HashSet::new();
    let mut buf_wire_bits = HashSet::new();
    let mut driven_wire_bits = HashSet::new();
    let mut cells_with_sink_ports = HashSet::new();
    let mut i_buf_out = HashSet::new();

    for cell in module.cells.iter() {
        let ctype = cell.cell_type;
        for (&port, sig) in cell.connections.iter() {
            let (_is_in, is_out) = port_direction(design, ctype, port);
            for (i, &bit) in sig.iter().enumerate() {
                let bi = i as u32;
                let cb = canon.canon(bit);
                if catalogue.is_sink(ctype, port, bi) {
                    sink_wire_bits.insert(cb);
                    cells_with_sink_ports.insert(ctype);
                }
                if catalogue.is_buf(ctype, port, bi) {
                    buf_wire_bits.insert(cb);
                }
                if is_out && ctype != cell_types.pll && ctype != cell_types.boot_clock {
                    driven_wire_bits.insert(bit);
                    if ctype == cell_types.i_buf {
                        i_buf_out.insert(bit);
                    }
                }
            }
        }
    }

    let mut generated_clk_bits = HashSet::new();
    for cell in module.cells.iter() {
        if cell.cell_type != cell_types.dffre {
            continue;
        }
        if let Some(sig) = cell.port(cell_types.dffre_clk_port) {
            for &bit in sig {
                if driven_wire_bits.contains(&bit) && !i_buf_out.contains(&bit) {
                    generated_clk_bits.insert(canon.canon(bit));
                }
            }
        }
    }

    Classified {
        sink_wire_bits,
        buf_wire_bits,
        driven_wire_bits,
        cells_with_sink_ports,
        i_buf_out,
        generated_clk_bits,
    }
}

/// Canonical-bit edges induced by `clkbuf_inv` pairs, keyed by the cell
/// instance that carries them (built fresh per module since the partner bit
/// depends on that specific instance's connections).
fn build_inverter_edges(
    module: &Module,
    catalogue: &Catalogue,
    canon: &Canon,
) -> (HashMap<Bit, Bit>, HashMap<Bit, Bit>) {
    let mut out_to_in = HashMap::new();
    let mut in_to_out = HashMap::new();

    for cell in module.cells.iter() {
        let ctype = cell.cell_type;
        for (&port, sig) in cell.connections.iter() {
            for (i, &bit) in sig.iter().enumerate() {
                let bi = i as u32;
                let cb = canon.canon(bit);
                if let Some((partner_port, partner_i)) = catalogue.inv_out(ctype, port, bi) {
                    if let Some(partner_bit) = cell.port(partner_port).and_then(|s| s.get(partner_i as usize)) {
                        out_to_in.insert(cb, canon.canon(*partner_bit));
                    }
                }
                if let Some((partner_port, partner_i)) = catalogue.inv_in(ctype, port, bi) {
                    if let Some(partner_bit) = cell.port(partner_port).and_then(|s| s.get(partner_i as usize)) {
                        in_to_out.insert(cb, canon.canon(*partner_bit));
                    }
                }
            }
        }
    }

    (out_to_in, in_to_out)
}

/// Grow `sink_wire_bits`/`buf_wire_bits` to their least fixed point under
/// inverter transparency, driven by a worklist of bits whose membership
/// just changed rather than repeated full sweeps.
fn propagate_inverters(
    classified: &mut Classified,
    out_to_in: &HashMap<Bit, Bit>,
    in_to_out: &HashMap<Bit, Bit>,
) {
    let mut worklist: VecDeque<Bit> = classified
        .sink_wire_bits
        .iter()
        .chain(classified.buf_wire_bits.iter())
        .copied()
        .collect();

    while let Some(b) = worklist.pop_front() {
        if classified.sink_wire_bits.contains(&b) && !classified.buf_wire_bits.contains(&b) {
            if let Some(&partner) = out_to_in.get(&b) {
                if classified.buf_wire_bits.insert(b) {
                    worklist.push_back(b);
                }
                if classified.sink_wire_bits.insert(partner) {
                    worklist.push_back(partner);
                }
            }
        }
        if classified.buf_wire_bits.contains(&b) {
            if let Some(&partner) = in_to_out.get(&b) {
                if classified.buf_wire_bits.insert(partner) {
                    worklist.push_back(partner);
                }
            }
        }
    }
}

/// A materialised buffer (or input-pad) chain for one canonical bit: the
/// topmost inserted cell, and the driver-side net the original driver must
/// now target.
#[derive(Clone, Copy, Debug)]
pub struct BufferedBit {
    pub cell: Id,
    pub iwire: Id,
}

pub struct InsertionResult {
    pub buffered_bits: HashMap<Bit, BufferedBit>,
    /// `(old_port_wire, new_port_wire)` pairs queued by input-port rewriting,
    /// consumed by the name swap and the combinational reconnection sweep.
    pub input_queue: Vec<(Id, Id)>,
    pub generated_clocks: usize,
}

/// Materialise buffers/pads over a snapshot of the module's wires.
#[allow(clippy::too_many_arguments)]
fn insert_buffers(
    module: &mut Module,
    is_top: bool,
    canon: &Canon,
    classified: &Classified,
    config: &PassConfig,
    cell_types: &CellTypeConfig,
    catalogue: &mut Catalogue,
    buffer_inputs: bool,
) -> InsertionResult {
    let mut buffered_bits: HashMap<Bit, BufferedBit> = HashMap::new();
    let mut input_queue: Vec<(Id, Id)> = Vec::new();
    let mut generated_clocks = 0usize;

    let snapshot: Vec<Wire> = module.wires.iter().cloned().collect();
    let module_name = module.name;
    let mut builder = Builder::new(module);

    for wire in &snapshot {
        if wire.is_input && wire.is_output {
            continue;
        }

        let candidate = if config.selection.is_some() {
            config.is_selected(wire.name)
        } else {
            !wire.attributes.has(Attribute::Inhibit)
        };
        if !candidate {
            if wire.is_output {
                for i in 0..wire.width {
                    catalogue.mark_buf(module_name, wire.name, i);
                }
            }
            continue;
        }

        let treat_as_input_pad = wire.is_input && config.inpad.is_some() && is_top;
        let mut buffered_idxs: Vec<u32> = Vec::new();

        for i in 0..wire.width {
            let bit = Bit::Wire(wire.name, i);
            let m = canon.canon(bit);

            if classified.buf_wire_bits.contains(&m) {
                if wire.is_output {
                    catalogue.mark_buf(module_name, wire.name, i);
                }
                continue;
            }
            if !classified.sink_wire_bits.contains(&m) {
                continue;
            }

            let has_local_driver =
                classified.driven_wire_bits.contains(&bit) || (wire.is_input && is_top);
            if !has_local_driver {
                catalogue.mark_sink(module_name, wire.name, i);
                continue;
            }

            if buffered_bits.contains_key(&m) {
                // Another wire's bit in this same module already
                // materialised a buffer chain for this canonical bit (e.g.
                // two top-level inputs tied together by a `Connect`, both
                // qualifying as locally driven); reuse that chain instead of
                // driving the same net from a second buffer cell.
                if wire.is_output {
                    catalogue.mark_buf(module_name, wire.name, i);
                } else {
                    buffered_idxs.push(i);
                }
                continue;
            }

            let generated_clk = classified.generated_clk_bits.contains(&m);
            let is_output_port = wire.is_output;
            let want_buffer = config.buf.is_some()
                && (!treat_as_input_pad || buffer_inputs)
                && !is_output_port;

            let mut inserted_cell: Option<Id> = None;
            let mut final_iwire: Option<Id> = None;

            if want_buffer {
                let buf = config.buf.expect("checked by want_buffer");
                let actual_type = if generated_clk {
                    cell_types.fclk_buf
                } else {
                    buf.cell_type
                };
                let cell_name = builder.add_cell("clkbuf", actual_type);
                let driver_iwire = builder.add_wire("clkbuf_net", 1);
                if let Some(c) = builder.module.cells.find_mut(cell_name) {
                    c.connect(buf.out_port, vec![m]);
                    c.connect(buf.in_port, vec![Bit::Wire(driver_iwire, 0)]);
                }
                inserted_cell = Some(cell_name);
                final_iwire = Some(driver_iwire);

                if generated_clk {
                    generated_clocks += 1;
                    log::warn!(
                        "generated clock on {}[{}] in module `{}`, substituting `{}`",
                        wire.name,
                        i,
                        module_name,
                        cell_types.fclk_buf
                    );
                }
            }

            if treat_as_input_pad {
                let pad = config.inpad.expect("checked by treat_as_input_pad");
                let pad_cell_name = builder.add_cell("clkbuf_inpad", pad.cell_type);
                let pad_out_wire = builder.add_wire("clkbuf_net", 1);
                let pad_target = match final_iwire {
                    Some(iw) => Bit::Wire(iw, 0),
                    None => m,
                };
                if let Some(c) = builder.module.cells.find_mut(pad_cell_name) {
                    c.connect(pad.out_port, vec![pad_target]);
                    c.connect(pad.in_port, vec![Bit::Wire(pad_out_wire, 0)]);
                }
                inserted_cell = Some(pad_cell_name);
                final_iwire = Some(pad_out_wire);
            }

            let (Some(cell), Some(iwire)) = (inserted_cell, final_iwire) else {
                continue;
            };
            buffered_bits.insert(m, BufferedBit { cell, iwire });
            buffered_idxs.push(i);
        }

        if wire.is_input && !buffered_idxs.is_empty() {
            let new_wire_name = builder.add_wire("clkbuf_in", wire.width);
            if let Some(nw) = builder.module.wires.find_mut(new_wire_name) {
                nw.attributes = wire.attributes.clone();
                nw.is_input = wire.is_input;
                nw.is_output = wire.is_output;
            }

            for i in 0..wire.width {
                let bit = Bit::Wire(wire.name, i);
                let m = canon.canon(bit);
                if buffered_idxs.contains(&i) {
                    if let Some(bb) = buffered_bits.get(&m) {
                        builder.module.connections.push(Connect {
                            lhs: vec![Bit::Wire(bb.iwire, 0)],
                            rhs: vec![Bit::Wire(new_wire_name, i)],
                        });
                        continue;
                    }
                }
                builder.module.connections.push(Connect {
                    lhs: vec![bit],
                    rhs: vec![Bit::Wire(new_wire_name, i)],
                });
            }

            input_queue.push((wire.name, new_wire_name));
        }
    }

    InsertionResult {
        buffered_bits,
        input_queue,
        generated_clocks,
    }
}

/// Elevate a module's own buffered output-port bits so parents skip
/// them. Runs over *every* output port, independent of whether the main
/// insertion loop above touched that particular wire this round, since a
/// port bit can be canon-equivalent to a net that a differently-named wire
/// drove the buffer onto.
fn promote_ports(
    module: &Module,
    canon: &Canon,
    buffered_bits: &HashMap<Bit, BufferedBit>,
    catalogue: &mut Catalogue,
) {
    if buffered_bits.is_empty() {
        return;
    }
    for port_name in &module.ports {
        let Some(wire) = module.wires.find(*port_name) else {
            continue;
        };
        if !wire.is_output {
            continue;
        }
        for i in 0..wire.width {
            let cb = canon.canon(Bit::Wire(wire.name, i));
            if buffered_bits.contains_key(&cb) {
                catalogue.mark_buf(module.name, wire.name, i);
            }
        }
    }
}

/// Driver re-routing: redirect every non-buffer cell's output bits
/// that were buffered onto the buffer's driver-side net instead of the
/// original one.
fn reroute_drivers(
    module: &mut Module,
    design: &Design,
    canon: &Canon,
    buffered_bits: &HashMap<Bit, BufferedBit>,
) {
    if buffered_bits.is_empty() {
        return;
    }
    for cell in module.cells.iter_mut() {
        let ctype = cell.cell_type;
        let ports: Vec<Id> = cell.connections.keys().copied().collect();
        for port in ports {
            let (_is_in, is_out) = port_direction(design, ctype, port);
            if !is_out {
                continue;
            }
            let Some(sig) = cell.port(port) else { continue };
            let mut changed = false;
            let new_sig: SigSpec = sig
                .iter()
                .map(|&b| {
                    let cb = canon.canon(b);
                    match buffered_bits.get(&cb) {
                        Some(bb) if bb.cell != cell.name => {
                            changed = true;
                            Bit::Wire(bb.iwire, 0)
                        }
                        _ => b,
                    }
                })
                .collect();
            if changed {
                cell.connect(port, new_sig);
            }
        }
    }
}

/// Port-name swap. The original port wire is stripped of its port
/// flags and attributes but keeps its own name unchanged, since cell
/// connections already reference it by that name and there is no general
/// mechanism here to rewrite arbitrary stale `Bit`s (only the targeted
/// reconnection sweep below handles the one case that needs it). The
/// replacement wire, built already carrying the original attributes and
/// port flags, becomes the wire `reindex_ports` picks up as the port.
fn swap_port_names(module: &mut Module, input_queue: &[(Id, Id)]) {
    if input_queue.is_empty() {
        return;
    }
    for &(old_name, _new_name) in input_queue {
        if let Some(old_wire) = module.wires.find_mut(old_name) {
            old_wire.is_input = false;
            old_wire.is_output = false;
            old_wire.attributes = clkbuf_ir::Attributes::new();
        }
    }
    module.reindex_ports();
}

/// Combinational-driver reconnection. Cells that never declared a
/// sink on the renamed-out wire still need the raw external signal, not the
/// now-internal buffered net, so their input connections are translated
/// through the `old -> new` map recorded by input-port rewriting.
fn reconnect_combinational(
    module: &mut Module,
    design: &Design,
    classified: &Classified,
    input_queue: &[(Id, Id)],
    config: &PassConfig,
) {
    if input_queue.is_empty() {
        return;
    }
    let rename: HashMap<Id, Id> = input_queue.iter().copied().collect();
    let buf_cell_type = config.buf.map(|b| b.cell_type);

    for cell in module.cells.iter_mut() {
        if classified.cells_with_sink_ports.contains(&cell.cell_type) {
            continue;
        }
        if Some(cell.cell_type) == buf_cell_type {
            continue;
        }
        let ctype = cell.cell_type;
        let ports: Vec<Id> = cell.connections.keys().copied().collect();
        for port in ports {
            let (is_in, _is_out) = port_direction(design, ctype, port);
            if !is_in {
                continue;
            }
            let Some(sig) = cell.port(port) else { continue };
            let mut changed = false;
            let new_sig: SigSpec = sig
                .iter()
                .map(|&b| match b {
                    Bit::Wire(w, i) if rename.contains_key(&w) => {
                        changed = true;
                        Bit::Wire(rename[&w], i)
                    }
                    other => other,
                })
                .collect();
            if changed {
                cell.connect(port, new_sig);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TwoPortCell;
    use clkbuf_ir::Cell;

    fn blackbox_ff() -> Module {
        let mut ff = Module::blackbox("FF");
        let mut c = Wire::new("C", 1);
        c.is_input = true;
        c.attributes.set_flag(Attribute::Sink);
        ff.wires.add(c);
        ff.ports.push(Id::new("C"));
        let mut q = Wire::new("Q", 1);
        q.is_output = true;
        ff.wires.add(q);
        ff.ports.push(Id::new("Q"));
        ff
    }

    fn default_config() -> PassConfig {
        PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: Some(TwoPortCell::new("IPAD", "O", "I")),
            selection: None,
        }
    }

    /// Scenario 1: simple driver-sink on a top-level input, expect an IPAD
    /// chained into a CLK_BUF driving the sink.
    #[test]
    fn simple_driver_sink_gets_ipad_and_buffer() {
        let mut design = Design::new();
        design.add_module(blackbox_ff());

        let mut top = Module::new("top");
        top.is_top = true;
        let mut clk = Wire::new("clk", 1);
        clk.is_input = true;
        top.wires.add(clk);
        top.ports.push(Id::new("clk"));

        let mut ff0 = Cell::new("ff0", "FF");
        ff0.connect("C", vec![Bit::Wire(Id::new("clk"), 0)]);
        top.cells.add(ff0);

        design.add_module(top);

        let config = default_config();
        let cell_types = CellTypeConfig::default();
        let summary = run(&mut design, &config, &cell_types).unwrap();
        assert_eq!(summary.modules_processed, 1);

        let top = design.find("top").unwrap();
        let cell_types_present: Vec<Id> = top.cells.iter().map(|c| c.cell_type).collect();
        assert!(cell_types_present.contains(&Id::new("CLK_BUF")));
        assert!(cell_types_present.contains(&Id::new("IPAD")));
        // "clk" keeps its own identity as the now-internal, buffered net
        // (ff0.C still reads it unchanged); the freshly generated wire takes
        // over the port role instead of "clk" itself, since nothing here
        // rewrites the `Bit`s already pointing at "clk".
        assert_eq!(top.ports.len(), 1);
        assert!(!top.ports.contains(&Id::new("clk")));
    }

    /// Scenario 2: a CLK_BUF already sits on the net (already a `buf_ports`
    /// producer via its blackbox declaration), so no new buffer chain is
    /// materialised downstream of it.
    #[test]
    fn already_buffered_net_gets_no_new_buffer() {
        let mut design = Design::new();
        design.add_module(blackbox_ff());

        let mut clk_buf = Module::blackbox("CLK_BUF");
        let mut o = Wire::new("O", 1);
        o.is_output = true;
        o.attributes.set_flag(Attribute::Driver);
        clk_buf.wires.add(o);
        clk_buf.ports.push(Id::new("O"));
        let mut ip = Wire::new("I", 1);
        ip.is_input = true;
        clk_buf.wires.add(ip);
        clk_buf.ports.push(Id::new("I"));
        design.add_module(clk_buf);

        let mut top = Module::new("top");
        top.is_top = true;
        let mut clk_in = Wire::new("clk_in", 1);
        clk_in.is_input = true;
        top.wires.add(clk_in);
        top.ports.push(Id::new("clk_in"));
        let mut clk = Wire::new("clk", 1);
        top.wires.add(clk);

        let mut buf0 = Cell::new("buf0", "CLK_BUF");
        buf0.connect("I", vec![Bit::Wire(Id::new("clk_in"), 0)]);
        buf0.connect("O", vec![Bit::Wire(Id::new("clk"), 0)]);
        top.cells.add(buf0);

        let mut ff0 = Cell::new("ff0", "FF");
        ff0.connect("C", vec![Bit::Wire(Id::new("clk"), 0)]);
        top.cells.add(ff0);

        design.add_module(top);

        let config = PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: None,
            selection: None,
        };
        let cell_types = CellTypeConfig::default();
        run(&mut design, &config, &cell_types).unwrap();

        let top = design.find("top").unwrap();
        assert_eq!(top.cells.len(), 2, "no additional buffer cell should appear");
    }

    /// Scenario 3: an inverter between the driver and the sink should pull
    /// the buffer requirement upstream of the inverter, not onto its output.
    #[test]
    fn inverter_pulls_buffer_upstream() {
        let mut design = Design::new();
        design.add_module(blackbox_ff());

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
        design.add_module(inv);

        let mut top = Module::new("top");
        top.is_top = true;
        let mut clk = Wire::new("clk", 1);
        clk.is_input = true;
        top.wires.add(clk);
        top.ports.push(Id::new("clk"));
        let mut nclk = Wire::new("nclk", 1);
        top.wires.add(nclk);

        let mut inv0 = Cell::new("inv0", "INV");
        inv0.connect("A", vec![Bit::Wire(Id::new("clk"), 0)]);
        inv0.connect("Y", vec![Bit::Wire(Id::new("nclk"), 0)]);
        top.cells.add(inv0);

        let mut ff0 = Cell::new("ff0", "FF");
        ff0.connect("C", vec![Bit::Wire(Id::new("nclk"), 0)]);
        top.cells.add(ff0);

        design.add_module(top);

        let config = PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: None,
            selection: None,
        };
        let cell_types = CellTypeConfig::default();
        run(&mut design, &config, &cell_types).unwrap();

        let top = design.find("top").unwrap();
        let buf_count = top.cells.iter().filter(|c| c.cell_type == Id::new("CLK_BUF")).count();
        assert_eq!(buf_count, 1, "exactly one buffer should be inserted, upstream of the inverter");
    }

    /// Scenario 4: a flip-flop output feeding another flip-flop's clock pin
    /// is a generated clock and must substitute FCLK_BUF.
    #[test]
    fn generated_clock_substitutes_fclk_buf() {
        let mut design = Design::new();
        let mut dffre = Module::blackbox("DFFRE");
        let mut c = Wire::new("C", 1);
        c.is_input = true;
        c.attributes.set_flag(Attribute::Sink);
        dffre.wires.add(c);
        dffre.ports.push(Id::new("C"));
        let mut q = Wire::new("Q", 1);
        q.is_output = true;
        dffre.wires.add(q);
        dffre.ports.push(Id::new("Q"));
        design.add_module(dffre);

        let mut top = Module::new("top");
        top.is_top = true;
        let mut q0 = Wire::new("q0", 1);
        top.wires.add(q0);

        let mut dff0 = Cell::new("dff0", "DFFRE");
        dff0.connect("Q", vec![Bit::Wire(Id::new("q0"), 0)]);
        top.cells.add(dff0);

        let mut dff1 = Cell::new("dff1", "DFFRE");
        dff1.connect("C", vec![Bit::Wire(Id::new("q0"), 0)]);
        top.cells.add(dff1);

        design.add_module(top);

        let config = PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: None,
            selection: None,
        };
        let cell_types = CellTypeConfig::default();
        let summary = run(&mut design, &config, &cell_types).unwrap();
        assert_eq!(summary.generated_clocks, 1);

        let top = design.find("top").unwrap();
        assert!(top.cells.iter().any(|c| c.cell_type == Id::new("FCLK_BUF")));
        assert!(!top.cells.iter().any(|c| c.cell_type == Id::new("CLK_BUF")));
    }

    /// Scenario 5: submodule handoff. `B`'s input sink propagates into
    /// `sink_ports` so that `A`, which drives `B`'s port with a local cell,
    /// inserts the buffer itself.
    #[test]
    fn submodule_handoff_buffers_in_parent() {
        let mut design = Design::new();
        design.add_module(blackbox_ff());

        let mut b = Module::new("B");
        let mut clk_in = Wire::new("clk_in", 1);
        clk_in.is_input = true;
        b.wires.add(clk_in);
        b.ports.push(Id::new("clk_in"));
        let mut ff0 = Cell::new("ff0", "FF");
        ff0.connect("C", vec![Bit::Wire(Id::new("clk_in"), 0)]);
        b.cells.add(ff0);
        design.add_module(b);

        let mut a = Module::new("A");
        a.is_top = true;
        let mut osc_out = Wire::new("osc_out", 1);
        a.wires.add(osc_out);
        let mut osc = Cell::new("osc", "OSC");
        osc.connect("Y", vec![Bit::Wire(Id::new("osc_out"), 0)]);
        a.cells.add(osc);
        let mut inst_b = Cell::new("inst_b", "B");
        inst_b.connect("clk_in", vec![Bit::Wire(Id::new("osc_out"), 0)]);
        a.cells.add(inst_b);
        design.add_module(a);

        let config = PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: None,
            selection: None,
        };
        let cell_types = CellTypeConfig::default();
        run(&mut design, &config, &cell_types).unwrap();

        let a = design.find("A").unwrap();
        assert!(a.cells.iter().any(|c| c.cell_type == Id::new("CLK_BUF")));
        let b = design.find("B").unwrap();
        assert!(!b.cells.iter().any(|c| c.cell_type == Id::new("CLK_BUF")));
    }

    /// Scenario 6: `clkbuf_inhibit` on an output port still gets promoted
    /// into `buf_ports` for parents even though no buffer is inserted here.
    #[test]
    fn inhibited_output_port_is_still_promoted() {
        let mut design = Design::new();
        design.add_module(blackbox_ff());

        let mut b = Module::new("B");
        let mut clk_in = Wire::new("clk_in", 1);
        clk_in.is_input = true;
        b.wires.add(clk_in);
        b.ports.push(Id::new("clk_in"));
        let mut clk_out = Wire::new("clk_out", 1);
        clk_out.is_output = true;
        clk_out.attributes.set_flag(Attribute::Inhibit);
        b.wires.add(clk_out);
        b.ports.push(Id::new("clk_out"));
        b.connections.push(Connect {
            lhs: vec![Bit::Wire(Id::new("clk_out"), 0)],
            rhs: vec![Bit::Wire(Id::new("clk_in"), 0)],
        });

        design.add_module(b);

        let config = PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: None,
            selection: None,
        };
        let cell_types = CellTypeConfig::default();
        run(&mut design, &config, &cell_types).unwrap();
        // no panic, and the module is left with no inserted cells since the
        // inhibited wire was the only candidate.
        let b = design.find("B").unwrap();
        assert!(b.cells.is_empty());
    }

    /// P5: an actual local-driver cell's output gets rewired onto the
    /// buffer's driver-side pin, and the buffer's own output keeps driving
    /// the original net.
    #[test]
    fn local_driver_is_rerouted_to_buffer_input() {
        let mut design = Design::new();
        design.add_module(blackbox_ff());

        let mut osc = Module::blackbox("OSC");
        let mut y = Wire::new("Y", 1);
        y.is_output = true;
        osc.wires.add(y);
        osc.ports.push(Id::new("Y"));
        design.add_module(osc);

        let mut top = Module::new("top");
        top.is_top = true;
        let mut osc_clk = Wire::new("osc_clk", 1);
        top.wires.add(osc_clk);

        let mut osc0 = Cell::new("osc0", "OSC");
        osc0.connect("Y", vec![Bit::Wire(Id::new("osc_clk"), 0)]);
        top.cells.add(osc0);

        let mut ff0 = Cell::new("ff0", "FF");
        ff0.connect("C", vec![Bit::Wire(Id::new("osc_clk"), 0)]);
        top.cells.add(ff0);

        design.add_module(top);

        let config = PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: None,
            selection: None,
        };
        let cell_types = CellTypeConfig::default();
        run(&mut design, &config, &cell_types).unwrap();

        let top = design.find("top").unwrap();
        let buf = top
            .cells
            .iter()
            .find(|c| c.cell_type == Id::new("CLK_BUF"))
            .expect("buffer should be inserted");
        let buf_driver_wire = match buf.port("I").unwrap()[0] {
            Bit::Wire(w, _) => w,
            Bit::Const(_) => panic!("buffer driver-side port should connect to a wire"),
        };

        let osc0 = top.cells.iter().find(|c| c.name == Id::new("osc0")).unwrap();
        assert_eq!(
            osc0.port("Y").unwrap()[0],
            Bit::Wire(buf_driver_wire, 0),
            "the local driver's output should be rerouted onto the buffer's driver-side net"
        );
        assert_eq!(
            buf.port("O").unwrap()[0],
            Bit::Wire(Id::new("osc_clk"), 0),
            "the buffer's network-side output should still drive the original net"
        );
    }

    /// P3: running the pass a second time over an already-buffered design
    /// inserts no further cells or wires.
    #[test]
    fn running_pass_twice_is_idempotent() {
        let mut design = Design::new();
        design.add_module(blackbox_ff());

        let mut clk_buf = Module::blackbox("CLK_BUF");
        let mut o = Wire::new("O", 1);
        o.is_output = true;
        o.attributes.set_flag(Attribute::Driver);
        clk_buf.wires.add(o);
        clk_buf.ports.push(Id::new("O"));
        let mut ip = Wire::new("I", 1);
        ip.is_input = true;
        clk_buf.wires.add(ip);
        clk_buf.ports.push(Id::new("I"));
        design.add_module(clk_buf);

        let mut top = Module::new("top");
        top.is_top = true;
        let mut clk = Wire::new("clk", 1);
        clk.is_input = true;
        top.wires.add(clk);
        top.ports.push(Id::new("clk"));

        let mut ff0 = Cell::new("ff0", "FF");
        ff0.connect("C", vec![Bit::Wire(Id::new("clk"), 0)]);
        top.cells.add(ff0);

        design.add_module(top);

        let config = PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: None,
            selection: None,
        };
        let cell_types = CellTypeConfig::default();

        run(&mut design, &config, &cell_types).unwrap();
        let top = design.find("top").unwrap();
        let cells_once = top.cells.len();
        let wires_once = top.wires.len();
        assert_eq!(cells_once, 2, "expect FF plus one inserted CLK_BUF");

        run(&mut design, &config, &cell_types).unwrap();
        let top = design.find("top").unwrap();
        assert_eq!(
            top.cells.len(),
            cells_once,
            "a second run over an already-buffered design should insert no further cells"
        );
        assert_eq!(
            top.wires.len(),
            wires_once,
            "a second run over an already-buffered design should create no further wires"
        );
    }

    /// P2: two top-level input wires tied together by a `Connect` (so both
    /// canonicalise to the same bit) and both independently qualifying as
    /// locally driven must still materialise exactly one buffer chain on
    /// that net, not one per wire.
    #[test]
    fn tied_inputs_share_a_single_buffer() {
        let mut design = Design::new();
        design.add_module(blackbox_ff());

        let mut top = Module::new("top");
        top.is_top = true;
        let mut clk_a = Wire::new("clk_a", 1);
        clk_a.is_input = true;
        top.wires.add(clk_a);
        top.ports.push(Id::new("clk_a"));
        let mut clk_b = Wire::new("clk_b", 1);
        clk_b.is_input = true;
        top.wires.add(clk_b);
        top.ports.push(Id::new("clk_b"));
        top.connections.push(Connect {
            lhs: vec![Bit::Wire(Id::new("clk_a"), 0)],
            rhs: vec![Bit::Wire(Id::new("clk_b"), 0)],
        });

        let mut ff0 = Cell::new("ff0", "FF");
        ff0.connect("C", vec![Bit::Wire(Id::new("clk_a"), 0)]);
        top.cells.add(ff0);

        design.add_module(top);

        let config = PassConfig {
            buf: Some(TwoPortCell::new("CLK_BUF", "O", "I")),
            inpad: None,
            selection: None,
        };
        let cell_types = CellTypeConfig::default();
        run(&mut design, &config, &cell_types).unwrap();

        let top = design.find("top").unwrap();
        let buf_count = top.cells.iter().filter(|c| c.cell_type == Id::new("CLK_BUF")).count();
        assert_eq!(buf_count, 1, "exactly one buffer should be inserted for the shared net");
    }
}
