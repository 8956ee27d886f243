//! Hierarchy orderer.
//!
//! Yields the design's *regular* modules in post-order over the
//! cell-instantiation graph: a module is emitted only after every module
//! referenced by one of its cells. Cycles (rare, typically illegal in a
//! real netlist) are broken by visiting each module at most once, mirroring
//! `calyx-opt`'s graph analyses (`analysis::graph`) which build a
//! `petgraph::graphmap::DiGraphMap` over names rather than indices, since
//! our nodes are already interned [`Id`]s.
use clkbuf_ir::{Design, Id};
use itertools::Itertools;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashSet;

/// Post-order traversal of `design`'s selected regular modules: a module
/// appears only after every regular module it instantiates (directly or
/// transitively). Blackbox cell-types contribute no edges, since they have
/// no body to order before.
pub fn post_order(design: &Design) -> Vec<Id> {
    let mut graph: DiGraphMap<Id, ()> = DiGraphMap::new();
    for module in design.modules.iter() {
        if module.is_blackbox {
            continue;
        }
        graph.add_node(module.name);
        for cell_type in module.instantiated_types() {
            if design.find(cell_type).is_some_and(|m| !m.is_blackbox) {
                graph.add_edge(module.name, cell_type, ());
            }
        }
    }

    // `DiGraphMap::nodes()` walks its backing `HashMap` in the hasher's
    // arbitrary, per-process-seeded order; picking roots from it would make
    // the emitted order vary run to run for the same design even though
    // nothing about the design changed. `design.modules` preserves insertion
    // order (it's a `LinkedHashMap`), so deriving the root list from it keeps
    // the traversal deterministic.
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();
    let roots = design
        .modules
        .iter()
        .filter(|m| !m.is_blackbox)
        .map(|m| m.name);
    for root in roots {
        visit(&graph, root, &mut visited, &mut on_stack, &mut order);
    }
    order
}

fn visit(
    graph: &DiGraphMap<Id, ()>,
    node: Id,
    visited: &mut HashSet<Id>,
    on_stack: &mut HashSet<Id>,
    order: &mut Vec<Id>,
) {
    if visited.contains(&node) || on_stack.contains(&node) {
        // Already emitted, or we're already visiting it further up the
        // stack: a cycle. Either way, don't revisit.
        return;
    }
    on_stack.insert(node);
    // Same determinism concern as the root list: `edges()` yields in
    // `HashMap` order, so sort by name before recursing.
    for (_, dep, ()) in graph.edges(node).sorted_by_key(|(_, dep, ())| dep.to_string()) {
        visit(graph, dep, visited, on_stack, order);
    }
    on_stack.remove(&node);
    if visited.insert(node) {
        order.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clkbuf_ir::{Cell, Module};

    fn leaf_before_parent(order: &[Id], leaf: &str, parent: &str) -> bool {
        let li = order.iter().position(|n| *n == Id::new(leaf)).unwrap();
        let pi = order.iter().position(|n| *n == Id::new(parent)).unwrap();
        li < pi
    }

    #[test]
    fn leaves_come_before_parents() {
        let mut design = Design::new();
        let b = Module::new("B");
        let mut a = Module::new("A");
        a.cells.add(Cell::new("inst_b", "B"));
        design.add_module(b);
        design.add_module(a);

        let order = post_order(&design);
        assert_eq!(order.len(), 2);
        assert!(leaf_before_parent(&order, "B", "A"));
    }

    #[test]
    fn cycle_is_visited_once() {
        let mut design = Design::new();
        let mut a = Module::new("A");
        a.cells.add(Cell::new("inst_b", "B"));
        let mut b = Module::new("B");
        b.cells.add(Cell::new("inst_a", "A"));
        design.add_module(a);
        design.add_module(b);

        let order = post_order(&design);
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn blackbox_cells_contribute_no_edges() {
        let mut design = Design::new();
        let mut a = Module::new("A");
        a.cells.add(Cell::new("ff0", "FF"));
        design.add_module(a);
        design.add_module(Module::blackbox("FF"));

        let order = post_order(&design);
        assert_eq!(order, vec![Id::new("A")]);
    }
}
