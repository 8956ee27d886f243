//! Recognised cell-type magic strings and user-configured buffer
//! cell-types, gathered into small records instead of hard-coded string
//! literals scattered through the control flow (Design Note "Dispatch by
//! cell type").
use clkbuf_ir::Id;

/// The two port names of a two-port cell: the side that drives the sinks
/// ("network side") and the side that consumes the original driver ("driver
/// side"). Shared shape for `-buf` and `-inpad`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TwoPortCell {
    pub cell_type: Id,
    /// Network-side port: drives the sinks with the buffered clock.
    pub out_port: Id,
    /// Driver-side port: consumes the original (unbuffered) driver.
    pub in_port: Id,
}

impl TwoPortCell {
    pub fn new(
        cell_type: impl Into<Id>,
        out_port: impl Into<Id>,
        in_port: impl Into<Id>,
    ) -> Self {
        TwoPortCell {
            cell_type: cell_type.into(),
            out_port: out_port.into(),
            in_port: in_port.into(),
        }
    }
}

/// User-supplied pass configuration: which cell types implement the buffer
/// and (optionally) the input pad, and which wires are candidates.
///
/// `buffer_inputs` is deliberately *not* a field here: whether the
/// configured input-pad cell already counts as buffered is derived from the
/// attribute catalogue (does the pad's output port carry `clkbuf_driver`?),
/// not supplied by the user, so it is computed once in
/// `passes::clock_buffer_insertion::run` right after the catalogue is built.
#[derive(Clone, Debug)]
pub struct PassConfig {
    pub buf: Option<TwoPortCell>,
    pub inpad: Option<TwoPortCell>,
    /// Explicit selection of candidate wire names. `None` means "every
    /// non-`clkbuf_inhibit` wire is a candidate".
    pub selection: Option<Vec<Id>>,
}

impl PassConfig {
    /// A wire is a selection candidate when no explicit selection was given,
    /// or the wire's name appears in it.
    pub fn is_selected(&self, wire: Id) -> bool {
        match &self.selection {
            None => true,
            Some(names) => names.contains(&wire),
        }
    }
}

/// The cell-type magic strings the pass treats specially. Exposed as a
/// configuration record so tests can retarget them without touching the
/// pass's control flow.
#[derive(Clone, Debug)]
pub struct CellTypeConfig {
    /// Output excluded from `driven_wire_bits`: its clock is already routed
    /// through a clock resource.
    pub pll: Id,
    /// Same exclusion as `pll`.
    pub boot_clock: Id,
    /// Its output marks bits as already driven by an input pad.
    pub i_buf: Id,
    /// Flip-flop type whose clock input port defines generated-clock bits.
    pub dffre: Id,
    /// Clock input port name on `dffre`.
    pub dffre_clk_port: Id,
    /// Substituted buffer cell-type for generated clocks.
    pub fclk_buf: Id,
}

impl Default for CellTypeConfig {
    fn default() -> Self {
        CellTypeConfig {
            pll: Id::new("PLL"),
            boot_clock: Id::new("BOOT_CLOCK"),
            i_buf: Id::new("I_BUF"),
            dffre: Id::new("DFFRE"),
            dffre_clk_port: Id::new("C"),
            fclk_buf: Id::new("FCLK_BUF"),
        }
    }
}
