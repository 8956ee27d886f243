//! Command-line argument parsing for `clkbuf`.
//!
//! Mirrors `cider`'s `argh`-based `Opts` (see `cider/src/main.rs`): a flat
//! struct of switches/options plus a positional input file, with the
//! compound `-buf`/`-inpad` arguments parsed through a small `FromStr`
//! helper rather than argh's generic subcommand machinery, since there is
//! only ever the one verb here and no host framework to dispatch many named
//! passes by name.
use argh::FromArgs;
use clkbuf_ir::Id;
use clkbuf_opt::config::{PassConfig, TwoPortCell};
use clkbuf_utils::OutputFile;
use std::path::PathBuf;
use std::str::FromStr;

/// A `<celltype>:<out-port>:<in-port>` triple, the compound value `-buf` and
/// `-inpad` take. argh parses one value per option, so the cell type and
/// its two port names are joined into a single colon-delimited token rather
/// than spread across separate arguments.
#[derive(Clone, Copy, Debug)]
pub struct TwoPortArg(pub TwoPortCell);

impl FromStr for TwoPortArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(cell_type), Some(out_port), Some(in_port), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!(
                "expected `<celltype>:<out-port>:<in-port>`, got `{s}`"
            ));
        };
        Ok(TwoPortArg(TwoPortCell::new(cell_type, out_port, in_port)))
    }
}

#[derive(FromArgs)]
#[argh(help_triggers("-h", "--help"))]
/// Insert clock-buffer (and optional input-pad) cells between clock
/// drivers and clock-sink pins across a hierarchical netlist.
pub struct Opts {
    /// input netlist, JSON-encoded (see `clkbuf_ir::netlist_io`); reads
    /// stdin when omitted
    #[argh(positional)]
    pub file: Option<PathBuf>,

    /// path to a technology-library netlist (JSON, blackbox modules only)
    /// whose modules are merged in before the pass runs, for declaring
    /// `clkbuf_sink`/`clkbuf_driver`/`clkbuf_inv` on cell-types the input
    /// netlist only instantiates rather than defines
    #[argh(option, short = 'l', long = "lib")]
    pub lib_path: Option<PathBuf>,

    /// output file, default is stdout
    #[argh(option, short = 'o', long = "output", default = "OutputFile::Stdout")]
    pub output: OutputFile,

    /// log level passed to `env_logger` (error, warn, info, debug, trace);
    /// default `warn`
    #[argh(option, long = "log-level", default = "String::from(\"warn\")")]
    pub log_level: String,

    /// configure the clock-buffer cell: `<celltype>:<out-port>:<in-port>`,
    /// where the out port drives the sinks and the in port consumes the
    /// original driver
    #[argh(option, long = "buf")]
    pub buf: Option<TwoPortArg>,

    /// configure the optional top-level input-pad cell, same shape as `-buf`
    #[argh(option, long = "inpad")]
    pub inpad: Option<TwoPortArg>,

    /// restrict candidate wires to this name; may be given more than once.
    /// When omitted, every non-`clkbuf_inhibit` wire is a candidate
    #[argh(option, long = "select")]
    pub select: Vec<String>,

    /// silence warnings (structural diagnostics are still counted, just not
    /// logged)
    #[argh(switch, short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Opts {
    /// Build the pass configuration this invocation describes.
    pub fn pass_config(&self) -> PassConfig {
        PassConfig {
            buf: self.buf.map(|a| a.0),
            inpad: self.inpad.map(|a| a.0),
            selection: if self.select.is_empty() {
                None
            } else {
                Some(self.select.iter().map(Id::new).collect())
            },
        }
    }
}
