//! `clkbuf`: CLI entry point for the clock-buffer insertion pass.
mod cmdline;

use clkbuf_ir::{read_design, write_design};
use clkbuf_opt::config::CellTypeConfig;
use clkbuf_utils::ClkbufResult;
use cmdline::Opts;
use std::fs::File;
use std::io::{stdin, BufReader};

fn main() -> ClkbufResult<()> {
    let opts: Opts = argh::from_env();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(opts.log_level.as_str()))
        .format_timestamp(None)
        .init();

    let config = opts.pass_config();
    let cell_types = CellTypeConfig::default();

    let mut design = match &opts.file {
        Some(path) => read_design(BufReader::new(File::open(path)?))?,
        None => read_design(BufReader::new(stdin()))?,
    };

    if let Some(lib_path) = &opts.lib_path {
        let mut lib_design = read_design(BufReader::new(File::open(lib_path)?))?;
        for module in lib_design.modules.drain() {
            if design.find(module.name).is_none() {
                design.add_module(module);
            }
        }
    }

    let top = design.top_name()?;
    log::debug!("clkbuf: top module is `{top}`");

    let summary = clkbuf_opt::run(&mut design, &config, &cell_types)?;
    if !opts.quiet {
        log::info!(
            "clkbuf: {} module(s) processed, {} generated-clock diagnostic(s)",
            summary.modules_processed,
            summary.generated_clocks
        );
    }

    let mut output = opts.output;
    write_design(&design, output.get_write()?)?;
    Ok(())
}
