// SPDX-License-Identifier: Apache-2.0

use anyhow::{anyhow, Context};
use clap::ArgMatches;
use lut_stitch::lut_collect::collect_luts;
use lut_stitch::lut_dump::{dump_luts_to_path, write_lut_report};
use lut_stitch::netlist::json_io::read_design_from_path;
use lut_stitch::{StitchConfig, StitchError};
use std::path::Path;

pub fn handle_dump_luts(matches: &ArgMatches, config: &StitchConfig) -> anyhow::Result<()> {
    let input = matches
        .get_one::<String>("input")
        .ok_or_else(|| anyhow!("input design path is required"))?;
    let design = read_design_from_path(Path::new(input))
        .with_context(|| format!("load design {}", input))?;
    let top = design.top_module().ok_or(StitchError::NoTopModule)?;
    let luts = collect_luts(top, config)?;

    match matches.get_one::<String>("output") {
        Some(path) => dump_luts_to_path(Path::new(path), top, &luts, config)?,
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_lut_report(&mut out, top, &luts, config).context("write LUT report")?;
        }
    }
    Ok(())
}
