// SPDX-License-Identifier: Apache-2.0

//! Human-readable report of the collected LUTs.

use crate::config::StitchConfig;
use crate::lut_collect::LutRecord;
use crate::netlist::Netlist;
use crate::stitch_error::StitchError;
use crate::truth_table::{format_binary, format_hex};
use std::io::Write;
use std::path::Path;

fn write_lut_entry<W: Write, N: Netlist>(
    out: &mut W,
    netlist: &N,
    lut: &LutRecord,
    config: &StitchConfig,
) -> std::io::Result<()> {
    writeln!(
        out,
        "  - Cell: {} (Type: {}, Size: {})",
        lut.cell, lut.cell_type, lut.arity
    )?;
    writeln!(out, "    Output: {}", netlist.signal_name(lut.output))?;
    writeln!(out, "    Inputs:")?;
    for (port, sig) in &lut.inputs {
        writeln!(
            out,
            "      .{}: {}",
            config.input_port(*port),
            netlist.signal_name(*sig)
        )?;
    }
    let width = lut.init.len();
    writeln!(out, "    INIT: {}'h{}", width, format_hex(&lut.init))?;
    writeln!(out, "    INIT: {}'b{}", width, format_binary(&lut.init))?;
    writeln!(out)
}

/// Writes the report for `luts` (collected from `netlist`) to `out`.
pub fn write_lut_report<W: Write, N: Netlist>(
    out: &mut W,
    netlist: &N,
    luts: &[LutRecord],
    config: &StitchConfig,
) -> std::io::Result<()> {
    writeln!(out, "--- Dump of all collected LUTs ({} total) ---", luts.len())?;
    writeln!(out)?;
    for lut in luts {
        write_lut_entry(out, netlist, lut, config)?;
    }
    writeln!(out, "--- End of LUT dump ---")
}

pub fn dump_luts_to_path<N: Netlist>(
    path: &Path,
    netlist: &N,
    luts: &[LutRecord],
    config: &StitchConfig,
) -> Result<(), StitchError> {
    let io_err = |source| StitchError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(io_err)?;
    let mut out = std::io::BufWriter::new(file);
    write_lut_report(&mut out, netlist, luts, config).map_err(io_err)?;
    out.flush().map_err(io_err)?;
    log::info!("dumped {} LUTs to {}", luts.len(), path.display());
    Ok(())
}
