// SPDX-License-Identifier: Apache-2.0

//! Extraction of single-output LUT cells from a netlist.

use crate::config::StitchConfig;
use crate::netlist::value::{Const, SigBit, Trit};
use crate::netlist::Netlist;
use crate::stitch_error::StitchError;

/// One collected LUT cell. Indices into the collected `Vec<LutRecord>` are
/// the stable keys used by every later stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutRecord {
    pub cell: String,
    pub cell_type: String,
    pub arity: usize,
    /// `(port index, canonical signal)` for every connected input port, in
    /// ascending port index. Unconnected ports are omitted.
    pub inputs: Vec<(usize, SigBit)>,
    pub output: SigBit,
    /// The truth table parameter as stored on the cell.
    pub init: Const,
    claimed: bool,
}

impl LutRecord {
    pub fn new(
        cell: &str,
        cell_type: &str,
        arity: usize,
        inputs: Vec<(usize, SigBit)>,
        output: SigBit,
        init: Const,
    ) -> Self {
        LutRecord {
            cell: cell.to_string(),
            cell_type: cell_type.to_string(),
            arity,
            inputs,
            output,
            init,
            claimed: false,
        }
    }

    /// Output for input assignment `address`; addresses past the table (or
    /// past `2^arity`) read as 0.
    pub fn table_bit(&self, address: usize) -> bool {
        address < (1usize << self.arity) && self.init.bit(address) == Some(Trit::One)
    }

    /// The first `2^arity` table bits packed into a `u64`.
    pub fn table_u64(&self) -> u64 {
        let raw = self.init.to_u64_lossy();
        if self.arity >= 6 {
            raw
        } else {
            raw & ((1u64 << (1u64 << self.arity)) - 1)
        }
    }

    pub fn has_input(&self, sig: SigBit) -> bool {
        self.inputs.iter().any(|(_, s)| *s == sig)
    }

    /// Port indices whose signal is `sig`.
    pub fn ports_of(&self, sig: SigBit) -> impl Iterator<Item = usize> + '_ {
        self.inputs
            .iter()
            .filter(move |(_, s)| *s == sig)
            .map(|(p, _)| *p)
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Marks the record as consumed by a merge plan. A record is claimed at
    /// most once per run.
    pub(crate) fn claim(&mut self) {
        assert!(!self.claimed, "LUT '{}' claimed twice", self.cell);
        self.claimed = true;
    }
}

/// Collects every single-output LUT in `netlist`, in cell enumeration order.
pub fn collect_luts<N: Netlist>(
    netlist: &N,
    config: &StitchConfig,
) -> Result<Vec<LutRecord>, StitchError> {
    let mut luts = Vec::new();
    for cell in netlist.cell_names() {
        let cell_type = netlist.cell_type(&cell)?;
        let Some(arity) = config.lut_arity(cell_type) else {
            continue;
        };
        let cell_type = cell_type.to_string();

        let mut inputs = Vec::with_capacity(arity);
        for index in 0..arity {
            if let Some(sig) = netlist.port(&cell, &config.input_port(index))? {
                inputs.push((index, netlist.canonicalize(sig)));
            }
        }

        let output = netlist
            .port(&cell, &config.output_port)?
            .ok_or_else(|| StitchError::MissingPort {
                cell: cell.clone(),
                port: config.output_port.clone(),
            })?;
        let init = netlist
            .param(&cell, &config.init_param)?
            .cloned()
            .ok_or_else(|| StitchError::MissingParameter {
                cell: cell.clone(),
                param: config.init_param.clone(),
            })?;

        log::trace!(
            "collected {} ({}): {} inputs, INIT {}",
            cell,
            cell_type,
            inputs.len(),
            init
        );
        luts.push(LutRecord::new(
            &cell,
            &cell_type,
            arity,
            inputs,
            netlist.canonicalize(output),
            init,
        ));
    }
    Ok(luts)
}
