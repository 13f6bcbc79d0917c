// SPDX-License-Identifier: Apache-2.0

//! Two-phase application of merge plans to a netlist.

use crate::config::StitchConfig;
use crate::netlist::Netlist;
use crate::plan::MergePlan;
use crate::stitch_error::StitchError;
use std::collections::BTreeSet;

/// Applies `plans`: every original cell named by any plan is removed before
/// any fused cell is added. Returns the number of fused cells added.
///
/// All named cells are checked to exist before the netlist is touched, so a
/// plan that refers to a missing cell fails without partial mutation.
pub fn commit_merges<N: Netlist>(
    netlist: &mut N,
    plans: &[MergePlan],
    config: &StitchConfig,
) -> Result<usize, StitchError> {
    let doomed: BTreeSet<&str> = plans
        .iter()
        .flat_map(|p| p.remove.iter().map(String::as_str))
        .collect();
    if let Some(missing) = doomed.iter().find(|c| !netlist.has_cell(c)) {
        return Err(StitchError::PlanReferencesMissingCell {
            cell: missing.to_string(),
        });
    }

    for cell in &doomed {
        netlist.remove_cell(cell)?;
    }
    log::debug!("removed {} original LUT cells", doomed.len());

    for plan in plans {
        netlist.add_cell(&plan.new_cell, &config.fused_cell_type)?;
        netlist.set_param(&plan.new_cell, &config.init_param, plan.table.to_const())?;
        for (i, sig) in plan.inputs.iter().enumerate() {
            netlist.set_port(&plan.new_cell, &config.input_port(i), *sig)?;
        }
        netlist.set_port(&plan.new_cell, &config.output_port, plan.z_output)?;
        netlist.set_port(&plan.new_cell, &config.fused_low_output_port, plan.z5_output)?;
    }
    log::info!("instantiated {} {} cells", plans.len(), config.fused_cell_type);
    Ok(plans.len())
}
