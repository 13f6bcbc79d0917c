// SPDX-License-Identifier: Apache-2.0

//! The stitching pass: collect, level, search, plan, commit.

use crate::candidates::{find_merge_candidates, SearchStrategy};
use crate::commit::commit_merges;
use crate::config::StitchOptions;
use crate::levels::compute_lut_levels;
use crate::lut_collect::collect_luts;
use crate::lut_dump::dump_luts_to_path;
use crate::netlist::{Design, Netlist};
use crate::plan::{merge_kind_counts, plan_merges, MergePlan};
use crate::stitch_error::StitchError;
use std::fmt;
use std::time::{Duration, Instant};

/// What one run of the pass did.
#[derive(Debug, Clone, Default)]
pub struct StitchSummary {
    pub num_luts: usize,
    pub num_cyclic: usize,
    /// `None` when the run stopped before searching.
    pub strategy: Option<SearchStrategy>,
    pub num_candidates: usize,
    pub plans: Vec<MergePlan>,
    /// Fused cells instantiated; always `plans.len()`.
    pub num_merged: usize,
    pub elapsed: Duration,
}

impl fmt::Display for StitchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (shared, absorb) = merge_kind_counts(&self.plans);
        writeln!(f, "LUTs collected:   {}", self.num_luts)?;
        writeln!(f, "LUTs in cycles:   {}", self.num_cyclic)?;
        match self.strategy {
            Some(s) => writeln!(f, "search strategy:  {}", s)?,
            None => writeln!(f, "search strategy:  (skipped)")?,
        }
        writeln!(f, "candidates:       {}", self.num_candidates)?;
        writeln!(
            f,
            "merged pairs:     {} ({} shared-inputs, {} absorb)",
            self.num_merged, shared, absorb
        )?;
        write!(f, "elapsed:          {:.3?}", self.elapsed)
    }
}

/// Runs the pass on the design's top module.
pub fn stitch_design(
    design: &mut Design,
    options: &StitchOptions,
) -> Result<StitchSummary, StitchError> {
    let module = design.top_module_mut().ok_or(StitchError::NoTopModule)?;
    log::info!("stitching LUTs in top module '{}'", module.name());
    stitch_module(module, options)
}

/// Runs the pass on a single netlist.
pub fn stitch_module<N: Netlist>(
    netlist: &mut N,
    options: &StitchOptions,
) -> Result<StitchSummary, StitchError> {
    let start = Instant::now();
    let config = &options.config;
    let mut summary = StitchSummary::default();

    let mut luts = collect_luts(netlist, config)?;
    summary.num_luts = luts.len();
    log::info!("collected {} LUT cells", luts.len());
    if let Some(path) = &options.dump_path {
        dump_luts_to_path(path, netlist, &luts, config)?;
    }
    if luts.is_empty() {
        log::warn!("no LUT cells found; nothing to stitch");
        summary.elapsed = start.elapsed();
        return Ok(summary);
    }

    let levels = compute_lut_levels(&luts);
    summary.num_cyclic = levels.num_cyclic();
    log::info!("leveled LUT graph: max level {}", levels.max_level());

    let queue = find_merge_candidates(&luts, &levels, config);
    summary.strategy = Some(queue.strategy());
    summary.num_candidates = queue.len();
    log::info!("found {} merge candidates", queue.len());
    if queue.is_empty() {
        log::warn!("no legal merge candidates; netlist left unchanged");
        summary.elapsed = start.elapsed();
        return Ok(summary);
    }

    let plans = plan_merges(netlist, &mut luts, queue);
    summary.num_merged = commit_merges(netlist, &plans, config)?;
    summary.plans = plans;
    summary.elapsed = start.elapsed();
    log::info!(
        "merged {} LUT pairs into {} cells in {:.3?}",
        summary.num_merged,
        config.fused_cell_type,
        summary.elapsed
    );
    Ok(summary)
}
