// SPDX-License-Identifier: Apache-2.0

//! Greedy selection of non-conflicting candidates into merge plans.

use crate::candidates::{CandidateQueue, MergeCandidate, MergeKind};
use crate::fusion::{fuse_truth_tables, Placement, SHARED_SLOTS};
use crate::lut_collect::LutRecord;
use crate::netlist::value::SigBit;
use crate::netlist::Netlist;
use crate::truth_table::TruthTable64;
use std::collections::HashSet;

/// One fused cell to instantiate and the two cells it replaces. Holds
/// names and signals only, never references into the netlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub new_cell: String,
    pub kind: MergeKind,
    pub table: TruthTable64,
    /// Signals for `I0..I5`; unused slots are constant 0.
    pub inputs: [SigBit; 6],
    /// Driven by the fused cell's full-function output.
    pub z_output: SigBit,
    /// Driven by the fused cell's selector-low output.
    pub z5_output: SigBit,
    pub remove: [String; 2],
}

/// Slots for a shared-input merge: the union, constant-0 padding, and a
/// constant-1 selector in the last slot.
fn shared_input_slots(union: &[SigBit]) -> [SigBit; 6] {
    let mut slots = [SigBit::Zero; 6];
    for (slot, sig) in slots.iter_mut().zip(union.iter().take(SHARED_SLOTS)) {
        *slot = *sig;
    }
    slots[5] = SigBit::One;
    slots
}

/// Slots for an absorption: the 6-input LUT's own ports in index order
/// (unconnected ports become constant 0) with the selector's port swapped
/// into the last slot.
fn absorb_slots(lut6: &LutRecord, selector: SigBit) -> [SigBit; 6] {
    let mut slots = [SigBit::Zero; 6];
    for (port, sig) in &lut6.inputs {
        slots[*port] = *sig;
    }
    if let Some(port) = lut6.ports_of(selector).next() {
        slots.swap(port, 5);
    }
    slots
}

fn unique_name<N: Netlist>(netlist: &N, reserved: &HashSet<String>, proposed: &str) -> String {
    let mut base = proposed.to_string();
    let mut suffix = 0usize;
    loop {
        let name = netlist.uniquify(&base);
        if !reserved.contains(&name) {
            return name;
        }
        suffix += 1;
        base = format!("{}_{}", proposed, suffix);
    }
}

fn build_plan<N: Netlist>(
    netlist: &N,
    luts: &[LutRecord],
    candidate: &MergeCandidate,
    reserved: &HashSet<String>,
) -> MergePlan {
    let a = &luts[candidate.index_a];
    let b = &luts[candidate.index_b];
    let (slots, selector) = match (candidate.kind, candidate.selector) {
        (MergeKind::Absorb, Some(selector)) => {
            let lut6 = if a.arity == 6 { a } else { b };
            (absorb_slots(lut6, selector), selector)
        }
        _ => (shared_input_slots(&candidate.union_inputs), SigBit::One),
    };
    let fused = fuse_truth_tables(a, b, &slots, selector);
    let (z5_output, z_output) = match fused.placement {
        Placement::FirstLow => (a.output, b.output),
        Placement::SecondLow => (b.output, a.output),
    };
    MergePlan {
        new_cell: unique_name(netlist, reserved, &format!("{}_{}_merged", a.cell, b.cell)),
        kind: candidate.kind,
        table: fused.table,
        inputs: slots,
        z_output,
        z5_output,
        remove: [a.cell.clone(), b.cell.clone()],
    }
}

/// `(shared-input merges, absorptions)` among `plans`.
pub fn merge_kind_counts(plans: &[MergePlan]) -> (usize, usize) {
    let absorb = plans.iter().filter(|p| p.kind == MergeKind::Absorb).count();
    (plans.len() - absorb, absorb)
}

/// Pops candidates best-first, skipping any that touch an already-claimed
/// LUT, and claims both LUTs of each accepted candidate.
pub fn plan_merges<N: Netlist>(
    netlist: &N,
    luts: &mut [LutRecord],
    mut queue: CandidateQueue,
) -> Vec<MergePlan> {
    let mut plans = Vec::new();
    let mut reserved: HashSet<String> = HashSet::new();
    let mut skipped = 0usize;
    while let Some(candidate) = queue.pop() {
        if luts[candidate.index_a].is_claimed() || luts[candidate.index_b].is_claimed() {
            skipped += 1;
            continue;
        }
        luts[candidate.index_a].claim();
        luts[candidate.index_b].claim();

        let plan = build_plan(netlist, luts, &candidate, &reserved);
        log::debug!(
            "plan {}: {} + {} ({}, score {}) Z5 32'h{:08x} Z 32'h{:08x}",
            plan.new_cell,
            plan.remove[0],
            plan.remove[1],
            plan.kind,
            candidate.score,
            plan.table.low_half(),
            plan.table.high_half()
        );
        reserved.insert(plan.new_cell.clone());
        plans.push(plan);
    }
    log::info!(
        "planned {} merges ({} candidates skipped over claimed LUTs)",
        plans.len(),
        skipped
    );
    plans
}
