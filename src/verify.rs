// SPDX-License-Identifier: Apache-2.0

//! Simulation-based equivalence check between a module and its stitched
//! counterpart.

use crate::config::StitchConfig;
use crate::lut_collect::collect_luts;
use crate::netlist::value::SigBit;
use crate::netlist::{Module, Netlist};
use crate::sim::LutSimulator;
use crate::stitch_error::StitchError;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashMap;

/// Modules with at most this many primary inputs are checked on every
/// assignment; larger ones are sampled.
pub const EXHAUSTIVE_INPUT_LIMIT: usize = 16;

pub const DEFAULT_VERIFY_SAMPLES: usize = 4096;
pub const DEFAULT_VERIFY_SEED: u64 = 0x5eed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquivalenceReport {
    pub num_inputs: usize,
    pub num_signals: usize,
    pub assignments: usize,
    pub exhaustive: bool,
}

/// A signal of `before` and its counterpart in `after`, matched by name.
struct Probe {
    name: String,
    before: SigBit,
    after: Option<SigBit>,
}

fn probe(before: &Module, after: &Module, sig: SigBit) -> Probe {
    let name = before.signal_name(sig);
    let after_sig = after.wire(&name).map(|s| after.canonicalize(s));
    Probe {
        name,
        before: sig,
        after: after_sig,
    }
}

fn describe(inputs: &[Probe], bits: &[bool]) -> String {
    let parts: Vec<String> = inputs
        .iter()
        .zip(bits)
        .map(|(p, b)| format!("{}={}", p.name, *b as u8))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

/// Checks that every signal driven by a LUT in `before` has the same value
/// in `after` under the same primary-input assignment.
///
/// Signals are matched across the two modules by wire name.
pub fn check_equivalence(
    before: &Module,
    after: &Module,
    config: &StitchConfig,
    samples: usize,
    seed: u64,
) -> Result<EquivalenceReport, StitchError> {
    let before_sim = LutSimulator::new(before, config)?;
    let after_sim = LutSimulator::new(after, config)?;
    let inputs: Vec<Probe> = before_sim
        .primary_inputs()
        .into_iter()
        .map(|s| probe(before, after, s))
        .collect();
    let mut observed: Vec<Probe> = Vec::new();
    for lut in collect_luts(before, config)? {
        if !lut.output.is_const() && !observed.iter().any(|p| p.before == lut.output) {
            observed.push(probe(before, after, lut.output));
        }
    }
    if let Some(p) = observed.iter().find(|p| p.after.is_none()) {
        return Err(StitchError::DesignFormat(format!(
            "signal '{}' does not exist in the stitched module",
            p.name
        )));
    }

    let exhaustive = inputs.len() <= EXHAUSTIVE_INPUT_LIMIT;
    let assignments = if exhaustive { 1usize << inputs.len() } else { samples };
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    log::info!(
        "checking {} signals over {} primary inputs ({} {} assignments)",
        observed.len(),
        inputs.len(),
        assignments,
        if exhaustive { "exhaustive" } else { "random" }
    );

    for index in 0..assignments {
        let bits: Vec<bool> = if exhaustive {
            (0..inputs.len()).map(|i| (index >> i) & 1 != 0).collect()
        } else {
            (0..inputs.len()).map(|_| rng.gen::<bool>()).collect()
        };
        let mut before_in: HashMap<SigBit, bool> = HashMap::new();
        let mut after_in: HashMap<SigBit, bool> = HashMap::new();
        for (p, b) in inputs.iter().zip(&bits) {
            before_in.insert(p.before, *b);
            if let Some(s) = p.after {
                after_in.insert(s, *b);
            }
        }
        let before_values = before_sim.evaluate(&before_in);
        let after_values = after_sim.evaluate(&after_in);
        for p in &observed {
            let want = before_values.get(&p.before).copied().unwrap_or(false);
            let got = p
                .after
                .and_then(|s| after_values.get(&s).copied())
                .unwrap_or(false);
            if want != got {
                return Err(StitchError::EquivalenceMismatch {
                    signal: p.name.clone(),
                    assignment: describe(&inputs, &bits),
                });
            }
        }
    }

    Ok(EquivalenceReport {
        num_inputs: inputs.len(),
        num_signals: observed.len(),
        assignments,
        exhaustive,
    })
}
