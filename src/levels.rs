// SPDX-License-Identifier: Apache-2.0

//! Topological leveling of the LUT-to-LUT dependency graph.
//!
//! There is an edge `u -> v` when LUT `u`'s canonical output is one of LUT
//! `v`'s canonical inputs. A LUT's level is the length of the longest chain
//! of such edges ending at it, so `level(u) < level(v)` along every edge.
//!
//! LUTs that sit on (or behind) a dependency cycle never drain from the
//! worklist; they get level 0, are flagged as cyclic, and are left out of
//! pairing.

use crate::lut_collect::LutRecord;
use crate::netlist::value::SigBit;
use std::collections::{HashMap, VecDeque};

/// Per-run leveling result, indexed like the collected `LutRecord`s.
#[derive(Debug, Clone)]
pub struct LutLevels {
    levels: Vec<u32>,
    cyclic: Vec<bool>,
    fanout: Vec<Vec<usize>>,
    ordered_inputs: Vec<Vec<SigBit>>,
}

impl LutLevels {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, lut: usize) -> u32 {
        self.levels[lut]
    }

    /// True when the LUT could not be leveled because of a dependency cycle.
    pub fn is_cyclic(&self, lut: usize) -> bool {
        self.cyclic[lut]
    }

    pub fn num_cyclic(&self) -> usize {
        self.cyclic.iter().filter(|c| **c).count()
    }

    pub fn max_level(&self) -> u32 {
        self.levels.iter().copied().max().unwrap_or(0)
    }

    /// LUTs whose inputs include `lut`'s output, ascending and deduplicated.
    pub fn fanout(&self, lut: usize) -> &[usize] {
        &self.fanout[lut]
    }

    /// Distinct canonical inputs of `lut`: primary inputs first (in port
    /// order), then LUT-driven inputs by ascending driver level.
    pub fn ordered_inputs(&self, lut: usize) -> &[SigBit] {
        &self.ordered_inputs[lut]
    }

    /// Non-cyclic LUT indices bucketed by level; bucket `k` holds level `k`
    /// in ascending index order.
    pub fn buckets(&self) -> Vec<Vec<usize>> {
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); self.max_level() as usize + 1];
        for (i, level) in self.levels.iter().enumerate() {
            if !self.cyclic[i] {
                buckets[*level as usize].push(i);
            }
        }
        buckets
    }
}

/// Levels `luts` with a Kahn-style worklist.
pub fn compute_lut_levels(luts: &[LutRecord]) -> LutLevels {
    let n = luts.len();

    let mut drivers: HashMap<SigBit, Vec<usize>> = HashMap::new();
    for (i, lut) in luts.iter().enumerate() {
        if !lut.output.is_const() {
            drivers.entry(lut.output).or_default().push(i);
        }
    }

    let mut fanout: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (v, lut) in luts.iter().enumerate() {
        for (_, sig) in &lut.inputs {
            if let Some(us) = drivers.get(sig) {
                for &u in us {
                    fanout[u].push(v);
                }
            }
        }
    }
    for succs in &mut fanout {
        succs.sort_unstable();
        succs.dedup();
    }

    let mut indegree: Vec<u32> = vec![0; n];
    for succs in &fanout {
        for &v in succs {
            indegree[v] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|i| indegree[*i] == 0).collect();
    let mut levels: Vec<u32> = vec![0; n];
    let mut visited: Vec<bool> = vec![false; n];
    while let Some(u) = queue.pop_front() {
        visited[u] = true;
        for &v in &fanout[u] {
            levels[v] = levels[v].max(levels[u] + 1);
            indegree[v] -= 1;
            if indegree[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    let cyclic: Vec<bool> = visited.iter().map(|v| !v).collect();
    let num_cyclic = cyclic.iter().filter(|c| **c).count();
    if num_cyclic > 0 {
        let sample: Vec<&str> = (0..n)
            .filter(|i| cyclic[*i])
            .take(5)
            .map(|i| luts[i].cell.as_str())
            .collect();
        log::warn!(
            "dependency cycle among LUTs; {} LUTs left unleveled and excluded from pairing (sample: {})",
            num_cyclic,
            sample.join(", ")
        );
        for i in 0..n {
            if cyclic[i] {
                levels[i] = 0;
            }
        }
    }

    let ordered_inputs = luts
        .iter()
        .map(|lut| order_inputs(lut, &drivers, &levels))
        .collect();

    LutLevels {
        levels,
        cyclic,
        fanout,
        ordered_inputs,
    }
}

fn order_inputs(
    lut: &LutRecord,
    drivers: &HashMap<SigBit, Vec<usize>>,
    levels: &[u32],
) -> Vec<SigBit> {
    // Key: (driven by a LUT, driver level, first port index).
    let mut keyed: Vec<((bool, u32, usize), SigBit)> = Vec::with_capacity(lut.inputs.len());
    for (port, sig) in &lut.inputs {
        if keyed.iter().any(|(_, s)| s == sig) {
            continue;
        }
        let key = match drivers.get(sig) {
            Some(us) => {
                let level = us.iter().map(|u| levels[*u]).max().unwrap_or(0);
                (true, level, *port)
            }
            None => (false, 0, *port),
        };
        keyed.push((key, *sig));
    }
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, sig)| sig).collect()
}
