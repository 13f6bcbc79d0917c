// SPDX-License-Identifier: Apache-2.0

//! Discovery and scoring of legal LUT pairings.

use crate::config::StitchConfig;
use crate::fusion::{absorb_match, SHARED_SLOTS};
use crate::levels::LutLevels;
use crate::lut_collect::LutRecord;
use crate::netlist::value::SigBit;
use rayon::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

/// Score floor for absorption; always above any shared-input score.
pub const ABSORB_BASE_SCORE: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MergeKind {
    /// Both LUTs read only from a union of at most five signals.
    SharedInputs,
    /// A 6-input LUT already contains the smaller LUT's function on one
    /// side of its selector input.
    Absorb,
}

impl fmt::Display for MergeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeKind::SharedInputs => write!(f, "shared-inputs"),
            MergeKind::Absorb => write!(f, "absorb"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Exhaustive,
    Windowed,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Exhaustive => write!(f, "exhaustive"),
            SearchStrategy::Windowed => write!(f, "windowed"),
        }
    }
}

/// A legal, scored pairing of two collected LUTs (`index_a < index_b`).
#[derive(Debug, Clone)]
pub struct MergeCandidate {
    pub index_a: usize,
    pub index_b: usize,
    pub score: i64,
    /// Distinct wire inputs of the pair: for shared inputs, the union in
    /// canonical order; for absorption, the 6-input LUT's own inputs.
    pub union_inputs: Vec<SigBit>,
    pub kind: MergeKind,
    pub selector: Option<SigBit>,
}

impl Ord for MergeCandidate {
    /// Highest score first; equal scores prefer the lexicographically
    /// smallest `(index_a, index_b)`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| {
                Reverse((self.index_a, self.index_b)).cmp(&Reverse((other.index_a, other.index_b)))
            })
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MergeCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MergeCandidate {}

/// Every discovered candidate, in one max-priority structure.
#[derive(Debug)]
pub struct CandidateQueue {
    heap: BinaryHeap<MergeCandidate>,
    strategy: SearchStrategy,
}

impl CandidateQueue {
    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn pop(&mut self) -> Option<MergeCandidate> {
        self.heap.pop()
    }
}

pub fn choose_strategy(num_luts: usize, config: &StitchConfig) -> SearchStrategy {
    if num_luts <= config.exhaustive_lut_limit {
        SearchStrategy::Exhaustive
    } else {
        SearchStrategy::Windowed
    }
}

fn wire_inputs(levels: &LutLevels, lut: usize) -> Vec<SigBit> {
    levels
        .ordered_inputs(lut)
        .iter()
        .copied()
        .filter(|s| !s.is_const())
        .collect()
}

/// Shared count is taken over arities, so repeated or constant-tied ports
/// still count toward the overlap.
fn shared_inputs_candidate(
    luts: &[LutRecord],
    a: usize,
    b: usize,
    inputs_a: &[SigBit],
    inputs_b: &[SigBit],
) -> Option<MergeCandidate> {
    let mut union: Vec<SigBit> = inputs_a.to_vec();
    for sig in inputs_b {
        if !union.contains(sig) {
            union.push(*sig);
        }
    }
    if union.len() > SHARED_SLOTS {
        return None;
    }
    let shared = (luts[a].arity + luts[b].arity).saturating_sub(union.len());
    let score = shared as i64 * 100 - union.len() as i64;
    Some(MergeCandidate {
        index_a: a,
        index_b: b,
        score,
        union_inputs: union,
        kind: MergeKind::SharedInputs,
        selector: None,
    })
}

fn absorb_candidate(
    luts: &[LutRecord],
    a: usize,
    b: usize,
    inputs_a: &[SigBit],
    inputs_b: &[SigBit],
) -> Option<MergeCandidate> {
    let (big, small, big_inputs, small_inputs) = match (luts[a].arity, luts[b].arity) {
        (6, k) if k < 6 => (a, b, inputs_a, inputs_b),
        (k, 6) if k < 6 => (b, a, inputs_b, inputs_a),
        _ => return None,
    };
    if !small_inputs.iter().all(|s| big_inputs.contains(s)) {
        return None;
    }
    let mut unused = big_inputs.iter().filter(|s| !small_inputs.contains(s));
    let selector = *unused.next()?;
    if unused.next().is_some() {
        return None;
    }

    let matched = absorb_match(&luts[big], &luts[small], selector);
    if !matched.selector_low {
        if matched.any() {
            log::debug!(
                "{} matches {} only with selector high; not placeable on Z5",
                luts[small].cell,
                luts[big].cell
            );
        }
        return None;
    }
    Some(MergeCandidate {
        index_a: a,
        index_b: b,
        score: ABSORB_BASE_SCORE + luts[small].arity as i64 * 100,
        union_inputs: big_inputs.to_vec(),
        kind: MergeKind::Absorb,
        selector: Some(selector),
    })
}

/// Evaluates both legality rules for the pair `(a, b)` and returns every
/// legal candidate, absorption first.
pub fn evaluate_pair(
    luts: &[LutRecord],
    levels: &LutLevels,
    a: usize,
    b: usize,
) -> Vec<MergeCandidate> {
    let (a, b) = (a.min(b), a.max(b));
    if a == b || levels.is_cyclic(a) || levels.is_cyclic(b) {
        return Vec::new();
    }
    let inputs_a = wire_inputs(levels, a);
    let inputs_b = wire_inputs(levels, b);
    absorb_candidate(luts, a, b, &inputs_a, &inputs_b)
        .into_iter()
        .chain(shared_inputs_candidate(luts, a, b, &inputs_a, &inputs_b))
        .collect()
}

/// Partners tested against `anchor`; every unordered pair is produced by
/// exactly one anchor.
fn partners(
    anchor: usize,
    num_luts: usize,
    levels: &LutLevels,
    buckets: &[Vec<usize>],
    strategy: SearchStrategy,
) -> Vec<usize> {
    if levels.is_cyclic(anchor) {
        return Vec::new();
    }
    match strategy {
        SearchStrategy::Exhaustive => ((anchor + 1)..num_luts)
            .filter(|j| !levels.is_cyclic(*j))
            .collect(),
        SearchStrategy::Windowed => {
            let level = levels.level(anchor) as usize;
            let same = buckets[level].iter().copied().filter(|j| *j > anchor);
            let next = buckets.get(level + 1).into_iter().flatten().copied();
            same.chain(next).collect()
        }
    }
}

/// Scores every pair the chosen strategy tests and collects the legal ones.
pub fn find_merge_candidates(
    luts: &[LutRecord],
    levels: &LutLevels,
    config: &StitchConfig,
) -> CandidateQueue {
    let n = luts.len();
    let strategy = choose_strategy(n, config);
    let buckets = match strategy {
        SearchStrategy::Windowed => levels.buckets(),
        SearchStrategy::Exhaustive => Vec::new(),
    };
    log::info!(
        "searching merge candidates among {} LUTs ({} strategy{})",
        n,
        strategy,
        if config.parallel_search { ", parallel" } else { "" }
    );

    let evaluate_anchor = |i: usize| -> Vec<MergeCandidate> {
        partners(i, n, levels, &buckets, strategy)
            .into_iter()
            .flat_map(|j| evaluate_pair(luts, levels, i, j))
            .collect()
    };
    let found: Vec<MergeCandidate> = if config.parallel_search {
        (0..n).into_par_iter().flat_map_iter(evaluate_anchor).collect()
    } else {
        (0..n).flat_map(evaluate_anchor).collect()
    };

    for c in &found {
        log::trace!(
            "candidate {} + {}: {} score {}",
            luts[c.index_a].cell,
            luts[c.index_b].cell,
            c.kind,
            c.score
        );
    }
    CandidateQueue {
        heap: found.into_iter().collect(),
        strategy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::compute_lut_levels;
    use crate::lut_collect::collect_luts;
    use crate::netlist::{Module, Netlist};
    use crate::test_utils::{add_lut, make_wires, table_from_fn};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn search(m: &Module, config: &StitchConfig) -> (Vec<LutRecord>, CandidateQueue) {
        let luts = collect_luts(m, config).unwrap();
        let levels = compute_lut_levels(&luts);
        let queue = find_merge_candidates(&luts, &levels, config);
        (luts, queue)
    }

    fn drain(mut queue: CandidateQueue) -> Vec<MergeCandidate> {
        let mut out = Vec::new();
        while let Some(c) = queue.pop() {
            out.push(c);
        }
        out
    }

    fn candidate(a: usize, b: usize, score: i64, kind: MergeKind) -> MergeCandidate {
        MergeCandidate {
            index_a: a,
            index_b: b,
            score,
            union_inputs: Vec::new(),
            kind,
            selector: None,
        }
    }

    #[test]
    fn heap_order_is_score_then_smallest_indices() {
        let heap: BinaryHeap<MergeCandidate> = vec![
            candidate(0, 3, 198, MergeKind::SharedInputs),
            candidate(1, 2, 198, MergeKind::SharedInputs),
            candidate(0, 2, 198, MergeKind::SharedInputs),
            candidate(4, 5, 10_200, MergeKind::Absorb),
            candidate(0, 1, -2, MergeKind::SharedInputs),
        ]
        .into_iter()
        .collect();
        let order: Vec<(usize, usize)> = heap
            .into_sorted_vec()
            .into_iter()
            .rev()
            .map(|c| (c.index_a, c.index_b))
            .collect();
        assert_eq!(order, vec![(4, 5), (0, 2), (0, 3), (1, 2), (0, 1)]);
    }

    #[test]
    fn shared_inputs_score_counts_overlap() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 8);
        add_lut(&mut m, "a", &[w[0], w[1], w[2]], w[5], 0x96);
        add_lut(&mut m, "b", &[w[1], w[2], w[3]], w[6], 0xe8);
        let (_, queue) = search(&m, &StitchConfig::default());
        let all = drain(queue);
        assert_eq!(all.len(), 1);
        let c = &all[0];
        assert_eq!(c.kind, MergeKind::SharedInputs);
        // shared = 3 + 3 - 4, union = 4.
        assert_eq!(c.score, 2 * 100 - 4);
        assert_eq!(c.union_inputs, vec![w[0], w[1], w[2], w[3]]);
        assert_eq!(c.selector, None);
    }

    #[test]
    fn union_above_five_is_not_shared_legal() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 8);
        add_lut(&mut m, "a", &[w[0], w[1], w[2]], w[6], 0x96);
        add_lut(&mut m, "b", &[w[3], w[4], w[5]], w[7], 0x96);
        let (_, queue) = search(&m, &StitchConfig::default());
        assert!(queue.is_empty());
    }

    #[test]
    fn duplicate_ports_count_once() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 8);
        // Five distinct inputs across six ports, plus one more on b.
        add_lut(&mut m, "a", &[w[0], w[1], w[2], w[3], w[4], w[0]], w[6], 0);
        add_lut(&mut m, "b", &[w[4]], w[7], 0b01);
        let (_, queue) = search(&m, &StitchConfig::default());
        let all = drain(queue);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].union_inputs.len(), 5);
        // shared = 6 + 1 - 5 over arities.
        assert_eq!(all[0].score, 2 * 100 - 5);
    }

    #[test]
    fn repeated_ports_count_toward_shared_score() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 5);
        add_lut(&mut m, "a", &[w[0], w[1], w[0], w[1]], w[3], 0x8008);
        add_lut(&mut m, "b", &[w[0], w[2]], w[4], 0b0110);
        let luts = collect_luts(&m, &StitchConfig::default()).unwrap();
        let levels = compute_lut_levels(&luts);
        let found = evaluate_pair(&luts, &levels, 0, 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].union_inputs, vec![w[0], w[1], w[2]]);
        // shared = 4 + 2 - 3.
        assert_eq!(found[0].score, 3 * 100 - 3);
    }

    fn absorb_netlist(small_table: u64) -> (Module, Vec<SigBit>) {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 5);
        let (i0, i1, s) = (w[0], w[1], w[2]);
        let t6 = table_from_fn(6, |a| {
            let b = |i: usize| (a >> i) & 1 != 0;
            (b(0) && b(1)) || (b(5) && !b(1))
        });
        m.add_cell("big", "GTP_LUT6").unwrap();
        m.set_port("big", "I0", i0).unwrap();
        m.set_port("big", "I1", i1).unwrap();
        m.set_port("big", "I5", s).unwrap();
        m.set_port("big", "Z", w[3]).unwrap();
        m.set_param("big", "INIT", crate::netlist::Const::from_u64(t6, 64))
            .unwrap();
        add_lut(&mut m, "small", &[i0, i1], w[4], small_table);
        (m, w)
    }

    #[test]
    fn absorb_outranks_shared_inputs() {
        let (m, w) = absorb_netlist(0b1000);
        let (luts, queue) = search(&m, &StitchConfig::default());
        let all = drain(queue);
        // Both rules are legal for the pair; both are queued.
        assert_eq!(all.len(), 2);
        let c = &all[0];
        assert_eq!(c.kind, MergeKind::Absorb);
        assert_eq!(c.selector, Some(w[2]));
        assert_eq!(c.score, ABSORB_BASE_SCORE + 200);
        assert_eq!(luts[c.index_a].cell, "big");
        assert_eq!(all[1].kind, MergeKind::SharedInputs);
        assert_eq!((all[1].index_a, all[1].index_b), (c.index_a, c.index_b));
    }

    #[test]
    fn absorb_mismatch_falls_back_to_shared_inputs() {
        // OR instead of AND: no absorption, but the union still fits.
        let (m, _) = absorb_netlist(0b1110);
        let (_, queue) = search(&m, &StitchConfig::default());
        let all = drain(queue);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, MergeKind::SharedInputs);
        // shared = 6 + 2 - 3; big's unconnected ports still count.
        assert_eq!(all[0].score, 5 * 100 - 3);
    }

    #[test]
    fn selector_high_match_is_not_absorbed() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 8);
        let ins: Vec<SigBit> = w[..6].to_vec();
        let bit = |a: usize, i: usize| (a >> i) & 1 != 0;
        // I5 ? (I0 & I1) : I2
        let t6 = table_from_fn(6, |a| if bit(a, 5) { bit(a, 0) && bit(a, 1) } else { bit(a, 2) });
        add_lut(&mut m, "big", &ins, w[6], t6);
        // I0 & I1 over I0..I4: equal to big only where I5 is 1.
        let t5 = table_from_fn(5, |a| bit(a, 0) && bit(a, 1));
        add_lut(&mut m, "small", &ins[..5], w[7], t5);

        let luts = collect_luts(&m, &StitchConfig::default()).unwrap();
        let levels = compute_lut_levels(&luts);
        let found = evaluate_pair(&luts, &levels, 0, 1);
        assert!(found.iter().all(|c| c.kind != MergeKind::Absorb));
        // Six distinct wires leave no room for a shared-input merge either.
        assert!(found.is_empty());
    }

    #[test]
    fn cyclic_luts_are_never_paired() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 3);
        add_lut(&mut m, "a", &[w[0], w[2]], w[1], 0b0110);
        add_lut(&mut m, "b", &[w[1]], w[2], 0b01);
        let (_, queue) = search(&m, &StitchConfig::default());
        assert!(queue.is_empty());
    }

    fn layered_netlist() -> Module {
        // Level 0: p0, p1. Level 1: q (reads p0). Level 2: r (reads q).
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 7);
        add_lut(&mut m, "p0", &[w[0]], w[1], 0b10);
        add_lut(&mut m, "p1", &[w[2]], w[3], 0b01);
        add_lut(&mut m, "q", &[w[1]], w[4], 0b01);
        add_lut(&mut m, "r", &[w[4]], w[5], 0b01);
        m
    }

    #[test_case(2048, SearchStrategy::Exhaustive, 6; "exhaustive tests all pairs")]
    #[test_case(2, SearchStrategy::Windowed, 4; "windowed skips distant levels")]
    fn strategy_selects_pairs(limit: usize, want_strategy: SearchStrategy, want_count: usize) {
        let m = layered_netlist();
        let config = StitchConfig {
            exhaustive_lut_limit: limit,
            ..StitchConfig::default()
        };
        let (_, queue) = search(&m, &config);
        assert_eq!(queue.strategy(), want_strategy);
        assert_eq!(queue.len(), want_count);
    }

    #[test]
    fn parallel_search_matches_serial() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 24);
        for i in 0..12 {
            let ins = [w[i % 6], w[(i + 1) % 6], w[(i * 5) % 7]];
            add_lut(&mut m, &format!("u{:02}", i), &ins, w[12 + i], 0x96 ^ i as u64);
        }
        let serial = drain(search(&m, &StitchConfig::default()).1);
        let parallel_config = StitchConfig {
            parallel_search: true,
            ..StitchConfig::default()
        };
        let parallel = drain(search(&m, &parallel_config).1);
        let key = |c: &MergeCandidate| (c.index_a, c.index_b, c.score, c.kind);
        assert_eq!(
            serial.iter().map(key).collect::<Vec<_>>(),
            parallel.iter().map(key).collect::<Vec<_>>()
        );
    }
}
