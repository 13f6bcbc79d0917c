// SPDX-License-Identifier: Apache-2.0

//! Equivalence classes of electrically connected signals.

use crate::netlist::value::SigBit;
use std::collections::HashMap;

/// Union-find over `SigBit`s joined by module-level alias connections.
///
/// Each class has one representative: the smallest member under `SigBit`'s
/// ordering, i.e. a constant when the class holds one, otherwise the
/// earliest-interned wire. `apply` is pure and idempotent.
#[derive(Debug, Clone, Default)]
pub struct SigMap {
    parent: HashMap<SigBit, SigBit>,
    rank: HashMap<SigBit, u32>,
    representative: HashMap<SigBit, SigBit>,
}

impl SigMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn root(&self, sig: SigBit) -> SigBit {
        let mut current = sig;
        while let Some(&parent) = self.parent.get(&current) {
            current = parent;
        }
        current
    }

    fn rep_of_root(&self, root: SigBit) -> SigBit {
        self.representative.get(&root).copied().unwrap_or(root)
    }

    /// Joins the classes of `a` and `b`.
    pub fn add(&mut self, a: SigBit, b: SigBit) {
        let root_a = self.root(a);
        let root_b = self.root(b);
        if root_a == root_b {
            return;
        }
        let preferred = self.rep_of_root(root_a).min(self.rep_of_root(root_b));
        let rank_a = self.rank.get(&root_a).copied().unwrap_or(0);
        let rank_b = self.rank.get(&root_b).copied().unwrap_or(0);
        let (keep, absorb) = if rank_a >= rank_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent.insert(absorb, keep);
        if rank_a == rank_b {
            *self.rank.entry(keep).or_insert(0) += 1;
        }
        self.representative.remove(&absorb);
        self.representative.insert(keep, preferred);
    }

    /// Returns the class representative of `sig`.
    pub fn apply(&self, sig: SigBit) -> SigBit {
        self.rep_of_root(self.root(sig))
    }
}
