// SPDX-License-Identifier: Apache-2.0

//! Truth-table synthesis for the dual-output fused LUT.
//!
//! The fused cell has six address lines `I0..I5` and a 64-bit table `T`:
//! - `Z5 = T[0, I4..I0]`, i.e. the low 32 bits, with `I5` read as 0;
//! - `Z  = T[I5, I4..I0]`, the full 6-input function.
//!
//! Slot 5 carries the selector. One source LUT (the one that does not use
//! the selector) is laid into the low half; the other is laid into the high
//! half with the selector forced to 1.

use crate::lut_collect::LutRecord;
use crate::netlist::value::SigBit;
use crate::truth_table::TruthTable64;

/// Number of fused-cell address lines shared by both outputs.
pub const SHARED_SLOTS: usize = 5;

/// Which of the two source LUTs drives which fused output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The first source feeds `Z5`, the second feeds `Z`.
    FirstLow,
    /// The second source feeds `Z5`, the first feeds `Z`.
    SecondLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusedTable {
    pub table: TruthTable64,
    pub placement: Placement,
}

/// Address into `lut`'s own table for fused address `shared_address`.
///
/// Each wire-driven port copies the bit of the first shared slot carrying
/// its signal; a port whose signal is in no shared slot contributes 0, and
/// constant-driven ports read their constant. When `forced_high` is given,
/// ports carrying that signal read 1 regardless.
fn source_address(
    lut: &LutRecord,
    shared: &[SigBit],
    shared_address: usize,
    forced_high: Option<SigBit>,
) -> usize {
    let mut address = 0usize;
    for (port, sig) in &lut.inputs {
        let bit = match sig {
            _ if Some(*sig) == forced_high => true,
            SigBit::One => true,
            SigBit::Zero | SigBit::Undef => false,
            SigBit::Wire(_) => match shared.iter().position(|s| s == sig) {
                Some(slot) => (shared_address >> slot) & 1 != 0,
                None => false,
            },
        };
        if bit {
            address |= 1 << port;
        }
    }
    address
}

/// Computes the fused 64-bit table for `first` and `second` given the six
/// fused input slots and the selector signal.
///
/// The source that does not use `selector` feeds `Z5`; when neither does,
/// `first` feeds `Z5`.
pub fn fuse_truth_tables(
    first: &LutRecord,
    second: &LutRecord,
    slots: &[SigBit; 6],
    selector: SigBit,
) -> FusedTable {
    let placement = if first.has_input(selector) {
        Placement::SecondLow
    } else {
        Placement::FirstLow
    };
    let (low_lut, high_lut) = match placement {
        Placement::FirstLow => (first, second),
        Placement::SecondLow => (second, first),
    };
    let shared = &slots[..SHARED_SLOTS];

    let mut low = 0u32;
    let mut high = 0u32;
    for i in 0..(1usize << SHARED_SLOTS) {
        if low_lut.table_bit(source_address(low_lut, shared, i, None)) {
            low |= 1 << i;
        }
        if high_lut.table_bit(source_address(high_lut, shared, i, Some(selector))) {
            high |= 1 << i;
        }
    }
    FusedTable {
        table: TruthTable64::from_halves(low, high),
        placement,
    }
}

/// Outcome of testing whether a 6-input LUT can absorb a smaller one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbsorbMatch {
    /// The big LUT restricted to selector = 0 equals the small LUT.
    pub selector_low: bool,
    /// The big LUT restricted to selector = 1 equals the small LUT.
    pub selector_high: bool,
}

impl AbsorbMatch {
    pub fn any(self) -> bool {
        self.selector_low || self.selector_high
    }
}

/// Port index of the first port of `lut6` carrying `sig`.
fn first_port(lut6: &LutRecord, sig: SigBit) -> Option<usize> {
    lut6.ports_of(sig).next()
}

/// Addresses of `lut6`'s table that can actually occur: unconnected ports
/// read 0, constant-driven ports read their constant, and ports sharing a
/// signal read the same value.
fn reachable_addresses(lut6: &LutRecord) -> TruthTable64 {
    let mut care = TruthTable64::const1();
    for port in 0..6 {
        let var = TruthTable64::var(port);
        match lut6.inputs.iter().find(|(p, _)| *p == port).map(|(_, s)| *s) {
            None | Some(SigBit::Zero) => care = care.and(var.not()),
            Some(SigBit::One) => care = care.and(var),
            Some(sig) => {
                if let Some(first) = first_port(lut6, sig).filter(|f| *f != port) {
                    let same = var.xor(TruthTable64::var(first)).not();
                    care = care.and(same);
                }
            }
        }
    }
    care
}

/// Expands `small`'s table over `lut6`'s six address lines.
///
/// For every true row of `small`, ANDs together the single-variable
/// patterns of the `lut6` slots its ports map to (complemented where the
/// row's bit is 0) and ORs the result in. Rows that disagree with an
/// unconnected (read as 0) or constant-driven port are skipped, matching
/// how fusion reads such ports. Returns `None` if some wire input of
/// `small` is not an input of `lut6`.
pub fn expand_to_lut6(lut6: &LutRecord, small: &LutRecord) -> Option<TruthTable64> {
    let mut port_slots = Vec::with_capacity(small.inputs.len());
    let mut wire_mask = 0usize;
    let mut fixed_ones = 0usize;
    for (port, sig) in &small.inputs {
        match sig {
            SigBit::Wire(_) => {
                port_slots.push((*port, first_port(lut6, *sig)?));
                wire_mask |= 1 << port;
            }
            SigBit::One => fixed_ones |= 1 << port,
            SigBit::Zero | SigBit::Undef => {}
        }
    }

    let mut expanded = TruthTable64::const0();
    for row in 0..(1usize << small.arity) {
        if row & !wire_mask != fixed_ones || !small.table_bit(row) {
            continue;
        }
        let mut target = TruthTable64::const1();
        for (port, slot) in &port_slots {
            let var = TruthTable64::var(*slot);
            target = if (row >> port) & 1 != 0 {
                target.and(var)
            } else {
                target.and(var.not())
            };
        }
        expanded = expanded.or(target);
    }
    Some(expanded)
}

/// Compares `small`'s expansion against `lut6` on each half of the
/// `selector` split, over reachable addresses only.
pub fn absorb_match(lut6: &LutRecord, small: &LutRecord, selector: SigBit) -> AbsorbMatch {
    let Some(selector_port) = first_port(lut6, selector) else {
        return AbsorbMatch::default();
    };
    let Some(expanded) = expand_to_lut6(lut6, small) else {
        return AbsorbMatch::default();
    };
    let sel_mask = TruthTable64::var(selector_port);
    let care = reachable_addresses(lut6);
    let diff = TruthTable64(lut6.table_u64()).xor(expanded).and(care);
    AbsorbMatch {
        selector_low: diff.and(sel_mask.not()) == TruthTable64::const0(),
        selector_high: diff.and(sel_mask) == TruthTable64::const0(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Module;
    use crate::test_utils::{make_wires, table_from_fn};
    use pretty_assertions::assert_eq;

    fn lut(name: &str, inputs: &[SigBit], output: SigBit, table: u64) -> LutRecord {
        let arity = inputs.len();
        LutRecord::new(
            name,
            &format!("GTP_LUT{}", arity),
            arity,
            inputs.iter().copied().enumerate().collect(),
            output,
            crate::netlist::value::Const::from_u64(table, 1 << arity),
        )
    }

    fn bit(a: usize, i: usize) -> bool {
        (a >> i) & 1 != 0
    }

    #[test]
    fn shared_inputs_pair_of_one_input_luts() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 4);
        let (x, y) = (w[0], w[1]);
        let buf = lut("buf", &[x], w[2], 0b10);
        let inv = lut("inv", &[y], w[3], 0b01);
        let slots = [x, y, SigBit::Zero, SigBit::Zero, SigBit::Zero, SigBit::One];
        let fused = fuse_truth_tables(&buf, &inv, &slots, SigBit::One);
        assert_eq!(fused.placement, Placement::FirstLow);

        for xv in 0..2usize {
            for yv in 0..2usize {
                let low_addr = xv | (yv << 1);
                let full_addr = low_addr | (1 << 5);
                assert_eq!(fused.table.get_bit(low_addr), xv == 1, "Z5 x={} y={}", xv, yv);
                assert_eq!(fused.table.get_bit(full_addr), yv == 0, "Z x={} y={}", xv, yv);
            }
        }
    }

    #[test]
    fn shared_inputs_exact_over_reordered_union() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 7);
        // a(w0, w1, w2) = majority; b(w3, w1, w4) = w3 ^ w1 ^ w4.
        let maj = table_from_fn(3, |a| a.count_ones() >= 2);
        let par = table_from_fn(3, |a| a.count_ones() % 2 == 1);
        let a = lut("a", &[w[0], w[1], w[2]], w[5], maj);
        let b = lut("b", &[w[3], w[1], w[4]], w[6], par);
        // Union in a scrambled order.
        let slots = [w[4], w[2], w[1], w[3], w[0], SigBit::One];
        let fused = fuse_truth_tables(&a, &b, &slots, SigBit::One);

        for assign in 0..32usize {
            let val = |s: SigBit| bit(assign, slots.iter().position(|x| *x == s).unwrap());
            let want_a = [val(w[0]), val(w[1]), val(w[2])].iter().filter(|v| **v).count() >= 2;
            let want_b = val(w[3]) ^ val(w[1]) ^ val(w[4]);
            assert_eq!(fused.table.get_bit(assign), want_a);
            assert_eq!(fused.table.get_bit(assign | 32), want_b);
        }
    }

    #[test]
    fn absorb_discovers_low_match() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 5);
        let (i0, i1, s) = (w[0], w[1], w[2]);
        // 6-input LUT with only I0, I1, I5 connected:
        // (I0 & I1) | (I5 & !I1).
        let t6 = table_from_fn(6, |a| (bit(a, 0) && bit(a, 1)) || (bit(a, 5) && !bit(a, 1)));
        let big = LutRecord::new(
            "big",
            "GTP_LUT6",
            6,
            vec![(0, i0), (1, i1), (5, s)],
            w[3],
            crate::netlist::value::Const::from_u64(t6, 64),
        );
        let small = lut("and", &[i0, i1], w[4], 0b1000);

        let m = absorb_match(&big, &small, s);
        assert!(m.selector_low);
        assert!(!m.selector_high);
    }

    #[test]
    fn absorb_rejects_unrelated_function() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 8);
        let ins: Vec<SigBit> = w[..6].to_vec();
        let xor6 = table_from_fn(6, |a| a.count_ones() % 2 == 1);
        let big = lut("big", &ins, w[6], xor6);
        let and5 = lut("and5", &ins[..5], w[7], 1 << 31);
        let m = absorb_match(&big, &and5, ins[5]);
        assert!(!m.any());
    }

    #[test]
    fn absorb_with_high_match_detected() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 8);
        let ins: Vec<SigBit> = w[..6].to_vec();
        // I5 ? (I0 & I1) : I2
        let t6 = table_from_fn(6, |a| {
            if bit(a, 5) {
                bit(a, 0) && bit(a, 1)
            } else {
                bit(a, 2)
            }
        });
        let big = lut("big", &ins, w[6], t6);
        // Small LUT over I0..I4 computing I0 & I1.
        let t5 = table_from_fn(5, |a| bit(a, 0) && bit(a, 1));
        let small = lut("small", &ins[..5], w[7], t5);
        let m = absorb_match(&big, &small, ins[5]);
        assert!(!m.selector_low);
        assert!(m.selector_high);
    }

    #[test]
    fn expand_fails_when_input_not_shared() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 9);
        let big = lut("big", &w[..6], w[6], 0);
        let small = lut("small", &[w[0], w[7]], w[8], 0b1000);
        assert_eq!(expand_to_lut6(&big, &small), None);
    }

    #[test]
    fn absorb_fusion_reproduces_both_functions() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 8);
        let ins: Vec<SigBit> = w[..6].to_vec();
        // f6 = I3 ? (I0 | I4) : (I1 ^ (I2 & I5)); small is f6 with I3 = 0.
        let f6 = |a: usize| {
            if bit(a, 3) {
                bit(a, 0) || bit(a, 4)
            } else {
                bit(a, 1) ^ (bit(a, 2) && bit(a, 5))
            }
        };
        let big = lut("big", &ins, w[6], table_from_fn(6, f6));
        // small over (I0, I1, I2, I4, I5), equal to f6 at I3 = 0.
        let small_ins = [ins[0], ins[1], ins[2], ins[4], ins[5]];
        let small_fn = |a: usize| bit(a, 1) ^ (bit(a, 2) && bit(a, 4));
        let small = lut("small", &small_ins, w[7], table_from_fn(5, small_fn));
        let sel = ins[3];
        assert!(absorb_match(&big, &small, sel).selector_low);

        // Selector moved to the last slot.
        let slots = [ins[0], ins[1], ins[2], ins[5], ins[4], ins[3]];
        let fused = fuse_truth_tables(&big, &small, &slots, sel);
        assert_eq!(fused.placement, Placement::SecondLow);

        for fused_addr in 0..64usize {
            let val = |s: SigBit| bit(fused_addr, slots.iter().position(|x| *x == s).unwrap());
            let big_addr = (0..6).fold(0, |acc, i| acc | ((val(ins[i]) as usize) << i));
            let small_addr = (0..5).fold(0, |acc, i| acc | ((val(small_ins[i]) as usize) << i));
            // Z reproduces the 6-input LUT on every assignment.
            assert_eq!(fused.table.get_bit(fused_addr), f6(big_addr));
            // Z5 reproduces the small LUT regardless of the selector.
            assert_eq!(fused.table.get_bit(fused_addr & 31), small_fn(small_addr));
        }
    }
}
