// SPDX-License-Identifier: Apache-2.0

//! Helpers for building small LUT netlists in tests.

use crate::config::StitchConfig;
use crate::netlist::value::{Const, SigBit};
use crate::netlist::{Module, Netlist};

/// Adds a `GTP_LUT<k>` cell driving `output` with `inputs` on `I0..I<k-1>`
/// and the low `2^k` bits of `table` as its INIT.
pub fn add_lut(module: &mut Module, name: &str, inputs: &[SigBit], output: SigBit, table: u64) {
    let config = StitchConfig::default();
    let arity = inputs.len();
    assert!((1..=6).contains(&arity), "LUT arity {} out of range", arity);
    module
        .add_cell(name, &format!("{}{}", config.lut_type_prefix, arity))
        .expect("test cell names are unique");
    for (i, sig) in inputs.iter().enumerate() {
        module
            .set_port(name, &config.input_port(i), *sig)
            .expect("cell was just added");
    }
    module
        .set_port(name, &config.output_port, output)
        .expect("cell was just added");
    module
        .set_param(name, &config.init_param, Const::from_u64(table, 1 << arity))
        .expect("cell was just added");
}

/// Builds the truth table of a `arity`-input function given as a predicate
/// over assignment indices.
pub fn table_from_fn(arity: usize, f: impl Fn(usize) -> bool) -> u64 {
    (0..(1usize << arity))
        .filter(|a| f(*a))
        .fold(0u64, |acc, a| acc | (1u64 << a))
}

/// Declares wires named `prefix0..prefix<n-1>`.
pub fn make_wires(module: &mut Module, prefix: &str, n: usize) -> Vec<SigBit> {
    (0..n)
        .map(|i| module.add_wire(&format!("{}{}", prefix, i)))
        .collect()
}
