// SPDX-License-Identifier: Apache-2.0

//! 6-input single-output Boolean function truth tables, plus the textual
//! helpers used when reporting and permuting LUT contents.
//!
//! A function `f(i0, .., i5)` is a `u64` where bit `a` is the output for the
//! assignment encoded by `a`, with `i0 = a & 1` toggling fastest.

use crate::netlist::value::{Const, Trit};
use crate::stitch_error::StitchError;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TruthTable64(pub u64);

impl TruthTable64 {
    pub const fn const0() -> Self {
        Self(0)
    }

    pub const fn const1() -> Self {
        Self(u64::MAX)
    }

    /// Returns the truth table of input variable `index` alone.
    pub const fn var(index: usize) -> Self {
        match index {
            0 => Self(0xAAAA_AAAA_AAAA_AAAA),
            1 => Self(0xCCCC_CCCC_CCCC_CCCC),
            2 => Self(0xF0F0_F0F0_F0F0_F0F0),
            3 => Self(0xFF00_FF00_FF00_FF00),
            4 => Self(0xFFFF_0000_FFFF_0000),
            5 => Self(0xFFFF_FFFF_0000_0000),
            _ => panic!("TruthTable64::var index out of range (expected 0..=5)"),
        }
    }

    /// Concatenates two 5-input halves: `low` where input 5 is 0, `high`
    /// where it is 1.
    pub const fn from_halves(low: u32, high: u32) -> Self {
        Self((low as u64) | ((high as u64) << 32))
    }

    #[inline]
    pub const fn not(self) -> Self {
        Self(!self.0)
    }

    #[inline]
    pub const fn and(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn xor(self, other: Self) -> Self {
        Self(self.0 ^ other.0)
    }

    #[inline]
    pub fn get_bit(self, assignment_index: usize) -> bool {
        debug_assert!(assignment_index < 64);
        (self.0 >> assignment_index) & 1 != 0
    }

    pub const fn low_half(self) -> u32 {
        self.0 as u32
    }

    pub const fn high_half(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn to_const(self) -> Const {
        Const::from_u64(self.0, 64)
    }
}

/// Renders a constant as lowercase hex, MSB first. `x` bits print as 0. A
/// 64-bit value is split into two 8-digit groups with an underscore.
pub fn format_hex(value: &Const) -> String {
    if value.is_empty() {
        return "0".to_string();
    }
    let bits = value.bits();
    let digits = bits.len().div_ceil(4);
    let mut hex = String::with_capacity(digits + 1);
    for d in (0..digits).rev() {
        let mut nibble = 0u32;
        for b in 0..4 {
            if bits.get(d * 4 + b) == Some(&Trit::One) {
                nibble |= 1 << b;
            }
        }
        hex.push(std::char::from_digit(nibble, 16).unwrap_or('0'));
    }
    if hex.len() == 16 {
        hex.insert(8, '_');
    }
    hex
}

/// Renders a constant as binary, MSB first.
pub fn format_binary(value: &Const) -> String {
    value.to_string()
}

/// Parses a `b`/`h` prefixed truth-table literal (MSB-first text) into a
/// table of exactly `2^num_vars` bits, zero-padded or truncated at the top.
pub fn parse_prefixed_literal(text: &str, num_vars: usize) -> Result<Const, StitchError> {
    if num_vars > 16 {
        return Err(StitchError::InvalidTruthTable(format!(
            "{} variables is more than the 16 supported",
            num_vars
        )));
    }
    let mut chars = text.chars();
    let format = chars.next().map(|c| c.to_ascii_lowercase());
    let body: String = chars.filter(|c| *c != '_').collect();
    if body.is_empty() {
        return Err(StitchError::InvalidTruthTable(format!(
            "literal '{}' is too short",
            text
        )));
    }
    let msb_first: String = match format {
        Some('b') => body,
        Some('h') => {
            let mut out = String::with_capacity(body.len() * 4);
            for c in body.chars() {
                let nibble = c.to_digit(16).ok_or_else(|| {
                    StitchError::InvalidTruthTable(format!("invalid hex digit '{}'", c))
                })?;
                out.push_str(&format!("{:04b}", nibble));
            }
            out
        }
        _ => {
            return Err(StitchError::InvalidTruthTable(format!(
                "literal '{}' must start with 'b' or 'h'",
                text
            )))
        }
    };
    let parsed: Const = msb_first.parse().map_err(StitchError::InvalidTruthTable)?;
    let width = 1usize << num_vars;
    let mut bits: Vec<Trit> = parsed.bits().iter().copied().take(width).collect();
    bits.resize(width, Trit::Zero);
    Ok(Const::new(bits))
}

/// Renames the inputs of `table`.
///
/// `from` labels the current inputs (character `i` names input `i`); `to`
/// is a permutation of the same labels giving the new input order. The
/// result computes the same function with input `i` now carrying label
/// `to[i]`.
pub fn permute_inputs(table: &Const, from: &str, to: &str) -> Result<Const, StitchError> {
    let from: Vec<char> = from.chars().collect();
    let to: Vec<char> = to.chars().collect();
    if from.len() != to.len() {
        return Err(StitchError::InvalidTruthTable(format!(
            "input orders have different lengths ({} vs {})",
            from.len(),
            to.len()
        )));
    }
    let mut old_position: HashMap<char, usize> = HashMap::new();
    for (i, c) in from.iter().enumerate() {
        if old_position.insert(*c, i).is_some() {
            return Err(StitchError::InvalidTruthTable(format!(
                "label '{}' repeats in the original order",
                c
            )));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for c in &to {
        if !old_position.contains_key(c) || !seen.insert(*c) {
            return Err(StitchError::InvalidTruthTable(format!(
                "new order is not a permutation of the original (label '{}')",
                c
            )));
        }
    }
    let width = 1usize << from.len();
    if table.len() != width {
        return Err(StitchError::InvalidTruthTable(format!(
            "table has {} bits, expected {}",
            table.len(),
            width
        )));
    }
    let mut bits = Vec::with_capacity(width);
    for new_addr in 0..width {
        let mut old_addr = 0usize;
        for (i, label) in to.iter().enumerate() {
            if (new_addr >> i) & 1 != 0 {
                old_addr |= 1 << old_position[label];
            }
        }
        bits.push(table.bit(old_addr).unwrap_or(Trit::Zero));
    }
    Ok(Const::new(bits))
}
