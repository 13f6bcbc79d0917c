// SPDX-License-Identifier: Apache-2.0

//! Single-bit signals and constant bit vectors.

use std::fmt;
use std::str::FromStr;
use string_interner::symbol::SymbolU32;

/// Interned wire name within a module.
///
/// Ordering follows interning order, so an earlier-declared wire compares
/// less than a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub(crate) SymbolU32);

/// A single-bit signal: a constant driver or a named wire.
///
/// The derived ordering puts constants before wires; the sigmap relies on
/// this to pick class representatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SigBit {
    Zero,
    One,
    Undef,
    Wire(WireId),
}

impl SigBit {
    pub fn is_const(self) -> bool {
        !matches!(self, SigBit::Wire(_))
    }

    /// Literal spelling of constant signals, as used in the design format.
    pub fn const_literal(self) -> Option<&'static str> {
        match self {
            SigBit::Zero => Some("1'b0"),
            SigBit::One => Some("1'b1"),
            SigBit::Undef => Some("1'bx"),
            SigBit::Wire(_) => None,
        }
    }

    pub fn from_const_literal(s: &str) -> Option<SigBit> {
        match s {
            "1'b0" => Some(SigBit::Zero),
            "1'b1" => Some(SigBit::One),
            "1'bx" | "1'bX" => Some(SigBit::Undef),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trit {
    Zero,
    One,
    Undef,
}

impl Trit {
    pub fn from_char(c: char) -> Option<Trit> {
        match c {
            '0' => Some(Trit::Zero),
            '1' => Some(Trit::One),
            'x' | 'X' => Some(Trit::Undef),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Trit::Zero => '0',
            Trit::One => '1',
            Trit::Undef => 'x',
        }
    }
}

impl From<bool> for Trit {
    fn from(value: bool) -> Self {
        if value {
            Trit::One
        } else {
            Trit::Zero
        }
    }
}

/// Constant parameter value. Bit 0 is the least significant bit; the textual
/// form is MSB first, e.g. `"0110"` has bit 1 and bit 2 set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Const(Vec<Trit>);

impl Const {
    pub fn new(bits: Vec<Trit>) -> Self {
        Const(bits)
    }

    pub fn from_u64(value: u64, width: usize) -> Self {
        assert!(width <= 64, "Const::from_u64 width {} exceeds 64", width);
        Const((0..width).map(|i| Trit::from((value >> i) & 1 != 0)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns bit `index`, or `None` past the end.
    pub fn bit(&self, index: usize) -> Option<Trit> {
        self.0.get(index).copied()
    }

    pub fn bits(&self) -> &[Trit] {
        &self.0
    }

    /// Packs the low 64 bits into a `u64`; `x` bits read as 0.
    pub fn to_u64_lossy(&self) -> u64 {
        self.0
            .iter()
            .take(64)
            .enumerate()
            .filter(|(_, t)| **t == Trit::One)
            .fold(0u64, |acc, (i, _)| acc | (1u64 << i))
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in self.0.iter().rev() {
            write!(f, "{}", t.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Const {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = Vec::with_capacity(s.len());
        for c in s.chars().rev() {
            if c == '_' {
                continue;
            }
            let t = Trit::from_char(c)
                .ok_or_else(|| format!("invalid bit character '{}' in constant '{}'", c, s))?;
            bits.push(t);
        }
        Ok(Const(bits))
    }
}
