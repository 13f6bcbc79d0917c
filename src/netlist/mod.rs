// SPDX-License-Identifier: Apache-2.0

//! Netlist graph access used by the stitching pass.
//!
//! The pass never holds references into the graph across a mutation: cells
//! are addressed by name, and names are only resolved again at commit time.

pub mod json_io;
pub mod module;
pub mod sigmap;
pub mod value;

pub use module::{Cell, Design, Module};
pub use sigmap::SigMap;
pub use value::{Const, SigBit, Trit, WireId};

use crate::stitch_error::StitchError;

/// Graph primitives the pass consumes. Implementations own storage and
/// canonicalization; the pass only reads, removes and adds cells.
pub trait Netlist {
    /// Cell names in a deterministic order.
    fn cell_names(&self) -> Vec<String>;

    fn has_cell(&self, cell: &str) -> bool;

    fn cell_type(&self, cell: &str) -> Result<&str, StitchError>;

    /// Signal connected to `port`, or `None` when the port is absent.
    fn port(&self, cell: &str, port: &str) -> Result<Option<SigBit>, StitchError>;

    fn param(&self, cell: &str, param: &str) -> Result<Option<&Const>, StitchError>;

    /// Representative of `sig`'s equivalence class.
    fn canonicalize(&self, sig: SigBit) -> SigBit;

    /// Human-readable name for `sig`.
    fn signal_name(&self, sig: SigBit) -> String;

    fn remove_cell(&mut self, cell: &str) -> Result<(), StitchError>;

    fn add_cell(&mut self, cell: &str, cell_type: &str) -> Result<(), StitchError>;

    fn set_param(&mut self, cell: &str, param: &str, value: Const) -> Result<(), StitchError>;

    fn set_port(&mut self, cell: &str, port: &str, sig: SigBit) -> Result<(), StitchError>;

    /// Returns a cell name not currently in use, derived from `proposed`.
    fn uniquify(&self, proposed: &str) -> String;
}
