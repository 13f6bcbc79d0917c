// SPDX-License-Identifier: Apache-2.0

//! Pairs single-output LUT cells of a mapped netlist into dual-output fused
//! LUT cells without changing the circuit's Boolean behavior.

pub mod candidates;
pub mod commit;
pub mod config;
pub mod fusion;
pub mod levels;
pub mod lut_collect;
pub mod lut_dump;
pub mod netlist;
pub mod plan;
pub mod sim;
pub mod stitch;
pub mod stitch_error;
pub mod test_utils;
pub mod truth_table;
pub mod verify;

pub use config::{StitchConfig, StitchOptions};
pub use stitch::{stitch_design, stitch_module, StitchSummary};
pub use stitch_error::StitchError;
