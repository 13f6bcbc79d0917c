// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use std::path::PathBuf;

/// LUT counts at or below this use the exhaustive pair search.
pub const DEFAULT_EXHAUSTIVE_LUT_LIMIT: usize = 2048;

/// Technology conventions and search knobs for the stitching pass.
///
/// Every field has a default, so a TOML table may set any subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StitchConfig {
    /// Single-output LUT cell types are this prefix followed by the arity
    /// digit, e.g. `GTP_LUT4`.
    pub lut_type_prefix: String,

    /// Input ports are this prefix followed by the port index, e.g. `I0`.
    pub input_port_prefix: String,

    /// Output port of single-output LUTs; also the full-function output of
    /// the fused cell.
    pub output_port: String,

    pub fused_cell_type: String,

    /// Output of the fused cell that sees the sixth address line as 0.
    pub fused_low_output_port: String,

    /// Truth table parameter name.
    pub init_param: String,

    pub exhaustive_lut_limit: usize,

    /// Score candidate pairs on the rayon thread pool.
    pub parallel_search: bool,
}

impl Default for StitchConfig {
    fn default() -> Self {
        StitchConfig {
            lut_type_prefix: "GTP_LUT".to_string(),
            input_port_prefix: "I".to_string(),
            output_port: "Z".to_string(),
            fused_cell_type: "GTP_LUT6D".to_string(),
            fused_low_output_port: "Z5".to_string(),
            init_param: "INIT".to_string(),
            exhaustive_lut_limit: DEFAULT_EXHAUSTIVE_LUT_LIMIT,
            parallel_search: false,
        }
    }
}

impl StitchConfig {
    pub fn input_port(&self, index: usize) -> String {
        format!("{}{}", self.input_port_prefix, index)
    }

    /// Returns the arity encoded in `cell_type` if it names a single-output
    /// LUT with 1 to 6 inputs.
    pub fn lut_arity(&self, cell_type: &str) -> Option<usize> {
        let suffix = cell_type.strip_prefix(self.lut_type_prefix.as_str())?;
        let mut chars = suffix.chars();
        let digit = chars.next()?.to_digit(10)? as usize;
        if chars.next().is_some() || !(1..=6).contains(&digit) {
            return None;
        }
        Some(digit)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StitchOptions {
    pub config: StitchConfig,
    /// Destination of the collected-LUT report, if one is wanted.
    pub dump_path: Option<PathBuf>,
}
