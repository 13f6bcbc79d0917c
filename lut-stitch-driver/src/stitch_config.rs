// SPDX-License-Identifier: Apache-2.0

//! Loading of the `[stitch]` table from a TOML configuration file.

use anyhow::Context;
use lut_stitch::StitchConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "lut-stitch.toml";

#[derive(Deserialize, Default)]
#[serde(default)]
struct LutStitchToml {
    stitch: StitchConfig,
}

/// The `--config` flag if given, else `lut-stitch.toml` in the current
/// directory if it exists.
pub fn resolve_config_path(flag: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(PathBuf::from(path));
    }
    let cwd_toml_path = std::env::current_dir().ok()?.join(DEFAULT_CONFIG_FILE);
    if cwd_toml_path.exists() {
        log::info!(
            "Using {} in current directory: {}",
            DEFAULT_CONFIG_FILE,
            cwd_toml_path.display()
        );
        Some(cwd_toml_path)
    } else {
        None
    }
}

pub fn parse_stitch_config(text: &str) -> anyhow::Result<StitchConfig> {
    let value: toml::Value = toml::from_str(text).context("parse TOML")?;
    let parsed: LutStitchToml = value
        .try_into()
        .context("parse [stitch] configuration table")?;
    Ok(parsed.stitch)
}

pub fn load_stitch_config(path: &Path) -> anyhow::Result<StitchConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    parse_stitch_config(&text).with_context(|| format!("in config file {}", path.display()))
}
