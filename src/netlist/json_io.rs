// SPDX-License-Identifier: Apache-2.0

//! JSON reading and writing of designs.
//!
//! The format is a small flattened cousin of the Yosys JSON netlist:
//!
//! ```text
//! {
//!   "top": "top",
//!   "modules": {
//!     "top": {
//!       "wires": ["a", "b", "y"],
//!       "connections": [["y_alias", "y"]],
//!       "cells": {
//!         "u1": {
//!           "type": "GTP_LUT2",
//!           "parameters": { "INIT": "0110" },
//!           "connections": { "I0": "a", "I1": "b", "Z": "y" }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Signals are wire names or the literals `1'b0`, `1'b1`, `1'bx`; parameter
//! values are MSB-first bit strings. Wires referenced but not listed are
//! declared implicitly.

use crate::netlist::module::{Cell, Design, Module};
use crate::netlist::value::{Const, SigBit};
use crate::netlist::Netlist;
use crate::stitch_error::StitchError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct DesignJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top: Option<String>,
    modules: BTreeMap<String, ModuleJson>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModuleJson {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    wires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    connections: Vec<(String, String)>,
    #[serde(default)]
    cells: BTreeMap<String, CellJson>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CellJson {
    #[serde(rename = "type")]
    cell_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    connections: BTreeMap<String, String>,
}

fn parse_signal(module: &mut Module, text: &str) -> SigBit {
    SigBit::from_const_literal(text).unwrap_or_else(|| module.add_wire(text))
}

fn module_from_json(name: &str, json: ModuleJson) -> Result<Module, StitchError> {
    let mut module = Module::new(name);
    for wire in &json.wires {
        module.add_wire(wire);
    }
    for (cell_name, cell_json) in json.cells {
        let mut cell = Cell::new(&cell_json.cell_type);
        for (param, text) in cell_json.parameters {
            let value: Const = text.parse().map_err(|e: String| {
                StitchError::DesignFormat(format!(
                    "cell '{}' parameter '{}': {}",
                    cell_name, param, e
                ))
            })?;
            cell.params.insert(param, value);
        }
        for (port, text) in cell_json.connections {
            let sig = parse_signal(&mut module, &text);
            cell.ports.insert(port, sig);
        }
        module.insert_cell(&cell_name, cell)?;
    }
    for (a, b) in json.connections {
        let sig_a = parse_signal(&mut module, &a);
        let sig_b = parse_signal(&mut module, &b);
        module.connect(sig_a, sig_b);
    }
    Ok(module)
}

fn module_to_json(module: &Module) -> ModuleJson {
    let wires = module.wires().map(|(_, name)| name.to_string()).collect();
    let connections = module
        .connections()
        .iter()
        .map(|(a, b)| (module.signal_name(*a), module.signal_name(*b)))
        .collect();
    let cells = module
        .cells()
        .map(|(name, cell)| {
            let cell_json = CellJson {
                cell_type: cell.cell_type.clone(),
                parameters: cell
                    .params
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect(),
                connections: cell
                    .ports
                    .iter()
                    .map(|(k, sig)| (k.clone(), module.signal_name(*sig)))
                    .collect(),
            };
            (name.to_string(), cell_json)
        })
        .collect();
    ModuleJson {
        wires,
        connections,
        cells,
    }
}

pub fn design_from_json_str(text: &str) -> Result<Design, StitchError> {
    let json: DesignJson =
        serde_json::from_str(text).map_err(|e| StitchError::DesignFormat(e.to_string()))?;
    let mut design = Design::new();
    for (name, module_json) in json.modules {
        design.add_module(module_from_json(&name, module_json)?);
    }
    if let Some(top) = json.top {
        design.set_top(&top);
    }
    Ok(design)
}

pub fn design_to_json_string(design: &Design) -> Result<String, StitchError> {
    let json = DesignJson {
        top: design.explicit_top().map(|s| s.to_string()),
        modules: design
            .modules()
            .map(|m| (m.name().to_string(), module_to_json(m)))
            .collect(),
    };
    serde_json::to_string_pretty(&json).map_err(|e| StitchError::DesignFormat(e.to_string()))
}

pub fn read_design_from_path(path: &Path) -> Result<Design, StitchError> {
    let text = std::fs::read_to_string(path).map_err(|source| StitchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    design_from_json_str(&text)
}

pub fn write_design_to_path(design: &Design, path: &Path) -> Result<(), StitchError> {
    let text = design_to_json_string(design)?;
    std::fs::write(path, text).map_err(|source| StitchError::Io {
        path: path.to_path_buf(),
        source,
    })
}
