// SPDX-License-Identifier: Apache-2.0

//! In-memory modules and designs.

use crate::netlist::sigmap::SigMap;
use crate::netlist::value::{Const, SigBit, WireId};
use crate::netlist::Netlist;
use crate::stitch_error::StitchError;
use std::collections::BTreeMap;
use string_interner::symbol::SymbolU32;
use string_interner::{backend::StringBackend, StringInterner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub cell_type: String,
    pub ports: BTreeMap<String, SigBit>,
    pub params: BTreeMap<String, Const>,
}

impl Cell {
    pub fn new(cell_type: &str) -> Self {
        Cell {
            cell_type: cell_type.to_string(),
            ports: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }
}

/// A flat module: interned wires, named cells and alias connections.
///
/// Invariants:
/// - cell names are unique within the module;
/// - `sigmap` always reflects every entry of `connections`.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    wires: StringInterner<StringBackend<SymbolU32>>,
    cells: BTreeMap<String, Cell>,
    connections: Vec<(SigBit, SigBit)>,
    sigmap: SigMap,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Module {
            name: name.to_string(),
            wires: StringInterner::new(),
            cells: BTreeMap::new(),
            connections: Vec::new(),
            sigmap: SigMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the wire named `name`, declaring it if needed.
    pub fn add_wire(&mut self, name: &str) -> SigBit {
        SigBit::Wire(WireId(self.wires.get_or_intern(name)))
    }

    pub fn wire(&self, name: &str) -> Option<SigBit> {
        self.wires.get(name).map(|sym| SigBit::Wire(WireId(sym)))
    }

    /// Wires in declaration order.
    pub fn wires(&self) -> impl Iterator<Item = (SigBit, &str)> + '_ {
        self.wires
            .into_iter()
            .map(|(sym, name)| (SigBit::Wire(WireId(sym)), name))
    }

    /// Records that `a` and `b` are the same electrical net.
    pub fn connect(&mut self, a: SigBit, b: SigBit) {
        self.connections.push((a, b));
        self.sigmap.add(a, b);
    }

    pub fn connections(&self) -> &[(SigBit, SigBit)] {
        &self.connections
    }

    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> + '_ {
        self.cells.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Inserts a fully built cell.
    pub fn insert_cell(&mut self, name: &str, cell: Cell) -> Result<(), StitchError> {
        if self.cells.contains_key(name) {
            return Err(StitchError::CellExists {
                cell: name.to_string(),
            });
        }
        self.cells.insert(name.to_string(), cell);
        Ok(())
    }

    fn cell_mut(&mut self, name: &str) -> Result<&mut Cell, StitchError> {
        self.cells
            .get_mut(name)
            .ok_or_else(|| StitchError::UnknownCell {
                cell: name.to_string(),
            })
    }

    fn existing_cell(&self, name: &str) -> Result<&Cell, StitchError> {
        self.cells.get(name).ok_or_else(|| StitchError::UnknownCell {
            cell: name.to_string(),
        })
    }
}

impl Netlist for Module {
    fn cell_names(&self) -> Vec<String> {
        self.cells.keys().cloned().collect()
    }

    fn has_cell(&self, cell: &str) -> bool {
        self.cells.contains_key(cell)
    }

    fn cell_type(&self, cell: &str) -> Result<&str, StitchError> {
        Ok(self.existing_cell(cell)?.cell_type.as_str())
    }

    fn port(&self, cell: &str, port: &str) -> Result<Option<SigBit>, StitchError> {
        Ok(self.existing_cell(cell)?.ports.get(port).copied())
    }

    fn param(&self, cell: &str, param: &str) -> Result<Option<&Const>, StitchError> {
        Ok(self.existing_cell(cell)?.params.get(param))
    }

    fn canonicalize(&self, sig: SigBit) -> SigBit {
        self.sigmap.apply(sig)
    }

    fn signal_name(&self, sig: SigBit) -> String {
        match sig {
            SigBit::Wire(WireId(sym)) => self
                .wires
                .resolve(sym)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("<wire {:?}>", sym)),
            constant => constant.const_literal().unwrap_or_default().to_string(),
        }
    }

    fn remove_cell(&mut self, cell: &str) -> Result<(), StitchError> {
        self.cells
            .remove(cell)
            .map(|_| ())
            .ok_or_else(|| StitchError::UnknownCell {
                cell: cell.to_string(),
            })
    }

    fn add_cell(&mut self, cell: &str, cell_type: &str) -> Result<(), StitchError> {
        self.insert_cell(cell, Cell::new(cell_type))
    }

    fn set_param(&mut self, cell: &str, param: &str, value: Const) -> Result<(), StitchError> {
        self.cell_mut(cell)?.params.insert(param.to_string(), value);
        Ok(())
    }

    fn set_port(&mut self, cell: &str, port: &str, sig: SigBit) -> Result<(), StitchError> {
        self.cell_mut(cell)?.ports.insert(port.to_string(), sig);
        Ok(())
    }

    fn uniquify(&self, proposed: &str) -> String {
        if !self.cells.contains_key(proposed) {
            return proposed.to_string();
        }
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{}_{}", proposed, suffix);
            if !self.cells.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// A collection of modules, one of which may be marked as the top.
#[derive(Debug, Clone, Default)]
pub struct Design {
    modules: BTreeMap<String, Module>,
    top: Option<String>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: Module) {
        self.modules.insert(module.name().to_string(), module);
    }

    pub fn set_top(&mut self, name: &str) {
        self.top = Some(name.to_string());
    }

    pub fn explicit_top(&self) -> Option<&str> {
        self.top.as_deref()
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> + '_ {
        self.modules.values()
    }

    fn top_name(&self) -> Option<String> {
        match &self.top {
            Some(name) => self.modules.contains_key(name).then(|| name.clone()),
            None if self.modules.len() == 1 => self.modules.keys().next().cloned(),
            None => None,
        }
    }

    /// The explicitly marked top module, or the only module if there is
    /// exactly one.
    pub fn top_module(&self) -> Option<&Module> {
        self.top_name().and_then(|name| self.modules.get(&name))
    }

    pub fn top_module_mut(&mut self) -> Option<&mut Module> {
        let name = self.top_name()?;
        self.modules.get_mut(&name)
    }
}
