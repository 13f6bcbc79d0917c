// SPDX-License-Identifier: Apache-2.0

//! Bit-level evaluation of the LUT cells of a netlist.
//!
//! Single-output LUTs and fused dual-output cells are evaluated; every other
//! cell is opaque and its outputs behave like primary inputs.

use crate::config::StitchConfig;
use crate::netlist::value::{Const, SigBit, Trit};
use crate::netlist::Netlist;
use crate::stitch_error::StitchError;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Address mask for the fused cell's selector-low output.
const LOW_OUTPUT_MASK: usize = 0x1f;

#[derive(Debug, Clone)]
struct SimCell {
    /// Canonical signal per address line, `None` when unconnected.
    inputs: Vec<Option<SigBit>>,
    table: Const,
    /// `(canonical output, address mask)`.
    outputs: Vec<(SigBit, usize)>,
}

impl SimCell {
    fn address(&self, values: &HashMap<SigBit, bool>) -> usize {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, sig)| sig.map_or(false, |s| value_of(values, s)))
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }
}

fn value_of(values: &HashMap<SigBit, bool>, sig: SigBit) -> bool {
    match sig {
        SigBit::One => true,
        SigBit::Zero | SigBit::Undef => false,
        SigBit::Wire(_) => values.get(&sig).copied().unwrap_or(false),
    }
}

fn sim_cells<N: Netlist>(netlist: &N, config: &StitchConfig) -> Result<Vec<SimCell>, StitchError> {
    let mut cells = Vec::new();
    for name in netlist.cell_names() {
        let cell_type = netlist.cell_type(&name)?;
        let (num_inputs, output_ports) = if let Some(arity) = config.lut_arity(cell_type) {
            (arity, vec![(config.output_port.clone(), usize::MAX)])
        } else if cell_type == config.fused_cell_type {
            (
                6,
                vec![
                    (config.output_port.clone(), usize::MAX),
                    (config.fused_low_output_port.clone(), LOW_OUTPUT_MASK),
                ],
            )
        } else {
            continue;
        };

        let mut inputs = Vec::with_capacity(num_inputs);
        for i in 0..num_inputs {
            let sig = netlist.port(&name, &config.input_port(i))?;
            inputs.push(sig.map(|s| netlist.canonicalize(s)));
        }
        let mut outputs = Vec::new();
        for (port, mask) in output_ports {
            if let Some(sig) = netlist.port(&name, &port)? {
                outputs.push((netlist.canonicalize(sig), mask));
            }
        }
        let table = netlist
            .param(&name, &config.init_param)?
            .cloned()
            .ok_or_else(|| StitchError::MissingParameter {
                cell: name.clone(),
                param: config.init_param.clone(),
            })?;
        cells.push(SimCell {
            inputs,
            table,
            outputs,
        });
    }
    Ok(cells)
}

/// The evaluated cells of one netlist, ordered drivers-first.
///
/// Built once and reused across assignments. Cells on a combinational loop
/// are placed after all others and swept until they settle.
#[derive(Debug, Clone)]
pub struct LutSimulator {
    cells: Vec<SimCell>,
    num_cyclic: usize,
}

impl LutSimulator {
    pub fn new<N: Netlist>(netlist: &N, config: &StitchConfig) -> Result<Self, StitchError> {
        let cells = sim_cells(netlist, config)?;
        let mut drivers: HashMap<SigBit, Vec<usize>> = HashMap::new();
        for (i, cell) in cells.iter().enumerate() {
            for (out, _) in &cell.outputs {
                if !out.is_const() {
                    drivers.entry(*out).or_default().push(i);
                }
            }
        }
        let mut fanout: Vec<Vec<usize>> = vec![Vec::new(); cells.len()];
        let mut pending = vec![0usize; cells.len()];
        for (j, cell) in cells.iter().enumerate() {
            let reads: BTreeSet<SigBit> = cell.inputs.iter().flatten().copied().collect();
            for sig in reads {
                for &u in drivers.get(&sig).into_iter().flatten() {
                    fanout[u].push(j);
                    pending[j] += 1;
                }
            }
        }

        let mut queue: VecDeque<usize> = (0..cells.len()).filter(|i| pending[*i] == 0).collect();
        let mut order = Vec::with_capacity(cells.len());
        let mut placed = vec![false; cells.len()];
        while let Some(u) = queue.pop_front() {
            order.push(u);
            placed[u] = true;
            for &v in &fanout[u] {
                pending[v] -= 1;
                if pending[v] == 0 {
                    queue.push_back(v);
                }
            }
        }
        let num_cyclic = cells.len() - order.len();
        if num_cyclic > 0 {
            log::debug!("{} simulated cells sit on combinational loops", num_cyclic);
            order.extend((0..cells.len()).filter(|i| !placed[*i]));
        }

        let mut slots: Vec<Option<SimCell>> = cells.into_iter().map(Some).collect();
        let cells = order.into_iter().filter_map(|i| slots[i].take()).collect();
        Ok(LutSimulator { cells, num_cyclic })
    }

    /// Canonical wires read by an evaluated cell but driven by none, ascending.
    pub fn primary_inputs(&self) -> Vec<SigBit> {
        let driven: BTreeSet<SigBit> = self
            .cells
            .iter()
            .flat_map(|c| c.outputs.iter().map(|(s, _)| *s))
            .collect();
        let read: BTreeSet<SigBit> = self
            .cells
            .iter()
            .flat_map(|c| c.inputs.iter().flatten().copied())
            .filter(|s| !s.is_const() && !driven.contains(s))
            .collect();
        read.into_iter().collect()
    }

    fn sweep(&self, values: &mut HashMap<SigBit, bool>) -> bool {
        let mut changed = false;
        for cell in &self.cells {
            let address = cell.address(values);
            for (out, mask) in &cell.outputs {
                if out.is_const() {
                    continue;
                }
                let bit = cell.table.bit(address & mask) == Some(Trit::One);
                if values.insert(*out, bit) != Some(bit) {
                    changed = true;
                }
            }
        }
        changed
    }

    /// Signal values under `inputs` (keyed by canonical signal; missing
    /// inputs read 0).
    ///
    /// Without loops a single drivers-first pass is exact. Otherwise passes
    /// repeat until nothing changes, at most once per cell output plus one.
    pub fn evaluate(&self, inputs: &HashMap<SigBit, bool>) -> HashMap<SigBit, bool> {
        let mut values = inputs.clone();
        if self.num_cyclic == 0 {
            self.sweep(&mut values);
            return values;
        }
        let max_sweeps = self.cells.iter().map(|c| c.outputs.len()).sum::<usize>() + 1;
        for _ in 0..max_sweeps {
            if !self.sweep(&mut values) {
                return values;
            }
        }
        log::debug!("simulation did not settle; combinational loop in netlist");
        values
    }
}

/// Canonical wires read by an evaluated cell but driven by none, ascending.
pub fn primary_inputs<N: Netlist>(
    netlist: &N,
    config: &StitchConfig,
) -> Result<Vec<SigBit>, StitchError> {
    Ok(LutSimulator::new(netlist, config)?.primary_inputs())
}

/// One-shot evaluation of `netlist`; see [`LutSimulator::evaluate`].
pub fn simulate_module<N: Netlist>(
    netlist: &N,
    config: &StitchConfig,
    inputs: &HashMap<SigBit, bool>,
) -> Result<HashMap<SigBit, bool>, StitchError> {
    Ok(LutSimulator::new(netlist, config)?.evaluate(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Module;
    use crate::test_utils::{add_lut, make_wires};
    use pretty_assertions::assert_eq;

    #[test]
    fn evaluates_lut_chain_out_of_order() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 4);
        // Declared consumer-first; evaluation still sees drivers first.
        add_lut(&mut m, "a_and", &[w[2], w[1]], w[3], 0b1000);
        add_lut(&mut m, "b_inv", &[w[0]], w[2], 0b01);
        let config = StitchConfig::default();
        assert_eq!(primary_inputs(&m, &config).unwrap(), vec![w[0], w[1]]);

        for x in [false, true] {
            for y in [false, true] {
                let inputs: HashMap<SigBit, bool> = [(w[0], x), (w[1], y)].into_iter().collect();
                let values = simulate_module(&m, &config, &inputs).unwrap();
                assert_eq!(values[&w[2]], !x);
                assert_eq!(values[&w[3]], !x && y);
            }
        }
    }

    #[test]
    fn fused_cell_low_output_ignores_sixth_line() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 4);
        m.add_cell("f", "GTP_LUT6D").unwrap();
        m.set_port("f", "I0", w[0]).unwrap();
        m.set_port("f", "I5", w[1]).unwrap();
        m.set_port("f", "Z", w[2]).unwrap();
        m.set_port("f", "Z5", w[3]).unwrap();
        // Low half: I0. High half: !I0.
        let table = crate::truth_table::TruthTable64::from_halves(0xaaaa_aaaa, 0x5555_5555);
        m.set_param("f", "INIT", table.to_const()).unwrap();
        let config = StitchConfig::default();

        for i0 in [false, true] {
            for i5 in [false, true] {
                let inputs: HashMap<SigBit, bool> = [(w[0], i0), (w[1], i5)].into_iter().collect();
                let values = simulate_module(&m, &config, &inputs).unwrap();
                assert_eq!(values[&w[3]], i0);
                assert_eq!(values[&w[2]], if i5 { !i0 } else { i0 });
            }
        }
    }

    #[test]
    fn simulator_is_reused_across_assignments() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 6);
        add_lut(&mut m, "c_xor", &[w[3], w[2]], w[4], 0b0110);
        add_lut(&mut m, "b_and", &[w[0], w[1]], w[3], 0b1000);
        add_lut(&mut m, "a_inv", &[w[4]], w[5], 0b01);
        let sim = LutSimulator::new(&m, &StitchConfig::default()).unwrap();
        assert_eq!(sim.primary_inputs(), vec![w[0], w[1], w[2]]);

        for assign in 0..8usize {
            let v = |i: usize| (assign >> i) & 1 != 0;
            let inputs: HashMap<SigBit, bool> =
                [(w[0], v(0)), (w[1], v(1)), (w[2], v(2))].into_iter().collect();
            let values = sim.evaluate(&inputs);
            let and = v(0) && v(1);
            assert_eq!(values[&w[3]], and);
            assert_eq!(values[&w[4]], and ^ v(2));
            assert_eq!(values[&w[5]], !(and ^ v(2)));
        }
    }

    #[test]
    fn combinational_loop_terminates() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 3);
        // Ring oscillator: never settles, but evaluation must still return.
        add_lut(&mut m, "ring", &[w[0]], w[0], 0b01);
        // Latch-like loop: w1 = w2 | w1 settles.
        add_lut(&mut m, "hold", &[w[2], w[1]], w[1], 0b1110);
        let sim = LutSimulator::new(&m, &StitchConfig::default()).unwrap();
        let inputs: HashMap<SigBit, bool> = [(w[2], true)].into_iter().collect();
        let values = sim.evaluate(&inputs);
        assert!(values[&w[1]]);
        assert!(values.contains_key(&w[0]));
    }

    #[test]
    fn opaque_cell_outputs_are_inputs() {
        let mut m = Module::new("top");
        let w = make_wires(&mut m, "w", 3);
        m.add_cell("ff", "GTP_DFF").unwrap();
        m.set_port("ff", "Q", w[0]).unwrap();
        add_lut(&mut m, "u", &[w[0], SigBit::One], w[1], 0b1000);
        let config = StitchConfig::default();
        assert_eq!(primary_inputs(&m, &config).unwrap(), vec![w[0]]);
        let inputs: HashMap<SigBit, bool> = [(w[0], true)].into_iter().collect();
        assert!(simulate_module(&m, &config, &inputs).unwrap()[&w[1]]);
    }
}
