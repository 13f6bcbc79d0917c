// SPDX-License-Identifier: Apache-2.0

use anyhow::{anyhow, Context};
use clap::ArgMatches;
use lut_stitch::netlist::json_io::{design_to_json_string, read_design_from_path, write_design_to_path};
use lut_stitch::verify::{check_equivalence, DEFAULT_VERIFY_SAMPLES, DEFAULT_VERIFY_SEED};
use lut_stitch::{stitch_design, StitchConfig, StitchOptions};
use std::path::{Path, PathBuf};

pub fn handle_stitch(matches: &ArgMatches, config: &StitchConfig) -> anyhow::Result<()> {
    let input = matches
        .get_one::<String>("input")
        .ok_or_else(|| anyhow!("input design path is required"))?;
    let output = matches.get_one::<String>("output");
    let dump_path = matches.get_one::<String>("dump").map(PathBuf::from);
    let verify = matches.get_flag("verify");
    let samples = matches
        .get_one::<usize>("verify_samples")
        .copied()
        .unwrap_or(DEFAULT_VERIFY_SAMPLES);
    let seed = matches
        .get_one::<u64>("seed")
        .copied()
        .unwrap_or(DEFAULT_VERIFY_SEED);

    let mut design = read_design_from_path(Path::new(input))
        .with_context(|| format!("load design {}", input))?;
    let before = if verify {
        design.top_module().cloned()
    } else {
        None
    };

    let options = StitchOptions {
        config: config.clone(),
        dump_path,
    };
    let summary = stitch_design(&mut design, &options)?;
    eprintln!("{}", summary);

    if let Some(before) = before {
        let after = design
            .top_module()
            .ok_or_else(|| anyhow!("top module disappeared while stitching"))?;
        let report = check_equivalence(&before, after, config, samples, seed)?;
        eprintln!(
            "equivalence: {} signals match over {} {} assignments of {} inputs",
            report.num_signals,
            report.assignments,
            if report.exhaustive { "exhaustive" } else { "random" },
            report.num_inputs
        );
    }

    match output {
        Some(path) => write_design_to_path(&design, Path::new(path))?,
        None => println!("{}", design_to_json_string(&design)?),
    }
    Ok(())
}
