// SPDX-License-Identifier: Apache-2.0

use anyhow::anyhow;
use clap::ArgMatches;
use lut_stitch::truth_table::{format_binary, format_hex, parse_prefixed_literal, permute_inputs};

pub fn handle_tt_shuffle(matches: &ArgMatches) -> anyhow::Result<()> {
    let get = |name: &str| {
        matches
            .get_one::<String>(name)
            .ok_or_else(|| anyhow!("--{} is required", name))
    };
    let from = get("from")?;
    let to = get("to")?;
    let table = get("table")?;

    let original = parse_prefixed_literal(table, from.chars().count())?;
    let shuffled = permute_inputs(&original, from, to)?;
    println!("original ({}): b{}", from, format_binary(&original));
    println!("shuffled ({}): b{}", to, format_binary(&shuffled));
    println!("shuffled ({}): h{}", to, format_hex(&shuffled));
    Ok(())
}
