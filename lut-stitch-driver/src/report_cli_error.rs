// SPDX-License-Identifier: Apache-2.0

//! Fatal error reporting for the driver: one headline, then indented
//! `label: value` lines, then exit status 1.

use colored::Colorize;

fn headline_prefix(subcommand: Option<&str>) -> String {
    match subcommand {
        Some(subcommand) => format!("lut-stitch-driver {}:", subcommand),
        None => "lut-stitch-driver:".to_string(),
    }
}

pub fn report_cli_error_and_exit(
    message: &str,
    subcommand: Option<&str>,
    details: &[(&str, String)],
) -> ! {
    eprintln!("{} {}", headline_prefix(subcommand), message.red().bold());
    for (label, value) in details {
        eprintln!("  {}: {}", label, value);
    }
    std::process::exit(1);
}

/// Reports `err` with each underlying cause on its own line, outermost
/// first.
pub fn report_error_chain_and_exit(err: &anyhow::Error, subcommand: Option<&str>) -> ! {
    let causes: Vec<(&str, String)> = err
        .chain()
        .skip(1)
        .map(|cause| ("caused by", cause.to_string()))
        .collect();
    report_cli_error_and_exit(&err.to_string(), subcommand, &causes)
}
