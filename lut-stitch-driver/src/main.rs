// SPDX-License-Identifier: Apache-2.0

//! Command line driver for the LUT stitching pass.
//!
//! Commands are given like:
//!
//! ```text
//! lut-stitch-driver <global-options> <command> <command-args-and-options>
//! ```
//!
//! Commands are:
//!
//! - stitch: Merges LUT pairs of a JSON design into dual-output LUT cells.
//! - dump-luts: Reports every LUT cell collected from a JSON design.
//! - tt-shuffle: Renames the inputs of a truth table literal.
//!
//! Sample usage:
//!
//! ```shell
//! $ cargo run -- stitch design.json --output stitched.json --verify
//! $ cargo run -- --config=lut-stitch.toml dump-luts design.json
//! $ cargo run -- tt-shuffle --from ABC --table hD9 --to BCA
//! ```

mod dump_luts;
mod report_cli_error;
mod stitch;
mod stitch_config;
mod tt_shuffle;

use clap::{value_parser, Arg, ArgAction};
use lut_stitch::StitchConfig;
use report_cli_error::{report_cli_error_and_exit, report_error_chain_and_exit};

trait AppExt {
    fn add_input_arg(self) -> Self;
    fn add_output_arg(self, help: &'static str) -> Self;
}

impl AppExt for clap::Command {
    fn add_input_arg(self) -> Self {
        (self as clap::Command).arg(
            Arg::new("input")
                .value_name("INPUT_JSON")
                .help("The input design, in JSON")
                .required(true)
                .index(1),
        )
    }

    fn add_output_arg(self, help: &'static str) -> Self {
        (self as clap::Command).arg(
            Arg::new("output")
                .long("output")
                .value_name("PATH")
                .help(help)
                .action(ArgAction::Set),
        )
    }
}

fn main() {
    let _ = env_logger::try_init();

    log::info!(
        "lut-stitch-driver starting; version: {}",
        env!("CARGO_PKG_VERSION")
    );

    let matches = clap::Command::new("lut-stitch-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Command line driver for the LUT stitching pass")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("CONFIG")
                .help("Path to a lut-stitch.toml file")
                .action(ArgAction::Set),
        )
        .subcommand(clap::Command::new("version").about("Prints the version of the driver"))
        .subcommand(
            clap::Command::new("stitch")
                .about("Merges pairs of LUT cells into dual-output LUT cells")
                .add_input_arg()
                .add_output_arg("Where to write the stitched design (default: stdout)")
                .arg(
                    Arg::new("dump")
                        .long("dump")
                        .value_name("PATH")
                        .help("Write a report of the collected LUTs to this path")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("verify")
                        .long("verify")
                        .help("Check the stitched module against the input by simulation")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("verify_samples")
                        .long("verify-samples")
                        .value_name("N")
                        .help("Random assignments to simulate when inputs are too many to enumerate")
                        .value_parser(value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Seed for the random assignments")
                        .value_parser(value_parser!(u64))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            clap::Command::new("dump-luts")
                .about("Reports every LUT cell of the top module")
                .add_input_arg()
                .add_output_arg("Where to write the report (default: stdout)"),
        )
        .subcommand(
            clap::Command::new("tt-shuffle")
                .about("Renames the inputs of a truth table")
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_name("LABELS")
                        .help("Current input labels, input 0 first (e.g. ABCD)")
                        .required(true),
                )
                .arg(
                    Arg::new("table")
                        .long("table")
                        .value_name("LITERAL")
                        .help("Truth table as a b- or h-prefixed literal, MSB first")
                        .required(true),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_name("LABELS")
                        .help("New input order, a permutation of --from")
                        .required(true),
                ),
        )
        .get_matches();

    let config_flag = matches.get_one::<String>("config").map(|s| s.as_str());
    let config = match stitch_config::resolve_config_path(config_flag) {
        Some(path) => {
            if !path.exists() {
                report_cli_error_and_exit(
                    "config file does not exist",
                    None,
                    &[("path", path.display().to_string())],
                );
            }
            match stitch_config::load_stitch_config(&path) {
                Ok(config) => config,
                Err(e) => report_error_chain_and_exit(&e, None),
            }
        }
        None => StitchConfig::default(),
    };

    let (subcommand, result) = if let Some(matches) = matches.subcommand_matches("stitch") {
        ("stitch", stitch::handle_stitch(matches, &config))
    } else if let Some(matches) = matches.subcommand_matches("dump-luts") {
        ("dump-luts", dump_luts::handle_dump_luts(matches, &config))
    } else if let Some(matches) = matches.subcommand_matches("tt-shuffle") {
        ("tt-shuffle", tt_shuffle::handle_tt_shuffle(matches))
    } else if let Some(_matches) = matches.subcommand_matches("version") {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return;
    } else {
        report_cli_error_and_exit("No valid subcommand provided.", None, &[]);
    };
    if let Err(e) = result {
        report_error_chain_and_exit(&e, Some(subcommand));
    }
}
