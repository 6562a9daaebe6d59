//! Command builders for the CLI.
//!
//! Each command is built from the shared arg builders in `args.rs`.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("irlink")
        .about("Inspect and link serialized IR declaration units")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(dump_command())
        .subcommand(check_command())
        .subcommand(link_command())
}

/// Print a human-readable listing of one unit.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Print a human-readable listing of a unit")
        .override_usage("irlink dump <UNIT>")
        .after_help(
            r#"EXAMPLES:
  irlink dump widgets.irlk            # tables and declaration tree"#,
        )
        .arg(unit_path_arg())
}

/// Validate units without linking.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate serialized units")
        .override_usage("irlink check <UNIT>...")
        .after_help(
            r#"EXAMPLES:
  irlink check widgets.irlk           # one unit
  irlink check build/*.irlk           # every unit, errors reported per file"#,
        )
        .arg(unit_paths_arg())
}

/// Link units into a declaration graph.
pub fn link_command() -> Command {
    Command::new("link")
        .about("Link units into a declaration graph")
        .override_usage("irlink link <UNIT>... [--state <FILE>]")
        .after_help(
            r#"EXAMPLES:
  irlink link build/*.irlk                      # one-shot link
  irlink link build/*.irlk --state .irlink      # seed and update session state"#,
        )
        .arg(unit_paths_arg())
        .arg(state_arg())
}
