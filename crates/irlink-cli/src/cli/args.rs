//! Shared argument builders for CLI commands.

use std::path::PathBuf;

use clap::{Arg, value_parser};

/// Single unit file (positional).
pub fn unit_path_arg() -> Arg {
    Arg::new("unit")
        .value_name("UNIT")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Serialized unit file")
}

/// One or more unit files (positional).
pub fn unit_paths_arg() -> Arg {
    Arg::new("units")
        .value_name("UNIT")
        .num_args(1..)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Serialized unit files")
}

/// Persisted session state (--state).
pub fn state_arg() -> Arg {
    Arg::new("state")
        .long("state")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Session state file to seed from and update")
}
