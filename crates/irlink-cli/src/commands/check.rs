use std::path::PathBuf;

use super::load_unit;

pub struct CheckArgs {
    pub units: Vec<PathBuf>,
}

pub fn run(args: CheckArgs) {
    // Units fail independently: one corrupt file never hides errors in the
    // others.
    let mut failed = false;
    for path in &args.units {
        if let Err(msg) = load_unit(path) {
            eprintln!("error: {}", msg);
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }

    // Silent on success (like cargo check)
}
