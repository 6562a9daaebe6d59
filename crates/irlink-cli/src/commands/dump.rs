use std::path::PathBuf;

use irlink_codec::dump::dump;

use super::load_unit;

pub struct DumpArgs {
    pub unit: PathBuf,
}

pub fn run(args: DumpArgs) {
    let unit = match load_unit(&args.unit) {
        Ok(unit) => unit,
        Err(msg) => {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        }
    };

    print!("{}", dump(&unit));
}
