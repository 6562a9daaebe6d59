use std::path::PathBuf;

use irlink_core::UnitSeq;
use irlink_linker::{Linker, Session};

use super::load_unit;

pub struct LinkArgs {
    pub units: Vec<PathBuf>,
    /// Session state file: seeded from if present, rewritten after a
    /// successful link.
    pub state: Option<PathBuf>,
}

pub fn run(args: LinkArgs) {
    let session = match &args.state {
        Some(path) if path.exists() => {
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("error: {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            };
            match Session::from_bytes(&bytes) {
                Ok(session) => session,
                Err(e) => {
                    eprintln!("error: {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        _ => Session::new(UnitSeq::new(0)),
    };

    let mut linker = Linker::new(session);
    for path in &args.units {
        let unit = match load_unit(path) {
            Ok(unit) => unit,
            Err(msg) => {
                eprintln!("error: {}", msg);
                std::process::exit(1);
            }
        };
        if let Err(e) = linker.add_unit(unit) {
            eprintln!("error: {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    let (units, definitions) = match linker.link() {
        Ok(graph) => (graph.unit_count(), graph.definition_count()),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    println!("linked {units} units, {definitions} symbol definitions");

    if let Some(path) = &args.state {
        if let Err(e) = std::fs::write(path, linker.session().to_bytes()) {
            eprintln!("error: {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
