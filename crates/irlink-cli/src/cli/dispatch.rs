//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use crate::commands::check::CheckArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::link::LinkArgs;

pub struct DumpParams {
    pub unit: PathBuf,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            unit: m.get_one::<PathBuf>("unit").cloned().unwrap(),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self { unit: p.unit }
    }
}

pub struct CheckParams {
    pub units: Vec<PathBuf>,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            units: m
                .get_many::<PathBuf>("units")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self { units: p.units }
    }
}

pub struct LinkParams {
    pub units: Vec<PathBuf>,
    pub state: Option<PathBuf>,
}

impl LinkParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            units: m
                .get_many::<PathBuf>("units")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
            state: m.get_one::<PathBuf>("state").cloned(),
        }
    }
}

impl From<LinkParams> for LinkArgs {
    fn from(p: LinkParams) -> Self {
        Self {
            units: p.units,
            state: p.state,
        }
    }
}
