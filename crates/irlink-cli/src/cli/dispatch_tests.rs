use std::path::PathBuf;

use super::commands::build_cli;
use super::dispatch::{CheckParams, DumpParams, LinkParams};

#[test]
fn dump_takes_one_unit() {
    let matches = build_cli()
        .try_get_matches_from(["irlink", "dump", "widgets.irlk"])
        .unwrap();
    let (name, m) = matches.subcommand().unwrap();
    assert_eq!(name, "dump");
    let params = DumpParams::from_matches(m);
    assert_eq!(params.unit, PathBuf::from("widgets.irlk"));
}

#[test]
fn check_takes_many_units() {
    let matches = build_cli()
        .try_get_matches_from(["irlink", "check", "a.irlk", "b.irlk"])
        .unwrap();
    let (name, m) = matches.subcommand().unwrap();
    assert_eq!(name, "check");
    let params = CheckParams::from_matches(m);
    assert_eq!(
        params.units,
        vec![PathBuf::from("a.irlk"), PathBuf::from("b.irlk")]
    );
}

#[test]
fn check_requires_a_unit() {
    assert!(build_cli().try_get_matches_from(["irlink", "check"]).is_err());
}

#[test]
fn link_accepts_state_flag() {
    let matches = build_cli()
        .try_get_matches_from(["irlink", "link", "a.irlk", "b.irlk", "--state", ".irlink"])
        .unwrap();
    let (name, m) = matches.subcommand().unwrap();
    assert_eq!(name, "link");
    let params = LinkParams::from_matches(m);
    assert_eq!(params.units.len(), 2);
    assert_eq!(params.state, Some(PathBuf::from(".irlink")));
}

#[test]
fn link_state_is_optional() {
    let matches = build_cli()
        .try_get_matches_from(["irlink", "link", "a.irlk"])
        .unwrap();
    let (_, m) = matches.subcommand().unwrap();
    let params = LinkParams::from_matches(m);
    assert_eq!(params.state, None);
}
