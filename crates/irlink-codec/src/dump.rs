//! Human-readable dump of a decoded unit, for debugging and the CLI.

use std::fmt::Write as _;

use irlink_core::DeclKind;

use crate::record::{ChildRef, UnlinkedDecl};
use crate::unit::UnlinkedUnit;

/// Generate a human-readable dump of a decoded unit.
pub fn dump(unit: &UnlinkedUnit) -> String {
    let mut out = String::new();

    writeln!(out, "[unit]").unwrap();
    writeln!(out, "name = {:?}", unit.name).unwrap();
    writeln!(out, "seq  = {}", unit.seq.as_u32()).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "[strings]").unwrap();
    for (i, s) in unit.strings.iter() {
        writeln!(out, "S{i} {s:?}").unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "[types]").unwrap();
    for (i, shape) in unit.types.iter() {
        let classifier = unit
            .strings
            .get(shape.classifier.as_u32())
            .map(String::as_str)
            .unwrap_or("<invalid>");
        let mut line = format!("T{i} {classifier:?}");
        if !shape.arguments.is_empty() {
            let args: Vec<String> = shape
                .arguments
                .iter()
                .map(|a| format!("T{}", a.as_u32()))
                .collect();
            line.push_str(&format!("<{}>", args.join(", ")));
        }
        if shape.nullable {
            line.push('?');
        }
        if let Some(symbol) = shape.classifier_symbol {
            line.push_str(&format!(" {symbol}"));
        }
        writeln!(out, "{line}").unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "[decls]").unwrap();
    for &root in &unit.roots {
        dump_decl(&mut out, unit, unit.decl(root), None, 0);
    }

    out
}

fn kind_label(kind: DeclKind) -> &'static str {
    match kind {
        DeclKind::Class => "class",
        DeclKind::TypeParameter => "type_parameter",
        DeclKind::ValueParameter => "value_parameter",
        DeclKind::Function => "function",
        DeclKind::Field => "field",
    }
}

fn dump_decl(
    out: &mut String,
    unit: &UnlinkedUnit,
    decl: &UnlinkedDecl,
    child: Option<ChildRef>,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    let name = unit.name_of(decl).unwrap_or("<invalid>");
    let mut line = format!("{indent}{} {name:?}", kind_label(decl.kind()));
    if let Some(symbol) = child.and_then(ChildRef::symbol) {
        line.push_str(&format!(" {symbol}"));
    }
    if !decl.supertypes.is_empty() {
        let supers: Vec<String> = decl
            .supertypes
            .iter()
            .map(|t| format!("T{}", t.as_u32()))
            .collect();
        line.push_str(&format!(" : {}", supers.join(", ")));
    }
    writeln!(out, "{line}").unwrap();

    for child in decl.children() {
        dump_decl(out, unit, unit.decl(child.decl()), Some(child), depth + 1);
    }
}
