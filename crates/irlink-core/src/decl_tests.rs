use crate::{DeclKind, DeclNode, TypeShape, Unit, UnitSeq};

fn sample_unit() -> Unit {
    let mut unit = Unit::new("src/widgets.ir", UnitSeq::new(1));

    let name = unit.intern_str("Widget");
    let t_name = unit.intern_str("T");
    let base_name = unit.intern_str("demo.Base");

    let base_ty = unit.intern_type(TypeShape::simple(base_name));

    let tp = unit
        .arena
        .alloc(DeclNode::new(DeclKind::TypeParameter, t_name));

    let mut class = DeclNode::new(DeclKind::Class, name);
    class.type_parameters.push(tp);
    class.supertypes.push(base_ty);
    let class = unit.arena.alloc(class);
    unit.roots.push(class);

    unit
}

#[test]
fn arena_handles_resolve_in_order() {
    let unit = sample_unit();

    assert_eq!(unit.arena.len(), 2);
    let class = unit.arena.get(unit.roots[0]);
    assert_eq!(class.kind(), DeclKind::Class);
    assert_eq!(unit.strings.get(class.name.as_u32()).unwrap(), "Widget");

    let tp = unit.arena.get(class.type_parameters[0]);
    assert_eq!(tp.kind(), DeclKind::TypeParameter);
}

#[test]
fn type_shapes_deduplicate() {
    let mut unit = Unit::new("u", UnitSeq::new(0));
    let name = unit.intern_str("demo.Base");

    let a = unit.intern_type(TypeShape::simple(name));
    let b = unit.intern_type(TypeShape::simple(name));
    let c = unit.intern_type(TypeShape {
        nullable: true,
        ..TypeShape::simple(name)
    });

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(unit.types.len(), 2);
}

#[test]
fn supertype_duplicates_are_representable() {
    let mut unit = Unit::new("u", UnitSeq::new(0));
    let name = unit.intern_str("demo.Base");
    let class_name = unit.intern_str("C");
    let ty = unit.intern_type(TypeShape::simple(name));

    let mut class = DeclNode::new(DeclKind::Class, class_name);
    class.supertypes.push(ty);
    class.supertypes.push(ty);
    let id = unit.arena.alloc(class);

    assert_eq!(unit.arena.get(id).supertypes, vec![ty, ty]);
}

#[test]
fn unit_json_roundtrip() {
    let unit = sample_unit();

    let json = serde_json::to_string(&unit).unwrap();
    let back: Unit = serde_json::from_str(&json).unwrap();

    assert_eq!(unit, back);
}
