use lcsc2kicad::mesh::obj_to_wrl;

const OBJ_FIXTURE: &str = "\
newmtl m1
Ka 0.1 0.1 0.1
Kd 0.5 0 0
Ks 0.2 0.2 0.2
d 1
endmtl
newmtl m2
Kd 0 0 0.8
Ks 0.1 0.1 0.1
d 0.5
endmtl
v 0 0 0
v 2.54 0 0
v 0 2.54 0
v 2.54 2.54 0
usemtl m1
f 1 2 3
f 2 3 4
usemtl m2
f 1/1/1 2/2/2 4/4/4
";

#[test]
fn wrl_starts_with_the_vrml_header() {
    let wrl = obj_to_wrl(OBJ_FIXTURE);
    assert!(wrl.starts_with("#VRML V2.0 utf8\n"));
}

#[test]
fn shared_vertices_are_deduplicated_per_shape() {
    let wrl = obj_to_wrl(OBJ_FIXTURE);
    // First shape touches vertices 1-4; the two faces share 2 and 3, so the
    // index runs reuse local indices instead of re-adding points.
    assert!(wrl.contains("0, 1, 2, -1, 1, 2, 3, -1"));
    // Four unique points plus the repeated final one.
    let first_shape = wrl.split("Shape {").nth(1).unwrap();
    let point_block = first_shape
        .split("point [")
        .nth(1)
        .unwrap()
        .split(']')
        .next()
        .unwrap();
    assert_eq!(point_block.matches(',').count(), 5);
}

#[test]
fn second_material_group_reindexes_from_zero() {
    let wrl = obj_to_wrl(OBJ_FIXTURE);
    let second_shape = wrl.split("Shape {").nth(2).unwrap();
    assert!(second_shape.contains("0, 1, 2, -1"));
}

#[test]
fn material_channels_are_preserved() {
    let wrl = obj_to_wrl(OBJ_FIXTURE);
    assert!(wrl.contains("diffuseColor 0.5 0 0"));
    assert!(wrl.contains("specularColor 0.2 0.2 0.2"));
    assert!(wrl.contains("diffuseColor 0 0 0.8"));
    // d 0.5 becomes transparency 0.5.
    assert!(wrl.contains("transparency 0.5"));
}

#[test]
fn vertices_are_scaled_into_vrml_units() {
    let wrl = obj_to_wrl(OBJ_FIXTURE);
    // 2.54 mm is exactly one 0.1-inch VRML unit.
    assert!(wrl.contains("1.0000 0.0000 0.0000"));
}

#[test]
fn faces_without_a_material_still_produce_a_shape() {
    let wrl = obj_to_wrl("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
    assert!(wrl.contains("IndexedFaceSet"));
    assert!(wrl.contains("0, 1, 2, -1"));
    // Unknown material falls back to grey.
    assert!(wrl.contains("diffuseColor 0.5 0.5 0.5"));
}
