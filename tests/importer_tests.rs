use lcsc2kicad::importer::{
    import_footprint, import_symbol, sanitize_identifier, to_bool, to_number,
};
use serde_json::json;

const PIN_RECORD: &str = "P~show~4~1~475~-160~180~gge23~0^^475~-160^^M 475 -160 h -20~#880000^^1~455~-160~0~RST#~end~~7pt^^1~475~-160~0~1~start~~7pt^^1~465~-160^^0~M 460 -157 L 464 -160 L 460 -163";

fn symbol_payload(shapes: Vec<&str>) -> serde_json::Value {
    json!({
        "dataStr": {
            "head": {
                "x": "400",
                "y": "300",
                "c_para": {
                    "name": "NE555",
                    "pre": "U?",
                    "package": "DIP-8",
                    "BOM_Manufacturer": "TI"
                }
            },
            "shape": shapes
        },
        "lcsc": { "url": "https://lcsc.com/ne555", "number": "C7593" }
    })
}

fn footprint_payload(shapes: Vec<&str>) -> serde_json::Value {
    json!({
        "packageDetail": {
            "title": "SOIC-8_TEST",
            "SMT": true,
            "dataStr": {
                "head": { "x": 3990, "y": 2990 },
                "shape": shapes
            }
        }
    })
}

#[test]
fn lenient_primitives_never_fail() {
    assert_eq!(to_number("12.5", 0.0), 12.5);
    assert_eq!(to_number("  -3 ", 0.0), -3.0);
    assert_eq!(to_number("abc", 7.0), 7.0);
    assert_eq!(to_number("", 1.5), 1.5);

    assert!(to_bool("show"));
    assert!(to_bool("true"));
    assert!(to_bool("1"));
    assert!(!to_bool("hide"));
    assert!(!to_bool("false"));
    assert!(!to_bool("0"));
    assert!(!to_bool(""));
    // Unrecognized non-empty values coerce truthy.
    assert!(to_bool("yes"));

    assert_eq!(sanitize_identifier("SOT-23 (TO-236)/A"), "SOT-23(TO-236)_A");
}

#[test]
fn symbol_header_and_pin_record_parse() {
    let data = symbol_payload(vec![
        PIN_RECORD,
        "R~390~290~2~2~20~20~#880000~1~0~none~gge5~0",
    ]);
    let symbol = import_symbol(&data).unwrap();

    assert_eq!(symbol.info.name, "NE555");
    assert_eq!(symbol.info.prefix, "U");
    assert_eq!(symbol.info.package.as_deref(), Some("DIP-8"));
    assert_eq!(symbol.info.manufacturer.as_deref(), Some("TI"));
    assert_eq!(symbol.info.lcsc_id.as_deref(), Some("C7593"));
    assert_eq!(symbol.bbox, (400.0, 300.0));

    assert_eq!(symbol.pins.len(), 1);
    let pin = &symbol.pins[0];
    assert_eq!(pin.settings.number, "1");
    assert_eq!(pin.settings.electric_type, "4");
    assert_eq!(pin.settings.pos_x, 475.0);
    assert_eq!(pin.settings.pos_y, -160.0);
    assert_eq!(pin.settings.rotation, 180.0);
    // Lead path "h -20" reduces to a signed length.
    assert_eq!(pin.length, -20.0);
    assert_eq!(pin.name.text, "RST#");
    assert_eq!(pin.name.font_size, 7.0);
    assert!(pin.dot.is_displayed);
    assert!(!pin.clock.is_displayed);

    assert_eq!(symbol.rectangles.len(), 1);
    let rect = &symbol.rectangles[0];
    assert_eq!(rect.pos_x, 390.0);
    assert_eq!(rect.width, 20.0);
    assert_eq!(rect.height, 20.0);
    assert!(!rect.is_filled);
}

#[test]
fn pin_with_missing_segments_degrades_to_defaults() {
    let data = symbol_payload(vec!["P~show~0~2~100~50~0~gge9~0"]);
    let symbol = import_symbol(&data).unwrap();
    let pin = &symbol.pins[0];
    assert_eq!(pin.settings.number, "2");
    assert_eq!(pin.length, 0.0);
    assert_eq!(pin.name.text, "");
    assert!(!pin.dot.is_displayed);
    assert!(!pin.clock.is_displayed);
}

#[test]
fn unknown_symbol_designators_are_skipped() {
    let with_unknown = import_symbol(&symbol_payload(vec![
        PIN_RECORD,
        "WEIRD~1~2~3",
        "C~400~320~5~#880000~1~0~none~gge7~0",
    ]))
    .unwrap();
    let without = import_symbol(&symbol_payload(vec![
        PIN_RECORD,
        "C~400~320~5~#880000~1~0~none~gge7~0",
    ]))
    .unwrap();

    assert_eq!(with_unknown.pins.len(), without.pins.len());
    assert_eq!(with_unknown.circles.len(), without.circles.len());
    assert_eq!(with_unknown.circles[0].radius, 5.0);
}

#[test]
fn footprint_records_parse_into_their_buckets() {
    let data = footprint_payload(vec![
        "PAD~ELLIPSE~4000~3000~6~6~11~~1~1.8~~0~gge16~0~~~0",
        "TRACK~1~3~~4000 3000 4010 3000~gge10~0",
        "HOLE~4005~3005~2~gge8~0",
        "VIA~4005~3005~3~~1.2~gge9~0",
        "CIRCLE~4010~3010~5~1~3~gge11~0",
        "ARC~1~3~~M 4000 3000 A 5 5 0 0 1 4010 3000~~gge12~0",
        "RECT~4000~3000~10~5~3~gge13~0",
        "TEXT~N~4000~2990~0.8~0~~3~~4.5~TEST~~~gge14",
    ]);
    let footprint = import_footprint(&data).unwrap();

    assert_eq!(footprint.info.name, "SOIC-8_TEST");
    assert_eq!(footprint.bbox, (3990.0, 2990.0));
    assert_eq!(footprint.pads.len(), 1);
    assert_eq!(footprint.tracks.len(), 1);
    assert_eq!(footprint.holes.len(), 1);
    assert_eq!(footprint.vias.len(), 1);
    assert_eq!(footprint.circles.len(), 1);
    assert_eq!(footprint.arcs.len(), 1);
    assert_eq!(footprint.rectangles.len(), 1);
    assert_eq!(footprint.texts.len(), 1);

    let pad = &footprint.pads[0];
    assert_eq!(pad.shape, "ELLIPSE");
    assert_eq!(pad.number, "1");
    assert_eq!(pad.hole_radius, 1.8);

    let via = &footprint.vias[0];
    assert_eq!(via.diameter, 3.0);
    assert_eq!(via.hole_radius, 1.2);

    let text = &footprint.texts[0];
    assert_eq!(text.text_type, "N");
    assert_eq!(text.text, "TEST");
    assert!(text.is_displayed);
}

#[test]
fn unknown_footprint_designators_do_not_change_counts() {
    let base = vec![
        "PAD~ELLIPSE~4000~3000~6~6~11~~1~1.8~~0~gge16~0~~~0",
        "TRACK~1~3~~4000 3000 4010 3000~gge10~0",
    ];
    let mut with_unknown = base.clone();
    with_unknown.insert(1, "SOLIDREGION~1~~M 4000 3000 Z~solid~gge17~~~~0");

    let a = import_footprint(&footprint_payload(base)).unwrap();
    let b = import_footprint(&footprint_payload(with_unknown)).unwrap();
    assert_eq!(a.pads.len(), b.pads.len());
    assert_eq!(a.tracks.len(), b.tracks.len());
}

#[test]
fn svgnode_metadata_becomes_a_model_reference() {
    let data = footprint_payload(vec![
        r#"SVGNODE~{"gId":"g1","nodeName":"g","attrs":{"uuid":"u123","title":"SOIC-8","c_origin":"4005,3005","z":"2","c_rotation":"0,0,90"}}"#,
    ]);
    let footprint = import_footprint(&data).unwrap();
    let model = footprint.model_3d.expect("model reference");
    assert_eq!(model.uuid, "u123");
    assert_eq!(model.name, "SOIC-8");
    assert_eq!(model.translation.x, 4005.0);
    assert_eq!(model.translation.y, 3005.0);
    assert_eq!(model.translation.z, 2.0);
    assert_eq!(model.rotation.z, 90.0);
    assert_eq!(footprint.info.model_3d_name.as_deref(), Some("SOIC-8"));
}

#[test]
fn malformed_svgnode_json_drops_only_the_model() {
    let data = footprint_payload(vec![
        "PAD~ELLIPSE~4000~3000~6~6~11~~1~1.8~~0~gge16~0~~~0",
        "SVGNODE~{this is not json",
    ]);
    let footprint = import_footprint(&data).unwrap();
    assert!(footprint.model_3d.is_none());
    assert_eq!(footprint.pads.len(), 1);
}

#[test]
fn missing_shape_array_is_a_hard_error() {
    let data = json!({ "dataStr": { "head": {} } });
    assert!(import_symbol(&data).is_err());
}
