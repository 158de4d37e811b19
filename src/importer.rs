// src/importer.rs
//
// Turns the raw EasyEDA API payload into normalized Ee* entities. Each shape
// line is a `~`-delimited positional record selected by its leading
// designator; unknown designators are skipped so one unrecognized record
// never fails the whole parse.

use crate::easyeda_models::*;
use crate::error::{Error, Result};
use glam::DVec3;
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

// --- Primitive utilities ---

/// Lenient numeric parse: anything that is not a finite number becomes the
/// fallback. Never fails.
pub fn to_number(value: &str, fallback: f64) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => fallback,
    }
}

/// Normalizes the vendor's show/hide-style flags. Empty, "hide", "false" and
/// "0" are false; "show", "true" and "1" are true; any other non-empty value
/// coerces to true, matching the source ecosystem's truthiness.
pub fn to_bool(flag: &str) -> bool {
    match flag.trim() {
        "" | "hide" | "false" | "0" => false,
        _ => true,
    }
}

/// Strips whitespace and path separators so a vendor name is safe to use as
/// a symbol identifier or file stem.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// Numeric coercion for JSON fields that are sometimes numbers, sometimes
/// strings, depending on the EasyEDA editor version.
fn json_number(value: &Value, fallback: f64) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(fallback),
        Value::String(s) => to_number(s, fallback),
        _ => fallback,
    }
}

fn parse_raw_line(line: &str) -> Vec<&str> {
    line.split('~').collect()
}

fn field<'a>(fields: &[&'a str], index: usize) -> &'a str {
    fields.get(index).copied().unwrap_or("")
}

/// Space-separated coordinate list ("x1 y1 x2 y2 …") into point pairs.
fn parse_points(raw: &str) -> Vec<(f64, f64)> {
    let values: Vec<f64> = raw
        .split_whitespace()
        .map(|v| to_number(v, 0.0))
        .collect();
    values.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

/// Reduces a pin lead path ("M670,-10h10") to its signed length: the last
/// numeric token is the horizontal or vertical delta of the lead stroke.
fn pin_lead_length(path: &str) -> f64 {
    let number = Regex::new(r"-?(?:\d+\.?\d*|\.\d+)").unwrap();
    number
        .find_iter(path)
        .last()
        .map(|m| to_number(m.as_str(), 0.0))
        .unwrap_or(0.0)
}

// --- Symbol parser ---

/// Parses the schematic-symbol half of the API payload.
pub fn import_symbol(data: &Value) -> Result<EeSymbol> {
    let data_str = &data["dataStr"];
    let c_para = &data_str["head"]["c_para"];

    let non_empty = |v: &Value| v.as_str().map(String::from).filter(|s| !s.is_empty());
    let info = EeSymbolInfo {
        name: c_para["name"].as_str().unwrap_or("Unknown").to_string(),
        prefix: c_para["pre"]
            .as_str()
            .unwrap_or("U")
            .trim_end_matches('?')
            .to_string(),
        package: non_empty(&c_para["package"]),
        manufacturer: non_empty(&c_para["BOM_Manufacturer"]),
        datasheet: non_empty(&data["lcsc"]["url"]),
        lcsc_id: non_empty(&data["lcsc"]["number"]),
        jlc_id: non_empty(&c_para["BOM_JLCPCB Part Class"]),
    };

    let mut symbol = EeSymbol {
        info,
        bbox: (
            json_number(&data_str["head"]["x"], 0.0),
            json_number(&data_str["head"]["y"], 0.0),
        ),
        ..Default::default()
    };

    let shapes = data_str["shape"]
        .as_array()
        .ok_or_else(|| Error::MissingData("Symbol shape data is missing".to_string()))?;

    for shape_val in shapes {
        let shape_str = shape_val.as_str().unwrap_or("");
        // Pin records carry `^^`-separated sub-segments; for every other
        // designator the whole line is one segment.
        let segments: Vec<&str> = shape_str.split("^^").collect();
        let fields = parse_raw_line(segments[0]);
        match field(&fields, 0) {
            "P" => symbol.pins.push(parse_pin(&segments)),
            "R" => symbol.rectangles.push(EeSymbolRectangle {
                pos_x: to_number(field(&fields, 1), 0.0),
                pos_y: to_number(field(&fields, 2), 0.0),
                width: to_number(field(&fields, 5), 0.0),
                height: to_number(field(&fields, 6), 0.0),
                stroke_width: to_number(field(&fields, 8), 1.0),
                is_filled: is_filled(field(&fields, 10)),
            }),
            "C" => symbol.circles.push(EeSymbolCircle {
                center_x: to_number(field(&fields, 1), 0.0),
                center_y: to_number(field(&fields, 2), 0.0),
                radius: to_number(field(&fields, 3), 0.0),
                stroke_width: to_number(field(&fields, 5), 1.0),
                is_filled: is_filled(field(&fields, 7)),
            }),
            "E" => symbol.ellipses.push(EeSymbolEllipse {
                center_x: to_number(field(&fields, 1), 0.0),
                center_y: to_number(field(&fields, 2), 0.0),
                radius_x: to_number(field(&fields, 3), 0.0),
                radius_y: to_number(field(&fields, 4), 0.0),
                stroke_width: to_number(field(&fields, 6), 1.0),
                is_filled: is_filled(field(&fields, 8)),
            }),
            "A" => symbol.arcs.push(EeSymbolArc {
                path: field(&fields, 1).to_string(),
                stroke_width: to_number(field(&fields, 4), 1.0),
            }),
            "PL" => symbol.polylines.push(EeSymbolPolyline {
                points: parse_points(field(&fields, 1)),
                stroke_width: to_number(field(&fields, 3), 1.0),
                is_filled: is_filled(field(&fields, 5)),
            }),
            "PG" => symbol.polygons.push(EeSymbolPolygon {
                points: parse_points(field(&fields, 1)),
                stroke_width: to_number(field(&fields, 3), 1.0),
                is_filled: is_filled(field(&fields, 5)),
            }),
            "PT" => symbol.paths.push(EeSymbolPath {
                path: field(&fields, 1).to_string(),
                stroke_width: to_number(field(&fields, 3), 1.0),
                is_filled: is_filled(field(&fields, 5)),
            }),
            other => debug!("skipping unrecognized symbol record '{}'", other),
        }
    }

    Ok(symbol)
}

fn is_filled(fill_color: &str) -> bool {
    !fill_color.is_empty() && fill_color != "none"
}

/// Pin records: seven ordered `^^` segments (settings, pin-dot reference,
/// lead path, name label, number label, dot marker, clock marker). Missing
/// segments degrade to empty field sets.
fn parse_pin(segments: &[&str]) -> EeSymbolPin {
    let seg = |idx: usize| parse_raw_line(segments.get(idx).copied().unwrap_or(""));

    let settings_fields = seg(0);
    let settings = EeSymbolPinSettings {
        is_displayed: to_bool(field(&settings_fields, 1)),
        electric_type: field(&settings_fields, 2).to_string(),
        number: field(&settings_fields, 3).to_string(),
        pos_x: to_number(field(&settings_fields, 4), 0.0),
        pos_y: to_number(field(&settings_fields, 5), 0.0),
        rotation: to_number(field(&settings_fields, 6), 0.0),
        id: field(&settings_fields, 7).to_string(),
        is_locked: to_bool(field(&settings_fields, 8)),
    };

    let path_fields = seg(2);
    let length = pin_lead_length(field(&path_fields, 0));

    let name_fields = seg(3);
    let name = EeSymbolPinName {
        is_displayed: to_bool(field(&name_fields, 0)),
        pos_x: to_number(field(&name_fields, 1), 0.0),
        pos_y: to_number(field(&name_fields, 2), 0.0),
        rotation: to_number(field(&name_fields, 3), 0.0),
        text: field(&name_fields, 4).to_string(),
        text_anchor: field(&name_fields, 5).to_string(),
        font: field(&name_fields, 6).to_string(),
        font_size: to_number(field(&name_fields, 7).trim_end_matches("pt"), 7.0),
    };

    let dot_fields = seg(5);
    let clock_fields = seg(6);

    EeSymbolPin {
        settings,
        length,
        name,
        dot: EeSymbolPinMarker {
            is_displayed: to_bool(field(&dot_fields, 0)),
        },
        clock: EeSymbolPinMarker {
            is_displayed: to_bool(field(&clock_fields, 0)),
        },
    }
}

// --- Footprint parser ---

// The SVGNODE payload is itself JSON; only these attributes matter.
#[derive(Deserialize, Debug)]
struct SvgNode {
    attrs: SvgNodeAttrs,
}

#[derive(Deserialize, Debug)]
struct SvgNodeAttrs {
    uuid: String,
    title: String,
    #[serde(default)]
    c_origin: Value,
    #[serde(default)]
    z: Value,
    #[serde(default)]
    c_rotation: Value,
}

/// Parses the footprint half of the API payload (`packageDetail`).
pub fn import_footprint(data: &Value) -> Result<EeFootprint> {
    let package = &data["packageDetail"];
    let data_str = &package["dataStr"];

    let mut footprint = EeFootprint {
        info: EeFootprintInfo {
            name: package["title"]
                .as_str()
                .unwrap_or("UnknownFootprint")
                .to_string(),
            fp_type: if package["SMT"].as_bool().unwrap_or(false) {
                EeFootprintType::Smd
            } else {
                EeFootprintType::Tht
            },
            model_3d_name: None,
        },
        bbox: (
            json_number(&data_str["head"]["x"], 0.0),
            json_number(&data_str["head"]["y"], 0.0),
        ),
        ..Default::default()
    };

    let shapes = data_str["shape"]
        .as_array()
        .ok_or_else(|| Error::MissingData("Footprint shape data is missing".to_string()))?;

    for shape_val in shapes {
        let shape_str = shape_val.as_str().unwrap_or("");
        let fields = parse_raw_line(shape_str);
        match field(&fields, 0) {
            "PAD" => footprint.pads.push(EeFootprintPad {
                shape: field(&fields, 1).to_string(),
                center_x: to_number(field(&fields, 2), 0.0),
                center_y: to_number(field(&fields, 3), 0.0),
                width: to_number(field(&fields, 4), 0.0),
                height: to_number(field(&fields, 5), 0.0),
                layer_id: to_number(field(&fields, 6), 0.0) as i32,
                net: field(&fields, 7).to_string(),
                number: field(&fields, 8).to_string(),
                hole_radius: to_number(field(&fields, 9), 0.0),
                points: parse_points(field(&fields, 10)),
                rotation: to_number(field(&fields, 11), 0.0),
                hole_length: to_number(field(&fields, 13), 0.0),
                is_locked: to_bool(field(&fields, 15)),
            }),
            "TRACK" => footprint.tracks.push(EeFootprintTrack {
                stroke_width: to_number(field(&fields, 1), 0.0),
                layer_id: to_number(field(&fields, 2), 0.0) as i32,
                points: parse_points(field(&fields, 4)),
            }),
            "HOLE" => footprint.holes.push(EeFootprintHole {
                center_x: to_number(field(&fields, 1), 0.0),
                center_y: to_number(field(&fields, 2), 0.0),
                radius: to_number(field(&fields, 3), 0.0),
            }),
            "VIA" => footprint.vias.push(EeFootprintVia {
                center_x: to_number(field(&fields, 1), 0.0),
                center_y: to_number(field(&fields, 2), 0.0),
                diameter: to_number(field(&fields, 3), 0.0),
                hole_radius: to_number(field(&fields, 5), 0.0),
            }),
            "CIRCLE" => footprint.circles.push(EeFootprintCircle {
                center_x: to_number(field(&fields, 1), 0.0),
                center_y: to_number(field(&fields, 2), 0.0),
                radius: to_number(field(&fields, 3), 0.0),
                stroke_width: to_number(field(&fields, 4), 0.1),
                layer_id: to_number(field(&fields, 5), 0.0) as i32,
            }),
            "ARC" => footprint.arcs.push(EeFootprintArc {
                stroke_width: to_number(field(&fields, 1), 0.1),
                layer_id: to_number(field(&fields, 2), 0.0) as i32,
                path: field(&fields, 4).to_string(),
            }),
            "RECT" => footprint.rectangles.push(EeFootprintRectangle {
                pos_x: to_number(field(&fields, 1), 0.0),
                pos_y: to_number(field(&fields, 2), 0.0),
                width: to_number(field(&fields, 3), 0.0),
                height: to_number(field(&fields, 4), 0.0),
                layer_id: to_number(field(&fields, 5), 0.0) as i32,
            }),
            "TEXT" => footprint.texts.push(EeFootprintText {
                text_type: field(&fields, 1).to_string(),
                center_x: to_number(field(&fields, 2), 0.0),
                center_y: to_number(field(&fields, 3), 0.0),
                stroke_width: to_number(field(&fields, 4), 0.1),
                rotation: to_number(field(&fields, 5), 0.0),
                layer_id: to_number(field(&fields, 7), 0.0) as i32,
                font_size: to_number(field(&fields, 9), 1.0),
                text: field(&fields, 10).to_string(),
                is_displayed: fields.get(12).is_none_or(|v| *v != "none"),
            }),
            "SVGNODE" => {
                // The payload after the designator is a JSON attribute object
                // describing the linked 3D asset. If it is malformed, drop
                // only the 3D reference and keep parsing the footprint.
                if let Some((_, json_part)) = shape_str.split_once('~') {
                    match serde_json::from_str::<SvgNode>(json_part) {
                        Ok(node) => {
                            footprint.info.model_3d_name = Some(node.attrs.title.clone());
                            footprint.model_3d = Some(svg_node_to_model(node));
                        }
                        Err(e) => warn!("dropping malformed 3D model metadata: {}", e),
                    }
                }
            }
            other => debug!("skipping unrecognized footprint record '{}'", other),
        }
    }

    Ok(footprint)
}

fn svg_node_to_model(node: SvgNode) -> Ee3dModel {
    let attrs = node.attrs;
    let origin = triple_or_pair(&attrs.c_origin);
    let rotation = triple_or_pair(&attrs.c_rotation);
    Ee3dModel {
        uuid: attrs.uuid,
        name: attrs.title,
        translation: DVec3::new(origin.x, origin.y, json_number(&attrs.z, 0.0)),
        rotation,
        raw_obj: None,
        step: None,
    }
}

/// "x,y" or "x,y,z" attribute strings; missing components are zero.
fn triple_or_pair(value: &Value) -> DVec3 {
    let raw = value.as_str().unwrap_or("");
    let mut parts = raw.split(',').map(|p| to_number(p, 0.0));
    DVec3::new(
        parts.next().unwrap_or(0.0),
        parts.next().unwrap_or(0.0),
        parts.next().unwrap_or(0.0),
    )
}
