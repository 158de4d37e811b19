// src/converter.rs
//
// Unit and coordinate conversion between the EasyEDA and KiCad worlds.
// Symbols flip the Y axis (EasyEDA is screen-down, KiCad symbols are
// math-up); footprints keep the vendor orientation and only rebase.

use crate::easyeda_models::*;
use crate::error::Result;
use crate::geometry::{self, PathCommand, DEGENERATE_ARC_EXTENT};
use crate::kicad_models::*;
use crate::mesh;
use glam::DVec3;
use log::warn;
use regex::Regex;

/// Schematic canvas: 1 vendor unit = 10 mil, defined through mils.
pub fn ee_sym_to_mm(value: f64) -> f64 {
    value * 10.0 * 0.0254
}

/// PCB canvas: 1 vendor unit = 10 mil, defined directly in mm.
pub fn ee_fp_to_mm(value: f64) -> f64 {
    value * 0.254
}

/// Where the footprint's model clause points, relative to the library root.
pub const DEFAULT_MODEL_DIR: &str = "../3dmodels.3dshapes";

const TOLERANCE: f64 = 1e-6;

// --- Symbol conversion ---

fn map_pin_type(ee_type: &str) -> KiPinType {
    match ee_type {
        "1" => KiPinType::Input,
        "2" => KiPinType::Output,
        "3" => KiPinType::Bidirectional,
        "4" => KiPinType::PowerIn,
        _ => KiPinType::Unspecified,
    }
}

fn map_pin_style(dot_visible: bool, clock_visible: bool) -> KiPinStyle {
    match (dot_visible, clock_visible) {
        (true, true) => KiPinStyle::InvertedClock,
        (true, false) => KiPinStyle::Inverted,
        (false, true) => KiPinStyle::Clock,
        (false, false) => KiPinStyle::Line,
    }
}

/// Converts an EasyEDA symbol to a KiCad symbol.
pub fn convert_symbol(ee_symbol: EeSymbol) -> Result<KiSymbol> {
    let (bbox_x, bbox_y) = ee_symbol.bbox;
    // Rebase against the document origin, scale, negate Y.
    let map = |x: f64, y: f64| (ee_sym_to_mm(x - bbox_x), -ee_sym_to_mm(y - bbox_y));

    let mut ki = KiSymbol {
        name: crate::importer::sanitize_identifier(&ee_symbol.info.name),
        reference: ee_symbol.info.prefix,
        footprint: ee_symbol.info.package.unwrap_or_default(),
        datasheet: ee_symbol.info.datasheet.unwrap_or_default(),
        manufacturer: ee_symbol.info.manufacturer.unwrap_or_default(),
        lcsc_id: ee_symbol.info.lcsc_id.unwrap_or_default(),
        jlc_id: ee_symbol.info.jlc_id.unwrap_or_default(),
        ..Default::default()
    };

    for ee_pin in ee_symbol.pins {
        let settings = &ee_pin.settings;
        ki.pins.push(KiSymbolPin {
            name: ee_pin.name.text.clone(),
            number: settings.number.clone(),
            pin_type: map_pin_type(&settings.electric_type),
            style: map_pin_style(ee_pin.dot.is_displayed, ee_pin.clock.is_displayed),
            pos: map(settings.pos_x, settings.pos_y),
            rotation: (180 + settings.rotation as i32).rem_euclid(360),
            length: ee_sym_to_mm(ee_pin.length.abs()),
        });
    }

    for ee_rect in ee_symbol.rectangles {
        let start = map(ee_rect.pos_x, ee_rect.pos_y);
        ki.rectangles.push(KiSymbolRect {
            start,
            end: (
                start.0 + ee_sym_to_mm(ee_rect.width),
                start.1 - ee_sym_to_mm(ee_rect.height),
            ),
            stroke_width: ee_sym_to_mm(ee_rect.stroke_width),
        });
    }

    for ee_circle in ee_symbol.circles {
        ki.circles.push(KiSymbolCircle {
            center: map(ee_circle.center_x, ee_circle.center_y),
            radius: ee_sym_to_mm(ee_circle.radius),
            stroke_width: ee_sym_to_mm(ee_circle.stroke_width),
            filled: ee_circle.is_filled,
        });
    }

    // KiCad symbols have no ellipse primitive; only circular ellipses survive.
    for ee_ellipse in ee_symbol.ellipses {
        if (ee_ellipse.radius_x - ee_ellipse.radius_y).abs() > TOLERANCE {
            warn!(
                "dropping non-circular ellipse ({} x {})",
                ee_ellipse.radius_x, ee_ellipse.radius_y
            );
            continue;
        }
        ki.circles.push(KiSymbolCircle {
            center: map(ee_ellipse.center_x, ee_ellipse.center_y),
            radius: ee_sym_to_mm(ee_ellipse.radius_x),
            stroke_width: ee_sym_to_mm(ee_ellipse.stroke_width),
            filled: ee_ellipse.is_filled,
        });
    }

    for ee_arc in ee_symbol.arcs {
        ki.arcs.extend(convert_path_arcs(
            &ee_arc.path,
            ee_sym_to_mm(ee_arc.stroke_width),
            map,
            ee_sym_to_mm,
            true,
        ));
    }

    for ee_poly in ee_symbol.polylines {
        ki.polylines
            .push(convert_polyline(&ee_poly.points, ee_poly.stroke_width, ee_poly.is_filled, ee_poly.is_filled, map));
    }
    for ee_poly in ee_symbol.polygons {
        ki.polylines
            .push(convert_polyline(&ee_poly.points, ee_poly.stroke_width, ee_poly.is_filled, true, map));
    }
    for ee_path in ee_symbol.paths {
        if let Some(poly) = convert_line_path(&ee_path, map) {
            ki.polylines.push(poly);
        }
    }

    Ok(ki)
}

fn convert_polyline(
    points: &[(f64, f64)],
    stroke_width: f64,
    filled: bool,
    close: bool,
    map: impl Fn(f64, f64) -> (f64, f64),
) -> KiSymbolPolyline {
    let mut mapped: Vec<(f64, f64)> = points.iter().map(|&(x, y)| map(x, y)).collect();
    if close && !mapped.is_empty() {
        mapped.push(mapped[0]);
    }
    KiSymbolPolyline {
        points: mapped,
        stroke_width: ee_sym_to_mm(stroke_width),
        filled,
    }
}

/// PT records carrying only move/line/close commands become polylines; any
/// other command in the path is ignored.
fn convert_line_path(
    ee_path: &EeSymbolPath,
    map: impl Fn(f64, f64) -> (f64, f64),
) -> Option<KiSymbolPolyline> {
    let mut points = Vec::new();
    for command in geometry::tokenize_path(&ee_path.path) {
        match command {
            PathCommand::MoveTo { x, y } | PathCommand::LineTo { x, y } => {
                points.push(map(x, y));
            }
            PathCommand::Close => {
                if let Some(&first) = points.first() {
                    points.push(first);
                }
            }
            PathCommand::Arc { .. } => {}
        }
    }
    if points.is_empty() {
        return None;
    }
    if ee_path.is_filled && points.first() != points.last() {
        points.push(points[0]);
    }
    Some(KiSymbolPolyline {
        points,
        stroke_width: ee_sym_to_mm(ee_path.stroke_width),
        filled: ee_path.is_filled,
    })
}

/// Walks an SVG path and solves every arc command into start/mid/end form.
/// `mirror_sweep` is set for symbol space, where the Y negation flips the
/// arc orientation.
fn convert_path_arcs(
    path: &str,
    stroke_width: f64,
    map: impl Fn(f64, f64) -> (f64, f64),
    scale: impl Fn(f64) -> f64,
    mirror_sweep: bool,
) -> Vec<KiSymbolArc> {
    let mut arcs = Vec::new();
    let mut current = (0.0, 0.0);
    for command in geometry::tokenize_path(path) {
        match command {
            PathCommand::MoveTo { x, y } | PathCommand::LineTo { x, y } => current = (x, y),
            PathCommand::Arc {
                radius_x,
                radius_y,
                x_rotation,
                large_arc,
                sweep,
                end_x,
                end_y,
            } => {
                let start = map(current.0, current.1);
                let end = map(end_x, end_y);
                let sweep = if mirror_sweep { !sweep } else { sweep };
                let solved = geometry::svg_arc_to_center(
                    start,
                    end,
                    scale(radius_x),
                    scale(radius_y),
                    x_rotation,
                    large_arc,
                    sweep,
                );
                current = (end_x, end_y);
                if solved.extent == DEGENERATE_ARC_EXTENT {
                    warn!("skipping degenerate arc in path '{}'", path);
                    continue;
                }
                let radius = ((start.0 - solved.center_x).powi(2)
                    + (start.1 - solved.center_y).powi(2))
                .sqrt();
                let start_angle =
                    geometry::angle_of(solved.center_x, solved.center_y, start.0, start.1);
                arcs.push(KiSymbolArc {
                    start,
                    mid: geometry::arc_midpoint(
                        solved.center_x,
                        solved.center_y,
                        radius,
                        start_angle,
                        start_angle + solved.extent,
                    ),
                    end,
                    stroke_width,
                });
            }
            PathCommand::Close => {}
        }
    }
    arcs
}

// --- Footprint conversion ---

/// Maps EasyEDA layer IDs to KiCad layer names.
fn map_layer(layer_id: i32) -> &'static str {
    match layer_id {
        1 => "F.Cu",
        2 => "B.Cu",
        3 => "F.SilkS",
        4 => "B.SilkS",
        5 => "F.Paste",
        6 => "B.Paste",
        7 => "F.Mask",
        8 => "B.Mask",
        10 | 11 => "Edge.Cuts",
        12 => "Cmts.User",
        13 => "F.Fab",
        14 => "B.Fab",
        15 => "Dwgs.User",
        101 => "F.Fab",
        _ => "Cmts.User",
    }
}

/// Copper/mask stacks for pads: through-hole pads span both sides.
fn pad_layers(layer_id: i32, has_hole: bool) -> Vec<String> {
    let set: &[&str] = if has_hole {
        &["*.Cu", "*.Mask"]
    } else if layer_id == 2 {
        &["B.Cu", "B.Paste", "B.Mask"]
    } else {
        &["F.Cu", "F.Paste", "F.Mask"]
    };
    set.iter().map(|s| s.to_string()).collect()
}

/// Maps EasyEDA pad shapes to KiCad pad shapes.
fn map_pad_shape(shape: &str) -> FpShape {
    match shape {
        "ELLIPSE" => FpShape::Circle,
        "RECT" => FpShape::Rect,
        "OVAL" => FpShape::Oval,
        "POLYGON" => FpShape::Custom,
        _ => FpShape::Rect,
    }
}

/// EasyEDA sometimes wraps the pad number in annotation, e.g. "A(12)".
/// Only the parenthesized part is the designator.
fn trim_pad_number(number: &str) -> String {
    let re = Regex::new(r"\(([^)]*)\)").unwrap();
    match re.captures(number) {
        Some(caps) => caps[1].to_string(),
        None => number.to_string(),
    }
}

/// Converts an EasyEDA footprint to a KiCad footprint, folding in the
/// already-converted 3D model when one exists.
pub fn convert_footprint(
    ee_footprint: EeFootprint,
    ki_model: Option<Ki3dModel>,
) -> Result<KiFootprint> {
    let (bbox_x, bbox_y) = ee_footprint.bbox;
    // Footprint space matches KiCad's directly: rebase and scale, no Y flip.
    let map = |x: f64, y: f64| (ee_fp_to_mm(x - bbox_x), ee_fp_to_mm(y - bbox_y));
    let is_smd = ee_footprint.info.fp_type == EeFootprintType::Smd;

    let mut ki = KiFootprint {
        name: crate::importer::sanitize_identifier(&ee_footprint.info.name),
        attr: if is_smd { "smd" } else { "through_hole" }.to_string(),
        model_dir: DEFAULT_MODEL_DIR.to_string(),
        ..Default::default()
    };

    for ee_pad in ee_footprint.pads {
        ki.pads.push(convert_pad(&ee_pad, &map));
    }

    for ee_track in ee_footprint.tracks {
        let layer = map_layer(ee_track.layer_id).to_string();
        let width = ee_fp_to_mm(ee_track.stroke_width);
        for pair in ee_track.points.windows(2) {
            ki.lines.push(FpLine {
                start: map(pair[0].0, pair[0].1),
                end: map(pair[1].0, pair[1].1),
                layer: layer.clone(),
                width,
            });
        }
    }

    for ee_rect in ee_footprint.rectangles {
        let layer = map_layer(ee_rect.layer_id).to_string();
        let (x, y) = map(ee_rect.pos_x, ee_rect.pos_y);
        let w = ee_fp_to_mm(ee_rect.width);
        let h = ee_fp_to_mm(ee_rect.height);
        let corners = [
            ((x, y), (x + w, y)),
            ((x + w, y), (x + w, y + h)),
            ((x + w, y + h), (x, y + h)),
            ((x, y + h), (x, y)),
        ];
        for (start, end) in corners {
            ki.lines.push(FpLine {
                start,
                end,
                layer: layer.clone(),
                width: 0.2,
            });
        }
    }

    for ee_hole in ee_footprint.holes {
        let diameter = ee_fp_to_mm(ee_hole.radius) * 2.0;
        ki.pads.push(FpPad {
            number: String::new(),
            pad_type: "np_thru_hole".to_string(),
            shape: FpShape::Circle,
            pos: map(ee_hole.center_x, ee_hole.center_y),
            size: (diameter, diameter),
            layers: vec!["*.Cu".to_string(), "*.Mask".to_string()],
            rotation: 0.0,
            drill: Some(diameter),
            drill_oval: None,
            polygon: Vec::new(),
        });
    }

    for ee_via in ee_footprint.vias {
        let diameter = ee_fp_to_mm(ee_via.diameter);
        ki.pads.push(FpPad {
            number: String::new(),
            pad_type: "thru_hole".to_string(),
            shape: FpShape::Circle,
            pos: map(ee_via.center_x, ee_via.center_y),
            size: (diameter, diameter),
            layers: vec!["*.Cu".to_string()],
            rotation: 0.0,
            drill: Some(ee_fp_to_mm(ee_via.hole_radius) * 2.0),
            drill_oval: None,
            polygon: Vec::new(),
        });
    }

    for ee_circle in ee_footprint.circles {
        let center = map(ee_circle.center_x, ee_circle.center_y);
        ki.circles.push(FpCircle {
            center,
            end: (center.0 + ee_fp_to_mm(ee_circle.radius), center.1),
            layer: map_layer(ee_circle.layer_id).to_string(),
            width: ee_fp_to_mm(ee_circle.stroke_width),
        });
    }

    for ee_arc in ee_footprint.arcs {
        let layer = map_layer(ee_arc.layer_id).to_string();
        let width = ee_fp_to_mm(ee_arc.stroke_width);
        for arc in convert_path_arcs(&ee_arc.path, width, map, ee_fp_to_mm, false) {
            ki.arcs.push(FpArc {
                start: arc.start,
                mid: arc.mid,
                end: arc.end,
                layer: layer.clone(),
                width,
            });
        }
    }

    for ee_text in ee_footprint.texts {
        let mut layer = map_layer(ee_text.layer_id).to_string();
        // Name labels on silk belong on the fabrication layer of the same side.
        if ee_text.text_type == "N" {
            layer = layer.replace("SilkS", "Fab");
        }
        let mirrored = layer.starts_with("B.");
        ki.texts.push(FpText {
            text_type: "user".to_string(),
            text: ee_text.text,
            pos: map(ee_text.center_x, ee_text.center_y),
            rotation: ee_text.rotation,
            layer,
            font_size: ee_fp_to_mm(ee_text.font_size).max(0.5),
            thickness: ee_fp_to_mm(ee_text.stroke_width).max(0.1),
            mirrored,
            hide: !ee_text.is_displayed,
        });
    }

    // The model placement is rebased against the footprint bounding box,
    // with Y flipped into KiCad's 3D frame. SMD parts sit on the board
    // surface (negated Z); through-hole parts rest at board level.
    if let Some(mut model) = ki_model {
        if let Some(ee_model) = &ee_footprint.model_3d {
            let translation = ee_model.translation;
            model.offset = DVec3::new(
                ee_fp_to_mm(translation.x - bbox_x),
                -ee_fp_to_mm(translation.y - bbox_y),
                if is_smd { -ee_fp_to_mm(translation.z) } else { 0.0 },
            );
            model.rotate = DVec3::new(
                (360.0 - ee_model.rotation.x).rem_euclid(360.0),
                (360.0 - ee_model.rotation.y).rem_euclid(360.0),
                (360.0 - ee_model.rotation.z).rem_euclid(360.0),
            );
        }
        ki.model_3d = Some(model);
    }

    Ok(ki)
}

fn convert_pad(ee_pad: &EeFootprintPad, map: &impl Fn(f64, f64) -> (f64, f64)) -> FpPad {
    let has_hole = ee_pad.hole_radius > 0.0;
    let pos = map(ee_pad.center_x, ee_pad.center_y);
    let size = (ee_fp_to_mm(ee_pad.width), ee_fp_to_mm(ee_pad.height));

    // An explicit outline always wins over the declared shape.
    let polygon: Vec<(f64, f64)> = ee_pad
        .points
        .iter()
        .map(|&(x, y)| {
            let p = map(x, y);
            (p.0 - pos.0, p.1 - pos.1)
        })
        .collect();
    let custom = !polygon.is_empty();

    let mut drill = None;
    let mut drill_oval = None;
    if has_hole {
        let hole_diameter = ee_fp_to_mm(ee_pad.hole_radius) * 2.0;
        let hole_length = ee_fp_to_mm(ee_pad.hole_length);
        if hole_length > 0.0 {
            // Slot along whichever pad axis leaves the larger margin.
            if size.1 >= size.0 {
                drill_oval = Some((hole_diameter, hole_length));
            } else {
                drill_oval = Some((hole_length, hole_diameter));
            }
        } else {
            drill = Some(hole_diameter);
        }
    }

    FpPad {
        number: trim_pad_number(&ee_pad.number),
        pad_type: if has_hole { "thru_hole" } else { "smd" }.to_string(),
        shape: if custom {
            FpShape::Custom
        } else {
            map_pad_shape(&ee_pad.shape)
        },
        pos,
        size: if custom { (0.1, 0.1) } else { size },
        layers: pad_layers(ee_pad.layer_id, has_hole),
        rotation: ee_pad.rotation,
        drill,
        drill_oval,
        polygon,
    }
}

// --- 3D model conversion ---

/// Converts an EasyEDA 3D model (with raw OBJ data) to a KiCad 3D model;
/// placement is filled in later by `convert_footprint`.
pub fn convert_3d_model(ee_model: Ee3dModel) -> Result<Ki3dModel> {
    let wrl_data = ee_model.raw_obj.as_deref().map(mesh::obj_to_wrl);
    Ok(Ki3dModel {
        name: ee_model.name,
        wrl_data,
        step_data: ee_model.step,
        offset: DVec3::ZERO,
        scale: DVec3::ONE,
        rotate: DVec3::ZERO,
    })
}
