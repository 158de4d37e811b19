// src/geometry.rs
//
// Restricted SVG path tokenizing and elliptical-arc geometry. EasyEDA only
// ever emits moveto / lineto / elliptical-arc / closepath in its shape paths,
// so that is all the tokenizer understands; anything else is skipped.

use log::debug;
use regex::Regex;

/// Sweep extent returned when the arc endpoints coincide with the solved
/// center and no direction vector exists. Outside (-360, 360], so callers
/// can tell it apart from every valid extent.
pub const DEGENERATE_ARC_EXTENT: f64 = 719.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Arc {
        radius_x: f64,
        radius_y: f64,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        end_x: f64,
        end_y: f64,
    },
    Close,
}

/// Splits an EasyEDA SVG path string into commands. Supported: `M` (pairs,
/// extra pairs become line-tos), `A` (septets), `L` (pairs), `Z`. Any other
/// command letter and its argument run is dropped.
pub fn tokenize_path(path: &str) -> Vec<PathCommand> {
    // One token per command letter or number; commas and whitespace separate.
    let lexer = Regex::new(r"[A-Za-z]|-?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").unwrap();
    let tokens: Vec<&str> = lexer.find_iter(path).map(|m| m.as_str()).collect();

    let mut commands = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        i += 1;
        if !tok.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            // Stray number without a command letter; nothing we can do with it.
            continue;
        }
        match tok {
            "M" | "m" => {
                let mut first = true;
                while let Some((x, y)) = take_pair(&tokens, &mut i) {
                    if first {
                        commands.push(PathCommand::MoveTo { x, y });
                        first = false;
                    } else {
                        commands.push(PathCommand::LineTo { x, y });
                    }
                }
            }
            "L" | "l" => {
                while let Some((x, y)) = take_pair(&tokens, &mut i) {
                    commands.push(PathCommand::LineTo { x, y });
                }
            }
            "A" | "a" => {
                while let Some(args) = take_run::<7>(&tokens, &mut i) {
                    commands.push(PathCommand::Arc {
                        radius_x: args[0],
                        radius_y: args[1],
                        x_rotation: args[2],
                        large_arc: args[3] != 0.0,
                        sweep: args[4] != 0.0,
                        end_x: args[5],
                        end_y: args[6],
                    });
                }
            }
            "Z" | "z" => commands.push(PathCommand::Close),
            other => {
                debug!("skipping unsupported path command '{}'", other);
                // Consume its argument run so the next letter lines up.
                while i < tokens.len() && !is_letter(tokens[i]) {
                    i += 1;
                }
            }
        }
    }
    commands
}

fn is_letter(tok: &str) -> bool {
    tok.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn take_pair(tokens: &[&str], i: &mut usize) -> Option<(f64, f64)> {
    take_run::<2>(tokens, i).map(|a| (a[0], a[1]))
}

fn take_run<const N: usize>(tokens: &[&str], i: &mut usize) -> Option<[f64; N]> {
    if *i + N > tokens.len() || tokens[*i..*i + N].iter().any(|&t| is_letter(t)) {
        return None;
    }
    let mut out = [0.0; N];
    for (k, slot) in out.iter_mut().enumerate() {
        *slot = tokens[*i + k].parse().unwrap_or(0.0);
    }
    *i += N;
    Some(out)
}

/// Center parameterization of an elliptical arc: absolute center plus a
/// signed sweep extent in degrees. Transient; recomputed per arc per export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcCenter {
    pub center_x: f64,
    pub center_y: f64,
    /// Signed angular extent in (-360, 360], or DEGENERATE_ARC_EXTENT.
    pub extent: f64,
}

/// Converts the SVG endpoint parameterization of an elliptical arc into a
/// center parameterization, with the usual radius correction when the
/// requested radii cannot span the endpoints.
///
/// Sweep sign follows the vendor's screen coordinates (Y grows downward):
/// a set sweep flag yields a non-positive extent, an unset one non-negative.
pub fn svg_arc_to_center(
    start: (f64, f64),
    end: (f64, f64),
    radius_x: f64,
    radius_y: f64,
    x_rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
) -> ArcCenter {
    let phi = x_rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // Step 1: chord midpoint vector rotated into the ellipse frame.
    let dx2 = (start.0 - end.0) / 2.0;
    let dy2 = (start.1 - end.1) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    // Step 2: scale radii up if they are too small for the endpoints.
    let mut rx = radius_x.abs();
    let mut ry = radius_y.abs();
    let ratio = if rx == 0.0 || ry == 0.0 {
        f64::INFINITY
    } else {
        (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry)
    };
    if !ratio.is_finite() {
        return ArcCenter {
            center_x: (start.0 + end.0) / 2.0,
            center_y: (start.1 + end.1) / 2.0,
            extent: DEGENERATE_ARC_EXTENT,
        };
    }
    if ratio > 1.0 {
        let s = ratio.sqrt();
        rx *= s;
        ry *= s;
    }

    // Step 3: local-frame center, radicand clamped against float drift.
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let coef = if den == 0.0 {
        0.0
    } else {
        sign * (num / den).max(0.0).sqrt()
    };
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;

    // Step 4: rotate back and re-add the chord midpoint.
    let center_x = cos_phi * cxp - sin_phi * cyp + (start.0 + end.0) / 2.0;
    let center_y = sin_phi * cxp + cos_phi * cyp + (start.1 + end.1) / 2.0;

    // Step 5: signed extent from the unit direction vectors.
    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;
    let nu = (ux * ux + uy * uy).sqrt();
    let nv = (vx * vx + vy * vy).sqrt();
    if nu == 0.0 || nv == 0.0 {
        return ArcCenter {
            center_x,
            center_y,
            extent: DEGENERATE_ARC_EXTENT,
        };
    }

    let dot = ((ux * vx + uy * vy) / (nu * nv)).clamp(-1.0, 1.0);
    let cross = ux * vy - uy * vx;
    let mut extent = dot.acos().to_degrees();
    if cross < 0.0 {
        extent = -extent;
    }
    if sweep && extent > 0.0 {
        extent -= 360.0;
    }
    if !sweep && extent < 0.0 {
        extent += 360.0;
    }
    if extent > 360.0 {
        extent -= 360.0;
    }
    if extent <= -360.0 {
        extent += 360.0;
    }

    ArcCenter {
        center_x,
        center_y,
        extent,
    }
}

/// Point at the angular midpoint of a circular arc. The KiCad grammars
/// describe arcs by start/mid/end rather than center + extent.
pub fn arc_midpoint(
    center_x: f64,
    center_y: f64,
    radius: f64,
    start_deg: f64,
    end_deg: f64,
) -> (f64, f64) {
    let mid = ((start_deg + end_deg) / 2.0).to_radians();
    (
        center_x + radius * mid.cos(),
        center_y + radius * mid.sin(),
    )
}

/// Angle of a point around a center, in degrees.
pub fn angle_of(center_x: f64, center_y: f64, x: f64, y: f64) -> f64 {
    (y - center_y).atan2(x - center_x).to_degrees()
}
