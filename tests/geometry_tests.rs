use lcsc2kicad::converter::{ee_fp_to_mm, ee_sym_to_mm};
use lcsc2kicad::geometry::{
    arc_midpoint, svg_arc_to_center, tokenize_path, PathCommand, DEGENERATE_ARC_EXTENT,
};

const EPS: f64 = 1e-6;

#[test]
fn unit_scales_round_trip() {
    let value = 123.456;
    assert!((ee_fp_to_mm(value) / 0.254 - value).abs() < EPS);
    assert!((ee_sym_to_mm(value) / (10.0 * 0.0254) - value).abs() < EPS);
}

#[test]
fn semicircle_solves_to_center_and_negative_sweep() {
    let arc = svg_arc_to_center((0.0, 0.0), (10.0, 0.0), 5.0, 5.0, 0.0, false, true);
    assert!((arc.center_x - 5.0).abs() < EPS);
    assert!((arc.center_y - 0.0).abs() < EPS);
    assert!((arc.extent - -180.0).abs() < EPS);

    // Reconstruct both endpoints from center + radius + extent.
    let start_angle: f64 = 180.0;
    let end_angle = start_angle + arc.extent;
    let sx = arc.center_x + 5.0 * start_angle.to_radians().cos();
    let sy = arc.center_y + 5.0 * start_angle.to_radians().sin();
    let ex = arc.center_x + 5.0 * end_angle.to_radians().cos();
    let ey = arc.center_y + 5.0 * end_angle.to_radians().sin();
    assert!((sx - 0.0).abs() < EPS && (sy - 0.0).abs() < EPS);
    assert!((ex - 10.0).abs() < EPS && (ey - 0.0).abs() < EPS);
}

#[test]
fn unset_sweep_flag_yields_positive_extent() {
    let arc = svg_arc_to_center((0.0, 0.0), (10.0, 0.0), 5.0, 5.0, 0.0, false, false);
    assert!((arc.extent - 180.0).abs() < EPS);
}

#[test]
fn undersized_radii_are_scaled_up() {
    // Radii of 2 cannot span endpoints 10 apart; the solver grows them
    // uniformly until they just fit, which lands the center on the chord.
    let arc = svg_arc_to_center((0.0, 0.0), (10.0, 0.0), 2.0, 2.0, 0.0, false, true);
    assert!((arc.center_x - 5.0).abs() < EPS);
    assert!((arc.center_y - 0.0).abs() < EPS);
    assert!((arc.extent.abs() - 180.0).abs() < EPS);
}

#[test]
fn coincident_endpoints_return_the_sentinel() {
    let arc = svg_arc_to_center((3.0, 4.0), (3.0, 4.0), 5.0, 5.0, 0.0, false, true);
    assert_eq!(arc.extent, DEGENERATE_ARC_EXTENT);
}

#[test]
fn zero_radii_return_the_sentinel() {
    let arc = svg_arc_to_center((0.0, 0.0), (10.0, 0.0), 0.0, 0.0, 0.0, false, true);
    assert_eq!(arc.extent, DEGENERATE_ARC_EXTENT);
}

#[test]
fn midpoint_sits_at_the_angular_middle() {
    let (x, y) = arc_midpoint(0.0, 0.0, 1.0, 0.0, 180.0);
    assert!((x - 0.0).abs() < EPS);
    assert!((y - 1.0).abs() < EPS);
}

#[test]
fn tokenizer_reads_the_supported_command_subset() {
    let commands = tokenize_path("M350,250 A25,25 0 0 1 400,250 L 410 260 Z");
    assert_eq!(commands.len(), 4);
    assert_eq!(commands[0], PathCommand::MoveTo { x: 350.0, y: 250.0 });
    assert_eq!(
        commands[1],
        PathCommand::Arc {
            radius_x: 25.0,
            radius_y: 25.0,
            x_rotation: 0.0,
            large_arc: false,
            sweep: true,
            end_x: 400.0,
            end_y: 250.0,
        }
    );
    assert_eq!(commands[2], PathCommand::LineTo { x: 410.0, y: 260.0 });
    assert_eq!(commands[3], PathCommand::Close);
}

#[test]
fn tokenizer_skips_unsupported_commands() {
    let commands = tokenize_path("M 0 0 Q 5 5 9 9 L 10 0");
    assert_eq!(
        commands,
        vec![
            PathCommand::MoveTo { x: 0.0, y: 0.0 },
            PathCommand::LineTo { x: 10.0, y: 0.0 },
        ]
    );
}

#[test]
fn extra_moveto_pairs_become_line_tos() {
    let commands = tokenize_path("M 0 0 10 0 10 10");
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[1], PathCommand::LineTo { x: 10.0, y: 0.0 });
    assert_eq!(commands[2], PathCommand::LineTo { x: 10.0, y: 10.0 });
}
