// src/kicad_models.rs

use glam::DVec3;
use std::fmt::Write;

/// Vertical step between stacked symbol property fields, in mm.
const PROPERTY_STEP: f64 = 2.54;

// --- Text styling helpers ---

/// EasyEDA marks active-low names with a trailing `#`; KiCad renders an
/// overline via `~{…}`.
pub fn apply_text_style(text: &str) -> String {
    match text.strip_suffix('#') {
        Some(stem) if !stem.is_empty() => format!("~{{{}}}", stem),
        _ => text.to_string(),
    }
}

/// Pin names like "A#/B" are styled per `/`-separated segment.
pub fn apply_pin_name_style(name: &str) -> String {
    name.split('/')
        .map(apply_text_style)
        .collect::<Vec<_>>()
        .join("/")
}

/// Compact numeric formatting for the S-expression grammars: three decimals,
/// trailing zeros trimmed, no negative zero.
fn fmt_num(value: f64) -> String {
    let mut rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        rounded = 0.0; // collapse -0
    }
    let mut s = format!("{:.3}", rounded);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Re-applies indentation line by line; the element renderers build their
/// blocks unindented.
fn indent(block: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    block
        .lines()
        .map(|l| format!("{}{}\n", pad, l))
        .collect()
}

// --- Symbol structs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiPinType {
    Unspecified,
    Input,
    Output,
    Bidirectional,
    PowerIn,
}

impl KiPinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KiPinType::Unspecified => "unspecified",
            KiPinType::Input => "input",
            KiPinType::Output => "output",
            KiPinType::Bidirectional => "bidirectional",
            KiPinType::PowerIn => "power_in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiPinStyle {
    Line,
    Inverted,
    Clock,
    InvertedClock,
}

impl KiPinStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            KiPinStyle::Line => "line",
            KiPinStyle::Inverted => "inverted",
            KiPinStyle::Clock => "clock",
            KiPinStyle::InvertedClock => "inverted_clock",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KiSymbolPin {
    pub name: String,
    pub number: String,
    pub pin_type: KiPinType,
    pub style: KiPinStyle,
    pub pos: (f64, f64),
    pub rotation: i32,
    pub length: f64,
}

#[derive(Debug, Clone)]
pub struct KiSymbolRect {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub stroke_width: f64,
}

#[derive(Debug, Clone)]
pub struct KiSymbolCircle {
    pub center: (f64, f64),
    pub radius: f64,
    pub stroke_width: f64,
    pub filled: bool,
}

#[derive(Debug, Clone)]
pub struct KiSymbolArc {
    pub start: (f64, f64),
    pub mid: (f64, f64),
    pub end: (f64, f64),
    pub stroke_width: f64,
}

#[derive(Debug, Clone)]
pub struct KiSymbolPolyline {
    pub points: Vec<(f64, f64)>,
    pub stroke_width: f64,
    pub filled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct KiSymbol {
    pub name: String,
    pub reference: String,
    pub footprint: String,
    pub datasheet: String,
    pub manufacturer: String,
    pub lcsc_id: String,
    pub jlc_id: String,
    pub pins: Vec<KiSymbolPin>,
    pub rectangles: Vec<KiSymbolRect>,
    pub circles: Vec<KiSymbolCircle>,
    pub arcs: Vec<KiSymbolArc>,
    pub polylines: Vec<KiSymbolPolyline>,
}

impl Default for KiSymbolPin {
    fn default() -> Self {
        KiSymbolPin {
            name: String::new(),
            number: String::new(),
            pin_type: KiPinType::Unspecified,
            style: KiPinStyle::Line,
            pos: (0.0, 0.0),
            rotation: 0,
            length: 0.0,
        }
    }
}

// --- Footprint structs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpShape {
    Circle,
    Rect,
    Oval,
    Custom,
}

impl FpShape {
    fn as_str(&self) -> &'static str {
        match self {
            FpShape::Circle => "circle",
            FpShape::Rect => "rect",
            FpShape::Oval => "oval",
            FpShape::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FpPad {
    pub number: String,
    pub pad_type: String, // "smd", "thru_hole" or "np_thru_hole"
    pub shape: FpShape,
    pub pos: (f64, f64),
    pub size: (f64, f64),
    pub layers: Vec<String>,
    pub rotation: f64,
    pub drill: Option<f64>,             // round drill diameter in mm
    pub drill_oval: Option<(f64, f64)>, // (width, height) slot in mm
    /// Copper outline relative to the pad center; non-empty forces a custom
    /// shape with a near-zero anchor size.
    pub polygon: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct FpLine {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub layer: String,
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct FpCircle {
    pub center: (f64, f64),
    pub end: (f64, f64),
    pub layer: String,
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct FpArc {
    pub start: (f64, f64),
    pub mid: (f64, f64),
    pub end: (f64, f64),
    pub layer: String,
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct FpText {
    pub text_type: String, // "reference", "value" or "user"
    pub text: String,
    pub pos: (f64, f64),
    pub rotation: f64,
    pub layer: String,
    pub font_size: f64,
    pub thickness: f64,
    pub mirrored: bool,
    pub hide: bool,
}

/// 3D model payloads plus the placement KiCad expects in the footprint.
#[derive(Debug, Clone)]
pub struct Ki3dModel {
    pub name: String,
    pub wrl_data: Option<String>,
    pub step_data: Option<bytes::Bytes>,
    pub offset: DVec3,
    pub scale: DVec3,
    pub rotate: DVec3,
}

#[derive(Debug, Clone, Default)]
pub struct KiFootprint {
    pub name: String,
    pub attr: String, // "smd" or "through_hole"
    pub pads: Vec<FpPad>,
    pub lines: Vec<FpLine>,
    pub circles: Vec<FpCircle>,
    pub arcs: Vec<FpArc>,
    pub texts: Vec<FpText>,
    pub model_3d: Option<Ki3dModel>,
    /// Directory the model clause points into, caller-supplied.
    pub model_dir: String,
}

// --- Symbol exporter ---

impl KiSymbol {
    /// Renders one `(symbol …)` library entry; the library writer wraps it
    /// in the `kicad_symbol_lib` container.
    pub fn to_kicad_lib_entry(&self) -> String {
        let mut out = String::new();
        writeln!(
            &mut out,
            "(symbol \"{}\" (in_bom yes) (on_board yes)",
            self.name
        )
        .unwrap();

        // Reference sits just above the highest pin, Value just below the
        // lowest; the hidden bookkeeping fields stack further down.
        let top = self
            .pins
            .iter()
            .map(|p| p.pos.1)
            .fold(0.0_f64, f64::max)
            + PROPERTY_STEP;
        let bottom = self
            .pins
            .iter()
            .map(|p| p.pos.1)
            .fold(0.0_f64, f64::min)
            - PROPERTY_STEP;

        let mut hidden_y = bottom - PROPERTY_STEP;
        let mut next_hidden = |out: &mut String, id: usize, key: &str, value: &str| {
            writeln!(
                out,
                "  (property \"{}\" \"{}\" (id {}) (at 0 {} 0) (effects (font (size 1.27 1.27)) hide))",
                key, value, id, fmt_num(hidden_y)
            )
            .unwrap();
            hidden_y -= PROPERTY_STEP;
        };

        writeln!(
            &mut out,
            "  (property \"Reference\" \"{}\" (id 0) (at 0 {} 0) (effects (font (size 1.27 1.27))))",
            self.reference,
            fmt_num(top)
        )
        .unwrap();
        writeln!(
            &mut out,
            "  (property \"Value\" \"{}\" (id 1) (at 0 {} 0) (effects (font (size 1.27 1.27))))",
            self.name,
            fmt_num(bottom)
        )
        .unwrap();
        next_hidden(&mut out, 2, "Footprint", &self.footprint);
        next_hidden(&mut out, 3, "Datasheet", &self.datasheet);
        if !self.manufacturer.is_empty() {
            next_hidden(&mut out, 4, "Manufacturer", &self.manufacturer);
        }
        if !self.lcsc_id.is_empty() {
            next_hidden(&mut out, 5, "LCSC Part", &self.lcsc_id);
        }
        if !self.jlc_id.is_empty() {
            next_hidden(&mut out, 6, "JLCPCB Part", &self.jlc_id);
        }

        writeln!(&mut out, "  (symbol \"{}_1_1\"", self.name).unwrap();
        for rect in &self.rectangles {
            out.push_str(&indent(&rect.render(), 4));
        }
        for circle in &self.circles {
            out.push_str(&indent(&circle.render(), 4));
        }
        for arc in &self.arcs {
            out.push_str(&indent(&arc.render(), 4));
        }
        for poly in &self.polylines {
            out.push_str(&indent(&poly.render(), 4));
        }
        for pin in &self.pins {
            out.push_str(&indent(&pin.render(), 4));
        }
        writeln!(&mut out, "  )\n)").unwrap();
        out
    }
}

impl KiSymbolRect {
    fn render(&self) -> String {
        format!(
            "(rectangle (start {} {}) (end {} {}) (stroke (width {}) (type default) (color 0 0 0 0)) (fill (type background)))",
            fmt_num(self.start.0),
            fmt_num(self.start.1),
            fmt_num(self.end.0),
            fmt_num(self.end.1),
            fmt_num(self.stroke_width)
        )
    }
}

impl KiSymbolCircle {
    fn render(&self) -> String {
        format!(
            "(circle (center {} {}) (radius {}) (stroke (width {}) (type default) (color 0 0 0 0)) (fill (type {})))",
            fmt_num(self.center.0),
            fmt_num(self.center.1),
            fmt_num(self.radius),
            fmt_num(self.stroke_width),
            if self.filled { "background" } else { "none" }
        )
    }
}

impl KiSymbolArc {
    fn render(&self) -> String {
        format!(
            "(arc (start {} {}) (mid {} {}) (end {} {}) (stroke (width {}) (type default) (color 0 0 0 0)) (fill (type none)))",
            fmt_num(self.start.0),
            fmt_num(self.start.1),
            fmt_num(self.mid.0),
            fmt_num(self.mid.1),
            fmt_num(self.end.0),
            fmt_num(self.end.1),
            fmt_num(self.stroke_width)
        )
    }
}

impl KiSymbolPolyline {
    fn render(&self) -> String {
        let pts = self
            .points
            .iter()
            .map(|(x, y)| format!("(xy {} {})", fmt_num(*x), fmt_num(*y)))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "(polyline (pts {}) (stroke (width {}) (type default) (color 0 0 0 0)) (fill (type {})))",
            pts,
            fmt_num(self.stroke_width),
            if self.filled { "background" } else { "none" }
        )
    }
}

impl KiSymbolPin {
    fn render(&self) -> String {
        format!(
            "(pin {} {} (at {} {} {}) (length {})\n  (name \"{}\" (effects (font (size 1.27 1.27))))\n  (number \"{}\" (effects (font (size 1.27 1.27))))\n)",
            self.pin_type.as_str(),
            self.style.as_str(),
            fmt_num(self.pos.0),
            fmt_num(self.pos.1),
            self.rotation,
            fmt_num(self.length),
            apply_pin_name_style(&self.name),
            self.number
        )
    }
}

// --- Footprint exporter ---

impl KiFootprint {
    /// Generates the full S-expression string for a .kicad_mod file.
    pub fn to_kicad_mod_entry(&self) -> String {
        let mut out = String::new();
        writeln!(&mut out, "(module {} (layer F.Cu)", self.name).unwrap();
        writeln!(&mut out, "  (attr {})", self.attr).unwrap();

        // Reference above the pad extent, value below; ±2 when no pads.
        let top = self.pads.iter().map(|p| p.pos.1).fold(0.0_f64, f64::min) - 2.0;
        let bottom = self.pads.iter().map(|p| p.pos.1).fold(0.0_f64, f64::max) + 2.0;
        writeln!(
            &mut out,
            "  (fp_text reference REF** (at 0 {}) (layer F.SilkS) (effects (font (size 1 1) (thickness 0.15))))",
            fmt_num(top)
        )
        .unwrap();
        writeln!(
            &mut out,
            "  (fp_text value {} (at 0 {}) (layer F.Fab) (effects (font (size 1 1) (thickness 0.15))))",
            self.name,
            fmt_num(bottom)
        )
        .unwrap();
        writeln!(
            &mut out,
            "  (fp_text user ${{REFERENCE}} (at 0 0) (layer F.Fab) (effects (font (size 1 1) (thickness 0.15))))"
        )
        .unwrap();

        for line in &self.lines {
            out.push_str(&indent(&line.render(), 2));
        }
        for circle in &self.circles {
            out.push_str(&indent(&circle.render(), 2));
        }
        for arc in &self.arcs {
            out.push_str(&indent(&arc.render(), 2));
        }
        for text in &self.texts {
            out.push_str(&indent(&text.render(), 2));
        }
        for pad in &self.pads {
            out.push_str(&indent(&pad.render(), 2));
        }

        if let Some(model) = &self.model_3d {
            let name = crate::importer::sanitize_identifier(&model.name);
            writeln!(
                &mut out,
                "  (model \"{}/{}.wrl\"\n    (offset (xyz {} {} {}))\n    (scale (xyz {} {} {}))\n    (rotate (xyz {} {} {}))\n  )",
                self.model_dir,
                name,
                fmt_num(model.offset.x),
                fmt_num(model.offset.y),
                fmt_num(model.offset.z),
                fmt_num(model.scale.x),
                fmt_num(model.scale.y),
                fmt_num(model.scale.z),
                fmt_num(model.rotate.x),
                fmt_num(model.rotate.y),
                fmt_num(model.rotate.z)
            )
            .unwrap();
        }

        writeln!(&mut out, ")").unwrap();
        out
    }
}

impl FpLine {
    fn render(&self) -> String {
        format!(
            "(fp_line (start {} {}) (end {} {}) (layer {}) (width {}))",
            fmt_num(self.start.0),
            fmt_num(self.start.1),
            fmt_num(self.end.0),
            fmt_num(self.end.1),
            self.layer,
            fmt_num(self.width)
        )
    }
}

impl FpCircle {
    fn render(&self) -> String {
        format!(
            "(fp_circle (center {} {}) (end {} {}) (layer {}) (width {}))",
            fmt_num(self.center.0),
            fmt_num(self.center.1),
            fmt_num(self.end.0),
            fmt_num(self.end.1),
            self.layer,
            fmt_num(self.width)
        )
    }
}

impl FpArc {
    fn render(&self) -> String {
        format!(
            "(fp_arc (start {} {}) (mid {} {}) (end {} {}) (layer {}) (width {}))",
            fmt_num(self.start.0),
            fmt_num(self.start.1),
            fmt_num(self.mid.0),
            fmt_num(self.mid.1),
            fmt_num(self.end.0),
            fmt_num(self.end.1),
            self.layer,
            fmt_num(self.width)
        )
    }
}

impl FpText {
    fn render(&self) -> String {
        let justify = if self.mirrored {
            " (justify mirror)"
        } else {
            ""
        };
        let hide = if self.hide { " hide" } else { "" };
        format!(
            "(fp_text {} \"{}\" (at {} {} {}) (layer {}){} (effects (font (size {} {}) (thickness {})){}))",
            self.text_type,
            apply_text_style(&self.text),
            fmt_num(self.pos.0),
            fmt_num(self.pos.1),
            fmt_num(self.rotation),
            self.layer,
            hide,
            fmt_num(self.font_size),
            fmt_num(self.font_size),
            fmt_num(self.thickness),
            justify
        )
    }
}

impl FpPad {
    fn render(&self) -> String {
        let mut out = format!(
            "(pad \"{}\" {} {} (at {} {} {}) (size {} {}) (layers {})",
            self.number,
            self.pad_type,
            self.shape.as_str(),
            fmt_num(self.pos.0),
            fmt_num(self.pos.1),
            fmt_num(self.rotation),
            fmt_num(self.size.0),
            fmt_num(self.size.1),
            self.layers.join(" ")
        );
        if let Some((w, h)) = self.drill_oval {
            write!(&mut out, " (drill oval {} {})", fmt_num(w), fmt_num(h)).unwrap();
        } else if let Some(dia) = self.drill {
            write!(&mut out, " (drill {})", fmt_num(dia)).unwrap();
        }
        if !self.polygon.is_empty() {
            let pts = self
                .polygon
                .iter()
                .map(|(x, y)| format!("(xy {} {})", fmt_num(*x), fmt_num(*y)))
                .collect::<Vec<_>>()
                .join(" ");
            write!(
                &mut out,
                "\n  (options (clearance outline) (anchor circle))\n  (primitives\n    (gr_poly (pts {}) (width 0.1) (fill yes))\n  )\n)",
                pts
            )
            .unwrap();
        } else {
            out.push(')');
        }
        out
    }
}
