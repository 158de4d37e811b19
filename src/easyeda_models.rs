// src/easyeda_models.rs
//
// Normalized EasyEDA entities: one value struct per vendor record kind.
// Everything here is produced by the importer, consumed by the converter,
// and never mutated in between. Coordinates are still in vendor units,
// relative to the document (not yet rebased to the bounding box origin).

use glam::DVec3;

// --- Symbol ---

#[derive(Debug, Clone, Default)]
pub struct EeSymbolInfo {
    pub name: String,
    pub prefix: String,
    pub package: Option<String>,
    pub manufacturer: Option<String>,
    pub datasheet: Option<String>,
    pub lcsc_id: Option<String>,
    pub jlc_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbol {
    pub info: EeSymbolInfo,
    pub bbox: (f64, f64), // Bounding box origin (x, y)
    pub pins: Vec<EeSymbolPin>,
    pub rectangles: Vec<EeSymbolRectangle>,
    pub circles: Vec<EeSymbolCircle>,
    pub ellipses: Vec<EeSymbolEllipse>,
    pub arcs: Vec<EeSymbolArc>,
    pub polylines: Vec<EeSymbolPolyline>,
    pub polygons: Vec<EeSymbolPolygon>,
    pub paths: Vec<EeSymbolPath>,
}

/// First `^^` segment of a pin record.
#[derive(Debug, Clone, Default)]
pub struct EeSymbolPinSettings {
    pub is_displayed: bool,
    pub electric_type: String,
    pub number: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub rotation: f64,
    pub id: String,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolPinName {
    pub is_displayed: bool,
    pub pos_x: f64,
    pub pos_y: f64,
    pub rotation: f64,
    pub text: String,
    pub text_anchor: String,
    pub font: String,
    pub font_size: f64,
}

/// Shared by the inversion-bubble and clock decorations; only visibility matters.
#[derive(Debug, Clone, Default)]
pub struct EeSymbolPinMarker {
    pub is_displayed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolPin {
    pub settings: EeSymbolPinSettings,
    /// Lead path reduced to a signed length in vendor units.
    pub length: f64,
    pub name: EeSymbolPinName,
    pub dot: EeSymbolPinMarker,
    pub clock: EeSymbolPinMarker,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolRectangle {
    pub pos_x: f64,
    pub pos_y: f64,
    pub width: f64,
    pub height: f64,
    pub stroke_width: f64,
    pub is_filled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolCircle {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub stroke_width: f64,
    pub is_filled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolEllipse {
    pub center_x: f64,
    pub center_y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
    pub stroke_width: f64,
    pub is_filled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolArc {
    /// SVG path string ("M … A …"), decoded lazily by the converter.
    pub path: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolPolyline {
    pub points: Vec<(f64, f64)>,
    pub stroke_width: f64,
    pub is_filled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolPolygon {
    pub points: Vec<(f64, f64)>,
    pub stroke_width: f64,
    pub is_filled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbolPath {
    pub path: String,
    pub stroke_width: f64,
    pub is_filled: bool,
}

// --- Footprint ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EeFootprintType {
    #[default]
    Smd,
    Tht,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintInfo {
    pub name: String,
    pub fp_type: EeFootprintType,
    pub model_3d_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprint {
    pub info: EeFootprintInfo,
    pub bbox: (f64, f64), // Bounding box origin (x, y)
    pub model_3d: Option<Ee3dModel>,
    pub pads: Vec<EeFootprintPad>,
    pub tracks: Vec<EeFootprintTrack>,
    pub holes: Vec<EeFootprintHole>,
    pub vias: Vec<EeFootprintVia>,
    pub circles: Vec<EeFootprintCircle>,
    pub arcs: Vec<EeFootprintArc>,
    pub rectangles: Vec<EeFootprintRectangle>,
    pub texts: Vec<EeFootprintText>,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintPad {
    pub shape: String,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub layer_id: i32,
    pub net: String,
    pub number: String,
    pub hole_radius: f64,
    /// Explicit copper outline for custom pads; empty for primitive shapes.
    pub points: Vec<(f64, f64)>,
    pub rotation: f64,
    pub hole_length: f64,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintTrack {
    pub stroke_width: f64,
    pub layer_id: i32,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintHole {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintVia {
    pub center_x: f64,
    pub center_y: f64,
    pub diameter: f64,
    pub hole_radius: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintCircle {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub stroke_width: f64,
    pub layer_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintArc {
    pub stroke_width: f64,
    pub layer_id: i32,
    pub path: String,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintRectangle {
    pub pos_x: f64,
    pub pos_y: f64,
    pub width: f64,
    pub height: f64,
    pub layer_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintText {
    pub text_type: String, // "P" for value-like labels, "N" for name labels
    pub center_x: f64,
    pub center_y: f64,
    pub stroke_width: f64,
    pub rotation: f64,
    pub layer_id: i32,
    pub font_size: f64,
    pub text: String,
    pub is_displayed: bool,
}

// --- 3D model ---

/// 3D model reference captured from the footprint's SVGNODE record, plus the
/// raw payloads once downloaded.
#[derive(Debug, Clone, Default)]
pub struct Ee3dModel {
    pub uuid: String,
    pub name: String,
    /// Document-relative translation in vendor units (z in mil).
    pub translation: DVec3,
    /// Rotation around each axis in degrees, vendor convention.
    pub rotation: DVec3,
    pub raw_obj: Option<String>,
    pub step: Option<bytes::Bytes>,
}
