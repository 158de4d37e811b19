// src/mesh.rs
//
// EasyEDA serves component models as OBJ text with inline material blocks.
// KiCad wants VRML. The translation is structural and lossy on purpose:
// faces and vertices map 1:1, one scene Shape per material group.

use glam::DVec3;
use log::debug;
use std::collections::HashMap;
use std::fmt::Write;

/// EasyEDA OBJ vertices are in mm; VRML scenes use 0.1-inch units.
const OBJ_UNIT_TO_VRML: f64 = 1.0 / 2.54;

#[derive(Debug, Clone, Default)]
struct ObjMaterial {
    ambient: [f64; 3],
    diffuse: [f64; 3],
    specular: [f64; 3],
    /// OBJ dissolve value: 1.0 is opaque.
    dissolve: f64,
}

/// De-duplicating vertex arena: every shape re-indexes the vertices it
/// touches, assigning a local index the first time a source index is seen.
#[derive(Debug, Default)]
struct VertexArena {
    assigned: HashMap<usize, usize>,
    points: Vec<DVec3>,
}

impl VertexArena {
    fn local_index(&mut self, source: usize, vertices: &[DVec3]) -> Option<usize> {
        if let Some(&local) = self.assigned.get(&source) {
            return Some(local);
        }
        let vertex = *vertices.get(source)?;
        let local = self.points.len();
        self.points.push(vertex);
        self.assigned.insert(source, local);
        Some(local)
    }
}

#[derive(Debug, Default)]
struct ObjShape {
    material: String,
    arena: VertexArena,
    /// Face index runs, each terminated by -1.
    indices: Vec<i64>,
}

/// Converts an OBJ mesh (with inline newmtl/endmtl material blocks) into a
/// VRML scene, one Shape node per material group.
pub fn obj_to_wrl(obj_data: &str) -> String {
    let mut materials: HashMap<String, ObjMaterial> = HashMap::new();
    let mut vertices: Vec<DVec3> = Vec::new();

    // Pass 1: materials and the global vertex list.
    let mut current_material: Option<(String, ObjMaterial)> = None;
    for line in obj_data.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        match parts[0] {
            "newmtl" => {
                current_material = Some((
                    parts.get(1).unwrap_or(&"").to_string(),
                    ObjMaterial {
                        dissolve: 1.0,
                        ..Default::default()
                    },
                ));
            }
            "endmtl" => {
                if let Some((id, material)) = current_material.take() {
                    materials.insert(id, material);
                }
            }
            "Ka" | "Kd" | "Ks" => {
                if let Some((_, material)) = current_material.as_mut() {
                    let channel = parse_triple(&parts[1..]);
                    match parts[0] {
                        "Ka" => material.ambient = channel,
                        "Kd" => material.diffuse = channel,
                        _ => material.specular = channel,
                    }
                }
            }
            "d" => {
                if let Some((_, material)) = current_material.as_mut() {
                    material.dissolve = parts
                        .get(1)
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(1.0);
                }
            }
            "v" => {
                if parts.len() >= 4 {
                    let x: f64 = parts[1].parse().unwrap_or(0.0);
                    let y: f64 = parts[2].parse().unwrap_or(0.0);
                    let z: f64 = parts[3].parse().unwrap_or(0.0);
                    vertices.push(DVec3::new(x, y, z) * OBJ_UNIT_TO_VRML);
                }
            }
            _ => {}
        }
    }

    // Pass 2: face groups, split on material-selection directives.
    let mut shapes: Vec<ObjShape> = Vec::new();
    let mut shape: Option<ObjShape> = None;
    for line in obj_data.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        match parts[0] {
            "usemtl" => {
                if let Some(done) = shape.take() {
                    shapes.push(done);
                }
                shape = Some(ObjShape {
                    material: parts.get(1).unwrap_or(&"").to_string(),
                    ..Default::default()
                });
            }
            "f" => {
                let shape = shape.get_or_insert_with(ObjShape::default);
                for token in &parts[1..] {
                    // "12/3/4" carries texture/normal indices we ignore.
                    let index: usize = match token.split('/').next().unwrap_or("").parse() {
                        Ok(i) if i >= 1 => i,
                        _ => {
                            debug!("skipping malformed face index '{}'", token);
                            continue;
                        }
                    };
                    if let Some(local) = shape.arena.local_index(index - 1, &vertices) {
                        shape.indices.push(local as i64);
                    }
                }
                shape.indices.push(-1);
            }
            _ => {}
        }
    }
    if let Some(done) = shape.take() {
        shapes.push(done);
    }

    // The downstream point-list consumer drops the final entry, so every
    // non-empty shape repeats its last point once.
    for shape in &mut shapes {
        if let Some(&last) = shape.arena.points.last() {
            shape.arena.points.push(last);
        }
    }

    render_wrl(&shapes, &materials)
}

fn parse_triple(parts: &[&str]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (slot, raw) in out.iter_mut().zip(parts) {
        *slot = raw.parse().unwrap_or(0.0);
    }
    out
}

fn render_wrl(shapes: &[ObjShape], materials: &HashMap<String, ObjMaterial>) -> String {
    let grey = ObjMaterial {
        ambient: [0.2, 0.2, 0.2],
        diffuse: [0.5, 0.5, 0.5],
        specular: [0.2, 0.2, 0.2],
        dissolve: 1.0,
    };

    let mut wrl = String::new();
    wrl.push_str("#VRML V2.0 utf8\n");
    for shape in shapes {
        let material = materials.get(&shape.material).unwrap_or(&grey);
        wrl.push_str("Shape {\n");
        wrl.push_str("  appearance Appearance {\n");
        wrl.push_str("    material Material {\n");
        writeln!(
            &mut wrl,
            "      diffuseColor {} {} {}",
            material.diffuse[0], material.diffuse[1], material.diffuse[2]
        )
        .unwrap();
        writeln!(
            &mut wrl,
            "      specularColor {} {} {}",
            material.specular[0], material.specular[1], material.specular[2]
        )
        .unwrap();
        writeln!(
            &mut wrl,
            "      transparency {}",
            (1.0 - material.dissolve).clamp(0.0, 1.0)
        )
        .unwrap();
        wrl.push_str("    }\n");
        wrl.push_str("  }\n");
        wrl.push_str("  geometry IndexedFaceSet {\n");
        wrl.push_str("    coord Coordinate {\n");
        wrl.push_str("      point [\n");
        for point in &shape.arena.points {
            writeln!(
                &mut wrl,
                "        {:.4} {:.4} {:.4},",
                point.x, point.y, point.z
            )
            .unwrap();
        }
        wrl.push_str("      ]\n");
        wrl.push_str("    }\n");
        wrl.push_str("    coordIndex [\n      ");
        wrl.push_str(
            &shape
                .indices
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
        wrl.push_str("\n    ]\n");
        wrl.push_str("  }\n");
        wrl.push_str("}\n");
    }
    wrl
}
