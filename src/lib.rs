// src/lib.rs

pub mod api;
pub mod converter;
pub mod easyeda_models;
pub mod error;
pub mod file_writer;
pub mod geometry;
pub mod importer;
pub mod kicad_models;
pub mod mesh;

use crate::error::Result;
use log::{info, warn};
use std::path::Path;

/// Fetches one LCSC component and writes its symbol, footprint and 3D model
/// into a KiCad library at `output_dir`.
pub async fn import_component(lcsc_id: &str, output_dir: &Path) -> Result<()> {
    info!("fetching data for LCSC ID: {}", lcsc_id);
    let api = api::EasyedaApi::new();
    let kicad_lib = file_writer::KicadLibrary {
        path: output_dir.to_path_buf(),
    };
    kicad_lib.setup_directories()?;

    let cad_data = api.get_cad_data_of_component(lcsc_id).await?;

    // --- SYMBOL ---
    let ee_symbol = importer::import_symbol(&cad_data)?;
    let ki_symbol = converter::convert_symbol(ee_symbol)?;
    kicad_lib.add_symbol(&ki_symbol)?;
    info!("generated symbol: {}", ki_symbol.name);

    // --- FOOTPRINT + 3D MODEL ---
    let ee_footprint = importer::import_footprint(&cad_data)?;

    let ki_model = if let Some(mut ee_model) = ee_footprint.model_3d.clone() {
        info!("found 3D model: {}", ee_model.name);
        let (raw_obj, step) = tokio::join!(
            api.get_raw_3d_model_obj(&ee_model.uuid),
            api.get_step_3d_model(&ee_model.uuid)
        );
        if let Err(e) = &raw_obj {
            warn!("no OBJ payload for {}: {}", ee_model.uuid, e);
        }
        ee_model.raw_obj = raw_obj.ok();
        ee_model.step = step.ok();
        let model = converter::convert_3d_model(ee_model)?;
        kicad_lib.add_3d_model(&model)?;
        info!("generated 3D model: {}", model.name);
        Some(model)
    } else {
        info!("no 3D model found for this component");
        None
    };

    let ki_footprint = converter::convert_footprint(ee_footprint, ki_model)?;
    kicad_lib.add_footprint(&ki_footprint)?;
    info!("generated footprint: {}", ki_footprint.name);

    info!("import complete, files are located in: {:?}", output_dir);
    Ok(())
}
