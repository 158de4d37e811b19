use crate::error::{Error, Result};
use crate::importer::sanitize_identifier;
use crate::kicad_models::*;
use log::info;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

const KICAD_SYM_HEADER: &str = r#"(kicad_symbol_lib (version 20211014) (generator lcsc2kicad)
"#;

const KICAD_SYM_FOOTER: &str = r#")
"#;

/// Manages the output library structure.
pub struct KicadLibrary {
    pub path: PathBuf,
}

impl KicadLibrary {
    /// Creates the necessary directories for symbols, footprints, and 3D models.
    pub fn setup_directories(&self) -> Result<()> {
        fs::create_dir_all(self.path.join("footprints.pretty"))?;
        fs::create_dir_all(self.path.join("symbols"))?;
        fs::create_dir_all(self.path.join("3dmodels.3dshapes"))?;
        Ok(())
    }

    /// Adds a symbol to the shared symbol library file, skipping duplicates.
    pub fn add_symbol(&self, symbol: &KiSymbol) -> Result<()> {
        let lib_path = self.path.join("symbols/lib.kicad_sym");
        let symbol_content = symbol.to_kicad_lib_entry();

        if lib_path.exists() {
            let mut file_content = String::new();
            File::open(&lib_path)?.read_to_string(&mut file_content)?;

            let pattern = format!(r#"\(\s*symbol\s*"{}"\s*.*\)"#, regex::escape(&symbol.name));
            let re = Regex::new(&pattern).map_err(|e| Error::ParseError(e.to_string()))?;

            if re.is_match(&file_content) {
                info!(
                    "symbol '{}' already exists in the library, skipping",
                    symbol.name
                );
                return Ok(());
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&lib_path)?;

        let metadata = file.metadata()?;

        if metadata.len() == 0 {
            // New or empty library: header, symbol, footer.
            file.write_all(KICAD_SYM_HEADER.as_bytes())?;
            file.write_all(symbol_content.as_bytes())?;
            file.write_all(KICAD_SYM_FOOTER.as_bytes())?;
            info!("created new symbol library with '{}'", symbol.name);
        } else {
            // Splice the new symbol in just before the closing paren.
            file.seek(SeekFrom::End(-(KICAD_SYM_FOOTER.len() as i64)))?;
            file.write_all(symbol_content.as_bytes())?;
            file.write_all(KICAD_SYM_FOOTER.as_bytes())?;
            info!("appended symbol '{}' to the existing library", symbol.name);
        }

        Ok(())
    }

    /// Writes a footprint to its own .kicad_mod file.
    pub fn add_footprint(&self, footprint: &KiFootprint) -> Result<()> {
        let fp_path = self.path.join(format!(
            "footprints.pretty/{}.kicad_mod",
            sanitize_identifier(&footprint.name)
        ));
        let content = footprint.to_kicad_mod_entry();
        fs::write(fp_path, content)?;
        Ok(())
    }

    /// Writes the 3D model files (.wrl, .step).
    pub fn add_3d_model(&self, model: &Ki3dModel) -> Result<()> {
        let base_path = self
            .path
            .join("3dmodels.3dshapes")
            .join(sanitize_identifier(&model.name));
        if let Some(wrl_data) = &model.wrl_data {
            fs::write(base_path.with_extension("wrl"), wrl_data)?;
        }
        if let Some(step_data) = &model.step_data {
            fs::write(base_path.with_extension("step"), step_data)?;
        }
        Ok(())
    }
}
