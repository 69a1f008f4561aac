use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::codec::write_subtree_glb;
use crate::config::AnalyzerConfig;
use crate::error::{CodecError, ExtractionError};
use crate::extraction::baker::{prepare_extraction, ExtractionData};
use crate::scene_graph::{ObjectId, Scene};

/// A zip archive holding the baked model and its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionBundle {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Encodes the baked clone and zips it with `metadata.json`. Does not modify `data`.
pub fn package_extraction(
    data: &ExtractionData,
    config: &AnalyzerConfig,
) -> Result<ExtractionBundle, ExtractionError> {
    let model = write_subtree_glb(&data.scene, data.root)?;
    let metadata = serde_json::to_string_pretty(&data.metadata).map_err(CodecError::from)?;

    let bytes = zip_entries(&[
        (config.model_entry_name.as_str(), model.as_slice()),
        (config.metadata_entry_name.as_str(), metadata.as_bytes()),
    ])?;

    log::info!("Packaged {} ({} bytes)", data.metadata.name, bytes.len());

    Ok(ExtractionBundle {
        file_name: format!("{}.zip", data.file_stem),
        bytes,
    })
}

fn zip_entries(entries: &[(&str, &[u8])]) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .compression_level(Some(6));

    for (name, contents) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(contents)?;
    }

    zip.finish()?;
    Ok(buffer.into_inner())
}

/// Prepares and packages in one step, without any orientation edits.
pub fn extract_and_bake(
    scene: &Scene,
    id: ObjectId,
    config: &AnalyzerConfig,
) -> Result<ExtractionBundle, ExtractionError> {
    let data = prepare_extraction(scene, id, config)?;
    package_extraction(&data, config)
}
