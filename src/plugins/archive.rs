// Zip extraction for plugins shipped as archives

use std::path::{Path, PathBuf};

use crate::error::{GeneratorError, Result};

/// Extract `archive_path` into `dest`, returning the files written.
///
/// Entries whose names would land outside `dest` are skipped.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = std::fs::File::open(archive_path).map_err(|e| GeneratorError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("Skipping zip entry outside the plugins folder: {}", entry.name());
            continue;
        };
        let out = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out).map_err(|e| GeneratorError::io(&out, e))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
        }
        let mut writer = std::fs::File::create(&out).map_err(|e| GeneratorError::io(&out, e))?;
        std::io::copy(&mut entry, &mut writer).map_err(|e| GeneratorError::io(&out, e))?;
        tracing::debug!("Extracted {:?}", out);
        extracted.push(out);
    }
    Ok(extracted)
}

#[cfg(test)]
pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
