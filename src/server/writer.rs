// Writes a rendered file map to disk

use std::path::{Path, PathBuf};

use crate::error::{GeneratorError, Result};
use crate::server::renderer::GeneratedFile;

/// Write every file under `target`, creating directories as needed.
///
/// Existing files are overwritten. Returns the absolute paths written, in
/// file-map order.
pub fn write_files(target: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(target).map_err(|e| GeneratorError::io(target, e))?;

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = target.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
        }
        std::fs::write(&path, &file.contents).map_err(|e| GeneratorError::io(&path, e))?;
        if file.executable {
            make_executable(&path)?;
        }
        tracing::debug!("Wrote {:?} ({} bytes)", path, file.contents.len());
        written.push(path);
    }

    tracing::info!("Wrote {} files to {:?}", written.len(), target);
    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| GeneratorError::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
