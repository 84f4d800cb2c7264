// Image discovery and encoding. Files are read whole and turned into the
// base64 payload the prediction service expects.

use crate::error::{ClassifyError, Result};
use crate::schema::ImageClassificationInstance;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An image file read from disk together with its base64 payload.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub path: PathBuf,
    pub content: String,
}

impl EncodedImage {
    pub fn to_instance(&self) -> ImageClassificationInstance {
        ImageClassificationInstance::new(self.content.clone())
    }
}

/// Lists the regular files directly inside `dir`, sorted by file name.
/// Directories (including links to them) and special files are skipped;
/// there is no recursion.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| ClassifyError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ClassifyError::io(dir, e))?;
        let path = entry.path();
        // Follows symlinks, so a link to a directory is skipped too.
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => files.push(path),
            Ok(_) => debug!("Skipping non-file entry {}", path.display()),
            Err(e) => warn!("Skipping unreadable entry {}: {}", path.display(), e),
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Reads `path` and encodes its bytes with the standard padded alphabet.
pub fn encode_file(path: &Path) -> Result<EncodedImage> {
    let bytes = fs::read(path).map_err(|e| ClassifyError::io(path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(EncodedImage {
        path: path.to_path_buf(),
        content: STANDARD.encode(bytes),
    })
}
