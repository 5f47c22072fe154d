// Reads the catalog document: a JSON array of glasses image file names,
// e.g. ["round.png", "aviator.png"]. The file lives next to the images in
// the assets directory. Any problem reading or parsing it degrades to an
// empty catalog; the app then simply offers nothing but the "no glasses"
// entry instead of failing to start.

use crate::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse the catalog file into the ordered list of image paths, resolved
/// relative to the catalog's own directory.
pub fn read_catalog(path: &Path) -> Result<Vec<PathBuf>, Error> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Catalog(format!("read {}: {e}", path.display())))?;
    let names: Vec<String> = serde_json::from_str(&text)
        .map_err(|e| Error::Catalog(format!("parse {}: {e}", path.display())))?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(names.into_iter().map(|n| dir.join(n)).collect())
}

/// Like `read_catalog`, but never fails: a missing or malformed catalog
/// logs once and yields the empty list (sentinel-only registry).
pub fn read_catalog_or_empty(path: &Path) -> Vec<PathBuf> {
    match read_catalog(path) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("{e}; starting with an empty catalog");
            Vec::new()
        }
    }
}
