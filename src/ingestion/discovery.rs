//! Input path expansion.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PipelineResult;

/// Expand `paths` into the list of CSV files to read, in argument order.
///
/// Files are taken as given, whatever their extension. Directories contribute the `.csv` / `.CSV`
/// files directly inside them (not recursively), sorted by file name. A path that does not exist
/// fails with [`std::io::ErrorKind::NotFound`].
pub fn discover_csv_paths<P: AsRef<Path>>(paths: &[P]) -> PipelineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(io::Error::from)?;
                if entry.file_type().is_file() && is_csv(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )
            .into());
        }
    }
    Ok(files)
}

fn is_csv(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("csv" | "CSV"))
}
