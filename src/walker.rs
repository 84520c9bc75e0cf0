use crate::config::AppConfig;
use crate::error::AppError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the candidate files directly inside the configured folder, sorted by name.
pub fn list_folder(config: &AppConfig) -> Result<Vec<PathBuf>, AppError> {
    let folder = Path::new(&config.folder_path);
    log::info!("Starting file discovery in {}", config.folder_path);
    log::debug!("Configured allowed extensions: {:?}", config.allowed_extensions);

    if !folder.is_dir() {
        return Err(AppError::NotADirectory(config.folder_path.clone()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        // Symlinks to files are candidates too.
        if !path.is_file() {
            log::trace!("Skipping non-file entry: {:?}", path);
            continue;
        }
        let ext = path.extension().and_then(|s| s.to_str());
        if config.accepts_extension(ext) {
            log::trace!("Discovered file: {:?}", path);
            paths.push(path.to_path_buf());
        } else {
            log::trace!("Skipping file due to unsupported extension: {:?}", path);
        }
    }

    log::info!("File discovery complete, {} candidate files.", paths.len());
    Ok(paths)
}
