//! Zip archive packaging for artifact folders.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::PersistError;

/// Packs a folder (recursively) into a zip archive at `archive_path`,
/// overwriting any existing archive. Entry names are relative to the
/// folder root.
pub fn zip_dir(archive_path: &Path, folder: &Path) -> Result<(), PersistError> {
    if !folder.is_dir() {
        return Err(PersistError::NotADirectory(folder.to_path_buf()));
    }

    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0usize;
    for entry in WalkDir::new(folder) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(folder)
            .expect("walked path is under the folder root");
        if relative.as_os_str().is_empty() {
            continue;
        }

        let name = relative.to_string_lossy().replace('\\', "/");
        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            io::copy(&mut File::open(entry.path())?, &mut zip)?;
            entries += 1;
        }
    }
    zip.finish()?;

    info!(
        archive = %archive_path.display(),
        files = entries,
        "packed folder into archive"
    );
    Ok(())
}

/// Extracts a zip archive into `dest`, creating it if needed. Entries that
/// would escape the destination are rejected.
pub fn unzip(archive_path: &Path, dest: &Path) -> Result<(), PersistError> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    fs::create_dir_all(dest)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| PersistError::UnsafeArchivePath(entry.name().to_string()))?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            io::copy(&mut entry, &mut File::create(&out_path)?)?;
        }
    }

    info!(
        archive = %archive_path.display(),
        dest = %dest.display(),
        "extracted archive"
    );
    Ok(())
}
