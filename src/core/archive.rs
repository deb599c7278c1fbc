use crate::error::{InstallError, Result};
use crate::utils::fs;
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::{Component, Path};
use tar::{Archive, EntryType};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnpackSummary {
    pub dirs: usize,
    pub files: usize,
}

/// Unpacks a gzip-compressed tar stream under `destination`.
///
/// Directories are created with mode 0755. Regular files are written with
/// the permission bits recorded in their header, replacing any file already
/// at that path. Any other entry type aborts the unpack.
pub fn unpack<R: Read>(reader: R, destination: &Path) -> Result<UnpackSummary> {
    fs::ensure_dir_exists(destination)?;

    let mut archive = Archive::new(GzDecoder::new(reader));
    let mut summary = UnpackSummary::default();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let relative = entry.path()?.into_owned();
        ensure_enclosed(&relative)?;
        let output_path = destination.join(&relative);

        match entry.header().entry_type() {
            EntryType::Directory => {
                log::debug!(">>> {}", output_path.display());
                fs::ensure_dir_exists(&output_path)?;
                summary.dirs += 1;
            }
            EntryType::Regular => {
                let mode = entry.header().mode()? & 0o7777;
                log::debug!("::: {} ({:o})", output_path.display(), mode);
                fs::write_file_with_mode(&output_path, &mut entry, mode)?;
                summary.files += 1;
            }
            other => {
                return Err(InstallError::UnsupportedEntry {
                    path: relative,
                    kind: format!("{other:?}"),
                });
            }
        }
    }

    Ok(summary)
}

fn ensure_enclosed(path: &Path) -> Result<()> {
    if path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
    {
        return Err(InstallError::UnsafePath {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
