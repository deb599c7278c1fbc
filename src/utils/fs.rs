use crate::error::{InstallError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Directory mode used for every directory this tool creates.
pub const DIR_MODE: u32 = 0o755;

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.is_dir() {
        create_dir_all_with_mode(path)
            .map_err(|e| InstallError::from_io_at(e, path))?;
    }
    Ok(())
}

#[cfg(unix)]
fn create_dir_all_with_mode(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir_all_with_mode(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

pub fn remove_dir_recursive(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| InstallError::from_io_at(e, path))?;
    }
    Ok(())
}

/// Writes `contents` to `path`, truncating any previous file, and applies
/// `mode` exactly (the process umask is not allowed to mask it).
pub fn write_file_with_mode(path: &Path, contents: &mut dyn Read, mode: u32) -> Result<u64> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    let mut file = open_truncate(path, mode).map_err(|e| InstallError::from_io_at(e, path))?;
    let written = std::io::copy(contents, &mut file)?;
    file.sync_all()?;
    drop(file);

    set_mode(path, mode)?;
    Ok(written)
}

#[cfg(unix)]
fn open_truncate(path: &Path, mode: u32) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_truncate(path: &Path, _mode: u32) -> std::io::Result<File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| InstallError::from_io_at(e, path))?;
    }

    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }

    Ok(())
}
