use crate::core::config::Config;
use crate::core::download::{download_url, Fetch};
use crate::core::setup;
use crate::core::target::{Layout, Target};
use crate::error::{InstallError, Result};
use crate::utils::fs;
use std::path::PathBuf;

/// Fetches, unpacks and promotes one target, then writes its setup scripts.
///
/// Returns the install root. The staging directory is removed whether or
/// not the install succeeded.
pub fn install_target(config: &Config, target: Target, fetcher: &dyn Fetch) -> Result<PathBuf> {
    let layout = config.layout(target);

    if layout.install_root.exists() {
        return Err(InstallError::AlreadyInstalled {
            path: layout.install_root,
        });
    }

    log::debug!("~~~ {}", layout.staging.display());
    fs::remove_dir_recursive(&layout.staging)?;
    fs::ensure_dir_exists(&layout.staging)?;

    let url = download_url(&config.version, target);
    let outcome = fetcher
        .fetch(&url, &layout.staging)
        .and_then(|()| promote(&layout));

    if let Err(e) = fs::remove_dir_recursive(&layout.staging) {
        log::warn!("could not remove {}: {e}", layout.staging.display());
    }
    outcome?;

    setup::write_setup_scripts(&layout.install_root, config.csh_style)?;
    Ok(layout.install_root)
}

/// Moves the unpacked `go` directory to its canonical name.
fn promote(layout: &Layout) -> Result<()> {
    let extracted = layout.extracted_root();
    if !extracted.is_dir() {
        return Err(InstallError::MissingArchiveRoot { path: extracted });
    }

    std::fs::rename(&extracted, &layout.install_root)
        .map_err(|e| InstallError::from_io_at(e, &layout.install_root))?;
    log::debug!(
        "renamed {} -> {}",
        extracted.display(),
        layout.install_root.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archive;
    use crate::core::download::BuiltinFetcher;
    use crate::core::target::{Arch, Os};
    use crate::test_support::{release_archive, snapshot_tree, ArchiveBuilder, StaticTransport};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const AMD64: Target = Target::new(Os::Linux, Arch::Amd64);

    #[test]
    fn test_install_target_populates_root() {
        let temp = TempDir::new().unwrap();
        let config = Config::new("1.2.2", temp.path()).unwrap();
        let fetcher = BuiltinFetcher::new(StaticTransport(release_archive()));

        let root = install_target(&config, AMD64, &fetcher).unwrap();

        assert_eq!(root, temp.path().join("1.2.2/linux_amd64"));
        let files: Vec<(String, u32)> = snapshot_tree(&root)
            .into_iter()
            .map(|(path, mode, _)| (path, mode))
            .collect();
        assert_eq!(
            files,
            vec![
                ("VERSION".to_string(), 0o644),
                ("bin/go".to_string(), 0o755),
                ("setup.csh".to_string(), 0o644),
                ("setup.sh".to_string(), 0o644),
            ]
        );
        assert!(!temp.path().join("1.2.2/tmp-linux-amd64").exists());
    }

    #[test]
    fn test_install_target_matches_archive_contents() {
        let temp = TempDir::new().unwrap();
        let config = Config::new("1.2.2", temp.path()).unwrap();
        let fetcher = BuiltinFetcher::new(StaticTransport(release_archive()));

        let root = install_target(&config, AMD64, &fetcher).unwrap();

        let reference = TempDir::new().unwrap();
        archive::unpack(release_archive().as_slice(), reference.path()).unwrap();

        let installed: Vec<_> = snapshot_tree(&root)
            .into_iter()
            .filter(|(path, _, _)| path != "setup.sh" && path != "setup.csh")
            .collect();
        assert_eq!(installed, snapshot_tree(&reference.path().join("go")));
    }

    #[test]
    fn test_unsupported_entry_removes_staging() {
        let temp = TempDir::new().unwrap();
        let config = Config::new("1.2.2", temp.path()).unwrap();
        let archive = ArchiveBuilder::new()
            .dir("go/")
            .file("go/VERSION", b"go1.2.2", 0o644)
            .symlink("go/bin", "elsewhere")
            .finish();
        let fetcher = BuiltinFetcher::new(StaticTransport(archive));

        let err = install_target(&config, AMD64, &fetcher).unwrap_err();

        assert!(matches!(err, InstallError::UnsupportedEntry { .. }));
        assert!(!temp.path().join("1.2.2/tmp-linux-amd64").exists());
        assert!(!temp.path().join("1.2.2/linux_amd64").exists());
    }

    #[test]
    fn test_archive_without_go_root() {
        let temp = TempDir::new().unwrap();
        let config = Config::new("1.2.2", temp.path()).unwrap();
        let archive = ArchiveBuilder::new()
            .file("golang/VERSION", b"go1.2.2", 0o644)
            .finish();
        let fetcher = BuiltinFetcher::new(StaticTransport(archive));

        let err = install_target(&config, AMD64, &fetcher).unwrap_err();

        assert!(matches!(err, InstallError::MissingArchiveRoot { .. }));
        assert!(!temp.path().join("1.2.2/tmp-linux-amd64").exists());
    }

    #[test]
    fn test_existing_root_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let config = Config::new("1.2.2", temp.path()).unwrap();
        let root = temp.path().join("1.2.2/linux_amd64");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("marker"), "keep").unwrap();
        let fetcher = BuiltinFetcher::new(StaticTransport(release_archive()));

        let err = install_target(&config, AMD64, &fetcher).unwrap_err();

        assert!(matches!(err, InstallError::AlreadyInstalled { .. }));
        assert_eq!(std::fs::read_to_string(root.join("marker")).unwrap(), "keep");
    }

    #[test]
    fn test_stale_staging_is_cleared() {
        let temp = TempDir::new().unwrap();
        let config = Config::new("1.2.2", temp.path()).unwrap();
        let stale = temp.path().join("1.2.2/tmp-linux-amd64/go/stale.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "left over").unwrap();
        let fetcher = BuiltinFetcher::new(StaticTransport(release_archive()));

        let root = install_target(&config, AMD64, &fetcher).unwrap();

        assert!(!root.join("stale.txt").exists());
    }
}
