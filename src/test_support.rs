//! Helpers shared by unit tests: in-memory release archives and tree snapshots.

use crate::core::download::Transport;
use crate::error::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Cursor, Read};
use std::path::Path;
use tar::{Builder, EntryType, Header};

/// Serves the same bytes for every URL.
pub struct StaticTransport(pub Vec<u8>);

impl Transport for StaticTransport {
    fn open(&self, _url: &str) -> Result<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(self.0.clone())))
    }
}

pub struct ArchiveBuilder {
    builder: Builder<GzEncoder<Vec<u8>>>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(GzEncoder::new(Vec::new(), Compression::default())),
        }
    }

    pub fn dir(mut self, path: &str) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    pub fn file(mut self, path: &str, contents: &[u8], mode: u32) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_mode(mode);
        header.set_size(contents.len() as u64);
        self.builder.append_data(&mut header, path, contents).unwrap();
        self
    }

    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_mode(0o777);
        header.set_size(0);
        header.set_link_name(target).unwrap();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.builder.into_inner().unwrap().finish().unwrap()
    }
}

/// A minimal runtime release: `go/` with one executable and one data file.
pub fn release_archive() -> Vec<u8> {
    ArchiveBuilder::new()
        .dir("go/")
        .dir("go/bin/")
        .file("go/bin/go", b"#!/bin/sh\necho go\n", 0o755)
        .file("go/VERSION", b"go1.2.2", 0o644)
        .finish()
}

/// Every regular file under `root` as `(relative path, mode bits, contents)`,
/// sorted by path.
pub fn snapshot_tree(root: &Path) -> Vec<(String, u32, Vec<u8>)> {
    let mut files = Vec::new();
    collect(root, root, &mut files);
    files.sort();
    files
}

fn collect(root: &Path, dir: &Path, files: &mut Vec<(String, u32, Vec<u8>)>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            files.push((relative, mode_of(&path), std::fs::read(&path).unwrap()));
        }
    }
}

#[cfg(unix)]
fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).unwrap().permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(_path: &Path) -> u32 {
    0
}
