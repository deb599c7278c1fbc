use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Os {
    Linux,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Os::Linux => "linux",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arch {
    Amd64,
    I386,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::I386 => "386",
        }
    }
}

/// One release variant of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target {
    pub os: Os,
    pub arch: Arch,
}

impl Target {
    /// Every target installed by a run.
    pub const ALL: [Target; 2] = [
        Target {
            os: Os::Linux,
            arch: Arch::Amd64,
        },
        Target {
            os: Os::Linux,
            arch: Arch::I386,
        },
    ];

    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Name of the final install directory, e.g. `linux_amd64`.
    pub fn install_dir_name(&self) -> String {
        format!("{}_{}", self.os.as_str(), self.arch.as_str())
    }

    /// Name of the staging directory, e.g. `tmp-linux-amd64`.
    pub fn staging_dir_name(&self) -> String {
        format!("tmp-{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

/// On-disk locations for one version/target pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub version_root: PathBuf,
    pub install_root: PathBuf,
    pub staging: PathBuf,
}

impl Layout {
    pub fn new(base: &Path, version: &str, target: Target) -> Self {
        let version_root = base.join(version);
        Layout {
            install_root: version_root.join(target.install_dir_name()),
            staging: version_root.join(target.staging_dir_name()),
            version_root,
        }
    }

    /// The directory the archive unpacks its runtime into.
    pub fn extracted_root(&self) -> PathBuf {
        self.staging.join("go")
    }
}
