use crate::core::setup::CshStyle;
use crate::core::target::{Layout, Target};
use crate::error::{InstallError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Site install area used when neither `-o` nor the config file names one.
pub const DEFAULT_OUTPUT_DIR: &str = "/afs/cern.ch/sw/lcg/contrib/go";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "ATL_INSTALL_GO_CONFIG";

/// How archives are fetched and unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// `curl | tar` in child processes.
    #[default]
    ExternalProcess,
    /// In-process HTTP client and tar reader.
    BuiltIn,
}

impl Mode {
    pub fn flag_value(self) -> &'static str {
        match self {
            Mode::ExternalProcess => "curl",
            Mode::BuiltIn => "go",
        }
    }
}

impl FromStr for Mode {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "curl" => Ok(Mode::ExternalProcess),
            "go" => Ok(Mode::BuiltIn),
            other => Err(InstallError::config_error(format!(
                "invalid download mode ({other})"
            ))),
        }
    }
}

/// Everything a run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub version: String,
    pub output_dir: PathBuf,
    pub mode: Mode,
    pub verbose: bool,
    pub csh_style: CshStyle,
    pub targets: Vec<Target>,
}

impl Config {
    pub fn new<V: Into<String>, P: Into<PathBuf>>(version: V, output_dir: P) -> Result<Self> {
        let version = version.into();
        validate_version(&version)?;

        Ok(Config {
            version,
            output_dir: output_dir.into(),
            mode: Mode::default(),
            verbose: false,
            csh_style: CshStyle::default(),
            targets: Target::ALL.to_vec(),
        })
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_csh_style(mut self, csh_style: CshStyle) -> Self {
        self.csh_style = csh_style;
        self
    }

    pub fn layout(&self, target: Target) -> Layout {
        Layout::new(&self.output_dir, &self.version, target)
    }
}

/// The version names a directory, so it must be a single path component.
pub fn validate_version(version: &str) -> Result<()> {
    let mut components = Path::new(version).components();
    let single_component = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single_component || version.contains(['/', '\\']) {
        return Err(InstallError::InvalidVersion {
            version: version.to_string(),
        });
    }
    Ok(())
}

/// Optional per-user defaults, overridden by command-line flags.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileDefaults {
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl FileDefaults {
    /// Loads the defaults file if present. A missing file yields empty defaults.
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            InstallError::config_error(format!("{}: {e}", path.display()))
        })
    }
}

fn get_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("atl-install-go").join("config.json"))
}
