use crate::core::archive;
use crate::core::config::Mode;
use crate::core::target::Target;
use crate::error::{InstallError, Result};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

const USER_AGENT: &str = concat!("atl-install-go/", env!("CARGO_PKG_VERSION"));

/// Release location for one version/target, e.g.
/// `http://golang.org/dl/go1.2.2.linux-amd64.tar.gz`.
pub fn download_url(version: &str, target: Target) -> String {
    format!(
        "http://golang.org/dl/go{version}.{}-{}.tar.gz",
        target.os.as_str(),
        target.arch.as_str()
    )
}

/// Which half of the external pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Extract,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::Extract => write!(f, "extract"),
        }
    }
}

/// Gets the release archive at `url` unpacked under `staging`.
pub trait Fetch: Sync {
    fn fetch(&self, url: &str, staging: &Path) -> Result<()>;
}

/// Source of raw archive bytes for the built-in mode.
pub trait Transport: Sync {
    fn open(&self, url: &str) -> Result<Box<dyn Read>>;
}

pub fn fetcher_for(mode: Mode) -> Result<Box<dyn Fetch>> {
    match mode {
        Mode::ExternalProcess => Ok(Box::new(ExternalFetcher::default())),
        Mode::BuiltIn => Ok(Box::new(BuiltinFetcher::new(HttpTransport::new()?))),
    }
}

/// Pipes `curl` into `tar`.
#[derive(Debug, Clone)]
pub struct ExternalFetcher {
    pub curl: String,
    pub tar: String,
}

impl Default for ExternalFetcher {
    fn default() -> Self {
        Self {
            curl: "curl".to_string(),
            tar: "tar".to_string(),
        }
    }
}

impl ExternalFetcher {
    fn locate(stage: Stage, program: &str) -> Result<PathBuf> {
        which::which(program).map_err(|e| InstallError::Spawn {
            stage,
            program: program.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        })
    }
}

impl Fetch for ExternalFetcher {
    fn fetch(&self, url: &str, staging: &Path) -> Result<()> {
        let curl_path = Self::locate(Stage::Fetch, &self.curl)?;
        let tar_path = Self::locate(Stage::Extract, &self.tar)?;

        let mut curl = Command::new(curl_path);
        curl.arg("-L") // Follow redirects
            .arg("-s") // Silent
            .arg("-f") // Fail on HTTP errors
            .arg("-H")
            .arg(format!("User-Agent: {USER_AGENT}"))
            .arg(url)
            .stdout(Stdio::piped());

        let mut curl_child = curl.spawn().map_err(|source| InstallError::Spawn {
            stage: Stage::Fetch,
            program: self.curl.clone(),
            source,
        })?;

        let Some(curl_out) = curl_child.stdout.take() else {
            let _ = curl_child.kill();
            let _ = curl_child.wait();
            return Err(std::io::Error::other("curl stdout was not captured").into());
        };

        // The Command holds a copy of the pipe's read end; it must be gone
        // before waiting or curl never sees tar exit.
        let untar_spawned = {
            let mut untar = Command::new(tar_path);
            untar
                .arg("-C")
                .arg(staging)
                .arg("-zxf")
                .arg("-")
                .stdin(Stdio::from(curl_out));
            log::debug!("untar.cmd: {untar:?}");
            untar.spawn()
        };

        let mut untar_child = match untar_spawned {
            Ok(child) => child,
            Err(source) => {
                let _ = curl_child.kill();
                let _ = curl_child.wait();
                return Err(InstallError::Spawn {
                    stage: Stage::Extract,
                    program: self.tar.clone(),
                    source,
                });
            }
        };

        // Reap both before reporting so neither is left behind.
        let curl_status = curl_child.wait();
        let untar_status = untar_child.wait();
        let (curl_status, untar_status) = (curl_status?, untar_status?);

        if !untar_status.success() && lost_its_reader(curl_status) {
            check_status(Stage::Extract, &self.tar, untar_status)?;
        }
        check_status(Stage::Fetch, &self.curl, curl_status)?;
        check_status(Stage::Extract, &self.tar, untar_status)?;
        Ok(())
    }
}

/// curl exit code for "failed writing received data".
const CURL_WRITE_ERROR: i32 = 23;

/// True when the fetch side only failed because tar stopped reading.
fn lost_its_reader(status: ExitStatus) -> bool {
    if status.success() || status.code() == Some(CURL_WRITE_ERROR) {
        return true;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        const SIGPIPE: i32 = 13;
        status.signal() == Some(SIGPIPE)
    }

    #[cfg(not(unix))]
    {
        false
    }
}

fn check_status(stage: Stage, program: &str, status: ExitStatus) -> Result<()> {
    if !status.success() {
        return Err(InstallError::ProcessFailed {
            stage,
            program: program.to_string(),
            status,
        });
    }
    Ok(())
}

/// Blocking HTTP GET.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| InstallError::config_error(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn open(&self, url: &str) -> Result<Box<dyn Read>> {
        let response = self.client.get(url).send().map_err(|source| InstallError::Http {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(InstallError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(Box::new(response))
    }
}

/// Streams the archive from a [`Transport`] through the in-process unpacker.
pub struct BuiltinFetcher<T> {
    transport: T,
}

impl<T: Transport> BuiltinFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> Fetch for BuiltinFetcher<T> {
    fn fetch(&self, url: &str, staging: &Path) -> Result<()> {
        log::debug!("GET {url}");
        let body = self.transport.open(url)?;
        let summary = archive::unpack(body, staging)?;
        log::debug!(
            "unpacked {} directories and {} files into {}",
            summary.dirs,
            summary.files,
            staging.display()
        );
        Ok(())
    }
}
