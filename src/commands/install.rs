use crate::core::config::Config;
use crate::core::download::{self, Fetch};
use crate::core::install::install_target;
use crate::core::target::Target;
use crate::error::{InstallError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Outcome of every target in one run.
#[derive(Debug)]
pub struct InstallReport {
    pub results: BTreeMap<Target, Result<PathBuf>>,
}

impl InstallReport {
    pub fn failures(&self) -> impl Iterator<Item = (Target, &InstallError)> {
        self.results
            .iter()
            .filter_map(|(target, result)| result.as_ref().err().map(|e| (*target, e)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Prints every failure and folds the report into a single result.
    pub fn into_result(self) -> Result<()> {
        let total = self.results.len();
        let mut failed = 0;
        for (target, err) in self.failures() {
            eprintln!("**error** {target}: {err}");
            failed += 1;
        }

        if failed > 0 {
            return Err(InstallError::FailedTargets { failed, total });
        }
        Ok(())
    }
}

/// Installs every configured target, one thread per target.
///
/// All targets run to completion; a failing target never stops its
/// siblings.
pub fn install_all(config: &Config, fetcher: &dyn Fetch) -> InstallReport {
    let results = std::thread::scope(|scope| {
        let handles: Vec<_> = config
            .targets
            .iter()
            .map(|&target| {
                let handle = scope.spawn(move || {
                    println!(":: installing {target}...");
                    let result = install_target(config, target, fetcher);
                    if result.is_ok() {
                        println!(":: installing {target}... [ok]");
                    }
                    result
                });
                (target, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(target, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(InstallError::WorkerPanicked {
                        target: target.to_string(),
                    })
                });
                (target, result)
            })
            .collect()
    });

    InstallReport { results }
}

pub fn install_version(config: &Config) -> Result<()> {
    println!(
        "Installing Go {} into {}",
        config.version,
        config.output_dir.display()
    );
    log::debug!("download mode: {}", config.mode.flag_value());

    let fetcher = download::fetcher_for(config.mode)?;
    install_all(config, fetcher.as_ref()).into_result()
}
