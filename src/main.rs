use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use atl_install_go::commands;
use atl_install_go::core::config::{Config, FileDefaults, Mode, DEFAULT_OUTPUT_DIR};
use atl_install_go::core::setup::CshStyle;

#[derive(Parser)]
#[clap(name = "atl-install-go")]
#[clap(about = "atl-install-go installs the go-gc runtime.")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Go version to install (e.g., 1.2.2)
    #[clap(value_name = "GO-VERSION")]
    go_version: Option<String>,
    /// Output directory where to install the go runtime
    #[clap(short = 'o', value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Enable verbose printouts
    #[clap(short = 'v')]
    verbose: bool,
    /// Which mode to use (go|curl)
    #[clap(long = "mode", value_name = "MODE")]
    mode: Option<String>,
    /// Write setup.csh exactly as older releases did (GROOT typo, no GOROOT value)
    #[clap(long)]
    legacy_csh: bool,
}

/// Accepts the single-dash `-mode` spelling alongside `--mode`.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-mode") => OsString::from("--mode"),
            Some(s) if s.starts_with("-mode=") => OsString::from(format!("-{s}")),
            _ => arg,
        })
        .collect()
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| match record.level() {
            log::Level::Error | log::Level::Warn => writeln!(
                buf,
                "**{}** {}",
                record.level().as_str().to_lowercase(),
                record.args()
            ),
            _ => writeln!(buf, "{}", record.args()),
        })
        .init();
}

fn resolve_mode(flag: Option<String>) -> Mode {
    match flag {
        None => Mode::default(),
        Some(value) => value.parse().unwrap_or_else(|_| {
            eprintln!("**error** invalid download mode ({value})");
            Mode::BuiltIn
        }),
    }
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let Some(version) = cli.go_version.filter(|v| !v.is_empty()) else {
        eprintln!("{}", Cli::command().render_help());
        std::process::exit(1);
    };

    let result = FileDefaults::load()
        .and_then(|defaults| {
            let output_dir = cli
                .output_dir
                .or(defaults.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
            let csh_style = if cli.legacy_csh {
                CshStyle::Legacy
            } else {
                CshStyle::Fixed
            };

            Ok(Config::new(version, output_dir)?
                .with_mode(resolve_mode(cli.mode.or(defaults.mode)))
                .with_verbose(cli.verbose)
                .with_csh_style(csh_style))
        })
        .and_then(|config| {
            init_logging(config.verbose);
            commands::install::install_version(&config)
        });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
