//! Environment setup scripts written into every install root.
//!
//! Both scripts export `GOROOT`, prepend `$GOROOT/bin` to `PATH`, point
//! `GOPATH` at `$HOME/dev/gocode` and prepend `$GOPATH/bin` to `PATH`.

use crate::error::Result;
use crate::utils::fs;
use std::path::{Path, PathBuf};

pub const SH_SCRIPT: &str = "setup.sh";
pub const CSH_SCRIPT: &str = "setup.csh";

const SCRIPT_MODE: u32 = 0o644;

/// Which rendition of `setup.csh` to write.
///
/// Older releases of this installer wrote a C-shell script that referenced
/// `${GROOT}` and never substituted the install root, leaving the literal
/// `%!s(MISSING)` behind. Sites whose tooling greps for those exact bytes can
/// ask for `Legacy`; everyone else gets `Fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CshStyle {
    #[default]
    Fixed,
    Legacy,
}

pub fn render_sh(goroot: &Path) -> String {
    format!(
        "#!/bin/sh

export GOROOT={}
export PATH=${{GOROOT}}/bin:${{PATH}}
export GOPATH=${{HOME}}/dev/gocode
export PATH=${{GOPATH}}/bin:${{PATH}}
",
        goroot.display()
    )
}

pub fn render_csh(goroot: &Path, style: CshStyle) -> String {
    match style {
        CshStyle::Fixed => format!(
            "
setenv GOROOT {}
setenv PATH ${{GOROOT}}/bin:${{PATH}}
setenv GOPATH ${{HOME}}/dev/gocode
setenv PATH ${{GOPATH}}/bin:${{PATH}}
",
            goroot.display()
        ),
        CshStyle::Legacy => "
setenv GOROOT %!s(MISSING)
setenv PATH ${GROOT}/bin:${PATH}
setenv GOPATH ${HOME}/dev/gocode
setenv PATH ${GOPATH}/bin:${PATH}
"
        .to_string(),
    }
}

/// Writes `setup.sh` and `setup.csh` into `goroot` and returns their paths.
pub fn write_setup_scripts(goroot: &Path, style: CshStyle) -> Result<[PathBuf; 2]> {
    let sh_path = goroot.join(SH_SCRIPT);
    fs::write_file_with_mode(&sh_path, &mut render_sh(goroot).as_bytes(), SCRIPT_MODE)?;

    let csh_path = goroot.join(CSH_SCRIPT);
    fs::write_file_with_mode(
        &csh_path,
        &mut render_csh(goroot, style).as_bytes(),
        SCRIPT_MODE,
    )?;

    log::debug!("wrote {} and {}", sh_path.display(), csh_path.display());
    Ok([sh_path, csh_path])
}
