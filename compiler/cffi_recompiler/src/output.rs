//! Writing generated source to disk.
//!
//! The file is only rewritten when its content changes, so build tools
//! that compare timestamps do not recompile an unchanged extension.

use std::fs;
use std::path::{Path, PathBuf};

use cffi_model::Ffi;

use crate::{RecompileError, RecompileResult, Recompiler, RecompilerOptions};

/// What a write did to the target file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WriteOutcome {
    /// The file was created or its content replaced.
    Updated,
    /// The file already held exactly this content and was left alone.
    Unchanged,
}

impl WriteOutcome {
    #[inline]
    pub fn is_updated(self) -> bool {
        self == Self::Updated
    }
}

/// Write `content` to `path` unless the file already holds it.
///
/// An unreadable or missing file counts as different.
pub fn write_if_changed(path: &Path, content: &str) -> RecompileResult<WriteOutcome> {
    if let Ok(existing) = fs::read(path) {
        if existing == content.as_bytes() {
            return Ok(WriteOutcome::Unchanged);
        }
    }
    fs::write(path, content).map_err(|err| RecompileError::io(path, &err))?;
    Ok(WriteOutcome::Updated)
}

/// Generate the C source of `ffi` into `target`.
///
/// On success `ffi` records the module name, so units including it can
/// refer to its module. On failure nothing is written.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(module = %options.module_name, target = %target.display())
)]
pub fn make_c_source(
    ffi: &mut Ffi,
    options: &RecompilerOptions,
    target: &Path,
) -> RecompileResult<WriteOutcome> {
    let source = Recompiler::new(ffi, options.clone()).generate()?;
    let outcome = write_if_changed(target, &source)?;
    ffi.set_module_name(options.module_name.clone());
    tracing::debug!(?outcome, "C source written");
    Ok(outcome)
}

/// Generate the C source of `ffi` for later native compilation.
///
/// The file goes to `c_file`, or `<tmpdir>/<module_name>.c` by default.
/// Returns the path written and whether it changed.
pub fn recompile(
    ffi: &mut Ffi,
    options: &RecompilerOptions,
    tmpdir: &Path,
    c_file: Option<&Path>,
) -> RecompileResult<(PathBuf, WriteOutcome)> {
    let target = c_file.map_or_else(
        || tmpdir.join(format!("{}.c", options.module_name)),
        Path::to_path_buf,
    );
    let outcome = make_c_source(ffi, options, &target)?;
    Ok((target, outcome))
}
