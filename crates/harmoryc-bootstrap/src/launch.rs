//! Hand control to the questionnaire.

use std::path::Path;

use crate::error::{exit_code_of, BootstrapError};
use crate::interpreter::Interpreter;
use crate::process::ProcessRunner;
use crate::workspace::ENTRYPOINT;

/// Run `<interpreter> app.py` in `root` with the console inherited and
/// return the questionnaire's own exit status.
pub fn launch_app<R: ProcessRunner + ?Sized>(
    runner: &R,
    interp: &Interpreter,
    root: &Path,
) -> Result<i32, BootstrapError> {
    let entry = root.join(ENTRYPOINT);
    if !entry.is_file() {
        return Err(BootstrapError::EntrypointMissing(entry));
    }
    let cmd = interp.command([ENTRYPOINT]).current_dir(root);
    tracing::info!(command = %cmd, "launching questionnaire");
    let status = runner
        .status(&cmd)
        .map_err(|e| BootstrapError::io(format!("launch {}", ENTRYPOINT), e))?;
    let code = exit_code_of(status);
    if code != 0 {
        tracing::warn!(code, "questionnaire exited with a failure status");
    }
    Ok(code)
}
