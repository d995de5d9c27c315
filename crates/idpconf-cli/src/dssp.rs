use crate::error::{CliError, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Runs the external DSSP executable over one structure file and returns
/// its classic-format output.
///
/// DSSP 4 (`mkdssp`) defaults to mmCIF output, so the classic format is
/// requested explicitly; the result is written to stdout.
///
/// # Errors
///
/// Returns [`CliError::DsspCommand`] carrying the process stderr when the
/// executable cannot be launched or exits non-zero.
pub fn run_dssp(cmd: &str, pdb_path: &Path) -> Result<String> {
    debug!("running {cmd} on {}", pdb_path.display());

    let output = Command::new(cmd)
        .arg("--output-format")
        .arg("dssp")
        .arg(pdb_path)
        .output()
        .map_err(|e| CliError::DsspCommand {
            path: pdb_path.to_path_buf(),
            stderr: format!("failed to launch '{cmd}': {e}"),
        })?;

    if !output.status.success() {
        return Err(CliError::DsspCommand {
            path: pdb_path.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn captures_stdout_of_a_successful_command() {
        // `echo` stands in for mkdssp: it prints its arguments.
        let out = run_dssp("echo", &PathBuf::from("input.pdb")).unwrap();
        assert!(out.contains("--output-format dssp input.pdb"));
    }

    #[test]
    fn nonzero_exit_carries_the_path() {
        let err = run_dssp("false", &PathBuf::from("input.pdb")).unwrap_err();
        match err {
            CliError::DsspCommand { path, .. } => {
                assert_eq!(path, PathBuf::from("input.pdb"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_executable_reports_launch_failure() {
        let err = run_dssp("definitely-not-a-dssp-binary", &PathBuf::from("x.pdb")).unwrap_err();
        match err {
            CliError::DsspCommand { stderr, .. } => {
                assert!(stderr.contains("failed to launch"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
