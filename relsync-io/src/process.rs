// relsync-io/src/process.rs
use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::sync::Arc;

use relsync_common::error::{RelsyncError, Result};
use tracing::{debug, error};

fn build_command(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    envs: Option<&HashMap<String, String>>,
) -> Command {
    debug!(
        "Running command: {} {:?} (cwd: {:?}, envs: {:?})",
        program,
        args,
        cwd,
        envs.map(|e| e.keys().collect::<Vec<_>>()) // Log only keys for envs
    );
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    if let Some(env_map) = envs {
        cmd.envs(env_map);
    }
    cmd.stdin(Stdio::null());
    cmd
}

/// Runs an external command and captures its output. A non-zero exit is not
/// an error here; callers inspect `status`.
pub fn run_command(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    envs: Option<&HashMap<String, String>>,
) -> Result<Output> {
    let mut cmd = build_command(program, args, cwd, envs);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    match cmd.output() {
        Ok(output) => {
            if !output.status.success() {
                debug!("Command failed with status: {}", output.status);
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stdout.trim().is_empty() {
                    debug!("Stdout:\n{}", stdout.trim());
                }
                if !stderr.trim().is_empty() {
                    debug!("Stderr:\n{}", stderr.trim());
                }
            } else {
                debug!("Command finished successfully.");
            }
            Ok(output)
        }
        Err(e) => {
            debug!("Failed to execute {}: {}", program, e);
            Err(RelsyncError::Io(Arc::new(e)))
        }
    }
}

/// Runs an external command with inherited stdout/stderr, so long builds
/// stream their progress to the terminal.
pub fn run_command_inherit(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    envs: Option<&HashMap<String, String>>,
) -> Result<ExitStatus> {
    let mut cmd = build_command(program, args, cwd, envs);
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    cmd.status().map_err(|e| {
        error!("Failed to execute {}: {}", program, e);
        RelsyncError::CommandExecError(format!("{program}: {e}"))
    })
}
