// relsync-core/src/platform/cuda.rs
use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use relsync_common::error::{RelsyncError, Result};
use relsync_common::model::ManifestExtras;
use relsync_io::run_command;
use tracing::{debug, warn};

use super::{portable_cpu_flags, BuildPlatform, Variant};
use crate::build::BuildContext;

const LINUX_CUDA_LIBS: &[&str] = &["libcudart.so.12", "libcublas.so.12", "libcublasLt.so.12"];
const WIN_CUDA_LIBS: &[&str] = &["cudart64_12.dll", "cublas64_12.dll", "cublasLt64_12.dll"];

/// Compute capabilities built as separate variants.
const ARCHITECTURES: &[u32] = &[60, 75, 80, 86, 89, 90, 100, 120];

pub struct CudaPlatform;

impl BuildPlatform for CudaPlatform {
    fn name(&self) -> &'static str {
        "cuda"
    }

    fn check_environment(&self) -> Result<()> {
        let nvcc = which::which("nvcc").map_err(|e| {
            RelsyncError::BuildEnvError(format!(
                "CUDA environment not found ({e}). Please install CUDA toolkit."
            ))
        })?;
        debug!("Found nvcc at {}", nvcc.display());
        match nvcc_version_output() {
            Some(stdout) if stdout.contains("nvcc") => {
                debug!("CUDA environment detected.");
                Ok(())
            }
            _ => Err(RelsyncError::BuildEnvError(
                "CUDA environment not found. Please install CUDA toolkit.".to_string(),
            )),
        }
    }

    fn compile_flags(&self, _ctx: &BuildContext) -> Vec<String> {
        let mut flags = vec!["-DSD_CUDA=ON".to_string()];
        flags.extend(portable_cpu_flags());
        flags
    }

    fn variants(&self) -> Vec<Variant> {
        ARCHITECTURES
            .iter()
            .map(|sm| {
                Variant::new(
                    format!("sm{sm}"),
                    vec![format!("-DCMAKE_CUDA_ARCHITECTURES={sm}")],
                )
            })
            .collect()
    }

    fn manifest_extras(&self) -> ManifestExtras {
        let mut extras = ManifestExtras::new();
        match nvcc_version_output().as_deref().and_then(parse_cuda_version) {
            Some(version) => {
                extras.insert("cuda_version".to_string(), version.into());
            }
            None => warn!("Could not determine the CUDA version from nvcc"),
        }
        extras
    }

    fn additional_files(&self, ctx: &BuildContext) -> Result<Vec<PathBuf>> {
        let libs = match ctx.target.os() {
            "linux" => LINUX_CUDA_LIBS,
            "win" => WIN_CUDA_LIBS,
            _ => return Ok(Vec::new()),
        };
        let path_var = env::var_os("PATH").unwrap_or_default();
        find_on_path(libs, &path_var)
    }
}

fn nvcc_version_output() -> Option<String> {
    match run_command("nvcc", &["--version".to_string()], None, None) {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(_) => None,
        Err(e) => {
            debug!("Could not run nvcc: {}", e);
            None
        }
    }
}

/// Extracts `12.2` from the `Cuda compilation tools, release 12.2, V12.2.91`
/// line of `nvcc --version`.
fn parse_cuda_version(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let (_, rest) = line.split_once("release ")?;
        let version = rest.split(',').next()?.trim();
        (!version.is_empty()).then(|| version.to_string())
    })
}

/// Resolves each library to the first `PATH` entry that holds it.
fn find_on_path(libs: &[&str], path_var: &OsStr) -> Result<Vec<PathBuf>> {
    let dirs: Vec<PathBuf> = env::split_paths(path_var).collect();
    libs.iter()
        .map(|lib| {
            dirs.iter()
                .map(|dir| dir.join(lib))
                .find(|candidate| candidate.exists())
                .inspect(|found| debug!("Found {} at {}", lib, found.display()))
                .ok_or_else(|| {
                    RelsyncError::BuildEnvError(format!(
                        "Required CUDA library {lib} not found in PATH."
                    ))
                })
        })
        .collect()
}
