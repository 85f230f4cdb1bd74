// relsync-core/src/platform/vulkan.rs
use std::collections::HashMap;
use std::env;

use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use relsync_common::error::{RelsyncError, Result};
use relsync_io::run_command;
use tracing::{debug, warn};

use super::{portable_cpu_flags, BuildPlatform};
use crate::build::BuildContext;

const ARM64_TOOLCHAIN_FILE: &str = "cmake/arm64-windows-llvm.cmake";
const LLVM_X64_BIN: &str = r"Tools\Llvm\x64\bin";

lazy_static! {
    static ref MSVC_HOST_X64_RE: Regex =
        Regex::new(r"Tools\\MSVC\\[\d.]+\\bin\\Hostx64\\x64").unwrap();
}

pub struct VulkanPlatform;

impl BuildPlatform for VulkanPlatform {
    fn name(&self) -> &'static str {
        "vulkan"
    }

    fn check_environment(&self) -> Result<()> {
        let not_found = |detail: String| {
            RelsyncError::BuildEnvError(format!(
                "Vulkan SDK not found ({detail}). Please install Vulkan SDK."
            ))
        };
        which::which("vulkaninfo").map_err(|e| not_found(e.to_string()))?;
        let output = run_command("vulkaninfo", &["--version".to_string()], None, None)?;
        if output.stderr.is_empty() {
            debug!("Vulkan environment detected.");
            Ok(())
        } else {
            Err(not_found(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }

    fn compile_flags(&self, ctx: &BuildContext) -> Vec<String> {
        let mut flags = vec!["-DSD_VULKAN=ON".to_string()];
        flags.extend(portable_cpu_flags());
        if is_windows_arm64(ctx) {
            flags.push("-G".to_string());
            flags.push("Ninja".to_string());
            flags.push(format!("-DCMAKE_TOOLCHAIN_FILE={ARM64_TOOLCHAIN_FILE}"));
            match env::var("VULKAN_SDK") {
                Ok(sdk) => flags.push(format!(
                    "-DVulkan_LIBRARY={}/Lib-ARM64/vulkan-1.lib",
                    sdk.replace('\\', "/")
                )),
                Err(_) => warn!("VULKAN_SDK is not set; CMake will search for vulkan-1.lib itself"),
            }
        }
        flags
    }

    fn build_env(&self, ctx: &BuildContext) -> Option<HashMap<String, String>> {
        if !is_windows_arm64(ctx) {
            return None;
        }
        let mut envs: HashMap<String, String> = env::vars().collect();
        if let Some(path) = envs.get_mut("PATH") {
            // Keep ggml-vulkan's shader tooling off the MSVC x64 compilers.
            *path = redirect_msvc_host_tools(path);
        }
        Some(envs)
    }
}

fn is_windows_arm64(ctx: &BuildContext) -> bool {
    ctx.target_any.os() == "win" && ctx.target_any.arch() == "arm64"
}

/// Rewrites every `Tools\MSVC\<version>\bin\Hostx64\x64` segment to the LLVM
/// x64 tool directory.
fn redirect_msvc_host_tools(path: &str) -> String {
    MSVC_HOST_X64_RE
        .replace_all(path, NoExpand(LLVM_X64_BIN))
        .into_owned()
}
