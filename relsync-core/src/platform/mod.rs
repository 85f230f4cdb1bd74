// relsync-core/src/platform/mod.rs
//! Build platforms: toolkit detection, CMake flags, variants and the extra
//! files and manifest data each platform contributes.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use relsync_common::error::{RelsyncError, Result};
use relsync_common::model::ManifestExtras;

use crate::build::BuildContext;

pub mod cpu;
pub mod cuda;
pub mod metal;
pub mod vulkan;

/// Portable x86 baseline shared by every non-Apple platform. `GGML_NATIVE`
/// stays off so binaries run on CPUs other than the build machine's.
pub(crate) const PORTABLE_CPU_FLAGS: &[&str] = &[
    "-DGGML_NATIVE=OFF",
    "-DGGML_AVX2=ON",
    "-DGGML_FMA=ON",
    "-DGGML_F16C=ON",
    "-DGGML_BMI2=ON",
];

/// A sub-configuration of a platform built into its own target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub compile_flags: Vec<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>, compile_flags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            compile_flags,
        }
    }
}

pub trait BuildPlatform {
    fn name(&self) -> &'static str;

    /// Fails with `BuildEnvError` when the toolkit is not usable on this machine.
    fn check_environment(&self) -> Result<()>;

    fn compile_flags(&self, ctx: &BuildContext) -> Vec<String>;

    /// Empty means a single build under the `any` variant.
    fn variants(&self) -> Vec<Variant> {
        Vec::new()
    }

    fn manifest_extras(&self) -> ManifestExtras {
        ManifestExtras::new()
    }

    /// Files published next to the build outputs under the `any` target.
    fn additional_files(&self, _ctx: &BuildContext) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }

    /// Full environment for the CMake subprocesses, when the inherited one
    /// must be altered.
    fn build_env(&self, _ctx: &BuildContext) -> Option<HashMap<String, String>> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformId {
    Cpu,
    Cuda,
    Vulkan,
    Metal,
}

impl PlatformId {
    pub const ALL: [PlatformId; 4] = [
        PlatformId::Cpu,
        PlatformId::Cuda,
        PlatformId::Vulkan,
        PlatformId::Metal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::Vulkan => "vulkan",
            Self::Metal => "metal",
        }
    }

    /// Platforms built by default on `os`, given as a `std::env::consts::OS`
    /// value. Unknown systems get the CPU build only.
    pub fn for_os(os: &str) -> &'static [PlatformId] {
        match os {
            "windows" => &[Self::Cpu, Self::Cuda, Self::Vulkan],
            "linux" => &[Self::Cpu, Self::Vulkan],
            "macos" => &[Self::Cpu, Self::Metal],
            _ => &[Self::Cpu],
        }
    }

    pub fn for_host() -> &'static [PlatformId] {
        Self::for_os(std::env::consts::OS)
    }

    pub fn platform(&self) -> Box<dyn BuildPlatform> {
        match self {
            Self::Cpu => Box::new(cpu::CpuPlatform),
            Self::Cuda => Box::new(cuda::CudaPlatform),
            Self::Vulkan => Box::new(vulkan::VulkanPlatform),
            Self::Metal => Box::new(metal::MetalPlatform),
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = RelsyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                RelsyncError::ValidationError(format!(
                    "Unknown platform '{s}' (expected one of: cpu, cuda, vulkan, metal)"
                ))
            })
    }
}

pub(crate) fn portable_cpu_flags() -> Vec<String> {
    PORTABLE_CPU_FLAGS.iter().map(|f| f.to_string()).collect()
}
