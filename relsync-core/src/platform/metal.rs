// relsync-core/src/platform/metal.rs
use relsync_common::error::{RelsyncError, Result};
use tracing::debug;

use super::BuildPlatform;
use crate::build::BuildContext;

const METAL_FLAGS: &[&str] = &[
    "-DSD_METAL=ON",
    "-DGGML_NATIVE=OFF",
    "-DGGML_ACCELERATE=ON",
    "-DCMAKE_OSX_ARCHITECTURES=arm64",
];

pub struct MetalPlatform;

impl BuildPlatform for MetalPlatform {
    fn name(&self) -> &'static str {
        "metal"
    }

    fn check_environment(&self) -> Result<()> {
        if cfg!(target_os = "macos") {
            debug!("Metal environment detected (macOS).");
            Ok(())
        } else {
            Err(RelsyncError::BuildEnvError(
                "Metal is only available on macOS.".to_string(),
            ))
        }
    }

    fn compile_flags(&self, _ctx: &BuildContext) -> Vec<String> {
        METAL_FLAGS.iter().map(|f| f.to_string()).collect()
    }
}
