// relsync-core/src/platform/cpu.rs
use relsync_common::error::Result;
use tracing::debug;

use super::{portable_cpu_flags, BuildPlatform};
use crate::build::BuildContext;

pub struct CpuPlatform;

impl BuildPlatform for CpuPlatform {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn check_environment(&self) -> Result<()> {
        debug!("CPU build environment ready.");
        Ok(())
    }

    fn compile_flags(&self, _ctx: &BuildContext) -> Vec<String> {
        portable_cpu_flags()
    }
}
