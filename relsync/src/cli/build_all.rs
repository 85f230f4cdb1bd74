// relsync/src/cli/build_all.rs
use clap::Args;
use colored::Colorize;
use relsync_common::error::Result;
use relsync_common::Config;
use relsync_core::{BuildOptions, BuildPlatform, BuildReport, BuildRunner, PlatformId};

use crate::cli::build::print_reports;

#[derive(Args, Debug, Clone)]
pub struct BuildAllArgs {
    /// Package the existing build outputs without running CMake
    #[arg(long)]
    pub no_compile: bool,
}

impl BuildAllArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let reports = self.build_host_platforms(config)?;
        print_reports(&reports)
    }

    /// Builds every platform supported on this OS, stopping at the first failure.
    pub fn build_host_platforms(&self, config: &Config) -> Result<Vec<BuildReport>> {
        let ids = PlatformId::for_host();
        let names: Vec<&str> = ids.iter().map(PlatformId::as_str).collect();
        println!(
            "{}{}",
            "==> ".bold().blue(),
            format!("Platforms to build for: {}", names.join(", ")).bold()
        );

        let platforms: Vec<Box<dyn BuildPlatform>> = ids.iter().map(PlatformId::platform).collect();
        let platforms: Vec<&dyn BuildPlatform> = platforms.iter().map(|p| &**p).collect();
        let options = BuildOptions {
            variants: Vec::new(),
            no_compile: self.no_compile,
        };
        BuildRunner::new(config).run_all(&platforms, &options)
    }
}
