// relsync/src/cli/build.rs
use clap::Args;
use colored::Colorize;
use relsync_common::error::Result;
use relsync_common::Config;
use relsync_core::{BuildOptions, BuildReport, BuildRunner, PlatformId};

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// The platform to build for (cpu, cuda, vulkan, metal)
    #[arg(long)]
    pub platform: PlatformId,

    /// Only build these variants (e.g. sm86); repeatable
    #[arg(long = "variant", value_name = "NAME")]
    pub variants: Vec<String>,

    /// Package the existing build outputs without running CMake
    #[arg(long)]
    pub no_compile: bool,
}

impl BuildArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let platform = self.platform.platform();
        let options = BuildOptions {
            variants: self.variants.clone(),
            no_compile: self.no_compile,
        };

        let reports = BuildRunner::new(config).run(platform.as_ref(), &options)?;
        print_reports(&reports)
    }
}

pub fn print_reports(reports: &[BuildReport]) -> Result<()> {
    for report in reports {
        println!(
            "{}{}",
            "==> ".bold().blue(),
            format!("Target: {}", report.target).bold()
        );
        println!("Build manifest:");
        println!("{}", report.manifest.to_json_pretty()?);
        println!(
            "Release artifacts are located in: {}",
            report
                .manifest_path
                .parent()
                .unwrap_or(&report.manifest_path)
                .display()
        );
    }
    Ok(())
}
