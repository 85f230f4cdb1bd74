// relsync/src/cli/ci.rs
use clap::Args;
use colored::Colorize;
use relsync_common::error::Result;
use relsync_common::Config;

use crate::cli::build_all::BuildAllArgs;
use crate::cli::upload::PublishArgs;
use crate::cli::upload_all::publish_all;

/// Builds every host platform, then previews the upload with a dry run.
#[derive(Args, Debug)]
pub struct CiArgs {
    /// GitHub release tag to preview against (e.g. v1.0.0)
    #[arg(long)]
    pub tag: String,

    /// GitHub repository in owner/repo form
    #[arg(long)]
    pub repo: Option<String>,

    #[command(flatten)]
    pub build: BuildAllArgs,
}

impl CiArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let reports = self.build.build_host_platforms(config)?;
        println!(
            "{}{}",
            "==> ".bold().blue(),
            format!("Built {} targets", reports.len()).bold()
        );
        publish_all(config, &self.preview())
    }

    fn preview(&self) -> PublishArgs {
        PublishArgs {
            tag: self.tag.clone(),
            repo: self.repo.clone(),
            dry_run: true,
            force: false,
        }
    }
}
