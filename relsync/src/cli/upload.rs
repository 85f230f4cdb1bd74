// relsync/src/cli/upload.rs
use clap::Args;
use colored::Colorize;
use relsync_common::error::Result;
use relsync_common::plan::SyncSummary;
use relsync_common::{Config, Credentials};
use relsync_core::{SyncExecutor, SyncOptions};
use relsync_net::GithubReleaseClient;
use tracing::debug;

/// Flags shared by the upload commands.
#[derive(Args, Debug, Clone)]
pub struct PublishArgs {
    /// GitHub release tag (e.g. v1.0.0)
    #[arg(long)]
    pub tag: String,

    /// GitHub repository in owner/repo form
    #[arg(long)]
    pub repo: Option<String>,

    /// Show what would be uploaded without uploading or deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Upload every file, even when the published hash matches
    #[arg(long)]
    pub force: bool,
}

impl PublishArgs {
    /// Resolves credentials and syncs `targets`, printing the summary.
    pub fn publish(&self, config: &Config, targets: &[String]) -> Result<()> {
        let config = config.clone().with_repo(self.repo.as_deref());
        let credentials = Credentials::resolve(config.project_root())?;
        let client = GithubReleaseClient::new(&config, &credentials)?;
        debug!("Publishing to {} via {}", config.repo, config.api_base_url);

        let options = SyncOptions {
            dry_run: self.dry_run,
            force: self.force,
        };
        let report = SyncExecutor::new(&client, config.build_root(), options).run(&self.tag, targets)?;
        print_summary(&report.summary, self.dry_run);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Target to upload (e.g. linux-x64-cuda-sm86)
    #[arg(long)]
    pub target_triple: String,

    #[command(flatten)]
    pub publish: PublishArgs,
}

impl UploadArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        self.publish
            .publish(config, std::slice::from_ref(&self.target_triple))
    }
}

pub fn print_summary(summary: &SyncSummary, dry_run: bool) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("{}", "Summary:".bold());
    println!("  Files uploaded: {}", summary.uploaded.to_string().green());
    println!("  Files skipped (identical): {}", summary.skipped);
    if summary.missing > 0 {
        println!(
            "  Files missing locally: {}",
            summary.missing.to_string().yellow()
        );
    }
    if dry_run {
        println!(
            "\n  {}",
            "This was a DRY RUN - no files were actually uploaded".yellow()
        );
    }
    println!("{rule}");
}
