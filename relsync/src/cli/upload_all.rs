// relsync/src/cli/upload_all.rs
use clap::Args;
use colored::Colorize;
use relsync_common::error::{RelsyncError, Result};
use relsync_common::Config;
use relsync_core::discover_targets;

use crate::cli::upload::PublishArgs;

#[derive(Args, Debug)]
pub struct UploadAllArgs {
    #[command(flatten)]
    pub publish: PublishArgs,
}

impl UploadAllArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        publish_all(config, &self.publish)
    }
}

/// Publishes every target found under the build root.
pub fn publish_all(config: &Config, publish: &PublishArgs) -> Result<()> {
    let build_root = config.build_root();
    let targets = discover_targets(&build_root)?;
    if targets.is_empty() {
        return Err(RelsyncError::Precondition(format!(
            "No targets with release_artifacts found in {}",
            build_root.display()
        )));
    }

    println!(
        "{}{}",
        "==> ".bold().blue(),
        format!("Found {} targets:", targets.len()).bold()
    );
    for target in &targets {
        println!("  - {target}");
    }
    publish.publish(config, &targets)?;
    println!("\nAll uploads completed.");
    Ok(())
}
