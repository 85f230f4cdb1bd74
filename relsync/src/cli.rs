// relsync/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use relsync_common::error::Result;
use relsync_common::Config;

pub mod build;
pub mod build_all;
pub mod ci;
pub mod upload;
pub mod upload_all;

use crate::cli::build::BuildArgs;
use crate::cli::build_all::BuildAllArgs;
use crate::cli::ci::CiArgs;
use crate::cli::upload::UploadArgs;
use crate::cli::upload_all::UploadAllArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "relsync", bin_name = "relsync")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a platform and package its release artifacts
    Build(BuildArgs),
    /// Build every platform supported on this OS
    BuildAll(BuildAllArgs),
    /// Upload one target's release artifacts to a GitHub release
    Upload(UploadArgs),
    /// Upload every target found under build/ to a GitHub release
    UploadAll(UploadAllArgs),
    /// Build every host platform, then preview the upload as a dry run
    Ci(CiArgs),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Build(command) => command.run(config),
            Self::BuildAll(command) => command.run(config),
            Self::Upload(command) => command.run(config),
            Self::UploadAll(command) => command.run(config),
            Self::Ci(command) => command.run(config),
        }
    }
}
