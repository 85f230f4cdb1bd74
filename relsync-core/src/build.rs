// relsync-core/src/build.rs
use std::path::{Path, PathBuf};

use relsync_common::config::Config;
use relsync_common::error::{RelsyncError, Result};
use relsync_common::model::{Manifest, Target, ANY_VARIANT};
use relsync_io::{run_command_inherit, write_json_pretty};
use tracing::{debug, error, info, warn};

use crate::archive_cache::ArchiveCache;
use crate::collect::{collect_release_files, ArtifactRecord};
use crate::manifest_builder::ManifestBuilder;
use crate::platform::{BuildPlatform, Variant};

/// Paths and names for one variant build.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub target: Target,
    /// Prefix for files shared by every variant of the platform.
    pub target_any: Target,
    pub project_root: PathBuf,
    pub build_dir: PathBuf,
}

impl BuildContext {
    pub fn new(config: &Config, target: Target) -> Self {
        Self {
            target_any: target.any_variant(),
            build_dir: config.build_dir(&target),
            project_root: config.project_root().to_path_buf(),
            target,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Restrict the build to these variants. Empty builds all of them.
    pub variants: Vec<String>,
    /// Package whatever is already in the build directory.
    pub no_compile: bool,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub target: Target,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub compressed: usize,
    pub reused: usize,
}

pub struct BuildRunner<'a> {
    config: &'a Config,
}

impl<'a> BuildRunner<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Builds and packages every selected variant of `platform`, writing one
    /// manifest per target.
    pub fn run(&self, platform: &dyn BuildPlatform, options: &BuildOptions) -> Result<Vec<BuildReport>> {
        let variants = select_variants(platform, &options.variants)?;

        let cmake_lists = self.config.cmake_lists_path();
        if !cmake_lists.is_file() {
            return Err(RelsyncError::Precondition(format!(
                "CMakeLists.txt not found in {}",
                self.config.project_root().display()
            )));
        }
        platform.check_environment()?;
        let cmake = if options.no_compile {
            None
        } else {
            Some(find_cmake()?)
        };

        let mut reports = Vec::with_capacity(variants.len());
        for variant in &variants {
            let target = Target::host(platform.name(), &variant.name);
            let ctx = BuildContext::new(self.config, target);
            info!("Building target {}", ctx.target);

            let mut flags = platform.compile_flags(&ctx);
            flags.extend(variant.compile_flags.iter().cloned());
            let additional_files = platform.additional_files(&ctx)?;
            debug!("Additional files to include: {:?}", additional_files);

            match &cmake {
                Some(cmake) => self.compile(cmake, platform, &ctx, flags)?,
                None => debug!("Skipping compilation for {}", ctx.target),
            }

            reports.push(self.package(platform, &ctx, &additional_files)?);
        }
        Ok(reports)
    }

    /// Runs every platform in turn with the same options. The first failing
    /// platform aborts the run; platforms after it are not started.
    pub fn run_all(
        &self,
        platforms: &[&dyn BuildPlatform],
        options: &BuildOptions,
    ) -> Result<Vec<BuildReport>> {
        let mut reports = Vec::new();
        for platform in platforms {
            info!("Building platform {}", platform.name());
            let built = self.run(*platform, options).inspect_err(|e| {
                error!("Build failed for platform {}: {}", platform.name(), e)
            })?;
            reports.extend(built);
        }
        Ok(reports)
    }

    fn compile(
        &self,
        cmake: &str,
        platform: &dyn BuildPlatform,
        ctx: &BuildContext,
        flags: Vec<String>,
    ) -> Result<()> {
        let envs = platform.build_env(ctx);
        relsync_io::fs::create_dir_all(&ctx.build_dir)?;

        let mut configure = vec![
            "-S".to_string(),
            path_arg(&ctx.project_root),
            "-B".to_string(),
            path_arg(&ctx.build_dir),
        ];
        configure.extend(flags);
        configure.push("-DCMAKE_BUILD_TYPE=Release".to_string());
        info!("Configuring CMake: cmake {}", configure.join(" "));
        check_status(
            "CMake configure",
            run_command_inherit(cmake, &configure, Some(&ctx.project_root), envs.as_ref())?,
        )?;

        let build = vec![
            "--build".to_string(),
            path_arg(&ctx.build_dir),
            "--config".to_string(),
            "Release".to_string(),
        ];
        info!("Building: cmake {}", build.join(" "));
        check_status(
            "CMake build",
            run_command_inherit(cmake, &build, Some(&ctx.project_root), envs.as_ref())?,
        )
    }

    fn package(
        &self,
        platform: &dyn BuildPlatform,
        ctx: &BuildContext,
        additional_files: &[PathBuf],
    ) -> Result<BuildReport> {
        let artifacts_dir = self.config.artifacts_dir(&ctx.target);
        relsync_io::fs::create_dir_all(&artifacts_dir)?;

        let release_files = collect_release_files(&ctx.build_dir)?;
        if release_files.is_empty() {
            warn!("No release files found in {}", ctx.build_dir.display());
        }

        let cache = ArchiveCache::open(&artifacts_dir, &ctx.target);
        let mut builder = ManifestBuilder::new();
        let (mut compressed, mut reused) = (0, 0);

        let (target, target_any) = (&ctx.target, &ctx.target_any);
        let outputs = release_files.into_iter().map(|r| (r, target));
        let shared = additional_files.iter().filter_map(move |path| {
            let record = ArtifactRecord::from_path(path.clone());
            if record.is_none() {
                warn!("Ignoring additional file without a name: {}", path.display());
            }
            record.map(|r| (r, target_any))
        });

        for (record, archive_target) in outputs.chain(shared) {
            let archived = cache.ensure_archive(&record, archive_target)?;
            if archived.reused {
                reused += 1;
            } else {
                compressed += 1;
            }
            builder.add_archive(&archived);
        }
        builder.merge_extras(platform.manifest_extras());
        let manifest = builder.build();

        let manifest_path = artifacts_dir.join(ctx.target.manifest_name());
        write_json_pretty(&manifest_path, &manifest)?;
        info!(
            "Wrote {} ({} files, {} compressed, {} reused)",
            manifest_path.display(),
            manifest.files().len(),
            compressed,
            reused
        );

        Ok(BuildReport {
            target: ctx.target.clone(),
            manifest_path,
            manifest,
            compressed,
            reused,
        })
    }
}

fn select_variants(platform: &dyn BuildPlatform, requested: &[String]) -> Result<Vec<Variant>> {
    let mut available = platform.variants();
    if available.is_empty() {
        available.push(Variant::new(ANY_VARIANT, Vec::new()));
    }
    if requested.is_empty() {
        return Ok(available);
    }
    if let Some(unknown) = requested
        .iter()
        .find(|name| !available.iter().any(|v| &v.name == *name))
    {
        let names: Vec<_> = available.iter().map(|v| v.name.as_str()).collect();
        return Err(RelsyncError::ValidationError(format!(
            "Unknown variant '{}' for {} (available: {})",
            unknown,
            platform.name(),
            names.join(", ")
        )));
    }
    available.retain(|v| requested.contains(&v.name));
    Ok(available)
}

fn find_cmake() -> Result<String> {
    which::which("cmake")
        .map(|p| p.to_string_lossy().into_owned())
        .map_err(|e| RelsyncError::BuildEnvError(format!("Failed to find 'cmake' on PATH: {e}")))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn check_status(step: &str, status: std::process::ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(RelsyncError::CommandExecError(format!("{step} failed ({status})")))
    }
}
