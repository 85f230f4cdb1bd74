// relsync-common/src/model/target.rs
use std::fmt;

/// Variant used when a platform has no sub-variants, and for files shared by
/// every variant of a platform.
pub const ANY_VARIANT: &str = "any";

/// One build configuration. Its `Display` form, `{os}-{arch}-{platform}-{variant}`,
/// partitions manifests and prefixes every published artifact name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    os: String,
    arch: String,
    platform: String,
    variant: String,
}

impl Target {
    pub fn new(
        os: impl Into<String>,
        arch: impl Into<String>,
        platform: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            platform: platform.into(),
            variant: variant.into(),
        }
    }

    /// Target for the machine running this process.
    pub fn host(platform: &str, variant: &str) -> Self {
        Self::new(host_os(), host_arch(), platform, variant)
    }

    /// The variant-independent sibling of this target.
    pub fn any_variant(&self) -> Self {
        Self {
            variant: ANY_VARIANT.to_string(),
            ..self.clone()
        }
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// `{target}-{basename}.tar.gz`
    pub fn archive_name(&self, basename: &str) -> String {
        format!("{self}-{basename}.tar.gz")
    }

    /// `{target}-manifest.json`
    pub fn manifest_name(&self) -> String {
        format!("{self}-manifest.json")
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.os, self.arch, self.platform, self.variant
        )
    }
}

fn host_os() -> String {
    map_os(std::env::consts::OS)
}

fn host_arch() -> String {
    map_arch(std::env::consts::ARCH)
}

fn map_os(os: &str) -> String {
    match os {
        "windows" => "win".to_string(),
        "macos" => "mac".to_string(),
        "linux" => "linux".to_string(),
        other => other.to_lowercase(),
    }
}

fn map_arch(arch: &str) -> String {
    match arch.to_lowercase().as_str() {
        "x86_64" | "amd64" => "x64".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        let target = Target::new("linux", "x64", "cuda", "sm86");
        assert_eq!(target.to_string(), "linux-x64-cuda-sm86");
        assert_eq!(target.manifest_name(), "linux-x64-cuda-sm86-manifest.json");
        assert_eq!(
            target.archive_name("sd.so"),
            "linux-x64-cuda-sm86-sd.so.tar.gz"
        );
    }

    #[test]
    fn test_any_variant_keeps_the_rest() {
        let target = Target::new("win", "arm64", "vulkan", "sm60");
        let any = target.any_variant();
        assert_eq!(any.to_string(), "win-arm64-vulkan-any");
        assert_eq!(any.platform(), target.platform());
        assert_ne!(any, target);
    }

    #[test]
    fn test_host_names() {
        assert_eq!(map_os("windows"), "win");
        assert_eq!(map_os("macos"), "mac");
        assert_eq!(map_os("FreeBSD"), "freebsd");
        assert_eq!(map_arch("x86_64"), "x64");
        assert_eq!(map_arch("AMD64"), "x64");
        assert_eq!(map_arch("aarch64"), "arm64");
        assert_eq!(map_arch("riscv64"), "riscv64");

        let host = Target::host("cpu", ANY_VARIANT);
        assert!(host.to_string().ends_with("-cpu-any"));
    }
}
