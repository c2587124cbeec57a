use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

/// Resolves a file inside an installed package to an absolute path.
///
/// Lookup failures are not errors: a `None` means the package (or the file's
/// install root) could not be discovered, and discovery degrades gracefully.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn locate(&self, package: &str, relative: &str) -> Option<PathBuf>;
}

/// Looks up files in the npm global package registry.
///
/// Two sequential npm queries: the global listing confirms the package is
/// installed, then `npm root -g` yields the directory to join against.
pub struct NpmGlobalSource;

#[async_trait]
impl MetadataSource for NpmGlobalSource {
    async fn locate(&self, package: &str, relative: &str) -> Option<PathBuf> {
        let listing = npm_stdout(&["list", "-g", "--depth=0"]).await?;
        if !listing.contains(package) {
            log::debug!("package {package} not found in global npm packages");
            return None;
        }

        let root = npm_stdout(&["root", "-g"]).await?;
        Some(Path::new(root.trim()).join(package).join(relative))
    }
}

async fn npm_stdout(args: &[&str]) -> Option<String> {
    let output = match Command::new("npm").args(args).output().await {
        Ok(output) => output,
        Err(err) => {
            log::debug!("npm {} failed to run: {err}", args.join(" "));
            return None;
        }
    };
    if !output.status.success() {
        log::debug!("npm {} exited with {}", args.join(" "), output.status);
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Fixed-root source, used by tests and the `M365_MCP_PACKAGE_ROOT` override.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MetadataSource for DirSource {
    async fn locate(&self, _package: &str, relative: &str) -> Option<PathBuf> {
        Some(self.root.join(relative))
    }
}
