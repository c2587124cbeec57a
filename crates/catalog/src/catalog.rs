use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::locator::MetadataSource;

/// npm package carrying the CLI, its command metadata and docs tree.
pub const PACKAGE_NAME: &str = "@pnp/cli-microsoft365";

/// Command metadata file shipped at the package root.
pub const METADATA_FILE: &str = "allCommandsFull.json";

/// One invocable command of the wrapped CLI.
///
/// `name` is hyphen-joined (`spo-list-add`); the execution adapter restores
/// hyphens to spaces when building a command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub docs: Option<String>,
    pub options: Vec<CommandOptionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOptionSpec {
    pub name: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub option_type: Option<String>,
}

/// Raw entry shape of `allCommandsFull.json`.
#[derive(Debug, Deserialize)]
struct RawCommand {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    help: Option<String>,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    name: String,
    #[serde(default)]
    required: bool,
    #[serde(rename = "type", default)]
    option_type: Option<String>,
}

impl From<RawCommand> for CommandDescriptor {
    fn from(raw: RawCommand) -> Self {
        Self {
            name: raw.name.split_whitespace().collect::<Vec<_>>().join("-"),
            description: raw.description,
            docs: raw.help,
            options: raw
                .options
                .into_iter()
                .map(|opt| CommandOptionSpec {
                    name: opt.name,
                    required: opt.required,
                    option_type: opt.option_type,
                })
                .collect(),
        }
    }
}

/// Loads immutable catalog snapshots from the package metadata.
pub struct Catalog;

impl Catalog {
    /// Reads and parses the command metadata file into a fresh snapshot,
    /// preserving source order.
    pub async fn load(source: &dyn MetadataSource) -> Result<Vec<CommandDescriptor>> {
        let path = source
            .locate(PACKAGE_NAME, METADATA_FILE)
            .await
            .ok_or(CatalogError::PackageNotFound)?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| CatalogError::Io { path, source })?;
        let raw: Vec<RawCommand> = serde_json::from_str(&text)?;
        log::debug!("loaded {} commands from metadata", raw.len());
        Ok(raw.into_iter().map(CommandDescriptor::from).collect())
    }

    /// Reads the documentation fragment for a command.
    ///
    /// Existence is checked before reading so a missing file reports a
    /// message naming the command rather than a bare I/O error.
    pub async fn docs(
        source: &dyn MetadataSource,
        command_name: &str,
        fragment: &str,
    ) -> Result<String> {
        let relative = docs_relative(fragment);
        let path = source
            .locate(PACKAGE_NAME, &relative)
            .await
            .ok_or(CatalogError::PackageNotFound)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(CatalogError::DocsNotFound {
                command: command_name.to_string(),
                path,
            });
        }
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| CatalogError::Io { path, source })
    }
}

/// Docs fragments live three levels deep inside the package.
fn docs_relative(fragment: &str) -> String {
    ["docs", "docs", "cmd", fragment].join(std::path::MAIN_SEPARATOR_STR)
}
