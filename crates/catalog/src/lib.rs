//! Command catalog for CLI for Microsoft 365.
//!
//! Locates the globally installed `@pnp/cli-microsoft365` package, parses its
//! command metadata into immutable [`CommandDescriptor`] snapshots and reads
//! per-command documentation fragments.

mod catalog;
mod error;
mod locator;

pub use catalog::{Catalog, CommandDescriptor, CommandOptionSpec, METADATA_FILE, PACKAGE_NAME};
pub use error::{CatalogError, Result};
pub use locator::{DirSource, MetadataSource, NpmGlobalSource};
