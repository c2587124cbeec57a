//! m365 MCP Server
//!
//! Exposes CLI for Microsoft 365 commands to AI agents via MCP protocol.
//!
//! ## Tools
//!
//! - `m365_get_commands` - Retrieve all CLI for Microsoft 365 commands
//! - `m365_search_commands` - Fuzzy search commands by a free-text query
//! - `m365_get_command_docs` - Retrieve documentation for a command
//! - `m365_run_command` - Execute a command and return its normalized output
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "m365": {
//!       "command": "m365-mcp"
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

mod tools;

use tools::M365Service;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure logging to stderr only (stdout is for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting m365 MCP server");

    // Create and start the MCP server
    let service = M365Service::new();
    let server = service.serve(stdio()).await?;

    // Wait for shutdown
    server.waiting().await?;

    log::info!("m365 MCP server stopped");
    Ok(())
}
