//! MCP Tools for CLI for Microsoft 365
//!
//! Exposes command discovery, documentation lookup and command execution to
//! AI agents via MCP protocol.

use m365_catalog::{Catalog, CatalogError, CommandDescriptor, DirSource, MetadataSource, NpmGlobalSource};
use m365_exec::ExecutionRequest;
use m365_search::CommandSearch;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Points the metadata locator at an unpacked package root instead of the
/// npm global registry. Used by integration tests.
pub const PACKAGE_ROOT_ENV: &str = "M365_MCP_PACKAGE_ROOT";

const DOCS_TIP: &str = "TIP: Before executing any of the command run the 'm365_get_command_docs' tool to retrieve more context about it";
const OUTPUT_TIP: &str = "TIP: avoid setting the '--output' option when running commands. The optimal output format is automatically selected in 'm365_run_command' tool based on the command type.";

/// m365 MCP Service
#[derive(Clone)]
pub struct M365Service {
    /// Metadata locator for the wrapped CLI's package
    source: Arc<dyn MetadataSource>,
    /// Tool router
    tool_router: ToolRouter<Self>,
}

impl M365Service {
    pub fn new() -> Self {
        let source: Arc<dyn MetadataSource> = match std::env::var(PACKAGE_ROOT_ENV) {
            Ok(root) if !root.trim().is_empty() => Arc::new(DirSource::new(root)),
            _ => Arc::new(NpmGlobalSource),
        };
        Self {
            source,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for M365Service {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Bridges CLI for Microsoft 365 to AI agents. Use 'm365_search_commands' to find relevant commands, 'm365_get_commands' for the full catalog, 'm365_get_command_docs' for documentation and 'm365_run_command' to execute a command.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Input/Output Schemas
// ============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct GetCommandsRequest {}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchCommandsRequest {
    /// Free-text search query
    #[schemars(description = "Search query to find relevant commands (e.g., \"sharepoint list\", \"teams channel\", \"user add\")")]
    pub query: String,

    /// Maximum results (default: 10)
    #[schemars(description = "Maximum number of results to return (default: 10, max: 50)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetCommandDocsRequest {
    /// Command the documentation is requested for
    #[serde(rename = "commandName")]
    #[schemars(description = "command name which for which documentation is requested")]
    pub command_name: String,

    /// Documentation fragment path from the command descriptor
    #[schemars(description = "file path to command documentation")]
    pub docs: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RunCommandRequest {
    /// Command line, or a catalog name with an option value map
    #[schemars(description = "command which should be executed: either a full command line or a {name, args} pair")]
    pub command: ExecutionRequest,
}

/// Discovery payload entry: the shape agents see for each command.
#[derive(Debug, Serialize)]
struct CommandSummary<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    docs: Option<&'a str>,
}

impl<'a> From<&'a CommandDescriptor> for CommandSummary<'a> {
    fn from(command: &'a CommandDescriptor) -> Self {
        Self {
            name: &command.name,
            description: &command.description,
            docs: command.docs.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    error: String,
}

// Discovery failures degrade to a one-element payload instead of an MCP
// error, so the agent gets a diagnosable message in the normal result shape.
fn catalog_error_payload(err: &CatalogError) -> String {
    serde_json::to_string(&[ErrorPayload {
        error: format!("Failed to retrieve commands: {err}"),
    }])
    .unwrap_or_default()
}

fn summaries_json(commands: &[CommandDescriptor], indices: Option<&[usize]>) -> String {
    let summaries: Vec<CommandSummary> = match indices {
        Some(indices) => indices.iter().map(|&idx| (&commands[idx]).into()).collect(),
        None => commands.iter().map(Into::into).collect(),
    };
    serde_json::to_string(&summaries).unwrap_or_default()
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl M365Service {
    /// Retrieve the full command catalog
    #[tool(description = "Gets all CLI for Microsoft 365 commands to be used by the Model Context Protocol to pick the right command for a given task. Note: This returns ALL commands and uses many tokens. Consider using m365_search_commands first to find relevant commands more efficiently.")]
    pub async fn m365_get_commands(
        &self,
        Parameters(_request): Parameters<GetCommandsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let commands = match Catalog::load(self.source.as_ref()).await {
            Ok(commands) => commands,
            Err(e) => {
                return Ok(CallToolResult::success(vec![Content::text(
                    catalog_error_payload(&e),
                )]));
            }
        };

        Ok(CallToolResult::success(vec![
            Content::text(DOCS_TIP),
            Content::text(OUTPUT_TIP),
            Content::text(summaries_json(&commands, None)),
        ]))
    }

    /// Fuzzy search the command catalog
    #[tool(description = "Searches CLI for Microsoft 365 commands using fuzzy search based on a query string. This is more efficient than getting all commands as it returns only relevant matches. Use this tool first to find relevant commands before getting full command list or documentation.")]
    pub async fn m365_search_commands(
        &self,
        Parameters(request): Parameters<SearchCommandsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let limit = request.limit.unwrap_or(10).clamp(1, 50);

        let commands = match Catalog::load(self.source.as_ref()).await {
            Ok(commands) => commands,
            Err(e) => {
                // Propagate the catalog's error payload unchanged so agents
                // can tell "catalog unavailable" from "no matches".
                return Ok(CallToolResult::success(vec![Content::text(
                    catalog_error_payload(&e),
                )]));
            }
        };

        let mut search = CommandSearch::new();
        let hits = search.search(&request.query, &commands, limit);
        let indices: Vec<usize> = hits.iter().map(|&(idx, _)| idx).collect();

        Ok(CallToolResult::success(vec![
            Content::text(format!(
                "Found {} command(s) matching \"{}\"",
                indices.len(),
                request.query
            )),
            Content::text(DOCS_TIP),
            Content::text(OUTPUT_TIP),
            Content::text(summaries_json(&commands, Some(&indices))),
        ]))
    }

    /// Retrieve documentation for one command
    #[tool(description = "Gets documentation for a specified CLI for Microsoft 365 command to be used by the Model Context Protocol to provide detailed information about the command along with examples, use cases, and option descriptions")]
    pub async fn m365_get_command_docs(
        &self,
        Parameters(request): Parameters<GetCommandDocsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = match Catalog::docs(self.source.as_ref(), &request.command_name, &request.docs)
            .await
        {
            Ok(text) => text,
            Err(e) => format!(
                "Failed to retrieve documentation for command {}: {e}",
                request.command_name
            ),
        };

        Ok(CallToolResult::success(vec![
            Content::text(OUTPUT_TIP),
            Content::text(text),
        ]))
    }

    /// Execute a command
    #[tool(description = "Runs a specified CLI for Microsoft 365 command to be used by the Model Context Protocol to execute the command and return the result and reason over the response")]
    pub async fn m365_run_command(
        &self,
        Parameters(request): Parameters<RunCommandRequest>,
    ) -> Result<CallToolResult, McpError> {
        match m365_exec::run(&request.command, m365_exec::DEFAULT_TIMEOUT).await {
            Ok(result) => Ok(CallToolResult::success(vec![Content::text(result.stdout)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}
