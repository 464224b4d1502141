//! MCP server exposing gocontext's three tools: `index_codebase`,
//! `search_code`, and `get_status`.

mod error;
pub mod indexer;
mod server;
mod tool;
pub mod validate;

pub use error::{McpError, Result};
pub use server::{project_id_for_path, run_mcp_server, GocontextMcpServer, StorageClientAndWriter};
