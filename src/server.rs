//! MCP server exposing the dispatcher as tools, plus one read-only `file://system` resource.
//!
//! The `initialize` handshake, `ping` and tool routing are handled by `rmcp`; lines are screened
//! by [`crate::frame`] on the way in. Every tool method hands a typed [`Operation`] to
//! [`Dispatcher::run`].

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Content, ErrorCode, Implementation, ListResourcesResult,
        PaginatedRequestParams, RawResource, ReadResourceRequestParams, ReadResourceResult,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use crate::dispatch::{Dispatcher, Operation, ToolOutput};
use crate::error::{Error, ErrorKind};
use crate::frame;
#[cfg(feature = "search")]
use crate::ops::SearchFilesRequest;
use crate::ops::{
    CreateDirectoryRequest, EditFileRequest, FileInfoRequest, ListDirRequest, MoveFileRequest,
    ReadFileRequest, ReadMultipleFilesRequest, WriteFileRequest,
};

pub const PERMISSION_DENIED: ErrorCode = ErrorCode(-32001);
pub const SYSTEM_RESOURCE_URI: &str = "file://system";

const PIPE_CAPACITY: usize = 64 * 1024;

/// Maps a protocol-level failure onto a JSON-RPC error object.
pub fn rpc_error(err: Error) -> McpError {
    let code = match err.kind() {
        ErrorKind::PermissionDenied => PERMISSION_DENIED,
        ErrorKind::UnknownOperation => ErrorCode::METHOD_NOT_FOUND,
        ErrorKind::InvalidArgument => ErrorCode::INVALID_PARAMS,
        _ => ErrorCode::INTERNAL_ERROR,
    };
    McpError::new(code, err.to_string(), None)
}

fn tool_result(output: ToolOutput) -> CallToolResult {
    let content = vec![Content::text(output.text)];
    if output.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[derive(Clone)]
pub struct SandboxServer {
    dispatcher: Arc<Dispatcher>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SandboxServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxServer")
            .field("dispatcher", &self.dispatcher)
            .field("tool_router", &self.tool_router)
            .finish()
    }
}

impl SandboxServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        #[cfg(feature = "search")]
        let tool_router = Self::tool_router() + Self::search_router();
        #[cfg(not(feature = "search"))]
        let tool_router = Self::tool_router();
        Self {
            dispatcher: Arc::new(dispatcher),
            tool_router,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serves MCP over stdin/stdout until the client closes its end.
    pub async fn serve_stdio(self) -> std::io::Result<()> {
        self.serve_lines(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serves newline-delimited JSON-RPC from `input` to `output` until `input` ends.
    pub async fn serve_lines<R, W>(self, input: R, output: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (service_in, transport_in) = tokio::io::duplex(PIPE_CAPACITY);
        let (transport_out, service_out) = tokio::io::duplex(PIPE_CAPACITY);
        let (rejected_tx, rejected_rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(frame::pump_input(input, service_in, rejected_tx));
        let writer = tokio::spawn(frame::pump_output(service_out, output, rejected_rx));

        let service = self
            .serve((transport_in, transport_out))
            .await
            .map_err(std::io::Error::other)?;
        tracing::info!("sandbox-fs server ready");
        let reason = service.waiting().await.map_err(std::io::Error::other)?;
        tracing::info!(?reason, "server stopped");

        if reader.is_finished() {
            reader.await.map_err(std::io::Error::other)??;
        } else {
            reader.abort();
        }
        writer.await.map_err(std::io::Error::other)??;
        Ok(())
    }

    fn run(&self, op: Operation) -> Result<CallToolResult, McpError> {
        self.dispatcher.run(op).map(tool_result).map_err(rpc_error)
    }

    /// JSON body of the `file://system` resource.
    pub fn system_resource_text(&self) -> Result<String, McpError> {
        let roots = self.dispatcher.context().allowed_roots();
        serde_json::to_string_pretty(&json!({
            "message": "Use the filesystem tools to perform operations",
            "allowedDirectories": roots,
        }))
        .map_err(|err| McpError::internal_error(err.to_string(), None))
    }
}

#[tool_router]
impl SandboxServer {
    #[tool(description = "Read the full text of one file.")]
    fn read_file(
        &self,
        Parameters(req): Parameters<ReadFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::ReadFile(req))
    }

    #[tool(description = "Read several files at once. A failure on one path is reported next to that path and does not stop the others.")]
    fn read_multiple_files(
        &self,
        Parameters(req): Parameters<ReadMultipleFilesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::ReadMultipleFiles(req))
    }

    #[tool(description = "Create a file or replace its content. Missing parent directories are created.")]
    fn write_file(
        &self,
        Parameters(req): Parameters<WriteFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::WriteFile(req))
    }

    #[tool(description = "Apply ordered literal replacements to a file and return per-edit results with a line diff. Set dryRun to preview without writing.")]
    fn edit_file(
        &self,
        Parameters(req): Parameters<EditFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::EditFile(req))
    }

    #[tool(description = "Create a directory and any missing parents. Succeeds if it already exists.")]
    fn create_directory(
        &self,
        Parameters(req): Parameters<CreateDirectoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::CreateDirectory(req))
    }

    #[tool(description = "List the entries of a directory, each tagged [DIR] or [FILE].")]
    fn list_directory(
        &self,
        Parameters(req): Parameters<ListDirRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::ListDirectory(req))
    }

    #[tool(description = "Move or rename a file or directory. Fails if the destination exists.")]
    fn move_file(
        &self,
        Parameters(req): Parameters<MoveFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::MoveFile(req))
    }

    #[tool(description = "Report size, type, timestamps and permission bits of a file or directory.")]
    fn get_file_info(
        &self,
        Parameters(req): Parameters<FileInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::GetFileInfo(req))
    }

    #[tool(description = "List the directories this server may access.")]
    fn list_allowed_directories(&self) -> Result<CallToolResult, McpError> {
        self.run(Operation::ListAllowedDirectories)
    }
}

#[cfg(feature = "search")]
#[tool_router(router = search_router)]
impl SandboxServer {
    #[tool(description = "Find files and directories below a path whose relative path matches a glob, ignoring case.")]
    fn search_files(
        &self,
        Parameters(req): Parameters<SearchFilesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.run(Operation::SearchFiles(req))
    }
}

#[tool_handler]
impl ServerHandler for SandboxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
        )
        .with_instructions(
            "Filesystem tools confined to an allow-list of directories. Call list_allowed_directories first.",
        )
        .with_server_info(Implementation::new(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        ))
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            let resource = RawResource {
                uri: SYSTEM_RESOURCE_URI.to_string(),
                name: "File System Operations Interface".to_string(),
                title: None,
                description: Some(
                    "Describes the allowed directories; operations run through tools".to_string(),
                ),
                mime_type: Some("application/json".to_string()),
                size: None,
                icons: None,
                meta: None,
            }
            .no_annotation();
            Ok(ListResourcesResult {
                meta: None,
                next_cursor: None,
                resources: vec![resource],
            })
        }
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            if request.uri != SYSTEM_RESOURCE_URI {
                return Err(McpError::resource_not_found(
                    format!("Resource {} not found", request.uri),
                    None,
                ));
            }
            let text = self.system_resource_text()?;
            Ok(ReadResourceResult::new(vec![ResourceContents::text(
                text,
                request.uri.clone(),
            )]))
        }
    }
}
