//! Maps `(tool name, JSON arguments)` onto typed operations and renders their results as text.
//!
//! Permission and unknown-tool failures are returned as `Err` so the protocol layer can turn them
//! into request-level errors. Every other failure is folded into a [`ToolOutput`] with
//! `is_error = true`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ops::{
    Context, CreateDirectoryRequest, EditFileRequest, FileInfoRequest, ListDirRequest,
    MoveFileRequest, OperationName, ReadFileRequest, ReadMultipleFilesRequest, WriteFileRequest,
};
#[cfg(feature = "search")]
use crate::ops::SearchFilesRequest;

/// A fully parsed request, ready to run against a [`Context`].
#[derive(Debug, Clone)]
pub enum Operation {
    ReadFile(ReadFileRequest),
    ReadMultipleFiles(ReadMultipleFilesRequest),
    WriteFile(WriteFileRequest),
    EditFile(EditFileRequest),
    CreateDirectory(CreateDirectoryRequest),
    ListDirectory(ListDirRequest),
    MoveFile(MoveFileRequest),
    #[cfg(feature = "search")]
    SearchFiles(SearchFilesRequest),
    GetFileInfo(FileInfoRequest),
    ListAllowedDirectories,
}

fn parse_args<T: DeserializeOwned>(name: OperationName, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|err| Error::InvalidArgument(format!("invalid arguments for {name}: {err}")))
}

impl Operation {
    pub fn parse(name: &str, arguments: Value) -> Result<Self> {
        let op =
            OperationName::parse(name).ok_or_else(|| Error::UnknownOperation(name.to_string()))?;
        let parsed = match op {
            OperationName::ReadFile => Self::ReadFile(parse_args(op, arguments)?),
            OperationName::ReadMultipleFiles => {
                Self::ReadMultipleFiles(parse_args(op, arguments)?)
            }
            OperationName::WriteFile => Self::WriteFile(parse_args(op, arguments)?),
            OperationName::EditFile => Self::EditFile(parse_args(op, arguments)?),
            OperationName::CreateDirectory => Self::CreateDirectory(parse_args(op, arguments)?),
            OperationName::ListDirectory => Self::ListDirectory(parse_args(op, arguments)?),
            OperationName::MoveFile => Self::MoveFile(parse_args(op, arguments)?),
            #[cfg(feature = "search")]
            OperationName::SearchFiles => Self::SearchFiles(parse_args(op, arguments)?),
            #[cfg(not(feature = "search"))]
            OperationName::SearchFiles => {
                return Err(Error::UnknownOperation(format!(
                    "{name} (crate feature 'search' is disabled)"
                )));
            }
            OperationName::GetFileInfo => Self::GetFileInfo(parse_args(op, arguments)?),
            OperationName::ListAllowedDirectories => Self::ListAllowedDirectories,
        };
        Ok(parsed)
    }

    pub fn name(&self) -> OperationName {
        match self {
            Self::ReadFile(_) => OperationName::ReadFile,
            Self::ReadMultipleFiles(_) => OperationName::ReadMultipleFiles,
            Self::WriteFile(_) => OperationName::WriteFile,
            Self::EditFile(_) => OperationName::EditFile,
            Self::CreateDirectory(_) => OperationName::CreateDirectory,
            Self::ListDirectory(_) => OperationName::ListDirectory,
            Self::MoveFile(_) => OperationName::MoveFile,
            #[cfg(feature = "search")]
            Self::SearchFiles(_) => OperationName::SearchFiles,
            Self::GetFileInfo(_) => OperationName::GetFileInfo,
            Self::ListAllowedDirectories => OperationName::ListAllowedDirectories,
        }
    }

    /// Runs the operation and renders its text payload.
    pub fn execute(self, ctx: &Context) -> Result<String> {
        match self {
            Self::ReadFile(req) => Ok(ctx.read_file(req)?.content),
            Self::ReadMultipleFiles(req) => pretty(&ctx.read_multiple_files(req)?),
            Self::WriteFile(req) => {
                let resp = ctx.write_file(req)?;
                Ok(format!("Successfully wrote to {}", resp.path.display()))
            }
            Self::EditFile(req) => pretty(&ctx.edit_file(req)?),
            Self::CreateDirectory(req) => {
                let resp = ctx.create_directory(req)?;
                Ok(format!(
                    "Directory {} created or already exists",
                    resp.path.display()
                ))
            }
            Self::ListDirectory(req) => Ok(ctx.list_directory(req)?.render()),
            Self::MoveFile(req) => {
                let resp = ctx.move_file(req)?;
                Ok(format!(
                    "Successfully moved {} to {}",
                    resp.source.display(),
                    resp.destination.display()
                ))
            }
            #[cfg(feature = "search")]
            Self::SearchFiles(req) => pretty(&ctx.search_files(req)?.matches),
            Self::GetFileInfo(req) => pretty(&ctx.get_file_info(req)?),
            Self::ListAllowedDirectories => pretty(&ctx.list_allowed_directories()),
        }
    }
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Text payload of a completed tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self {
            text: format!("Error: {err}"),
            is_error: true,
        }
    }
}

#[derive(Debug)]
pub struct Dispatcher {
    ctx: Context,
}

impl Dispatcher {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Parses and runs one tool call.
    ///
    /// Returns `Err` only for protocol-level failures ([`Error::is_protocol_level`]).
    pub fn call(&self, name: &str, arguments: Value) -> Result<ToolOutput> {
        match Operation::parse(name, arguments) {
            Ok(op) => self.run(op),
            Err(err) => settle(name, err),
        }
    }

    /// Runs an already-typed operation, folding non-protocol failures into the output.
    pub fn run(&self, op: Operation) -> Result<ToolOutput> {
        let name = op.name();
        match op.execute(&self.ctx) {
            Ok(text) => Ok(ToolOutput::success(text)),
            Err(err) => settle(name.as_str(), err),
        }
    }
}

fn settle(tool: &str, err: Error) -> Result<ToolOutput> {
    if err.is_protocol_level() {
        tracing::debug!(tool, error = %err, "tool call rejected");
        return Err(err);
    }
    tracing::debug!(tool, code = err.code(), error = %err, "tool call failed");
    Ok(ToolOutput::failure(&err))
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::config::SandboxConfig;

    fn dispatcher(root: &std::path::Path) -> Dispatcher {
        let ctx = Context::with_base_dir(SandboxConfig::with_roots([root]), root).expect("context");
        Dispatcher::new(ctx)
    }

    #[test]
    fn unknown_tool_is_protocol_level() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = dispatcher(dir.path())
            .call("delete_file", json!({}))
            .expect_err("unknown");
        assert!(matches!(err, Error::UnknownOperation(ref name) if name == "delete_file"));
        assert_eq!(err.to_string(), "Unknown tool: delete_file");
    }

    #[test]
    fn missing_argument_is_reported_in_band() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dispatcher(dir.path())
            .call("read_file", json!({}))
            .expect("in-band");
        assert!(out.is_error);
        assert!(out.text.starts_with("Error: invalid argument"), "{}", out.text);
    }

    #[test]
    fn outside_path_is_protocol_level() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = dispatcher(dir.path())
            .call("read_file", json!({ "path": "/etc/passwd" }))
            .expect_err("denied");
        assert_eq!(err.to_string(), "Access to /etc/passwd is not allowed");
    }

    #[test]
    fn write_and_create_directory_render_confirmation_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let d = dispatcher(dir.path());
        let file = dir.path().join("a.txt");
        let out = d
            .call("write_file", json!({ "path": file, "content": "x" }))
            .expect("write");
        assert_eq!(out.text, format!("Successfully wrote to {}", file.display()));

        let sub = dir.path().join("sub");
        let out = d
            .call("create_directory", json!({ "path": sub }))
            .expect("mkdir");
        assert_eq!(
            out.text,
            format!("Directory {} created or already exists", sub.display())
        );
    }

    #[test]
    fn list_directory_renders_tagged_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("b")).expect("mkdir");
        fs::write(dir.path().join("a.txt"), "").expect("write");
        let out = dispatcher(dir.path())
            .call("list_directory", json!({ "path": dir.path() }))
            .expect("list");
        assert_eq!(out.text, "[FILE] a.txt\n[DIR] b");
    }

    #[test]
    fn edit_file_renders_json_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.txt");
        fs::write(&file, "one\ntwo").expect("write");
        let out = dispatcher(dir.path())
            .call(
                "edit_file",
                json!({
                    "path": file,
                    "edits": [{ "oldText": "two", "newText": "2" }],
                    "dryRun": true
                }),
            )
            .expect("edit");
        assert!(!out.is_error);
        let doc: Value = serde_json::from_str(&out.text).expect("json");
        assert_eq!(doc["dryRun"], json!(true));
        assert_eq!(doc["applied"], json!(false));
        assert_eq!(doc["diff"], json!("  one\n- two\n+ 2\n"));
        assert_eq!(doc["results"][0]["match"], json!(true));
        assert_eq!(fs::read_to_string(&file).expect("read"), "one\ntwo");
    }

    #[test]
    fn list_allowed_directories_takes_no_arguments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dispatcher(dir.path())
            .call("list_allowed_directories", Value::Null)
            .expect("roots");
        let roots: Vec<String> = serde_json::from_str(&out.text).expect("json");
        assert_eq!(roots, vec![dir.path().display().to_string()]);
    }

    #[test]
    fn typed_run_matches_named_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.txt");
        fs::write(&file, "same").expect("write");
        let d = dispatcher(dir.path());

        let typed = d
            .run(Operation::ReadFile(ReadFileRequest { path: file.clone() }))
            .expect("typed");
        let named = d
            .call("read_file", json!({ "path": file }))
            .expect("named");
        assert_eq!(typed, named);

        let err = d
            .run(Operation::ReadFile(ReadFileRequest {
                path: "/etc/passwd".into(),
            }))
            .expect_err("denied");
        assert!(err.is_protocol_level());
    }

    #[test]
    fn missing_file_is_reported_in_band() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dispatcher(dir.path())
            .call("read_file", json!({ "path": dir.path().join("nope.txt") }))
            .expect("in-band");
        assert!(out.is_error);
    }
}
