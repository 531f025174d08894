//! RPC Method Handlers
//!
//! Translates wire types to application requests and back.

use crate::error::to_rpc_error;
use crate::types::{
    EditRequest, ExecRequest, ExecResponse, GlobRequest, GlobResponse, GrepRequest, GrepResponse,
    KillRequest, KillResponse, ListResponse, MessageResponse, OutputRequest, OutputResponse,
    ReadRequest, ReadResponse, ShellInfo, WriteRequest,
};
use chrono::SecondsFormat;
use jsonrpsee::types::ErrorObjectOwned;
use shellhost_core::application::{self, FileService, SearchService, ShellService};
use shellhost_core::error::AppError;
use shellhost_core::port::GrepOutputMode;
use std::sync::Arc;

/// RPC Handler with injected services
pub struct RpcHandler {
    shell: Arc<ShellService>,
    files: Arc<FileService>,
    search: Arc<SearchService>,
}

impl RpcHandler {
    pub fn new(
        shell: Arc<ShellService>,
        files: Arc<FileService>,
        search: Arc<SearchService>,
    ) -> Self {
        Self {
            shell,
            files,
            search,
        }
    }

    /// shell.exec.v1
    pub async fn exec(&self, params: ExecRequest) -> Result<ExecResponse, ErrorObjectOwned> {
        let result = self
            .shell
            .execute(application::ExecRequest {
                command: params.command,
                description: params.description,
                timeout_ms: params.timeout,
                run_in_background: params.run_in_background,
            })
            .await
            .map_err(to_rpc_error)?;

        Ok(ExecResponse {
            output: result.result,
            shell_id: result.shell_id,
        })
    }

    /// shell.output.v1
    pub fn output(&self, params: OutputRequest) -> Result<OutputResponse, ErrorObjectOwned> {
        let delta = self
            .shell
            .poll_output(&params.shell_id, params.filter.as_deref())
            .map_err(to_rpc_error)?;

        Ok(OutputResponse {
            shell_id: params.shell_id,
            status: delta.status.to_string(),
            exit_code: delta.exit_code,
            error: delta.error,
            stdout: delta.stdout,
            stderr: delta.stderr,
            timestamp: delta.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
        })
    }

    /// shell.list.v1
    pub fn list(&self) -> ListResponse {
        let shells = self
            .shell
            .list()
            .into_iter()
            .map(|s| ShellInfo {
                id: s.id,
                command: s.command,
                description: s.description,
                status: s.status.to_string(),
            })
            .collect();
        ListResponse { shells }
    }

    /// shell.kill.v1
    pub async fn kill(&self, params: KillRequest) -> Result<KillResponse, ErrorObjectOwned> {
        let message = self
            .shell
            .terminate(&params.shell_id)
            .await
            .map_err(to_rpc_error)?;
        Ok(KillResponse {
            message,
            shell_id: params.shell_id,
        })
    }

    /// fs.read.v1
    pub async fn read(&self, params: ReadRequest) -> Result<ReadResponse, ErrorObjectOwned> {
        let content = self
            .files
            .read(application::ReadRequest {
                file_path: params.file_path,
                offset: params.offset,
                limit: params.limit,
            })
            .await
            .map_err(to_rpc_error)?;
        Ok(ReadResponse { content })
    }

    /// fs.write.v1
    pub async fn write(&self, params: WriteRequest) -> Result<MessageResponse, ErrorObjectOwned> {
        let message = self
            .files
            .write(application::WriteRequest {
                file_path: params.file_path,
                content: params.content,
            })
            .await
            .map_err(to_rpc_error)?;
        Ok(MessageResponse { message })
    }

    /// fs.edit.v1
    pub async fn edit(&self, params: EditRequest) -> Result<MessageResponse, ErrorObjectOwned> {
        let message = self
            .files
            .edit(application::EditRequest {
                file_path: params.file_path,
                old_string: params.old_string,
                new_string: params.new_string,
                replace_all: params.replace_all,
            })
            .await
            .map_err(to_rpc_error)?;
        Ok(MessageResponse { message })
    }

    /// search.glob.v1
    pub async fn glob(&self, params: GlobRequest) -> Result<GlobResponse, ErrorObjectOwned> {
        let files = self
            .search
            .glob(application::GlobRequest {
                pattern: params.pattern,
                path: params.path,
            })
            .await
            .map_err(to_rpc_error)?;
        Ok(GlobResponse { files })
    }

    /// search.grep.v1
    pub async fn grep(&self, params: GrepRequest) -> Result<GrepResponse, ErrorObjectOwned> {
        let output_mode = parse_output_mode(params.output_mode.as_deref()).map_err(to_rpc_error)?;
        let results = self
            .search
            .grep(application::GrepRequest {
                pattern: params.pattern,
                path: params.path,
                glob: params.glob,
                file_type: params.file_type,
                output_mode,
                case_insensitive: params.case_insensitive,
                multiline: params.multiline,
                line_numbers: params.line_numbers,
                after: params.after,
                before: params.before,
                context: params.context,
                head_limit: params.head_limit,
            })
            .await
            .map_err(to_rpc_error)?;
        Ok(GrepResponse { results })
    }
}

fn parse_output_mode(raw: Option<&str>) -> Result<GrepOutputMode, AppError> {
    match raw.unwrap_or("") {
        "" | "files_with_matches" => Ok(GrepOutputMode::FilesWithMatches),
        "content" => Ok(GrepOutputMode::Content),
        "count" => Ok(GrepOutputMode::Count),
        other => Err(AppError::validation(format!(
            "Invalid output_mode: {}. Must be one of: content, files_with_matches, count.",
            other
        ))),
    }
}
