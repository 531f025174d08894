//! shellhost Client Implementation

use crate::error::Result;
use crate::types::{
    EditRequest, ExecRequest, ExecResponse, GlobRequest, GlobResponse, GrepRequest,
    GrepResponse, KillRequest, KillResponse, ListResponse, MessageResponse, OutputRequest,
    OutputResponse, ReadRequest, ReadResponse, WriteRequest,
};
use crate::SdkError;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Requests can outlive the longest foreground command (10 minutes)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(11 * 60);

/// Named params from a struct's fields
fn object_params<T: Serialize>(value: &T) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    if let serde_json::Value::Object(fields) = serde_json::to_value(value)? {
        for (name, field) in fields {
            params.insert(&name, field)?;
        }
    }
    Ok(params)
}

/// shellhost Client
///
/// # Example
///
/// ```no_run
/// use shellhost_sdk::{ExecRequest, ShellhostClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ShellhostClient::connect("http://127.0.0.1:9527").await?;
/// let started = client.exec(ExecRequest::background("cargo build")).await?;
/// let shell_id = started.shell_id.unwrap_or_default();
/// let delta = client.output(&shell_id, None).await?;
/// print!("{}", delta.stdout);
/// # Ok(())
/// # }
/// ```
pub struct ShellhostClient {
    client: HttpClient,
}

impl ShellhostClient {
    /// Connect to the daemon
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9527`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(REQUEST_TIMEOUT)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    async fn call<P: Serialize, R: DeserializeOwned>(&self, method: &str, request: &P) -> Result<R> {
        let params = object_params(request)?;
        Ok(self.client.request(method, params).await?)
    }

    /// Run a command in the foreground or start it in the background
    pub async fn exec(&self, request: ExecRequest) -> Result<ExecResponse> {
        self.call("shell.exec.v1", &request).await
    }

    /// New output of a background shell since the last poll
    pub async fn output(&self, shell_id: &str, filter: Option<&str>) -> Result<OutputResponse> {
        let request = OutputRequest {
            shell_id: shell_id.to_string(),
            filter: filter.map(str::to_string),
        };
        self.call("shell.output.v1", &request).await
    }

    pub async fn list(&self) -> Result<ListResponse> {
        self.call("shell.list.v1", &serde_json::json!({})).await
    }

    pub async fn kill(&self, shell_id: &str) -> Result<KillResponse> {
        let request = KillRequest {
            shell_id: shell_id.to_string(),
        };
        self.call("shell.kill.v1", &request).await
    }

    pub async fn read(&self, request: ReadRequest) -> Result<ReadResponse> {
        self.call("fs.read.v1", &request).await
    }

    pub async fn write(
        &self,
        file_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<MessageResponse> {
        let request = WriteRequest {
            file_path: file_path.into(),
            content: content.into(),
        };
        self.call("fs.write.v1", &request).await
    }

    pub async fn edit(&self, request: EditRequest) -> Result<MessageResponse> {
        self.call("fs.edit.v1", &request).await
    }

    pub async fn glob(&self, pattern: &str, path: Option<&str>) -> Result<GlobResponse> {
        let request = GlobRequest {
            pattern: pattern.to_string(),
            path: path.map(str::to_string),
        };
        self.call("search.glob.v1", &request).await
    }

    pub async fn grep(&self, request: GrepRequest) -> Result<GrepResponse> {
        self.call("search.grep.v1", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_params_skip_absent_fields() {
        let params = object_params(&ExecRequest::background("sleep 1")).unwrap();
        let raw = jsonrpsee::core::traits::ToRpcParams::to_rpc_params(params)
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(raw.get()).unwrap();

        assert_eq!(value["command"], "sleep 1");
        assert_eq!(value["run_in_background"], true);
        assert!(value.get("timeout").is_none());
    }

    #[test]
    fn test_grep_wire_names() {
        let value = serde_json::to_value(GrepRequest {
            pattern: "TODO".into(),
            file_type: Some("rust".into()),
            case_insensitive: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(value["type"], "rust");
        assert_eq!(value["-i"], true);
    }
}
