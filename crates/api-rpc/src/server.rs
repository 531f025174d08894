//! JSON-RPC Server
//!
//! Serves JSON-RPC 2.0 over HTTP on a localhost TCP port.

use crate::handler::RpcHandler;
use crate::types::{
    EditRequest, ExecRequest, GlobRequest, GrepRequest, KillRequest, OutputRequest, ReadRequest,
    WriteRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use shellhost_core::application::{FileService, SearchService, ShellService};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks a free port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        shell: Arc<ShellService>,
        files: Arc<FileService>,
        search: Arc<SearchService>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(shell, files, search)),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address along with the handle used to stop it.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("shell.exec.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ExecRequest = params.parse()?;
                    handler.exec(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_method("shell.output.v1", move |params, _, _| {
                let req: OutputRequest = params.parse()?;
                handler.output(req)
            })
            .map_err(|e| e.to_string())?;

        // Takes no parameters; anything sent is ignored
        let handler = self.handler.clone();
        module
            .register_method("shell.list.v1", move |_, _, _| {
                Ok::<_, ErrorObjectOwned>(handler.list())
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("shell.kill.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: KillRequest = params.parse()?;
                    handler.kill(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("fs.read.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ReadRequest = params.parse()?;
                    handler.read(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("fs.write.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: WriteRequest = params.parse()?;
                    handler.write(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("fs.edit.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: EditRequest = params.parse()?;
                    handler.edit(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("search.glob.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: GlobRequest = params.parse()?;
                    handler.glob(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("search.grep.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: GrepRequest = params.parse()?;
                    handler.grep(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC server started");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
