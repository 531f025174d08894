//! shellhost SDK - Rust Client Library
//!
//! Typed client for the shellhost daemon's JSON-RPC API.
//!
//! # Example
//!
//! ```no_run
//! use shellhost_sdk::{ExecRequest, ShellhostClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ShellhostClient::connect("http://127.0.0.1:9527").await?;
//!
//!     let response = client.exec(ExecRequest::foreground("uname -a")).await?;
//!     print!("{}", response.output);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::ShellhostClient;
pub use error::{code, Result, SdkError};
pub use types::{
    EditRequest, ExecRequest, ExecResponse, GlobResponse, GrepRequest, GrepResponse,
    KillResponse, ListResponse, MessageResponse, OutputResponse, ReadRequest, ReadResponse,
    ShellInfo,
};
