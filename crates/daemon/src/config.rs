//! Daemon configuration from environment variables

use anyhow::{Context, Result};
use shellhost_api_rpc::server::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use std::path::PathBuf;

const DEFAULT_RG_PATH: &str = "rg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub rpc_host: String,
    pub rpc_port: u16,
    /// Working directory for commands and default search root
    pub workdir: PathBuf,
    pub rg_path: PathBuf,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc_port = match get("SHELLHOST_RPC_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid SHELLHOST_RPC_PORT: {}", raw))?,
            None => DEFAULT_RPC_PORT,
        };

        let workdir = match get("SHELLHOST_WORKDIR") {
            Some(dir) => PathBuf::from(shellexpand::tilde(&dir).into_owned()),
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };

        let rg_path = get("SHELLHOST_RG_PATH")
            .map(|p| shellexpand::tilde(&p).into_owned())
            .unwrap_or_else(|| DEFAULT_RG_PATH.to_string());

        let log_format = match get("SHELLHOST_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            rpc_host: get("SHELLHOST_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port,
            workdir,
            rg_path: PathBuf::from(rg_path),
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<DaemonConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.rpc_host, "127.0.0.1");
        assert_eq!(cfg.rpc_port, 9527);
        assert_eq!(cfg.rg_path, PathBuf::from("rg"));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(cfg.workdir, std::env::current_dir().unwrap());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("SHELLHOST_RPC_HOST", "0.0.0.0"),
            ("SHELLHOST_RPC_PORT", "0"),
            ("SHELLHOST_WORKDIR", "/srv/project"),
            ("SHELLHOST_RG_PATH", "/opt/bin/rg"),
            ("SHELLHOST_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(cfg.rpc_host, "0.0.0.0");
        assert_eq!(cfg.rpc_port, 0);
        assert_eq!(cfg.workdir, PathBuf::from("/srv/project"));
        assert_eq!(cfg.rg_path, PathBuf::from("/opt/bin/rg"));
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_port() {
        let err = config(&[("SHELLHOST_RPC_PORT", "ninety")]).unwrap_err();
        assert!(err.to_string().contains("SHELLHOST_RPC_PORT"));
    }
}
