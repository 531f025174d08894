//! shellhost CLI - Command-line interface for the shellhost daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

#[derive(Parser)]
#[command(name = "shellhost")]
#[command(about = "shellhost CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "SHELLHOST_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a shell command
    Exec {
        /// Command line passed to bash -c
        command: String,

        /// Run in the background and print the shell id
        #[arg(short, long)]
        background: bool,

        /// Timeout in milliseconds (foreground only)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Short description of what the command does
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Fetch new output of a background shell
    Output {
        shell_id: String,

        /// Only show lines fully matching this regex
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// List background shells
    List,

    /// Kill a background shell
    Kill { shell_id: String },

    /// Read a file with line numbers
    Read {
        /// Absolute path
        file_path: String,

        #[arg(long)]
        offset: Option<usize>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Write a file (existing files must be read first)
    Write {
        /// Absolute path
        file_path: String,

        content: String,
    },

    /// Replace text in a file that was read first
    Edit {
        /// Absolute path
        file_path: String,

        old_string: String,

        new_string: String,

        /// Replace every occurrence
        #[arg(long)]
        all: bool,
    },

    /// Find files by glob pattern
    Glob {
        pattern: String,

        #[arg(short, long)]
        path: Option<String>,
    },

    /// Search file contents with ripgrep
    Grep {
        pattern: String,

        #[arg(short, long)]
        path: Option<String>,

        #[arg(short, long)]
        glob: Option<String>,

        /// content | files_with_matches | count
        #[arg(short, long, default_value = "files_with_matches")]
        mode: String,

        #[arg(short = 'i', long)]
        ignore_case: bool,

        #[arg(short = 'n', long)]
        line_numbers: bool,

        #[arg(long, default_value = "0")]
        head_limit: usize,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct ShellRow {
    id: String,
    status: String,
    command: String,
    #[serde(default)]
    #[tabled(display_with = "display_description")]
    description: Option<String>,
}

fn display_description(description: &Option<String>) -> String {
    description.clone().unwrap_or_default()
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn text_field(result: &serde_json::Value, field: &str) -> String {
    result
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Exec {
            command,
            background,
            timeout,
            description,
        } => {
            let params = json!({
                "command": command,
                "run_in_background": background,
                "timeout": timeout,
                "description": description,
            });
            let result = call_rpc(&cli.rpc_url, "shell.exec.v1", params).await?;

            if background {
                println!("{}", text_field(&result, "output").green().bold());
            } else {
                print!("{}", text_field(&result, "output"));
            }
        }

        Commands::Output { shell_id, filter } => {
            let params = json!({
                "shell_id": shell_id,
                "filter": filter,
            });
            let result = call_rpc(&cli.rpc_url, "shell.output.v1", params).await?;

            let status = text_field(&result, "status");
            let status = match status.as_str() {
                "running" => status.yellow(),
                "completed" => status.green(),
                _ => status.red(),
            };
            eprintln!("{} {}", "Status:".bold(), status);
            if let Some(code) = result.get("exit_code").and_then(|v| v.as_i64()) {
                eprintln!("{} {}", "Exit code:".bold(), code);
            }
            print!("{}", text_field(&result, "stdout"));
            eprint!("{}", text_field(&result, "stderr"));
        }

        Commands::List => {
            let result = call_rpc(&cli.rpc_url, "shell.list.v1", json!({})).await?;
            let shells: Vec<ShellRow> =
                serde_json::from_value(result.get("shells").cloned().unwrap_or_default())
                    .unwrap_or_default();

            if shells.is_empty() {
                println!("{}", "No background shells".yellow());
            } else {
                println!("{}", Table::new(shells));
            }
        }

        Commands::Kill { shell_id } => {
            let params = json!({ "shell_id": shell_id });
            let result = call_rpc(&cli.rpc_url, "shell.kill.v1", params).await?;
            println!("{}", format!("✓ {}", text_field(&result, "message")).green().bold());
        }

        Commands::Read {
            file_path,
            offset,
            limit,
        } => {
            let params = json!({
                "file_path": file_path,
                "offset": offset,
                "limit": limit,
            });
            let result = call_rpc(&cli.rpc_url, "fs.read.v1", params).await?;
            println!("{}", text_field(&result, "content"));
        }

        Commands::Write { file_path, content } => {
            let params = json!({
                "file_path": file_path,
                "content": content,
            });
            let result = call_rpc(&cli.rpc_url, "fs.write.v1", params).await?;
            println!("{}", format!("✓ {}", text_field(&result, "message")).green());
        }

        Commands::Edit {
            file_path,
            old_string,
            new_string,
            all,
        } => {
            let params = json!({
                "file_path": file_path,
                "old_string": old_string,
                "new_string": new_string,
                "replace_all": all,
            });
            let result = call_rpc(&cli.rpc_url, "fs.edit.v1", params).await?;
            println!("{}", text_field(&result, "message"));
        }

        Commands::Glob { pattern, path } => {
            let params = json!({
                "pattern": pattern,
                "path": path,
            });
            let result = call_rpc(&cli.rpc_url, "search.glob.v1", params).await?;
            println!("{}", text_field(&result, "files"));
        }

        Commands::Grep {
            pattern,
            path,
            glob,
            mode,
            ignore_case,
            line_numbers,
            head_limit,
        } => {
            let params = json!({
                "pattern": pattern,
                "path": path,
                "glob": glob,
                "output_mode": mode,
                "-i": ignore_case,
                "-n": line_numbers,
                "head_limit": head_limit,
            });
            let result = call_rpc(&cli.rpc_url, "search.grep.v1", params).await?;
            println!("{}", text_field(&result, "results"));
        }
    }

    Ok(())
}
