use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Stride chat server
#[derive(Debug, Parser)]
#[command(name = "stride", about = "Streaming fitness chat assistant backed by MCP tools")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "stride.toml", env = "STRIDE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "STRIDE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directives, e.g. `info,stride_chat=debug`
    ///
    /// Falls back to `RUST_LOG`, then `info`
    #[arg(long, env = "STRIDE_LOG")]
    pub log: Option<String>,
}

impl Args {
    pub fn log_filter(&self) -> String {
        self.log
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "info".to_owned())
    }
}
