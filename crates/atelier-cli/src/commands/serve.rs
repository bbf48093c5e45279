//! Serve command - run the local settings GUI

use anyhow::Result;
use atelier_server::{serve, ServerConfig};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub async fn run(root: &Path, port: u16, assets: Option<PathBuf>) -> Result<()> {
    println!(
        "{}",
        format!("Serving settings GUI on http://127.0.0.1:{port}")
            .cyan()
            .bold()
    );
    println!("{}", "Press Ctrl-C to stop".dimmed());

    serve(ServerConfig {
        root: root.to_path_buf(),
        port,
        assets_dir: assets,
    })
    .await
}
