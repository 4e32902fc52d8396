use crate::watch::{DirWatcher, RebuildLock};
use axum::Router;
use gozer::assets::STATIC_DIR;
use gozer::{BuildOptions, CONTENT_DIR, DEFAULT_TEMPLATE, TEMPLATES_DIR};
use log::{error, info, warn};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tower_http::services::ServeDir;

const FALLBACK_TITLE: &str = "My website";

const DEFAULT_TEMPLATE_SOURCE: &str = r#"<!DOCTYPE html>
<html>
<head>
	<title>{{ Title }}</title>
</head>
<body>
{{ Content | safe }}
</body>
</html>
"#;

const INDEX_SOURCE: &str = r#"+++
title = "Gozer!"
+++

Welcome to my website.
"#;

fn escape_toml_string(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for character in input.chars() {
        match character {
            '\\' => output.push_str("\\\\"),
            '"' => output.push_str("\\\""),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '\u{0008}' => output.push_str("\\b"),
            '\u{000C}' => output.push_str("\\f"),
            control if control < '\u{0020}' => {
                output.push_str(&format!("\\u{:04X}", control as u32));
            }
            other => output.push(other),
        }
    }
    output
}

fn site_title(root: &Path) -> String {
    fs::canonicalize(root)
        .ok()
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

pub fn new_site(root: &Path, config_file: &Path) -> Result<(), Box<dyn Error>> {
    let config_path = root.join(config_file);
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()).into());
    }

    fs::create_dir_all(root.join(CONTENT_DIR))?;
    fs::create_dir_all(root.join(TEMPLATES_DIR))?;
    fs::create_dir_all(root.join(STATIC_DIR))?;

    let title = escape_toml_string(&site_title(root));
    let config = format!("url = \"http://localhost:8080\"\ntitle = \"{title}\"\n");
    fs::write(&config_path, config)?;

    fs::write(
        root.join(TEMPLATES_DIR).join(DEFAULT_TEMPLATE),
        DEFAULT_TEMPLATE_SOURCE,
    )?;
    fs::write(root.join(CONTENT_DIR).join("index.md"), INDEX_SOURCE)?;

    info!("Created new site in {}", root.display());

    Ok(())
}

pub fn build_site(options: &BuildOptions) -> Result<(), Box<dyn Error>> {
    let summary = gozer::build_site(options)?;
    if summary.failed > 0 {
        warn!(
            "{} of {} pages failed to build",
            summary.failed, summary.pages
        );
    }
    Ok(())
}

fn watched_dirs(root: &Path) -> Vec<PathBuf> {
    [CONTENT_DIR, TEMPLATES_DIR, STATIC_DIR]
        .iter()
        .map(|dir| root.join(dir))
        .collect()
}

fn spawn_rebuilder(options: &BuildOptions, lock: &RebuildLock) -> Result<(), Box<dyn Error>> {
    let watcher = DirWatcher::new(&watched_dirs(&options.root_dir))?;
    let options = options.clone();
    let lock = lock.clone();

    std::thread::spawn(move || {
        watcher.run(|| {
            lock.run(|| {
                info!("Changes detected, rebuilding...");
                if let Err(error) = gozer::build_site(&options) {
                    error!("Rebuild failed: {error}");
                }
            })
        })
    });

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!("Error listening for shutdown signal: {error}");
        return;
    }
    info!("Shutting down (received Ctrl+C)...");
}

fn exit_when_idle(lock: &RebuildLock) {
    let _guard = lock.acquire();
    std::process::exit(0);
}

/// Waits out any rebuild in progress, then ends the process while still
/// holding the lock so no new rebuild can start.
async fn exit_after_rebuild(lock: RebuildLock) -> Result<(), Box<dyn Error>> {
    tokio::task::spawn_blocking(move || exit_when_idle(&lock)).await?;
    Ok(())
}

pub async fn watch_site(options: &BuildOptions) -> Result<(), Box<dyn Error>> {
    build_site(options)?;

    let lock = RebuildLock::new();
    spawn_rebuilder(options, &lock)?;
    info!("Watching {} for changes", options.root_dir.display());

    shutdown_signal().await;
    exit_after_rebuild(lock).await
}

pub async fn serve_site(options: &BuildOptions, listen: &str) -> Result<(), Box<dyn Error>> {
    build_site(options)?;

    let lock = RebuildLock::new();
    spawn_rebuilder(options, &lock)?;

    let serve_dir = ServeDir::new(&options.output_dir).append_index_html_on_directories(true);
    let app = Router::new().fallback_service(serve_dir);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!("Listening on http://{listen}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    exit_after_rebuild(lock).await
}
