use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};

use selection_handles::handler::SelectionHandler;
use selection_handles::model::config::HandlerConfig;
use selection_handles::replay;
use selection_handles::shell::JsonShell;
use selection_handles::sim::{Scene, SimDocument};
use selection_handles::wire::InboundMessage;

fn main() -> Result<()> {
    let config = HandlerConfig::load()?;

    // Initialize logging to file (stdout carries the wire protocol)
    let log_dir = directories::ProjectDirs::from("", "", "selhandles")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "selhandles.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(config.logging.filter.as_str())
        .init();

    tracing::info!("selhandles starting");

    let scene_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: selhandles <scene.toml>")?;
    let document = Scene::load(&scene_path)?.build()?;

    let result = run(document, config);
    if let Err(e) = &result {
        tracing::error!("replay failed: {e:?}");
    }
    result
}

fn run(document: SimDocument, config: HandlerConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel::<InboundMessage>();
    let mut handler = SelectionHandler::new(document, JsonShell::new(io::stdout()), config);

    // Input thread: one JSON message per stdin line
    thread::spawn(move || {
        for (idx, line) in io::stdin().lock().lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!("stdin read failed: {err}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<InboundMessage>(&line) {
                Ok(msg) => {
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
                Err(err) => tracing::warn!("line {}: bad message: {err}", idx + 1),
            }
        }
    });

    // ── Main event loop ──
    // Ends when the input thread hangs up.
    while let Ok(msg) = rx.recv() {
        replay::apply(&mut handler, msg);
    }

    handler.close_selection();
    tracing::info!("selhandles finished");
    Ok(())
}
