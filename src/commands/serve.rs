use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::Router;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use htmlx::build::pipeline::LIVE_RELOAD_PATH;
use htmlx::build::{BuildResult, Builder, ChangeKind, FileWatcher, WatchEvent, WatchPaths};
use htmlx::config::HtmlxConfig;

use crate::ServeArgs;

use super::load_config;

/// SSE handler for live reload notifications.
async fn live_reload_handler(
    State(tx): State<broadcast::Sender<()>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = tx.subscribe();
    let stream = async_stream::stream! {
        let mut rx = rx;
        loop {
            match rx.recv().await {
                Ok(_) => {
                    yield Ok(Event::default().event("reload").data("reload"));
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    // Only the latest reload matters
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let (config, config_path, base_path) = load_config(args.config_file.as_deref())?;

    // Create broadcast channel for live reload
    let (reload_tx, _) = broadcast::channel::<()>(16);

    // Build the project first
    println!("Building project...");
    let result = do_build(&config, &base_path).await?;
    print_summary("Built", &result);

    // Set up file watcher if enabled
    let _watcher_handle = if args.watch {
        let source_dir = Builder::new(config.clone(), base_path.clone()).source_dir();
        // Canonicalize to match the paths reported by file events
        let source_dir = source_dir.canonicalize().unwrap_or(source_dir);
        let config_path = config_path.canonicalize().unwrap_or(config_path);
        let watch_paths = WatchPaths {
            source_dir,
            config_path: config_path.clone(),
        };

        match FileWatcher::new(&config.dev.watch, &watch_paths) {
            Ok(watcher) => {
                println!("Watching for changes...");
                let watcher_reload_tx = reload_tx.clone();
                let runtime = tokio::runtime::Handle::current();

                Some(tokio::task::spawn_blocking(move || {
                    let mut config = config;
                    while let Some(event) = watcher.recv() {
                        match event {
                            WatchEvent::FilesChanged(changes) => {
                                println!("\nDetected {} change(s), rebuilding...", changes.len());
                                debug!(?changes, "rebuild triggered");

                                if changes.contains(&ChangeKind::Config) {
                                    match HtmlxConfig::load(&config_path) {
                                        Ok(reloaded) => config = reloaded,
                                        Err(e) => warn!("keeping previous config: {e}"),
                                    }
                                }

                                let rebuilt = runtime.block_on(do_build(&config, &base_path));
                                match rebuilt {
                                    Ok(result) => {
                                        print_summary("Rebuilt", &result);
                                        // Notify connected browsers to reload
                                        let _ = watcher_reload_tx.send(());
                                    }
                                    Err(e) => eprintln!("Build error: {e}"),
                                }
                            }
                            WatchEvent::Error(e) => {
                                eprintln!("Watch error: {e}");
                            }
                        }
                    }
                }))
            }
            Err(e) => {
                eprintln!("Warning: Failed to start file watcher: {e}");
                None
            }
        }
    } else {
        None
    };

    // Create the static file server
    let serve_dir = ServeDir::new(&result.output_dir).append_index_html_on_directories(true);

    // Build router with SSE endpoint for live reload
    let app = Router::new()
        .route(LIVE_RELOAD_PATH, get(live_reload_handler))
        .with_state(reload_tx)
        .fallback_service(serve_dir);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    println!("\nServing {} at {}", result.output_dir.display(), url);
    println!("Press Ctrl+C to stop\n");

    if args.open
        && let Err(e) = open::that(&url)
    {
        eprintln!("Failed to open browser: {e}");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Prints diagnostics for failed documents without stopping the server.
fn print_summary(verb: &str, result: &BuildResult) {
    for doc in &result.documents {
        if let Some(error) = &doc.error {
            eprintln!("{error}");
        }
        for warning in &doc.warnings {
            eprintln!("{}:{warning}", doc.relative.display());
        }
    }
    println!(
        "{verb} {} document(s), {} failed",
        result.documents.len(),
        result.failures()
    );
}

/// Run a development build.
async fn do_build(config: &HtmlxConfig, base_path: &Path) -> Result<BuildResult, anyhow::Error> {
    let builder = Builder::new(config.clone(), PathBuf::from(base_path))
        .with_dev_mode(true)
        .with_live_reload(config.dev.live_reload);
    Ok(builder.build().await?)
}
