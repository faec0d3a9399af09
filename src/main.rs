//! mustachio - Headless Face-Overlay Anchoring Service
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mustachio::{
    config::Config,
    overlay::AssetManager,
    tracking::MeshReceiver,
    AppState,
};

/// mustachio - Headless Face-Overlay Anchoring Service
#[derive(Parser, Debug)]
#[command(name = "mustachio", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mesh receiver UDP port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Overlay assets directory (overrides config)
    #[arg(short, long)]
    assets_dir: Option<PathBuf>,

    /// Print each computed anchor frame as JSON on stdout
    #[arg(long)]
    print_frames: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", mustachio::NAME, mustachio::VERSION);

    let runtime = tokio::runtime::Runtime::new()?;

    let state = runtime.block_on(async { setup_and_spawn_services(&args).await })?;

    // Wait for Ctrl+C / SIGTERM
    runtime.block_on(async {
        shutdown_signal().await;
        info!("Shutdown signal received");
        state.shutdown();

        // Give tasks a moment to clean up
        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
    });

    info!("mustachio stopped");
    Ok(())
}

/// Setup config, create AppState, and spawn all background services.
async fn setup_and_spawn_services(args: &Args) -> anyhow::Result<Arc<AppState>> {
    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.tracking.port = port;
    }
    if let Some(ref dir) = args.assets_dir {
        config.overlay.assets_dir = dir.clone();
    }

    // Validate configuration
    config.validate()?;

    info!(
        "Mesh receiver: {}:{}",
        config.tracking.listen_address, config.tracking.port
    );
    for feature in &config.overlay.features {
        info!(
            "Feature {}: {} vertices, {} overlay options",
            feature.name,
            feature.indices.len(),
            feature.options.len()
        );
    }

    // Resolve overlay assets up front so missing files are reported at startup
    let assets = AssetManager::new(&config.overlay)?;
    let resolved = assets.keys().count();
    info!("Resolved {} overlay assets in {}", resolved, assets.base_dir().display());

    // Create shared application state
    let state = AppState::new(config.clone());

    // Start the mesh ingestion loop
    let mesh_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = run_mesh_loop(mesh_state).await {
            error!("Mesh loop error: {}", e);
        }
    });

    // Start the stdin interaction loop ("next [feature]" cycles overlays)
    let control_state = Arc::clone(&state);
    tokio::spawn(async move {
        run_control_loop(control_state).await;
    });

    // Print frames for downstream consumption if requested
    if args.print_frames {
        let frame_state = Arc::clone(&state);
        tokio::spawn(async move {
            run_frame_printer(frame_state, assets).await;
        });
    }

    Ok(state)
}

/// Receive mesh packets and apply them to the session.
async fn run_mesh_loop(state: Arc<AppState>) -> anyhow::Result<()> {
    let config = state.config.read().await;
    let tracking_config = config.tracking.clone();
    drop(config);

    let mut shutdown_rx = state.subscribe_shutdown();

    let mut receiver = MeshReceiver::new(&tracking_config);
    receiver.start()?;

    loop {
        tokio::select! {
            result = receiver.process() => {
                match result {
                    Ok(Some(packet)) => {
                        if let Err(e) = state.handle_packet(&packet).await {
                            warn!("Failed to apply mesh packet: {}", e);
                        }
                    }
                    Ok(None) => {
                        // Socket idle, yield before polling again
                        tokio::time::sleep(tokio::time::Duration::from_millis(2)).await;
                    }
                    Err(e) => {
                        warn!("Mesh receive error: {}", e);
                        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Mesh loop shutting down");
                receiver.stop();
                return Ok(());
            }
        }
    }
}

/// Read interaction events from stdin.
///
/// `next` cycles the first configured feature, `next <feature>` a specific
/// one. This stands in for the tap gesture a host UI would deliver.
async fn run_control_loop(state: Arc<AppState>) {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut shutdown_rx = state.subscribe_shutdown();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => {
                        info!("stdin closed, interaction events disabled");
                        return;
                    }
                    Err(e) => {
                        warn!("stdin read error: {}", e);
                        return;
                    }
                };

                let mut parts = line.split_whitespace();
                match parts.next() {
                    Some("next") => {
                        let feature = parts.next();
                        match state.advance_overlay(feature).await {
                            Ok(Some(_)) => {}
                            Ok(None) => info!("No face tracked, ignoring overlay advance"),
                            Err(e) => warn!("Overlay advance failed: {}", e),
                        }
                    }
                    Some("quit") | Some("exit") => {
                        state.shutdown();
                        return;
                    }
                    Some(other) => {
                        info!("Unknown command: {} (try: next [feature], quit)", other);
                    }
                    None => {}
                }
            }
            _ = shutdown_rx.recv() => return,
        }
    }
}

/// Emit each anchor frame as a JSON line on stdout.
async fn run_frame_printer(state: Arc<AppState>, assets: AssetManager) {
    let mut frame_rx = state.subscribe_frames();
    let mut shutdown_rx = state.subscribe_shutdown();

    loop {
        tokio::select! {
            frame = frame_rx.recv() => {
                let frame = match frame {
                    Ok(f) => f,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Frame printer lagged, skipped {} frames", n);
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                };

                for (feature, update) in &frame.anchors {
                    if !assets.has_asset(&update.overlay) {
                        warn!(
                            "Feature {} selected overlay {} with no asset on disk",
                            feature, update.overlay
                        );
                    }
                }

                match serde_json::to_string(&frame) {
                    Ok(json) => println!("{}", json),
                    Err(e) => warn!("Failed to serialize frame: {}", e),
                }
            }
            _ = shutdown_rx.recv() => return,
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
