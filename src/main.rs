mod api;
mod app;
mod cli;
mod controller;
mod error;
mod geo;
mod overlay;
mod panels;
mod tasks;
mod tui;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use crate::api::{default_cache_dir, ApiService, Backend, VesselArea};
use crate::app::{AppState, Settings, Status};
use crate::cli::{Args, Command};
use crate::controller::{Alert, MapController};
use crate::error::{Result, SeachartError};
use crate::geo::LatLon;
use crate::overlay::{DetailPanel, LayerSurface, OverlayKind};
use crate::tasks::{collision_alert, Channels, Worker, WorkerCommand, WorkerEvent};
use crate::tui::TuiApp;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::from_args(&args)?;

    // Log to a file while the TUI owns the terminal
    let log_file = args.wants_tui().then(|| {
        settings
            .cache_dir
            .clone()
            .unwrap_or_else(default_cache_dir)
            .join("seachart.log")
    });
    init_tracing(args.verbose, log_file.as_deref());

    info!("seachart v{} starting", env!("CARGO_PKG_VERSION"));

    // Create shared application state
    let state = AppState::new(settings);

    // Set up graceful shutdown
    let shutdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Received Ctrl-C, shutting down...");
        shutdown_state.quit();
    });

    // Run the application
    if let Err(e) = run(state, args).await {
        error!("Application error: {}", e);
        return Err(e);
    }

    info!("seachart shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact();

    let file = log_file.and_then(|path| {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        File::create(path).ok()
    });
    match file {
        Some(file) => builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
}

/// Pick the tracking area named on the command line
fn vessel_area(
    region: Option<String>,
    bbox: Option<crate::api::AreaBounds>,
) -> Result<VesselArea> {
    match (region, bbox) {
        (Some(region), _) => Ok(VesselArea::Region(region)),
        (None, Some(bbox)) => Ok(VesselArea::Custom(bbox)),
        (None, None) => Err(SeachartError::Config(
            "vessels needs --region or --bbox".to_string(),
        )),
    }
}

async fn run(state: Arc<AppState>, args: Args) -> Result<()> {
    let settings = state.settings.clone();
    info!(
        api_url = %settings.api_url,
        timeout_secs = settings.timeout.as_secs(),
        hidden = ?settings.hidden,
        "Starting session"
    );

    // Initialize services
    let api = Arc::new(ApiService::new(
        &settings.api_url,
        settings.timeout,
        settings.cache_dir.clone(),
        settings.catalog_ttl,
    )?);
    let controller = Arc::new(MapController::with_hidden(
        LayerSurface::new(),
        &settings.hidden,
    ));

    if args.wants_tui() {
        let initial = match args.command {
            Some(Command::Route {
                origin,
                destination,
            }) => Some(WorkerCommand::CalculateRoute {
                origin,
                destination,
            }),
            Some(Command::Vessels { region, bbox, limit }) => Some(WorkerCommand::LoadVessels {
                area: vessel_area(region, bbox)?,
                limit,
            }),
            _ => None,
        };
        return run_tui(state, api, controller, initial).await;
    }

    match args.command {
        Some(Command::Route {
            origin,
            destination,
        }) => print_route(&*api, &controller, &origin, &destination).await,
        Some(Command::Vessels { region, bbox, limit }) => {
            let area = vessel_area(region, bbox)?;
            print_vessels(&*api, &controller, &area, limit).await
        }
        Some(Command::Catalog {
            water_body,
            country,
        }) => print_catalog(&api, water_body, country).await,
        Some(Command::Regions) => {
            for region in api.ocean_regions().await? {
                let b = region.bounds();
                println!(
                    "{:<32} {:>7.2},{:>8.2} .. {:>7.2},{:>8.2}",
                    region.name, b.south, b.west, b.north, b.east
                );
            }
            Ok(())
        }
        Some(Command::Weather { lat, lon }) => {
            let panel = controller.weather(&*api, LatLon::new(lat, lon)).await?;
            print_panel(&panel);
            Ok(())
        }
        None => Err(SeachartError::Config(
            "--no-tui needs a subcommand".to_string(),
        )),
    }
}

/// Main application loop
async fn run_tui(
    state: Arc<AppState>,
    api: Arc<ApiService>,
    controller: Arc<MapController<LayerSurface>>,
    initial: Option<WorkerCommand>,
) -> Result<()> {
    // Set up channels for task communication
    let channels = Channels::new();
    let (cmd_tx, cmd_rx, event_tx, mut event_rx) = channels.split();

    // Start worker task
    let backend: Arc<dyn Backend> = api;
    let worker = Worker::new(
        backend,
        Arc::clone(&controller),
        Arc::clone(&state),
        cmd_rx,
        event_tx,
    );
    tokio::spawn(async move {
        worker.run().await;
    });

    // Initialize TUI
    let mut tui = TuiApp::new(Arc::clone(&state), controller, cmd_tx.clone())?;

    if let Some(cmd) = initial {
        tui.remember(&cmd);
        let _ = cmd_tx.send(cmd).await;
    }

    info!("TUI started - press 'q' to quit");

    // Status to return to once a side request finishes
    let mut settled = Status::Idle;

    // Main event loop
    'main: loop {
        // Handle TUI input
        let should_quit = tui.handle_input().await?;
        if should_quit || state.is_quitting() {
            break;
        }

        // Process worker events
        while let Ok(event) = event_rx.try_recv() {
            match event {
                WorkerEvent::Busy(what) => state.set_status(Status::Working(what)),
                WorkerEvent::RouteReady(summary) => {
                    tui.clear_selection();
                    settled = Status::from_summary(&summary);
                    state.set_status(settled.clone());
                    state.clear_alerts().await;
                    state.push_alerts(summary.alerts).await;
                }
                WorkerEvent::VesselsReady(vessels) => {
                    tui.clear_selection();
                    settled = Status::Tracking { vessels };
                    state.set_status(settled.clone());
                    state.clear_alerts().await;
                }
                WorkerEvent::Alerts(alerts) => {
                    if matches!(state.status(), Status::Working(_)) {
                        state.set_status(settled.clone());
                    }
                    state.push_alerts(alerts).await;
                }
                WorkerEvent::Detail(panel) => {
                    if matches!(state.status(), Status::Working(_)) {
                        state.set_status(settled.clone());
                    }
                    tui.pin_detail(panel);
                }
                WorkerEvent::Error(message) => {
                    state.push_alerts([Alert::danger("Error", message.clone())]).await;
                    state.set_status(Status::Error(message));
                }
                WorkerEvent::Shutdown => {
                    info!("Worker shutdown");
                    break 'main;
                }
            }
        }

        // Draw TUI
        let alerts = state.alerts.read().await.clone();
        tui.draw(&alerts)?;

        // Small delay to prevent busy loop
        tokio::time::sleep(tokio::time::Duration::from_millis(16)).await; // ~60 FPS
    }

    // Clean shutdown
    state.quit();
    let _ = cmd_tx.send(WorkerCommand::Quit).await;
    tui.cleanup();

    Ok(())
}

fn print_panel(panel: &DetailPanel) {
    println!("{}", panel.title);
    if let Some(subtitle) = &panel.subtitle {
        println!("  {subtitle}");
    }
    for row in &panel.rows {
        println!("  {:<16} {}", row.label, row.value);
    }
}

fn print_groups(controller: &MapController<LayerSurface>) {
    for kind in OverlayKind::ALL {
        let count = controller.group_len(kind);
        if count > 0 {
            println!("  {:<18} {count}", kind.label());
        }
    }
}

async fn print_route(
    api: &ApiService,
    controller: &MapController<LayerSurface>,
    origin: &str,
    destination: &str,
) -> Result<()> {
    let Some(summary) = controller.calculate_route(api, origin, destination).await? else {
        return Ok(());
    };

    println!(
        "{} → {}: {}",
        summary.origin.as_deref().unwrap_or(origin),
        summary.destination.as_deref().unwrap_or(destination),
        summary.length_label()
    );
    for alert in &summary.alerts {
        println!("[{}] {alert}", alert.level);
    }

    if !summary.collision_targets.is_empty() {
        match controller
            .check_disaster_collisions(api, summary.generation, &summary.collision_targets)
            .await
        {
            Some(aggregate) => {
                let alert = collision_alert(&aggregate);
                println!("[{}] {alert}", alert.level);
            }
            None => warn!("Collision check produced no result"),
        }
    }

    println!("Overlays:");
    print_groups(controller);
    Ok(())
}

async fn print_vessels(
    api: &ApiService,
    controller: &MapController<LayerSurface>,
    area: &VesselArea,
    limit: u32,
) -> Result<()> {
    let Some(count) = controller.load_vessels(api, area, limit).await? else {
        return Ok(());
    };
    println!("{count} vessels loaded");

    if let Some(report) = controller.check_disasters_in_area(api).await? {
        for alert in &report.alerts {
            println!("[{}] {alert}", alert.level);
        }
    }

    println!("Overlays:");
    print_groups(controller);
    Ok(())
}

async fn print_catalog(
    api: &ApiService,
    water_body: Option<String>,
    country: Option<String>,
) -> Result<()> {
    match (water_body, country) {
        (None, _) => {
            for water_body in api.water_bodies().await? {
                println!("{water_body}");
            }
        }
        (Some(water_body), None) => {
            for country in api.countries(&water_body).await? {
                println!("{country}");
            }
        }
        (Some(water_body), Some(country)) => {
            for port in api.ports(&water_body, &country).await? {
                println!(
                    "{:<8} {}",
                    port.port_code.as_deref().unwrap_or("-"),
                    port.port_name.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}
