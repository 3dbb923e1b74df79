use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::api::{Backend, Chokepoint};
use crate::app::AppState;
use crate::controller::{Alert, AreaReport, CollisionAggregate, Generation, MapController};
use crate::error::SeachartError;
use crate::overlay::LayerSurface;

use super::channels::{WorkerCommand, WorkerEvent};

/// Everything a single command needs; cloned into the task that runs it
#[derive(Clone)]
struct Context {
    backend: Arc<dyn Backend>,
    controller: Arc<MapController<LayerSurface>>,
    event_tx: mpsc::Sender<WorkerEvent>,
    /// Chokepoints of the last drawn route, tagged with its generation
    chokepoints: Arc<Mutex<Option<(Generation, Vec<Chokepoint>)>>>,
}

/// Worker task that runs backend requests and feeds the map controller.
///
/// Each command runs in its own task so a slow request never blocks a newer
/// one; the controller's generation check drops results that arrive late.
pub struct Worker {
    context: Context,
    state: Arc<AppState>,
    cmd_rx: mpsc::Receiver<WorkerCommand>,
}

impl Worker {
    pub fn new(
        backend: Arc<dyn Backend>,
        controller: Arc<MapController<LayerSurface>>,
        state: Arc<AppState>,
        cmd_rx: mpsc::Receiver<WorkerCommand>,
        event_tx: mpsc::Sender<WorkerEvent>,
    ) -> Self {
        Self {
            context: Context {
                backend,
                controller,
                event_tx,
                chokepoints: Arc::new(Mutex::new(None)),
            },
            state,
            cmd_rx,
        }
    }

    /// Run the worker task
    #[instrument(skip(self), name = "worker")]
    pub async fn run(mut self) {
        info!("Worker starting");

        loop {
            tokio::select! {
                // Handle commands from TUI
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(WorkerCommand::Quit) | None => {
                            info!("Received Quit command");
                            break;
                        }
                        Some(cmd) => {
                            debug!(?cmd, "Received command");
                            let context = self.context.clone();
                            tokio::spawn(async move { context.handle(cmd).await });
                        }
                    }
                }

                // Check for shutdown
                _ = tokio::time::sleep(Duration::from_millis(100)) => {
                    if self.state.is_quitting() {
                        break;
                    }
                }
            }
        }

        info!("Worker shutting down");
        let _ = self.context.event_tx.send(WorkerEvent::Shutdown).await;
    }
}

impl Context {
    async fn send(&self, event: WorkerEvent) {
        let _ = self.event_tx.send(event).await;
    }

    async fn fail(&self, what: &str, e: SeachartError) {
        error!(error = %e, recoverable = e.is_recoverable(), "{what} failed");
        self.send(WorkerEvent::Error(format!("{what}: {e}"))).await;
    }

    /// Keep a route's chokepoints unless a newer round has started
    fn remember_chokepoints(&self, generation: Generation, chokepoints: &[Chokepoint]) {
        let mut stored = self.chokepoints.lock();
        if !self.controller.is_current(generation) {
            debug!(?generation, "Dropping stale chokepoints");
            return;
        }
        *stored = Some((generation, chokepoints.to_vec()));
    }

    /// Chokepoints of the route currently on the map
    fn current_chokepoints(&self) -> Vec<Chokepoint> {
        match &*self.chokepoints.lock() {
            Some((generation, chokepoints)) if self.controller.is_current(*generation) => {
                chokepoints.clone()
            }
            _ => Vec::new(),
        }
    }

    async fn handle(self, cmd: WorkerCommand) {
        let backend = &*self.backend;
        let controller = &self.controller;

        match cmd {
            WorkerCommand::CalculateRoute {
                origin,
                destination,
            } => {
                self.send(WorkerEvent::Busy(format!("Routing {origin} → {destination}")))
                    .await;
                match controller.calculate_route(backend, &origin, &destination).await {
                    Ok(Some(summary)) => {
                        let generation = summary.generation;
                        self.remember_chokepoints(generation, &summary.chokepoints);
                        let targets = summary.collision_targets.clone();
                        self.send(WorkerEvent::RouteReady(summary)).await;

                        if !targets.is_empty() {
                            if let Some(aggregate) = controller
                                .check_disaster_collisions(backend, generation, &targets)
                                .await
                            {
                                self.send(WorkerEvent::Alerts(vec![collision_alert(&aggregate)]))
                                    .await;
                            }
                        }
                    }
                    Ok(None) => debug!("Route superseded"),
                    Err(e) => self.fail("Route calculation", e).await,
                }
            }
            WorkerCommand::ShowChokepoints => {
                let chokepoints = self.current_chokepoints();
                match controller.show_chokepoints(backend, &chokepoints).await {
                    Ok(Some(ships)) => {
                        let alert = Alert::info(
                            "Chokepoints",
                            format!("{} chokepoints, {ships} ships inside", chokepoints.len()),
                        );
                        self.send(WorkerEvent::Alerts(vec![alert])).await;
                    }
                    Ok(None) => {}
                    Err(e) => self.fail("Chokepoint lookup", e).await,
                }
            }
            WorkerCommand::DetectCollisions => {
                self.send(WorkerEvent::Busy("Detecting collisions".to_string())).await;
                match controller.detect_collisions(backend).await {
                    Ok(Some(collisions)) => {
                        let aggregate = CollisionAggregate {
                            issued: 1,
                            settled: 1,
                            failed: 0,
                            collisions,
                        };
                        self.send(WorkerEvent::Alerts(vec![collision_alert(&aggregate)]))
                            .await;
                    }
                    Ok(None) => {}
                    Err(e) => self.fail("Collision detection", e).await,
                }
            }
            WorkerCommand::Weather(at) => match controller.weather(backend, at).await {
                Ok(panel) => self.send(WorkerEvent::Detail(panel)).await,
                Err(e) => self.fail("Weather", e).await,
            },
            WorkerCommand::LoadVessels { area, limit } => {
                self.send(WorkerEvent::Busy("Loading vessels".to_string())).await;
                match controller.load_vessels(backend, &area, limit).await {
                    Ok(Some(count)) => self.send(WorkerEvent::VesselsReady(count)).await,
                    Ok(None) => debug!("Vessel load superseded"),
                    Err(e) => self.fail("Vessel lookup", e).await,
                }
            }
            WorkerCommand::DisastersInArea => {
                let report = controller.check_disasters_in_area(backend).await;
                self.report("Disaster lookup", report).await;
            }
            WorkerCommand::ProtectedAreasInArea => {
                let report = controller.check_protected_areas_in_area(backend).await;
                self.report("ECA/MPA lookup", report).await;
            }
            WorkerCommand::Quit => {}
        }
    }

    async fn report(&self, what: &str, report: crate::error::Result<Option<AreaReport>>) {
        match report {
            Ok(Some(report)) => self.send(WorkerEvent::Alerts(report.alerts)).await,
            Ok(None) => {}
            Err(e) => self.fail(what, e).await,
        }
    }
}

/// Summarize a collision check for the alert panel
pub fn collision_alert(aggregate: &CollisionAggregate) -> Alert {
    let critical = aggregate.critical_count();
    let total = aggregate.collisions.len();
    if critical > 0 {
        Alert::danger(
            "Collision Alert",
            format!("{critical} critical of {total} potential collisions"),
        )
    } else if total > 0 {
        Alert::warning("Collision Risk", format!("{total} low-risk encounters"))
    } else if aggregate.failed > 0 {
        Alert::warning(
            "Collision Check",
            format!("No collisions found; {} lookups failed", aggregate.failed),
        )
    } else {
        Alert::new(
            crate::controller::AlertLevel::Success,
            "No Collisions",
            "No collision risks detected",
        )
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use serde_json::json;

    use super::*;
    use crate::app::Settings;
    use crate::cli::Args;
    use crate::controller::tests::{collision, FakeBackend};
    use crate::tasks::Channels;

    fn state() -> Arc<AppState> {
        AppState::new(Settings::from_args(&Args::parse_from(["seachart"])).unwrap())
    }

    #[tokio::test]
    async fn test_route_then_collision_alert() {
        let backend = FakeBackend::default()
            .with_route(
                "NLRTM",
                json!({
                    "origin": {"name": "Rotterdam", "lat": 51.9, "lon": 4.0},
                    "destination": {"name": "Hamburg", "lat": 53.5, "lon": 10.0},
                    "route": {
                        "coordinates": [[51.9, 4.0], [53.5, 10.0]],
                        "length": 500.0,
                        "units": "km"
                    },
                    "enable_collision_check": true,
                    "ships": {"42": {"ships": []}}
                }),
            )
            .with_collisions("42", vec![collision("CRITICAL", 6.0)]);
        let controller = Arc::new(MapController::new(LayerSurface::new()));
        let (cmd_tx, cmd_rx, event_tx, mut event_rx) = Channels::new().split();

        let worker = Worker::new(
            Arc::new(backend),
            Arc::clone(&controller),
            state(),
            cmd_rx,
            event_tx,
        );
        let handle = tokio::spawn(worker.run());

        cmd_tx
            .send(WorkerCommand::CalculateRoute {
                origin: "NLRTM".to_string(),
                destination: "DEHAM".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(event_rx.recv().await, Some(WorkerEvent::Busy(_))));
        let Some(WorkerEvent::RouteReady(summary)) = event_rx.recv().await else {
            panic!("expected route");
        };
        assert_eq!(summary.length_label(), "500.0 km");
        let Some(WorkerEvent::Alerts(alerts)) = event_rx.recv().await else {
            panic!("expected collision alert");
        };
        assert_eq!(alerts[0].title, "Collision Alert");
        assert_eq!(controller.group_len(crate::overlay::OverlayKind::Collisions), 1);

        cmd_tx.send(WorkerCommand::Quit).await.unwrap();
        assert!(matches!(event_rx.recv().await, Some(WorkerEvent::Shutdown)));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failures_become_error_events() {
        let controller = Arc::new(MapController::new(LayerSurface::new()));
        let (cmd_tx, cmd_rx, event_tx, mut event_rx) = Channels::new().split();
        let worker = Worker::new(
            Arc::new(FakeBackend::default()),
            controller,
            state(),
            cmd_rx,
            event_tx,
        );
        tokio::spawn(worker.run());

        cmd_tx.send(WorkerCommand::ShowChokepoints).await.unwrap();
        let Some(WorkerEvent::Error(message)) = event_rx.recv().await else {
            panic!("expected error");
        };
        assert!(message.starts_with("Chokepoint lookup"));
    }

    fn chokepoint(name: &str) -> Chokepoint {
        Chokepoint {
            name: name.to_string(),
            lat: 30.0,
            lon: 32.5,
        }
    }

    #[test]
    fn test_stale_route_keeps_newer_chokepoints() {
        let (_, _, event_tx, _) = Channels::new().split();
        let controller = Arc::new(MapController::new(LayerSurface::new()));
        let context = Context {
            backend: Arc::new(FakeBackend::default()),
            controller: Arc::clone(&controller),
            event_tx,
            chokepoints: Arc::new(Mutex::new(None)),
        };

        let older = controller.reset();
        let newer = controller.reset();
        context.remember_chokepoints(newer, &[chokepoint("Suez")]);
        // The older route finishes last and must not overwrite
        context.remember_chokepoints(older, &[chokepoint("Panama")]);
        assert_eq!(context.current_chokepoints(), vec![chokepoint("Suez")]);

        // Anything that starts a new round retires them
        controller.reset();
        assert!(context.current_chokepoints().is_empty());
    }

    #[test]
    fn test_collision_alert_levels() {
        let mut aggregate = CollisionAggregate {
            issued: 2,
            settled: 2,
            failed: 1,
            collisions: vec![],
        };
        assert_eq!(collision_alert(&aggregate).title, "Collision Check");

        aggregate.failed = 0;
        assert_eq!(collision_alert(&aggregate).title, "No Collisions");

        aggregate.collisions.push(collision("MEDIUM", 1.0));
        assert_eq!(collision_alert(&aggregate).title, "Collision Risk");
    }
}
