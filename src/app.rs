use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};

use crate::cli::Args;
use crate::controller::{Alert, RouteSummary};
use crate::error::{Result, SeachartError};
use crate::overlay::OverlayKind;

/// Alerts kept for the alert panel
const ALERT_HISTORY: usize = 20;

/// Runtime settings derived from the command line
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Duration,
    pub cache_dir: Option<PathBuf>,
    pub catalog_ttl: Duration,
    pub hidden: Vec<OverlayKind>,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self> {
        let hidden = args
            .hidden_groups()
            .map_err(|e| SeachartError::Config(e.to_string()))?;
        if args.timeout_secs == 0 {
            return Err(SeachartError::Config("--timeout-secs must be positive".to_string()));
        }

        Ok(Self {
            api_url: args.api_url.clone(),
            timeout: Duration::from_secs(args.timeout_secs),
            cache_dir: args.cache_dir.clone(),
            catalog_ttl: Duration::from_secs(args.catalog_ttl_secs),
            hidden,
        })
    }
}

/// What the worker is doing, for the header
#[derive(Debug, Clone, Default)]
pub enum Status {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A request is in flight
    Working(String),
    /// A route is on the map
    Route {
        origin: String,
        destination: String,
        length: String,
    },
    /// Vessels of a region are on the map
    Tracking { vessels: usize },
    /// The last request failed
    Error(String),
}

impl Status {
    pub fn from_summary(summary: &RouteSummary) -> Self {
        Status::Route {
            origin: summary.origin.clone().unwrap_or_else(|| "?".to_string()),
            destination: summary.destination.clone().unwrap_or_else(|| "?".to_string()),
            length: summary.length_label(),
        }
    }

    /// Get status string for display
    pub fn status_text(&self) -> &'static str {
        match self {
            Status::Idle => "IDLE",
            Status::Working(_) => "WORKING",
            Status::Route { .. } => "ROUTE",
            Status::Tracking { .. } => "TRACKING",
            Status::Error(_) => "ERROR",
        }
    }

    /// One-line description next to the status word
    pub fn detail(&self) -> String {
        match self {
            Status::Idle => "No route loaded".to_string(),
            Status::Working(what) => format!("{what}..."),
            Status::Route {
                origin,
                destination,
                length,
            } => format!("{origin} → {destination} ({length})"),
            Status::Tracking { vessels } => format!("{vessels} vessels tracked"),
            Status::Error(message) => message.clone(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    /// Current status (watch channel for TUI updates)
    status_tx: watch::Sender<Status>,
    status_rx: watch::Receiver<Status>,
    /// Most recent alerts, newest last
    pub alerts: RwLock<VecDeque<Alert>>,
    /// Shutdown flag
    pub should_quit: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(settings: Settings) -> Arc<Self> {
        let (status_tx, status_rx) = watch::channel(Status::Idle);

        Arc::new(Self {
            settings,
            status_tx,
            status_rx,
            alerts: RwLock::new(VecDeque::new()),
            should_quit: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn set_status(&self, status: Status) {
        let _ = self.status_tx.send(status);
    }

    pub fn status(&self) -> Status {
        self.status_rx.borrow().clone()
    }

    /// Signal shutdown
    pub fn quit(&self) {
        self.should_quit.store(true, Ordering::SeqCst);
    }

    /// Check if shutdown requested
    pub fn is_quitting(&self) -> bool {
        self.should_quit.load(Ordering::SeqCst)
    }

    pub async fn push_alerts(&self, new: impl IntoIterator<Item = Alert>) {
        let mut alerts = self.alerts.write().await;
        alerts.extend(new);
        while alerts.len() > ALERT_HISTORY {
            alerts.pop_front();
        }
    }

    pub async fn clear_alerts(&self) {
        self.alerts.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn settings(argv: &[&str]) -> Result<Settings> {
        Settings::from_args(&Args::parse_from(argv))
    }

    #[test]
    fn test_settings_from_args() {
        let settings = settings(&["seachart", "--timeout-secs", "5", "--hide", "ships"]).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.hidden, vec![OverlayKind::Ships]);
        assert_eq!(settings.api_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_settings_reject_unknown_group() {
        let err = settings(&["seachart", "--hide", "clouds"]).unwrap_err();
        assert!(matches!(err, SeachartError::Config(ref m) if m.contains("clouds")));
    }

    #[tokio::test]
    async fn test_alert_history_is_bounded() {
        let state = AppState::new(settings(&["seachart"]).unwrap());
        state
            .push_alerts((0..25).map(|i| Alert::info("n", i.to_string())))
            .await;

        let alerts = state.alerts.read().await;
        assert_eq!(alerts.len(), ALERT_HISTORY);
        assert_eq!(alerts.front().unwrap().message, "5");
    }

    #[test]
    fn test_status_detail() {
        let status = Status::Route {
            origin: "Shanghai".to_string(),
            destination: "Los Angeles".to_string(),
            length: "10543.2 km".to_string(),
        };
        assert_eq!(status.status_text(), "ROUTE");
        assert_eq!(status.detail(), "Shanghai → Los Angeles (10543.2 km)");
    }
}
