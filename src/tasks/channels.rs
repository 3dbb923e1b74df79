use tokio::sync::mpsc;

use crate::api::VesselArea;
use crate::controller::{Alert, RouteSummary};
use crate::geo::LatLon;
use crate::overlay::DetailPanel;

/// Commands from TUI/input to the worker task
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    /// Clear the map and draw the route between two ports
    CalculateRoute { origin: String, destination: String },
    /// Circle the chokepoints of the current route and load their ships
    ShowChokepoints,
    /// Run collision detection over the tracked vessels
    DetectCollisions,
    /// Fetch the weather at a point
    Weather(LatLon),
    /// Start tracking vessels in an area
    LoadVessels { area: VesselArea, limit: u32 },
    /// Draw the disasters inside the tracked area
    DisastersInArea,
    /// Draw the ECA/MPA zones inside the tracked area
    ProtectedAreasInArea,
    /// Shutdown the worker
    Quit,
}

/// Messages from the worker to the main loop
#[derive(Debug)]
pub enum WorkerEvent {
    /// A request was sent
    Busy(String),
    /// A route was drawn
    RouteReady(RouteSummary),
    /// Vessels of a region were drawn
    VesselsReady(usize),
    /// Notices to show in the alert panel
    Alerts(Vec<Alert>),
    /// Content for the detail panel
    Detail(DetailPanel),
    /// A request failed
    Error(String),
    /// Worker is shutting down
    Shutdown,
}

/// Channel bundle for communication
pub struct Channels {
    /// Commands to worker
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub cmd_rx: mpsc::Receiver<WorkerCommand>,

    /// Events from worker
    pub event_tx: mpsc::Sender<WorkerEvent>,
    pub event_rx: mpsc::Receiver<WorkerEvent>,
}

impl Channels {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(32);

        Self {
            cmd_tx,
            cmd_rx,
            event_tx,
            event_rx,
        }
    }

    /// Split into sender/receiver pairs
    pub fn split(
        self,
    ) -> (
        mpsc::Sender<WorkerCommand>,
        mpsc::Receiver<WorkerCommand>,
        mpsc::Sender<WorkerEvent>,
        mpsc::Receiver<WorkerEvent>,
    ) {
        (self.cmd_tx, self.cmd_rx, self.event_tx, self.event_rx)
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}
