use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::api::VesselArea;
use crate::app::{AppState, Status};
use crate::controller::{Alert, MapController};
use crate::error::TuiError;
use crate::geo::{wrap_lon, LatLon};
use crate::overlay::{DetailPanel, DrawableId, LayerSurface, OverlayKind};
use crate::tasks::WorkerCommand;

use super::widgets::legend::LegendEntry;
use super::widgets::{alerts, detail, legend, world_map};

/// TUI application state
pub struct TuiApp {
    state: Arc<AppState>,
    controller: Arc<MapController<LayerSurface>>,
    cmd_tx: mpsc::Sender<WorkerCommand>,
    terminal: Terminal<CrosstermBackend<Stdout>>,

    /// Last requested route, for recalculation
    route: Option<(String, String)>,
    /// Last tracked area, for reloading
    tracking: Option<(VesselArea, u32)>,

    // Display state
    selected: Option<DrawableId>,
    /// Panel pinned by a lookup (weather); replaces the selection's panel
    pinned: Option<DetailPanel>,
}

impl TuiApp {
    /// Create a new TUI application
    pub fn new(
        state: Arc<AppState>,
        controller: Arc<MapController<LayerSurface>>,
        cmd_tx: mpsc::Sender<WorkerCommand>,
    ) -> Result<Self, TuiError> {
        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            state,
            controller,
            cmd_tx,
            terminal,
            route: None,
            tracking: None,
            selected: None,
            pinned: None,
        })
    }

    /// Restore terminal state
    fn restore_terminal(&mut self) -> Result<(), TuiError> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Remember what was requested so `r` can repeat it
    pub fn remember(&mut self, cmd: &WorkerCommand) {
        match cmd {
            WorkerCommand::CalculateRoute {
                origin,
                destination,
            } => {
                self.route = Some((origin.clone(), destination.clone()));
                self.tracking = None;
            }
            WorkerCommand::LoadVessels { area, limit } => {
                self.tracking = Some((area.clone(), *limit));
                self.route = None;
            }
            _ => {}
        }
    }

    /// Show a panel until the selection changes
    pub fn pin_detail(&mut self, panel: DetailPanel) {
        self.pinned = Some(panel);
    }

    /// Forget the selection after the map was redrawn from scratch
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.pinned = None;
    }

    /// Ids of attached drawables that have a detail panel, in id order
    fn selectable(&self) -> Vec<DrawableId> {
        self.controller
            .snapshot()
            .into_iter()
            .filter(|(_, d)| d.detail.is_some())
            .map(|(_, d)| d.id)
            .collect()
    }

    fn cycle_selection(&mut self, forward: bool) {
        let ids = self.selectable();
        if ids.is_empty() {
            self.selected = None;
            return;
        }
        let position = self.selected.and_then(|id| ids.iter().position(|i| *i == id));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => ids.len() - 1,
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
        };
        self.selected = Some(ids[next]);
        self.pinned = None;
    }

    /// Point the weather lookup uses: the selection, else the map center
    fn focus_point(&self) -> Option<LatLon> {
        let selected = self.selected.and_then(|id| {
            self.controller
                .snapshot()
                .into_iter()
                .find(|(_, d)| d.id == id)
                .and_then(|(_, d)| d.anchor())
        });
        selected
            .or_else(|| self.controller.viewport().map(|b| b.center()))
            .map(|p| LatLon::new(p.lat, wrap_lon(p.lon)))
    }

    async fn send(&self, cmd: WorkerCommand) {
        let _ = self.cmd_tx.send(cmd).await;
    }

    /// Draw the TUI
    pub fn draw(&mut self, alert_history: &VecDeque<Alert>) -> Result<(), TuiError> {
        let drawables = self.controller.snapshot();
        let view = world_map::fit_view(self.controller.viewport());
        let entries: Vec<LegendEntry> = OverlayKind::ALL
            .into_iter()
            .map(|kind| LegendEntry {
                kind,
                visible: self.controller.is_visible(kind),
                count: self.controller.group_len(kind),
            })
            .collect();
        let status = self.state.status();
        let selected = self.selected;
        let panel = self.pinned.clone().or_else(|| {
            drawables
                .iter()
                .find(|(_, d)| Some(d.id) == selected)
                .and_then(|(_, d)| d.detail.clone())
        });

        self.terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: header, body, footer
            let main_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Min(10),   // Body
                    Constraint::Length(3), // Footer
                ])
                .split(area);

            render_header(frame, main_chunks[0], &status);

            // Body layout: left panel (30%) + world map (70%)
            let body_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(main_chunks[1]);

            let left_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(OverlayKind::COUNT as u16 + 2), // Legend
                    Constraint::Min(8),                                // Details
                    Constraint::Length(10),                            // Alerts
                ])
                .split(body_chunks[0]);

            legend::render(frame, left_chunks[0], &entries);
            detail::render(frame, left_chunks[1], panel.as_ref());
            alerts::render(frame, left_chunks[2], alert_history);
            world_map::render(frame, body_chunks[1], view, &drawables, selected);

            render_footer(frame, main_chunks[2]);
        })?;

        Ok(())
    }

    /// Handle keyboard input (non-blocking)
    pub async fn handle_input(&mut self) -> Result<bool, TuiError> {
        // Poll for events with a short timeout
        if !event::poll(Duration::from_millis(50))? {
            return Ok(false);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(false);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                info!("Quit requested");
                self.state.quit();
                self.send(WorkerCommand::Quit).await;
                return Ok(true); // Signal quit
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(kind) = OverlayKind::from_hotkey(c) {
                    let visible = self.controller.toggle(kind);
                    debug!(group = %kind, visible, "Toggled overlay");
                }
            }
            KeyCode::Char('s') => {
                for kind in OverlayKind::ALL {
                    self.controller.set_visible(kind, true);
                }
            }
            KeyCode::Tab => self.cycle_selection(true),
            KeyCode::BackTab => self.cycle_selection(false),
            KeyCode::Char('r') => {
                if let Some((origin, destination)) = self.route.clone() {
                    debug!("Recalculate route");
                    self.clear_selection();
                    self.send(WorkerCommand::CalculateRoute {
                        origin,
                        destination,
                    })
                    .await;
                } else if let Some((area, limit)) = self.tracking.clone() {
                    debug!("Reload vessels");
                    self.clear_selection();
                    self.send(WorkerCommand::LoadVessels { area, limit }).await;
                }
            }
            KeyCode::Char('c') => self.send(WorkerCommand::ShowChokepoints).await,
            KeyCode::Char('x') => self.send(WorkerCommand::DetectCollisions).await,
            KeyCode::Char('d') => self.send(WorkerCommand::DisastersInArea).await,
            KeyCode::Char('e') => self.send(WorkerCommand::ProtectedAreasInArea).await,
            KeyCode::Char('w') => {
                if let Some(at) = self.focus_point() {
                    self.send(WorkerCommand::Weather(at)).await;
                }
            }
            KeyCode::Char('a') => self.state.clear_alerts().await,
            _ => {}
        }

        Ok(false)
    }

    /// Run cleanup on drop
    pub fn cleanup(&mut self) {
        if let Err(e) = self.restore_terminal() {
            error!(error = %e, "Failed to restore terminal");
        }
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Render the header bar
fn render_header(frame: &mut Frame, area: Rect, status: &Status) {
    let color = match status {
        Status::Idle => Color::Gray,
        Status::Working(_) => Color::Yellow,
        Status::Route { .. } | Status::Tracking { .. } => Color::Green,
        Status::Error(_) => Color::Red,
    };

    let title = Line::from(vec![
        Span::styled(" seachart ", Style::default().bold().fg(Color::Cyan)),
        Span::raw("| "),
        Span::styled(status.status_text(), Style::default().fg(color)),
        Span::raw(" | "),
        Span::raw(status.detail()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(title).block(block).centered();
    frame.render_widget(paragraph, area);
}

/// Render the footer with controls
fn render_footer(frame: &mut Frame, area: Rect) {
    let keys = [
        ("q", "quit"),
        ("1-0", "layers"),
        ("s", "show all"),
        ("tab", "select"),
        ("r", "reload"),
        ("c", "chokepoints"),
        ("x", "collisions"),
        ("d", "disasters"),
        ("e", "eca/mpa"),
        ("w", "weather"),
        ("a", "clear alerts"),
    ];
    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Style::default().fg(Color::Yellow)),
                Span::raw(format!(":{action}  ")),
            ]
        })
        .collect();

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block).centered();
    frame.render_widget(paragraph, area);
}
