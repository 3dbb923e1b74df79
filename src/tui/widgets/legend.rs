use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::overlay::{OverlayKind, Rgb};

/// One legend row
#[derive(Debug, Clone, Copy)]
pub struct LegendEntry {
    pub kind: OverlayKind,
    pub visible: bool,
    pub count: usize,
}

/// Swatch color of a group
fn swatch(kind: OverlayKind) -> Rgb {
    match kind {
        OverlayKind::Route => Rgb::ROUTE,
        OverlayKind::Ports => Rgb::ORIGIN,
        OverlayKind::Disasters => Rgb::ALERT_ORANGE,
        OverlayKind::Ships | OverlayKind::ChokepointShips => Rgb::SHIP,
        OverlayKind::PortShips => Rgb::CONGESTED,
        OverlayKind::Chokepoints => Rgb::CHOKEPOINT,
        OverlayKind::Collisions => Rgb::COLLISION,
        OverlayKind::ProtectedAreas => Rgb::ECA,
        OverlayKind::Piracy => Rgb::PIRACY,
    }
}

/// Render the overlay legend with toggle hotkeys
pub fn render(frame: &mut Frame, area: Rect, entries: &[LegendEntry]) {
    let block = Block::default()
        .title(" Layers ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            let Rgb(r, g, b) = swatch(entry.kind);
            let (mark, label_style) = if entry.visible {
                ("●", Style::default().fg(Color::White))
            } else {
                ("○", Style::default().fg(Color::DarkGray))
            };
            Line::from(vec![
                Span::styled(
                    format!("{} ", entry.kind.hotkey()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(format!("{mark} "), Style::default().fg(Color::Rgb(r, g, b))),
                Span::styled(entry.kind.label(), label_style),
                Span::styled(format!(" ({})", entry.count), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
