use std::collections::VecDeque;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::controller::{Alert, AlertLevel};

fn level_color(level: AlertLevel) -> Color {
    match level {
        AlertLevel::Info => Color::Cyan,
        AlertLevel::Success => Color::Green,
        AlertLevel::Warning => Color::Yellow,
        AlertLevel::Danger => Color::Red,
    }
}

/// Render recent alerts, newest first
pub fn render(frame: &mut Frame, area: Rect, alerts: &VecDeque<Alert>) {
    let block = Block::default()
        .title(format!(" Alerts ({}) ", alerts.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let lines: Vec<Line> = if alerts.is_empty() {
        vec![Line::from(Span::styled(
            "No alerts",
            Style::default().fg(Color::DarkGray).italic(),
        ))]
    } else {
        alerts
            .iter()
            .rev()
            .map(|alert| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", alert.title),
                        Style::default().bold().fg(level_color(alert.level)),
                    ),
                    Span::styled(alert.message.clone(), Style::default().fg(Color::Gray)),
                ])
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
