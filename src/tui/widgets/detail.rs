use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::overlay::DetailPanel;

/// Render the detail panel of the selected drawable
pub fn render(frame: &mut Frame, area: Rect, panel: Option<&DetailPanel>) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let Some(panel) = panel else {
        let hint = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Tab to select a map object",
                Style::default().fg(Color::DarkGray).italic(),
            )),
        ];
        frame.render_widget(Paragraph::new(hint).block(block), area);
        return;
    };

    let mut lines = vec![Line::from(Span::styled(
        panel.title.clone(),
        Style::default().bold().fg(Color::White),
    ))];
    if let Some(subtitle) = &panel.subtitle {
        lines.push(Line::from(Span::styled(
            subtitle.clone(),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::from(""));

    let width = panel
        .rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0);
    for row in &panel.rows {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$}  ", row.label),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(row.value.clone(), Style::default().fg(Color::White)),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
