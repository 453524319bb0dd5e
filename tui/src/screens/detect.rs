//! Detect Screen
//!
//! Live view of the capture loop: where frames come from, whether the
//! camera is ready, and the latest classification.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use roadscan_core::{DetectSnapshot, LoopPhase};

use crate::theme::Palette;

fn status_line(snapshot: &DetectSnapshot, palette: &Palette) -> Line<'static> {
    let (text, style) = match (snapshot.phase, snapshot.camera_ready) {
        (LoopPhase::Stopped, _) => ("Stopped", palette.muted()),
        (_, false) => ("Waiting for camera", palette.muted()),
        (LoopPhase::Capturing, true) => ("Classifying", palette.base()),
        (LoopPhase::Idle, true) => ("Camera ready", palette.base()),
    };
    Line::from(Span::styled(text, style))
}

/// Draw the Detect screen for `snapshot`
pub fn render(frame: &mut Frame, area: Rect, snapshot: &DetectSnapshot, palette: &Palette) {
    let [preview, label, confidence, error, stats] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let preview_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border).bg(palette.background))
        .title(Span::styled(snapshot.source.clone(), palette.muted()));
    frame.render_widget(
        Paragraph::new(status_line(snapshot, palette))
            .alignment(Alignment::Center)
            .style(palette.base())
            .block(preview_block),
        preview,
    );

    let label_text = snapshot
        .last_result
        .as_ref()
        .map_or(String::new(), |r| r.label.clone());
    frame.render_widget(
        Paragraph::new(label_text)
            .alignment(Alignment::Center)
            .style(palette.base()),
        label,
    );

    frame.render_widget(
        Paragraph::new(snapshot.confidence_text().unwrap_or_default())
            .alignment(Alignment::Center)
            .style(palette.base().add_modifier(Modifier::BOLD)),
        confidence,
    );

    if let Some(message) = &snapshot.last_error {
        frame.render_widget(
            Paragraph::new(message.clone())
                .alignment(Alignment::Center)
                .style(palette.muted()),
            error,
        );
    }

    let s = &snapshot.stats;
    frame.render_widget(
        Paragraph::new(format!(
            "frames {} · ok {} · failed {} · busy {} · Esc back",
            s.attempts, s.successes, s.failures, s.skipped_busy
        ))
        .alignment(Alignment::Center)
        .style(palette.muted()),
        stats,
    );
}
