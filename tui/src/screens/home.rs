//! Home Screen

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::centered;
use crate::theme::Palette;

/// Greeting line
pub const TITLE: &str = "Welcome to My App";
/// Line under the greeting
pub const SUBTITLE: &str = "Find and report potholes in your area";
/// Label of the button that opens Detect
pub const DETECT_BUTTON: &str = "Detect Potholes";

/// Draw Home into `area`
pub fn render(frame: &mut Frame, area: Rect, palette: &Palette) {
    let content = centered(area, area.width, 7);
    let [title, _, subtitle, _, _, button, hint] = Layout::vertical([Constraint::Length(1); 7])
        .areas(content);

    frame.render_widget(
        Paragraph::new(TITLE)
            .alignment(Alignment::Center)
            .style(palette.base().add_modifier(Modifier::BOLD)),
        title,
    );
    frame.render_widget(
        Paragraph::new(SUBTITLE)
            .alignment(Alignment::Center)
            .style(palette.base()),
        subtitle,
    );
    frame.render_widget(
        Paragraph::new(DETECT_BUTTON)
            .alignment(Alignment::Center)
            .style(palette.button()),
        centered(button, 21, 1),
    );
    frame.render_widget(
        Paragraph::new("Enter to start · ←/→ switch tabs · Esc quit")
            .alignment(Alignment::Center)
            .style(palette.muted()),
        hint,
    );
}
