//! Account Screen

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::centered;
use crate::theme::Palette;

/// Draw Account into `area`; `email` is `None` only mid sign-out
pub fn render(frame: &mut Frame, area: Rect, email: Option<&str>, palette: &Palette) {
    let content = centered(area, area.width, 4);
    let [signed_in, _, _, hint] = Layout::vertical([Constraint::Length(1); 4]).areas(content);

    let line = match email {
        Some(email) => Line::from(vec![
            Span::styled("Signed in as ", palette.base()),
            Span::styled(email.to_string(), palette.base().add_modifier(Modifier::BOLD)),
        ]),
        None => Line::from(Span::styled("Not signed in", palette.muted())),
    };
    frame.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .style(palette.base()),
        signed_in,
    );
    frame.render_widget(
        Paragraph::new("s sign out · ←/→ switch tabs · Esc quit")
            .alignment(Alignment::Center)
            .style(palette.muted()),
        hint,
    );
}
