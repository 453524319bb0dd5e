//! Screens
//!
//! One module per screen plus the chrome they share: header, tab bar and
//! the toast overlay. Every renderer is a pure function of its inputs.

pub mod account;
pub mod detect;
pub mod home;
pub mod login;

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};
use ratatui::Frame;

use roadscan_core::{Screen, Tab};

use crate::theme::Palette;

/// Header height (title row plus padding)
pub const HEADER_HEIGHT: u16 = 1;

/// Tab bar height
pub const TAB_BAR_HEIGHT: u16 = 1;

/// Rectangle of at most `width` x `height`, centered in `area`
#[must_use]
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Header bar: screen title, plus a back hint on pushed screens
pub fn render_header(frame: &mut Frame, area: Rect, screen: Screen, palette: &Palette) {
    let mut spans = Vec::new();
    if screen.tab().is_none() {
        spans.push(Span::styled("← ", palette.chrome()));
    }
    spans.push(Span::styled(
        screen.title(),
        palette.chrome().add_modifier(Modifier::BOLD),
    ));

    let header = Paragraph::new(Line::from(spans)).style(palette.chrome());
    frame.render_widget(header, area);
}

/// Bottom tab bar with the active tab highlighted
pub fn render_tabs(frame: &mut Frame, area: Rect, active: Tab, palette: &Palette) {
    let selected = Tab::ALL.iter().position(|t| *t == active).unwrap_or(0);
    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.label()))
        .select(selected)
        .style(palette.chrome().fg(palette.muted))
        .highlight_style(
            Style::default()
                .fg(palette.button)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}

/// Toast overlay near the bottom of the screen
pub fn render_toast(frame: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let width = u16::try_from(message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(4);
    let bottom = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(5),
        area.width,
        area.height.min(3),
    );
    let popup = centered(bottom, width, 3);

    frame.render_widget(Clear, popup);
    let toast = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.text).bg(palette.chrome))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted).bg(palette.chrome)),
        );
    frame.render_widget(toast, popup);
}
