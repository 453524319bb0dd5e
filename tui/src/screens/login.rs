//! Login Screen
//!
//! Email and password form. Both Log In and Register submit the same
//! fields; the identity client rejects empty ones before any network call.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::centered;
use crate::theme::TuiTheme;

/// Character shown for each password character
pub const MASK_CHAR: char = '•';

/// Form width in columns
const FORM_WIDTH: u16 = 44;

/// Which login input receives typed characters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Field {
    /// Email input (focused first)
    #[default]
    Email,
    /// Masked password input
    Password,
}

/// Login form state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    email: String,
    password: String,
    focus: Field,
}

impl LoginForm {
    /// Empty form, Email focused
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Email as typed
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Password as typed (never render this)
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Field receiving input
    #[must_use]
    pub fn focus(&self) -> Field {
        self.focus
    }

    /// Switch between Email and Password
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Field::Email => Field::Password,
            Field::Password => Field::Email,
        };
    }

    /// Type into the focused field
    pub fn push(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    /// Delete the last character of the focused field
    pub fn pop(&mut self) {
        self.focused_mut().pop();
    }

    /// Empty both fields and focus Email
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// One mask character per password character
    #[must_use]
    pub fn masked_password(&self) -> String {
        std::iter::repeat(MASK_CHAR)
            .take(self.password.chars().count())
            .collect()
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }
}

fn input<'a>(value: String, placeholder: &'a str, focused: bool, theme: &TuiTheme) -> Paragraph<'a> {
    let palette = &theme.login;
    let text = if value.is_empty() {
        Span::styled(placeholder, palette.muted())
    } else {
        Span::styled(value, palette.base())
    };
    let border = if focused {
        Style::default().fg(theme.accent()).bg(palette.background)
    } else {
        Style::default().fg(palette.border).bg(palette.background)
    };

    Paragraph::new(Line::from(text)).style(palette.base()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border),
    )
}

/// Render the login form
pub fn render(frame: &mut Frame, area: Rect, form: &LoginForm, theme: &TuiTheme) {
    let palette = &theme.login;
    let form_area = centered(area, FORM_WIDTH, 16);

    let [heading, subheading, _, email, password, _, button, _, account, register] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(form_area);

    frame.render_widget(
        Paragraph::new("Log In")
            .alignment(Alignment::Center)
            .style(palette.base().add_modifier(Modifier::BOLD)),
        heading,
    );
    frame.render_widget(
        Paragraph::new("Please enter your username and password")
            .alignment(Alignment::Center)
            .style(palette.base()),
        subheading,
    );

    frame.render_widget(
        input(form.email.clone(), "Email", form.focus == Field::Email, theme),
        email,
    );
    frame.render_widget(
        input(
            form.masked_password(),
            "Password",
            form.focus == Field::Password,
            theme,
        ),
        password,
    );

    frame.render_widget(
        Paragraph::new(" Log In ")
            .alignment(Alignment::Center)
            .style(palette.button()),
        centered(button, 12, 1),
    );

    frame.render_widget(
        Paragraph::new("Don't have an account? Enter credentials and click Register")
            .alignment(Alignment::Center)
            .wrap(ratatui::widgets::Wrap { trim: true })
            .style(palette.base()),
        account,
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Register", Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD)),
            Span::styled("  (Ctrl+R)", palette.muted()),
        ]))
        .alignment(Alignment::Center)
        .style(palette.base()),
        register,
    );
}
