//! Theme and Colors
//!
//! Terminal palettes built from the core theme resolver, so the TUI and the
//! core agree on every hex value.

use ratatui::style::{Color, Modifier, Style};

use roadscan_core::{ColorScheme, HexColor, Theme, ThemeColors};

/// Convert a core color to a terminal color
#[must_use]
pub const fn color(hex: HexColor) -> Color {
    Color::Rgb(hex.r, hex.g, hex.b)
}

/// One screen's colors, ready for ratatui
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Screen fill
    pub background: Color,
    /// Body text
    pub text: Color,
    /// Button fill, also the link accent
    pub button: Color,
    /// Frames around inputs and the camera preview
    pub border: Color,
    /// Hints, status lines and other secondary text
    pub muted: Color,
    /// Header and tab bar
    pub chrome: Color,
}

impl Palette {
    /// Convert resolved hex colors to terminal colors
    #[must_use]
    pub fn from_colors(colors: ThemeColors) -> Self {
        Self {
            background: color(colors.background),
            text: color(colors.text),
            button: color(colors.button),
            border: color(colors.border),
            muted: color(colors.muted),
            chrome: color(colors.chrome),
        }
    }

    /// Plain text on the screen background
    #[must_use]
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    /// Placeholder and hint text
    #[must_use]
    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted).bg(self.background)
    }

    /// Filled button
    #[must_use]
    pub fn button(&self) -> Style {
        Style::default()
            .fg(self.text)
            .bg(self.button)
            .add_modifier(Modifier::BOLD)
    }

    /// Header and tab bar
    #[must_use]
    pub fn chrome(&self) -> Style {
        Style::default().fg(self.text).bg(self.chrome)
    }
}

/// Palettes for every screen under one color scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuiTheme {
    /// Scheme the palettes were resolved for
    pub scheme: ColorScheme,
    /// Home, Account, Detect
    pub app: Palette,
    /// Login keeps its own text and button colors
    pub login: Palette,
}

impl TuiTheme {
    /// Resolve both palettes for `scheme`
    #[must_use]
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            app: Palette::from_colors(Theme::resolve(scheme)),
            login: Palette::from_colors(Theme::login(scheme)),
        }
    }

    /// Accent for the Register link (same pink in both schemes)
    #[must_use]
    pub fn accent(&self) -> Color {
        self.app.button
    }
}
