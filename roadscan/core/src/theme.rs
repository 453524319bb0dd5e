//! Theme Resolution
//!
//! Maps the binary display-mode flag to the handful of color tokens every
//! screen draws with. No state, no side effects: surfaces call
//! [`Theme::resolve`] whenever they render.
//!
//! # Palette
//!
//! | Token        | Dark      | Light     |
//! |--------------|-----------|-----------|
//! | background   | `#000000` | `#F5F5F5` |
//! | text         | `#F5F5F5` | `#000000` |
//! | button       | `#FF4081` | `#FF4081` |
//! | border       | `#333333` | `#333333` |
//! | muted        | `#A9A9A9` | `#A9A9A9` |
//!
//! The login form uses a softer text color and a neutral button in light
//! mode, see [`Theme::login`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Palette
// ============================================================================

/// Near-black page background (dark mode)
pub const BLACK: HexColor = HexColor::rgb(0x00, 0x00, 0x00);

/// Off-white page background (light mode) and text (dark mode)
pub const OFF_WHITE: HexColor = HexColor::rgb(0xF5, 0xF5, 0xF5);

/// Accent pink for primary actions
pub const ACCENT_PINK: HexColor = HexColor::rgb(0xFF, 0x40, 0x81);

/// Charcoal for borders and the light-mode login text
pub const CHARCOAL: HexColor = HexColor::rgb(0x33, 0x33, 0x33);

/// Placeholder / secondary text
pub const MUTED_GRAY: HexColor = HexColor::rgb(0xA9, 0xA9, 0xA9);

/// Tab bar and header background
pub const CHROME: HexColor = HexColor::rgb(0x1E, 0x1E, 0x1E);

// ============================================================================
// Types
// ============================================================================

/// An sRGB color parsed from `#RGB` or `#RRGGBB`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl HexColor {
    /// Build a color from channels
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Error returned when a hex color string is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color: {0:?}")]
pub struct ParseColorError(pub String);

impl FromStr for HexColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(err)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        match digits.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(digits.chars()) {
                    let v = u8::from_str_radix(&c.to_string(), 16).map_err(|_| err())?;
                    *slot = v * 17;
                }
                Ok(Self::rgb(channels[0], channels[1], channels[2]))
            }
            6 => {
                let channel =
                    |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
                Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => Err(err()),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// The binary display-mode flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Light background, dark text
    Light,
    /// Dark background, light text
    Dark,
}

impl ColorScheme {
    /// Whether this is the dark scheme
    #[must_use]
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Configured theme preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Always light
    Light,
    /// Always dark
    Dark,
    /// Follow the operating system
    #[default]
    System,
}

impl ThemeMode {
    /// Resolve the preference to a concrete scheme.
    ///
    /// `System` asks the OS and falls back to dark when detection fails.
    #[must_use]
    pub fn scheme(self) -> ColorScheme {
        match self {
            Self::Light => ColorScheme::Light,
            Self::Dark => ColorScheme::Dark,
            Self::System => match dark_light::detect() {
                Ok(dark_light::Mode::Light) => ColorScheme::Light,
                _ => ColorScheme::Dark,
            },
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" | "auto" => Ok(Self::System),
            other => Err(format!("unknown theme {other:?} (expected light, dark or system)")),
        }
    }
}

/// Resolved color tokens for one screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeColors {
    /// Page background
    pub background: HexColor,
    /// Primary text
    pub text: HexColor,
    /// Primary action background
    pub button: HexColor,
    /// Input borders
    pub border: HexColor,
    /// Placeholders and secondary text
    pub muted: HexColor,
    /// Tab bar and header background
    pub chrome: HexColor,
}

/// Stateless theme lookup
pub struct Theme;

impl Theme {
    /// Color tokens shared by the Home, Account and Detect screens
    #[must_use]
    pub fn resolve(scheme: ColorScheme) -> ThemeColors {
        let (background, text) = if scheme.is_dark() {
            (BLACK, OFF_WHITE)
        } else {
            (OFF_WHITE, BLACK)
        };

        ThemeColors {
            background,
            text,
            button: ACCENT_PINK,
            border: CHARCOAL,
            muted: MUTED_GRAY,
            chrome: CHROME,
        }
    }

    /// Login form tokens (softer light-mode text, neutral button)
    #[must_use]
    pub fn login(scheme: ColorScheme) -> ThemeColors {
        let base = Self::resolve(scheme);
        ThemeColors {
            text: if scheme.is_dark() { OFF_WHITE } else { CHARCOAL },
            button: CHARCOAL,
            ..base
        }
    }
}
