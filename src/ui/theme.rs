//! Marquee theme for cinetui
//!
//! Dark auditorium background, warm gold for ratings and focus, soft red for
//! the not-found panel.

use ratatui::style::{Color, Modifier, Style};

/// Color palette and style helpers
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // CORE PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Background: #101014 (auditorium black)
    pub const BACKGROUND: Color = Color::Rgb(0x10, 0x10, 0x14);

    /// Primary: #f5c518 (marquee gold)
    pub const PRIMARY: Color = Color::Rgb(0xf5, 0xc5, 0x18);

    /// Secondary: #8ab4f8 (projector blue)
    pub const SECONDARY: Color = Color::Rgb(0x8a, 0xb4, 0xf8);

    /// Text: #e8e6e3 (screen white)
    pub const TEXT: Color = Color::Rgb(0xe8, 0xe6, 0xe3);

    /// Dim: #6b6b78 (aisle grey)
    pub const DIM: Color = Color::Rgb(0x6b, 0x6b, 0x78);

    /// Member: #4cd97b (on a list)
    pub const MEMBER: Color = Color::Rgb(0x4c, 0xd9, 0x7b);

    /// Error: #ff5c5c (exit sign red)
    pub const ERROR: Color = Color::Rgb(0xff, 0x5c, 0x5c);

    /// Panel background for popups
    pub const PANEL: Color = Color::Rgb(0x1c, 0x1c, 0x24);

    /// Unfocused border
    pub const BORDER: Color = Color::Rgb(0x3a, 0x3a, 0x48);

    // ═══════════════════════════════════════════════════════════════════════
    // STYLE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Title/header style
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Taglines and secondary metadata
    pub fn secondary() -> Style {
        Style::default()
            .fg(Self::SECONDARY)
            .add_modifier(Modifier::ITALIC)
    }

    /// Star rating
    pub fn rating() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    /// List action button, on or off
    pub fn action(active: bool) -> Style {
        if active {
            Style::default()
                .fg(Self::MEMBER)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Self::TEXT)
        }
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn border_focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected entry in a focused list
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Hyperlink-like text
    pub fn link() -> Style {
        Style::default()
            .fg(Self::SECONDARY)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn popup() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::PANEL)
    }

    pub fn input() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::PANEL)
    }

    pub fn keybind() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    pub fn keybind_desc() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn loading() -> Style {
        Style::default()
            .fg(Self::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }
}
