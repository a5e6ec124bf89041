use tui::style::{Color, Modifier, Style};

use crate::models::Theme;

/// Colors used by every screen for one theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub focus: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub error: Color,
    pub success: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Rgb(30, 30, 30),
                text: Color::Rgb(220, 220, 220),
                muted: Color::Rgb(150, 150, 150),
                accent: Color::Cyan,
                focus: Color::Yellow,
                highlight_bg: Color::Rgb(70, 70, 100),
                highlight_fg: Color::White,
                error: Color::LightRed,
                success: Color::LightGreen,
            },
            Theme::Light => Self {
                background: Color::Rgb(245, 245, 245),
                text: Color::Black,
                muted: Color::Rgb(100, 100, 100),
                accent: Color::Rgb(52, 56, 118),
                focus: Color::Rgb(232, 62, 140),
                highlight_bg: Color::Rgb(173, 216, 230),
                highlight_fg: Color::Black,
                error: Color::Red,
                success: Color::Green,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.text)
    }

    pub fn focused(&self) -> Style {
        self.base().fg(self.focus)
    }

    pub fn title(&self) -> Style {
        self.base().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .fg(self.highlight_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        self.base().fg(self.muted)
    }
}
