use ratatui::style::{Color, Modifier, Style};

use crate::api::models::Rockon;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    pub foreground: Color,
    pub error: Color,
    pub success: Color,
    pub warning: Color,
    pub border: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Yellow,
            secondary: Color::Cyan,
            background: Color::Reset,
            foreground: Color::White,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Magenta,
            border: Color::DarkGray,
            muted: Color::DarkGray,
        }
    }
}

impl Theme {
    pub fn style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn primary_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn secondary_style(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Highlight for the selected row or focused field
    pub fn selected_style(&self) -> Style {
        self.primary_style()
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }

    /// Wizard navigation button
    pub fn button_style(&self, enabled: bool) -> Style {
        if enabled {
            self.primary_style().add_modifier(Modifier::BOLD)
        } else {
            self.muted_style()
        }
    }

    /// Colour for the status column of an add-on
    pub fn rockon_style(&self, rockon: &Rockon) -> Style {
        if rockon.is_pending() {
            Style::default().fg(self.warning)
        } else if rockon.install_failed() {
            self.error_style()
        } else if rockon.is_started() {
            self.success_style()
        } else {
            self.muted_style()
        }
    }

    pub fn mode_style(&self, mode: &str) -> Style {
        let color = match mode {
            "NORMAL" => self.secondary,
            "INSERT" => self.success,
            "COMMAND" => self.primary,
            _ => self.foreground,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}
