use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ui::{Layout, Theme};

pub fn draw_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Rock-on list", heading)),
        Line::from("  j/k      Move selection"),
        Line::from("  Tab h/l  Switch between Installed and All available"),
        Line::from("  Enter    Install (available) / settings (installed)"),
        Line::from("  Space    Start or stop the selected Rock-on"),
        Line::from("  u        Uninstall (stopped Rock-ons only)"),
        Line::from("  m        More information"),
        Line::from("  r        Refresh"),
        Line::from(""),
        Line::from(Span::styled("Wizard", heading)),
        Line::from("  j/k      Move between fields"),
        Line::from("  i        Edit the focused text field"),
        Line::from("  Space    Toggle or pick the next choice"),
        Line::from("  n / p    Next / previous page"),
        Line::from("  a / e    Add labels / edit ports (settings)"),
        Line::from("  + / -    Add / remove a label field"),
        Line::from("  Esc      Normal mode, then cancel"),
        Line::from(""),
        Line::from(Span::styled("Commands", heading)),
        Line::from("  :install :uninstall :settings :info"),
        Line::from("  :start :stop :update :refresh"),
        Line::from("  :tab [installed|available] :help :q"),
        Line::from(""),
        Line::from(Span::styled("Press Escape to close", theme.muted_style())),
    ];

    let height = help_text.len() as u16 + 2;
    let width = 60u16.min(area.width.saturating_sub(4));
    let help_area = Layout::centered_box(area, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Help ")
        .title_style(theme.primary_style());

    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}
