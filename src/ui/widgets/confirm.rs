use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::manager::ConfirmAction;
use crate::ui::{Layout, Theme};

pub fn draw_confirm_dialog(frame: &mut Frame, area: Rect, action: &ConfirmAction, theme: &Theme) {
    let title = match action {
        ConfirmAction::Uninstall { .. } => "Uninstall",
    };

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(action.prompt(), theme.style().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", theme.success_style().add_modifier(Modifier::BOLD)),
            Span::raw(" - Yes    "),
            Span::styled("n", theme.error_style().add_modifier(Modifier::BOLD)),
            Span::raw(" - No"),
        ]),
    ];

    // Wide enough for the prompt on one line, borders and padding included
    let prompt_width = action.prompt().chars().count() as u16 + 6;
    let width = prompt_width.max(40).min(area.width.saturating_sub(4));
    let dialog_area = Layout::centered_box(area, width, 7);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.primary_style())
        .title(format!(" {title} "))
        .title_style(theme.primary_style().add_modifier(Modifier::BOLD));

    frame.render_widget(Clear, dialog_area);
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        dialog_area,
    );
}
