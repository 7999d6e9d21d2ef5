use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::manager::ManagerApp;
use crate::vim::VimMode;

pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &ManagerApp) {
    let theme = &app.theme;
    let mode_name = app.vim_mode.display_name();

    let mut left_spans = vec![
        Span::raw(" "),
        Span::styled(format!(" {mode_name} "), theme.mode_style(mode_name)),
        Span::raw(" "),
    ];

    // Command buffer in command mode, otherwise the left hint
    if app.vim_mode == VimMode::Command {
        left_spans.push(Span::styled(":", theme.primary_style()));
        left_spans.push(Span::raw(app.command_buffer.content().to_string()));
        left_spans.push(Span::styled("│", theme.primary_style()));
    } else {
        left_spans.push(Span::styled(app.status_bar.left_hint.as_str(), theme.muted_style()));
    }

    frame.render_widget(
        Paragraph::new(Line::from(left_spans)).style(theme.style()),
        area,
    );

    let right = Line::from(Span::styled(
        format!("{} ", app.status_bar.right_hint),
        theme.muted_style(),
    ));
    let right_width = right.width() as u16;
    if area.width > right_width {
        let right_area = Rect {
            x: area.x + area.width - right_width,
            y: area.y,
            width: right_width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), right_area);
    }
}
