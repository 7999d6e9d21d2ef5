use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::manager::ManagerApp;

pub fn draw_message_panel(frame: &mut Frame, area: Rect, app: &ManagerApp) {
    let theme = &app.theme;
    let (text, is_error, dismissable) = match (&app.message, &app.busy) {
        (Some(m), _) => (m.text.clone(), m.is_error, app.busy.is_none()),
        (None, Some(label)) => (format!("{} {label}...", app.spinner_char()), false, false),
        (None, None) => return,
    };

    let (title, border_style, text_style) = if is_error {
        (" Error ", theme.error_style(), theme.error_style())
    } else {
        (" Info ", theme.secondary_style(), theme.style())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_style(border_style.add_modifier(Modifier::BOLD));

    let mut spans = vec![Span::styled(text, text_style)];
    if dismissable {
        spans.push(Span::styled(" (press any key to dismiss)", theme.muted_style()));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
