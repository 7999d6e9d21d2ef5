use chrono::Local;
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

use crate::manager::ManagerApp;

pub fn draw_header(frame: &mut Frame, area: Rect, app: &ManagerApp) {
    frame.render_widget(Clear, area);
    let theme = &app.theme;

    // Left side: title and appliance host
    let mut left = vec![
        Span::raw(" "),
        Span::styled(
            app.config.general.title.as_str(),
            theme.primary_style().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" @ {}", app.host), theme.muted_style()),
    ];
    if app.is_dryrun() {
        left.push(Span::styled(" [DRYRUN]", theme.error_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(left)), area);

    // Right side: docker service status and time
    let (docker, docker_style) = match app.docker_running {
        Some(true) => ("[Docker: OK]", theme.secondary_style()),
        Some(false) => ("[Docker: off]", theme.error_style()),
        None => ("[Docker: --]", theme.muted_style()),
    };
    let mut right = vec![Span::styled(docker, docker_style)];
    if app.is_polling() {
        right.push(Span::styled(format!(" {}", app.spinner_char()), theme.muted_style()));
    }
    right.push(Span::raw("  "));
    right.push(Span::styled(
        Local::now().format("%H:%M").to_string(),
        theme.primary_style().add_modifier(Modifier::BOLD),
    ));
    right.push(Span::raw(" "));
    frame.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        area,
    );
}
