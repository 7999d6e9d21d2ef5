use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::api::models::Rockon;
use crate::manager::{ManagerApp, Tab};
use crate::ui::Theme;

pub fn draw_tabs(frame: &mut Frame, area: Rect, app: &ManagerApp) {
    let mut spans = vec![Span::raw(" ")];
    for tab in [Tab::Installed, Tab::Available] {
        let count = app.rockons.iter().filter(|r| tab.contains(r)).count();
        let label = format!(" {} ({count}) ", tab.title());
        let style = if tab == app.tab {
            app.theme.selected_style()
        } else {
            app.theme.muted_style()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_rockon_list(frame: &mut Frame, area: Rect, app: &ManagerApp) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(format!(" {} ", app.config.general.title))
        .title_style(theme.primary_style());

    let visible = app.visible_rockons();
    if visible.is_empty() {
        let text = if app.loaded {
            app.tab.empty_text().to_string()
        } else {
            format!("{} Loading Rock-ons...", app.spinner_char())
        };
        frame.render_widget(
            Paragraph::new(format!(" {text}"))
                .style(theme.muted_style())
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, rockon)| rockon_item(rockon, i == app.selected, &app.host, theme))
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn rockon_item<'a>(rockon: &Rockon, selected: bool, host: &str, theme: &Theme) -> ListItem<'a> {
    let marker = if selected { ">" } else { " " };
    let name_style = if selected {
        theme.primary_style().add_modifier(Modifier::BOLD)
    } else {
        theme.style().add_modifier(Modifier::BOLD)
    };

    let status = rockon
        .pending_label()
        .map(str::to_string)
        .unwrap_or_else(|| match rockon.state.as_str() {
            "installed" => rockon.status.clone(),
            "install_failed" => "install failed".to_string(),
            _ => "available".to_string(),
        });

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{marker} "), theme.primary_style()),
        Span::styled(format!("{:<28}", rockon.name), name_style),
        Span::styled(format!("[{status}]"), theme.rockon_style(rockon)),
    ])];

    if !rockon.description.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("    {}", rockon.description),
            theme.muted_style(),
        )));
    }

    if let Some(hint) = link_hint(rockon, host) {
        lines.push(Line::from(Span::styled(format!("    {hint}"), theme.secondary_style())));
    }

    if rockon.install_failed() {
        for hint in FAILED_HINTS {
            lines.push(Line::from(Span::styled(format!("    {hint}"), theme.error_style())));
        }
    }

    ListItem::new(lines)
}

const FAILED_HINTS: [&str; 2] = [
    "Failed to install in the previous attempt. Check the appliance logs for clues,",
    "then install again. If the problem persists, ask for help on the forum.",
];

/// UI line for an installed add-on: the link when it can be opened, otherwise
/// why it cannot
pub fn link_hint(rockon: &Rockon, host: &str) -> Option<String> {
    if !rockon.is_installed() || rockon.is_pending() {
        return None;
    }
    let link = rockon.ui_link(host)?;
    let text = if !rockon.is_started() {
        "UI: switch on to access the UI.".to_string()
    } else if !rockon.ui_publish {
        "UI: disabled due to current ports settings. See Rock-on settings.".to_string()
    } else {
        format!("UI: {link}")
    };
    Some(text)
}
