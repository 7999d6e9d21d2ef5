use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::summary::{completion_text, install_summary, settings_summary, Section};
use crate::manager::ManagerApp;
use crate::ui::{Layout, Theme};
use crate::vim::VimMode;
use crate::wizard::{FieldKind, FormField, StepKind, Wizard, WizardKind, WizardPhase};

const LABEL_WIDTH: u16 = 26;

pub fn draw_wizard(frame: &mut Frame, area: Rect, app: &ManagerApp, wizard: &Wizard) {
    let theme = &app.theme;
    let overlay = Layout::overlay(area);

    let title = match wizard.kind {
        WizardKind::Install => format!(" Install {} ", wizard.session.rockon.name),
        WizardKind::Settings => format!(" {} settings ", wizard.session.rockon.name),
        WizardKind::Info => format!(" About {} ", wizard.session.rockon.name),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.primary_style())
        .title(title)
        .title_style(theme.primary_style().add_modifier(Modifier::BOLD));

    let inner = block.inner(overlay);
    frame.render_widget(Clear, overlay);
    frame.render_widget(block, overlay);

    if inner.height < 4 {
        return;
    }

    let chunks = ratatui::layout::Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Step indicator
            Constraint::Min(1),    // Page body
            Constraint::Length(1), // Buttons
        ])
        .split(inner);

    if wizard.phase() == WizardPhase::Loading {
        let text = format!(" {} Loading Rock-on details...", app.spinner_char());
        frame.render_widget(Paragraph::new(text).style(theme.muted_style()), chunks[1]);
        return;
    }

    let Some(step) = wizard.current_step() else {
        return;
    };

    let indicator = Line::from(vec![
        Span::styled(
            format!(" Step {} of {}: ", wizard.index() + 1, wizard.steps().len()),
            theme.muted_style(),
        ),
        Span::styled(step.title(), theme.secondary_style().add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(indicator), chunks[0]);

    if step.has_form() {
        draw_form(frame, chunks[1], app, wizard);
    } else {
        draw_page(frame, chunks[1], theme, wizard, step);
    }

    draw_buttons(frame, chunks[2], app, wizard);
}

fn draw_form(frame: &mut Frame, area: Rect, app: &ManagerApp, wizard: &Wizard) {
    let theme = &app.theme;
    let form = &wizard.form;

    if form.is_empty() {
        frame.render_widget(
            Paragraph::new(" Nothing to configure on this page.").style(theme.muted_style()),
            area,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut focused_line = 0;
    for (idx, field) in form.fields.iter().enumerate() {
        let focused = idx == form.focused;
        let inserting = focused && app.vim_mode == VimMode::Insert;
        if focused {
            focused_line = lines.len();
        }

        let label_style = if focused {
            theme.primary_style().add_modifier(Modifier::BOLD)
        } else {
            theme.style()
        };
        let mut spans = vec![
            Span::styled(if focused { " > " } else { "   " }, theme.primary_style()),
            Span::styled(
                format!("{:<width$}", field.label, width = LABEL_WIDTH as usize),
                label_style,
            ),
        ];
        spans.extend(field_spans(field, focused, inserting, theme));
        lines.push(Line::from(spans));

        if let Some(options) = network_options(field) {
            lines.push(Line::from(Span::styled(
                format!("{:pad$}available: {options}", "", pad = LABEL_WIDTH as usize + 3),
                theme.muted_style(),
            )));
        }
        if let Some(error) = form.error_for(idx) {
            lines.push(Line::from(Span::styled(
                format!("{:pad$}{error}", "", pad = LABEL_WIDTH as usize + 3),
                theme.error_style(),
            )));
        } else if let (true, Some(help)) = (focused, field.help.as_deref()) {
            lines.push(Line::from(Span::styled(
                format!("{:pad$}{help}", "", pad = LABEL_WIDTH as usize + 3),
                theme.muted_style(),
            )));
        }
    }

    // Keep the focused field on screen for long forms
    let scroll = focused_line.saturating_sub(area.height.saturating_sub(2) as usize) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
}

fn network_options(field: &FormField) -> Option<String> {
    match &field.kind {
        FieldKind::Networks(options) if !options.is_empty() => Some(options.join(", ")),
        _ => None,
    }
}

fn field_spans<'a>(field: &FormField, focused: bool, inserting: bool, theme: &Theme) -> Vec<Span<'a>> {
    let display = field.display();

    if inserting {
        // Insert mode: cursor drawn as a bar
        let cursor = field.input.cursor();
        let before: String = display.chars().take(cursor).collect();
        let after: String = display.chars().skip(cursor).collect();
        return vec![
            Span::styled(before, theme.style()),
            Span::styled("|", theme.primary_style().add_modifier(Modifier::BOLD)),
            Span::styled(after, theme.style()),
        ];
    }

    let style = match (&field.kind, focused) {
        (FieldKind::Choice(_) | FieldKind::Toggle, true) => theme.selected_style(),
        (_, true) => theme.primary_style(),
        _ => theme.muted_style(),
    };
    if display.is_empty() && field.is_typed() {
        let placeholder = if focused { "(press i to edit)" } else { "" };
        return vec![Span::styled(placeholder, theme.muted_style())];
    }
    vec![Span::styled(display, style)]
}

fn draw_page(frame: &mut Frame, area: Rect, theme: &Theme, wizard: &Wizard, step: StepKind) {
    let session = &wizard.session;
    let lines = match step {
        StepKind::Summary => {
            let (intro, sections) = match wizard.kind {
                WizardKind::Install => (
                    "Review the choices below, then submit to install.",
                    install_summary(session),
                ),
                _ => (
                    "Current settings. Turn the Rock-on off before changing them.",
                    settings_summary(session),
                ),
            };
            let mut lines = vec![Line::from(Span::styled(format!(" {intro}"), theme.muted_style()))];
            lines.extend(section_lines(&sections, theme));
            lines
        }
        StepKind::Complete => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(" {}", completion_text(session, wizard.kind == WizardKind::Install)),
                theme.success_style(),
            )),
        ],
        StepKind::InfoSummary => {
            let mut lines = vec![Line::from(Span::styled(
                format!(" {}", session.rockon.description),
                theme.style(),
            ))];
            if let Some(website) = session.rockon.website.as_deref() {
                lines.push(Line::from(Span::styled(format!(" {website}"), theme.secondary_style())));
            }
            lines.push(Line::from(""));
            for text in session.rockon.more_info.as_deref().unwrap_or_default().lines() {
                lines.push(Line::from(format!(" {text}")));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(" Press Esc to close", theme.muted_style())));
            lines
        }
        _ => Vec::new(),
    };

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn section_lines<'a>(sections: &[Section], theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for section in sections {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", section.title),
            theme.secondary_style().add_modifier(Modifier::BOLD),
        )));
        for (left, right) in &section.rows {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("   {:<width$}", left, width = LABEL_WIDTH as usize),
                    theme.style(),
                ),
                Span::styled(right.clone(), theme.muted_style()),
            ]));
        }
    }
    lines
}

fn draw_buttons(frame: &mut Frame, area: Rect, app: &ManagerApp, wizard: &Wizard) {
    let theme = &app.theme;

    if wizard.phase() == WizardPhase::Saving {
        let text = format!(" {} Submitting...", app.spinner_char());
        frame.render_widget(Paragraph::new(text).style(theme.muted_style()), area);
        return;
    }

    let buttons = wizard.buttons();
    let mut left = vec![Span::raw(" ")];
    if buttons.add_label {
        left.push(Span::styled("[a] Add label", theme.button_style(true)));
        left.push(Span::raw("  "));
    }
    if buttons.edit_ports {
        let enabled = !wizard.session.rockon.host_network;
        left.push(Span::styled("[e] Edit ports", theme.button_style(enabled)));
    }
    frame.render_widget(Paragraph::new(Line::from(left)), area);

    let mut right = Vec::new();
    if buttons.prev {
        right.push(Span::styled("[p] Previous", theme.button_style(true)));
        right.push(Span::raw("  "));
    }
    if let Some(next) = buttons.next {
        right.push(Span::styled(format!("[n] {next}"), theme.button_style(true)));
    }
    right.push(Span::raw(" "));
    frame.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        area,
    );
}
