mod layout;
mod theme;
pub mod widgets;

pub use layout::Layout;
pub use theme::Theme;

use crate::manager::ManagerApp;
use ratatui::Frame;

/// Render the whole screen from the current application state
pub fn draw(frame: &mut Frame, app: &ManagerApp) {
    let layout = Layout::new(frame.area());

    widgets::draw_background(frame, layout.full, &app.theme);
    widgets::draw_header(frame, layout.header, app);
    widgets::draw_tabs(frame, layout.tabs, app);
    widgets::draw_rockon_list(frame, layout.content, app);

    // Always draw message panel area (shows content only when there's a message)
    widgets::draw_message_panel(frame, layout.message, app);

    widgets::draw_status_bar(frame, layout.status, app);

    // Overlays render on top of everything
    if let Some(wizard) = &app.wizard {
        widgets::draw_wizard(frame, layout.content, app, wizard);
    }

    if app.show_help {
        widgets::draw_help(frame, layout.content, &app.theme);
    }

    if let Some(confirm) = &app.confirm_action {
        widgets::draw_confirm_dialog(frame, layout.content, confirm, &app.theme);
    }
}
