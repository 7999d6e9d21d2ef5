mod confirm;
mod header;
mod help;
mod message_panel;
mod rockon_list;
mod status_bar;
pub mod summary;
mod wizard;

pub use confirm::draw_confirm_dialog;
pub use header::draw_header;
pub use help::draw_help;
pub use message_panel::draw_message_panel;
pub use rockon_list::{draw_rockon_list, draw_tabs, link_hint};
pub use status_bar::draw_status_bar;
pub use wizard::draw_wizard;

use crate::ui::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Block;

pub fn draw_background(frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default().style(theme.style());
    frame.render_widget(block, area);
}
