use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Screen regions of the manager view
pub struct Layout {
    pub full: Rect,
    pub header: Rect,
    pub tabs: Rect,
    pub content: Rect,
    pub message: Rect,
    pub status: Rect,
}

impl Layout {
    pub fn new(area: Rect) -> Self {
        // Message panel space is always reserved so the list never jumps
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(1), // Tabs
                Constraint::Min(6),    // Add-on list or wizard
                Constraint::Length(3), // Message panel
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        Self {
            full: area,
            header: chunks[0],
            tabs: chunks[1],
            content: chunks[2],
            message: chunks[3],
            status: chunks[4],
        }
    }

    pub fn centered_box(area: Rect, width: u16, height: u16) -> Rect {
        let horizontal = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(width.min(area.width)),
                Constraint::Fill(1),
            ])
            .split(area);

        let vertical = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(height.min(area.height)),
                Constraint::Fill(1),
            ])
            .split(horizontal[1]);

        vertical[1]
    }

    /// Wizard overlay: most of the content area, bounded for wide terminals
    pub fn overlay(area: Rect) -> Rect {
        let width = (area.width.saturating_sub(4)).min(90);
        let height = area.height.saturating_sub(2);
        Self::centered_box(area, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_box_fits_inside_small_areas() {
        let area = Rect::new(0, 0, 30, 8);
        let inner = Layout::centered_box(area, 40, 12);
        assert!(inner.width <= area.width);
        assert!(inner.height <= area.height);

        let inner = Layout::centered_box(Rect::new(0, 0, 100, 40), 40, 10);
        assert_eq!((inner.x, inner.y, inner.width, inner.height), (30, 15, 40, 10));
    }
}
