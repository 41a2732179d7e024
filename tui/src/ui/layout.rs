use crate::app::{App, Tab};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use super::{
    render_detail_overlay, render_favorites_list, render_header, render_help_screen,
    render_search_panel, render_status_bar, render_tabs,
};

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.size();

    // header, tabs, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    match app.active_tab {
        Tab::Search => render_search_panel(frame, app, chunks[2]),
        Tab::Favorites => render_favorites_list(frame, app, chunks[2]),
    }
    render_status_bar(frame, app, chunks[3]);

    // Overlays (drawn last)
    if app.is_detail_open() {
        render_detail_overlay(frame, app, size);
    }
    if app.help_open {
        render_help_screen(frame, app, size);
    }
}
