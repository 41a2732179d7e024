mod layout;
mod widgets;

pub use layout::render;
pub use widgets::{
    render_detail_overlay,
    render_favorites_list,
    render_header,
    render_help_screen,
    render_search_panel,
    render_status_bar,
    render_tabs,
};
