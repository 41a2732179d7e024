use crate::app::{App, InputMode, SearchStatus, Tab};
use flicklist_core::models::{FavoriteEntry, MovieRecord, DEFAULT_POSTER_SIZE};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Render the header with title and key hints
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let key_hints = match app.input_mode {
        InputMode::Searching => " [Enter:Search] [Esc:Cancel] [Type to search] ",
        InputMode::EditingNote => " [Enter:Save] [Alt+Enter:New line] [Esc:Cancel] ",
        InputMode::Normal if app.is_detail_open() => {
            " [f:Favorite] [1-5:Rate] [0:Clear rating] [n:Note] [o:Open page] [Esc:Close] "
        }
        InputMode::Normal => " [q:Quit] [h:Help] [/:Search] [Tab:Switch] [↑/↓:Move] [Enter:Details] [f:Favorite] ",
    };

    let header_spans = vec![
        Span::styled(
            " 🎬 Flicklist ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(key_hints, Style::default().fg(Color::DarkGray)),
    ];

    let header = Paragraph::new(Line::from(header_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

/// Render the Search / Favorites tab bar
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = vec![
        "Search Movies".to_string(),
        format!("My Favorites ({})", app.favorites.len()),
    ];
    let selected = match app.active_tab {
        Tab::Search => 0,
        Tab::Favorites => 1,
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

/// Render the search box and whatever the last search produced
pub fn render_search_panel(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let searching = app.input_mode == InputMode::Searching;
    let border_style = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(Text::from(format!("/ {}", app.search_query))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Search "),
    );
    frame.render_widget(input, chunks[0]);

    if searching {
        let cursor_x = chunks[0].x + 3 + app.search_query.width() as u16;
        frame.set_cursor(
            cursor_x.min(chunks[0].right().saturating_sub(2)),
            chunks[0].y + 1,
        );
    }

    let block = Block::default().borders(Borders::ALL).title(" Results ");
    let message = match &app.search_status {
        SearchStatus::Idle => Some(("Search for movies to get started!".to_string(), Style::default().fg(Color::DarkGray))),
        SearchStatus::Loading => Some(("Searching...".to_string(), Style::default().fg(Color::Yellow))),
        SearchStatus::NoResults => Some((
            "No movies found. Try a different search term.".to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        SearchStatus::Failed(msg) => Some((msg.clone(), Style::default().fg(Color::Red))),
        SearchStatus::Misconfigured(msg) => Some((
            format!("{} (set TMDB_API_KEY)", msg),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        SearchStatus::Results => None,
    };

    if let Some((text, style)) = message {
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .style(style)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[1]);
        return;
    }

    let inner_width = chunks[1].width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .search_results
        .iter()
        .map(|movie| ListItem::new(movie_line(movie, app.favorites.is_favorite(movie.id), inner_width)))
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.results_selected_index));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

/// One row of a movie list: favorite badge, title, year
fn movie_line(movie: &MovieRecord, is_favorite: bool, max_width: usize) -> Line<'static> {
    let badge = if is_favorite { "★ " } else { "  " };
    let year = format!(" ({})", movie.year_label());
    let title_width = max_width.saturating_sub(badge.width() + year.width());

    Line::from(vec![
        Span::styled(badge, Style::default().fg(Color::Yellow)),
        Span::styled(
            truncate_to_width(&movie.title, title_width),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(year, Style::default().fg(Color::DarkGray)),
    ])
}

/// Render the favorites list with ratings and note previews
pub fn render_favorites_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" My Favorites ");

    if app.favorites.is_empty() {
        let empty_message = Paragraph::new("No favorites yet. Search for movies and add them to your favorites!")
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty_message, area);
        return;
    }

    let inner_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .favorites
        .favorites()
        .iter()
        .map(|favorite| ListItem::new(favorite_lines(favorite, inner_width)))
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.favorites_selected_index));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(list, area, &mut state);
}

fn favorite_lines(favorite: &FavoriteEntry, max_width: usize) -> Vec<Line<'static>> {
    let mut first = movie_line(&favorite.movie, true, max_width.saturating_sub(6));
    if let Some(rating) = favorite.user_rating {
        first.spans.push(Span::styled(format!(" {}", rating), Style::default().fg(Color::Yellow)));
    }

    let mut lines = vec![first];
    if let Some(note) = favorite.user_note.as_deref().filter(|n| !n.trim().is_empty()) {
        let preview = note.lines().next().unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("    {}", truncate_to_width(preview, max_width.saturating_sub(4))),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

/// Render the status bar
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_text = match &app.status_message {
        Some(message) => format!(" {} ", message),
        None => match &app.last_query {
            Some(query) => format!(
                " {} favorites | {} results for \"{}\" ",
                app.favorites.len(),
                app.search_results.len(),
                query
            ),
            None => format!(" {} favorites ", app.favorites.len()),
        },
    };

    let status_bar = Paragraph::new(status_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .alignment(Alignment::Center);

    frame.render_widget(status_bar, area);
}

/// Render the movie detail overlay (centered modal)
pub fn render_detail_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let Some(movie) = app.selected_movie.as_ref() else {
        return;
    };
    let favorite = app.selected_favorite();
    let popup = popup_area(area, 70, 80);

    let label = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(
            movie.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "{} • {} • ⭐ {:.1}",
            movie.year_label(),
            if app.is_detail_loading() { "...".to_string() } else { movie.runtime_label() },
            movie.vote_average
        )),
        Line::from(""),
        Line::from(movie.overview_or_placeholder().to_string()),
        Line::from(""),
    ];

    if let Some(poster) = movie.poster_url(DEFAULT_POSTER_SIZE) {
        lines.push(Line::from(Span::styled(poster, Style::default().fg(Color::DarkGray))));
        lines.push(Line::from(""));
    }

    let button = if favorite.is_some() {
        Span::styled("★ Remove from Favorites", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("☆ Add to Favorites", Style::default().fg(Color::White))
    };
    lines.push(Line::from(vec![button, Span::styled("  [f]", Style::default().fg(Color::DarkGray))]));

    if let Some(favorite) = favorite {
        lines.push(Line::from(""));
        let stars = favorite
            .user_rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "☆☆☆☆☆".to_string());
        lines.push(Line::from(vec![
            Span::styled("Your Rating: ", label),
            Span::styled(stars, Style::default().fg(Color::Yellow)),
            Span::styled("  [1-5, 0 clears]", Style::default().fg(Color::DarkGray)),
        ]));

        lines.push(Line::from(Span::styled("Your Notes:", label)));
        if app.input_mode == InputMode::EditingNote {
            for (i, text) in app.note_buffer.split('\n').enumerate() {
                let last = i == app.note_buffer.matches('\n').count();
                let cursor = if last { "▏" } else { "" };
                lines.push(Line::from(Span::styled(
                    format!("{}{}", text, cursor),
                    Style::default().fg(Color::White).bg(Color::Black),
                )));
            }
        } else {
            match favorite.user_note.as_deref() {
                Some(note) if !note.is_empty() => {
                    lines.extend(note.lines().map(|l| Line::from(l.to_string())));
                }
                _ => lines.push(Line::from(Span::styled(
                    "Add your thoughts about this movie... [n]",
                    Style::default().fg(Color::DarkGray),
                ))),
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Details ")
        .title_alignment(Alignment::Center);
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

/// Render the help screen overlay
pub fn render_help_screen(frame: &mut Frame, app: &App, size: Rect) {
    let keymap = &app.config.keymap;
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("Navigation", heading)),
        help_entry(&keymap.search, "Search movies"),
        help_entry(&keymap.switch_tab, "Switch between Search and Favorites"),
        help_entry(&format!("{}/{}", keymap.select_up, keymap.select_down), "Move selection"),
        help_entry(&keymap.open_detail, "Show details"),
        help_entry(&keymap.close, "Close overlay"),
        help_entry(&keymap.quit, "Quit"),
        Line::from(""),
        Line::from(Span::styled("Favorites", heading)),
        help_entry(&keymap.toggle_favorite, "Add / remove favorite"),
        help_entry("1-5", "Rate (in details)"),
        help_entry(&keymap.clear_rating, "Clear rating"),
        help_entry(&keymap.edit_note, "Edit note"),
        help_entry(&keymap.clear_note, "Delete note"),
        help_entry(&keymap.open_in_browser, "Open catalog page in browser"),
        Line::from(""),
        Line::from(Span::styled(
            format!("Press {} or {} to close", keymap.close, keymap.help),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let area = popup_area(size, 60, 70);
    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

fn help_entry(key: &str, text: &str) -> Line<'static> {
    Line::from(format!("{:<12} {}", key, text))
}

/// Centered rectangle taking the given percentages of `area`
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Cut `text` to at most `max_width` display columns, marking the cut
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
