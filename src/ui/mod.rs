pub mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, Focus, Popup};
use crate::chips::Highlight;
use crate::theme::Theme;
use components::{candidate_offset, chip_slots, inner, input_offset, regions, Regions};
use unicode_width::UnicodeWidthStr;

// Set once from config at startup, defaults otherwise
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::warn!("Theme already initialized");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn chip_bg() -> Color { theme().chip_bg }
fn bg_selected() -> Color { theme().bg_selected }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }

fn box_block<'a>(title: impl Into<std::borrow::Cow<'a, str>>, is_active: bool) -> Block<'a> {
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(header())
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

pub fn draw(f: &mut Frame, app: &App) {
    let regions = regions(f.area(), app.chips.chips());

    draw_status_line(f, app, regions.status);
    draw_chips_box(f, app, regions.chips);
    draw_input(f, app, &regions);
    draw_candidates(f, app, regions.candidates);
    draw_footer(f, app, regions.footer);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let line = match app.status_message {
        Some(ref status) => Line::from(Span::styled(status, Style::default().fg(accent()))),
        None => Line::from(Span::styled(
            format!("{} chips │ {} candidates", app.chips.chips().len(), app.chips.pool().len()),
            Style::default().fg(text_dim()),
        )),
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_chips_box(f: &mut Frame, app: &App, area: Rect) {
    let inner_area = inner(area);
    let slots = chip_slots(inner_area, app.chips.chips());

    // Older rows scroll off the top
    let hidden = app.chips.chips().len() - slots.len();
    let title = if hidden > 0 {
        format!(" Chips (+{} more) ", hidden)
    } else {
        " Chips ".to_string()
    };
    f.render_widget(box_block(title, false), area);

    if app.chips.chips().is_empty() {
        let hint = Paragraph::new(Span::styled("No chips yet", Style::default().fg(text_dim())));
        f.render_widget(hint, inner_area);
        return;
    }

    let armed = match app.chips.highlight() {
        Highlight::Armed(id) => Some(id),
        Highlight::Idle => None,
    };

    for (slot, chip) in slots.iter().zip(&app.chips.chips()[hidden..]) {
        let badge_style = if armed == Some(chip.id) {
            Style::default().bg(danger()).fg(chip_bg()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(chip_bg()).fg(text())
        };

        f.render_widget(Paragraph::new("").style(badge_style), slot.area);

        let label_area = Rect {
            x: slot.area.x + 1,
            width: slot.area.width.saturating_sub(4),
            ..slot.area
        };
        f.render_widget(Paragraph::new(chip.label.as_str()).style(badge_style), label_area);

        let remove_style = if armed == Some(chip.id) {
            badge_style
        } else {
            badge_style.fg(danger())
        };
        f.render_widget(Paragraph::new("x").style(remove_style), slot.remove);
    }
}

fn draw_input(f: &mut Frame, app: &App, regions: &Regions) {
    let is_active = app.focus == Focus::Input && app.popup == Popup::None;
    let block = box_block(" Input ", is_active);

    let content = if app.chips.input().is_empty() {
        Span::styled(app.placeholder.as_str(), Style::default().fg(text_dim()))
    } else {
        Span::styled(app.chips.input(), Style::default().fg(text()))
    };

    let field = inner(regions.input);
    let offset = input_offset(app.chips.input(), field.width);
    f.render_widget(Paragraph::new(content).scroll((0, offset)).block(block), regions.input);

    if is_active {
        let typed = u16::try_from(app.chips.input().width()).unwrap_or(u16::MAX);
        let x = field.x.saturating_add(typed - offset).min(field.right().saturating_sub(1));
        f.set_cursor_position((x, field.y));
    }
}

fn draw_candidates(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::Candidates && app.popup == Popup::None;
    let block = box_block(" Candidates ", is_active);

    let visible = app.chips.visible_candidates();
    let rows: Vec<Row> = if visible.is_empty() {
        let msg = if app.chips.input().trim().is_empty() {
            "  No candidates left"
        } else {
            "  No match, Enter adds it as a chip"
        };
        vec![Row::new(vec![Span::styled(msg, Style::default().fg(text_dim()))])]
    } else {
        let offset = candidate_offset(app.selected_candidate, inner(area).height);
        visible
            .iter()
            .enumerate()
            .skip(offset)
            .map(|(i, label)| {
                let row_style = if i == app.selected_candidate && is_active {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default().fg(text())
                };
                Row::new(vec![Span::raw(*label)]).style(row_style)
            })
            .collect()
    };

    let table = Table::new(rows, [Constraint::Percentage(100)]).block(block);
    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.focus {
        Focus::Input => vec![
            ("F1", "Help"),
            ("Enter", "Add"),
            ("⌫⌫", "Remove last"),
            ("↓", "Candidates"),
            ("Esc", "Clear/Quit"),
        ],
        Focus::Candidates => vec![
            ("F1", "Help"),
            ("↑↓", "Nav"),
            ("Enter", "Add"),
            ("Tab", "Input"),
        ],
    };

    // Only whole hints that fit the width
    let mut used = 0usize;
    let hint_spans: Vec<Span> = hints
        .iter()
        .map(|(key, action)| (*key, format!(" {} │ ", action)))
        .take_while(|(key, action)| {
            used += key.width() + action.width();
            used <= usize::from(area.width)
        })
        .flat_map(|(key, action)| {
            vec![
                Span::styled(key, Style::default().fg(accent())),
                Span::styled(action, Style::default().fg(text_dim())),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center), area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 90 } else { 60 }, 70, area);

    f.render_widget(Clear, popup_area);

    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(accent())),
            Span::raw(what),
        ])
    };
    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        section("═══ Input ═══"),
        key("Enter", "Turn the typed text into a chip"),
        key("Backspace", "Delete a character; on empty input, mark the last chip"),
        key("", "then press again to remove it"),
        key("↓ / Tab", "Move into the candidate list"),
        key("Esc", "Clear the input, or quit when it is empty"),
        Line::from(""),
        section("═══ Candidates ═══"),
        key("↑ / ↓", "Move the cursor"),
        key("Enter", "Add the highlighted candidate"),
        key("Tab / Esc", "Back to the input"),
        Line::from(""),
        section("═══ Mouse ═══"),
        key("Click x", "Remove that chip"),
        key("Click row", "Add that candidate"),
        Line::from(""),
        Line::from(Span::styled("  Press any key to close", Style::default().fg(text_dim()))),
    ];

    let help = Paragraph::new(help_text).block(
        Block::default()
            .title(Span::styled(" Help ", Style::default().fg(accent())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent())),
    );

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
