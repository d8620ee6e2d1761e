use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use scout_terminal::format::{
    ATTRIBUTE_TITLES, attribute_values, format_execution_time, format_measure, format_opt_number,
    format_similarity, graph_image_url,
};
use scout_terminal::radar::{self, RING_COUNT, RadarSeries};
use scout_terminal::search::SearchBox;
use scout_terminal::state::{
    Algorithm, AppState, Category, Player, Screen, SimilarityResult, screen_label,
};

const MAX_OPTIONS_SHOWN: usize = 6;

pub fn draw(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.screen {
        Screen::Home => render_home(frame, chunks[1], state),
        Screen::Communities => render_communities(frame, chunks[1], state),
        Screen::Similar => render_similar(frame, chunks[1], state),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if let Some(message) = state.similar.notification.as_deref() {
        render_notification(frame, frame.size(), message);
    }
}

fn header_text(state: &AppState) -> String {
    let store = match state.store.player_id() {
        Some(id) => format!("Store player: {id}"),
        None => "Store player: -".to_string(),
    };
    let line1 = format!("  (o)  SCOUT | {} | {store}", screen_label(state.screen));
    let line2 = " /|_|\\".to_string();
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.search_box(state.screen).active {
        return "Type to search | ↑/↓ Pick | Enter Select | Esc Done".to_string();
    }
    match state.screen {
        Screen::Home => "1 Search | 2 Communities | 3 Similar | / Search | r Remove | ? Help | q Quit",
        Screen::Communities => {
            "1 Search | 2 Communities | 3 Similar | / Search | ←/→ Move | Space Toggle | r Remove | q Quit"
        }
        Screen::Similar => {
            "1 Search | 2 Communities | 3 Similar | / Search | a/←/→ Algorithm | Enter Find | c Clear | x Export | q Quit"
        }
    }
    .to_string()
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn search_height(search: &SearchBox) -> u16 {
    let shown = if search.active {
        search.options.len().min(MAX_OPTIONS_SHOWN).max(1)
    } else {
        0
    };
    3 + shown as u16
}

fn render_search_box(frame: &mut Frame, area: Rect, search: &SearchBox, title: &str) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let border_style = if search.active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let text = if search.active {
        format!("{}▏", search.query)
    } else if search.query.is_empty() {
        "Find player name (press /)".to_string()
    } else {
        search.query.clone()
    };
    let text_style = if !search.active && search.query.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let input = Paragraph::new(text).style(text_style).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(input, sections[0]);

    if !search.active || sections[1].height == 0 {
        return;
    }

    let lines = if search.loading {
        vec![Line::styled("  searching...", Style::default().fg(Color::DarkGray))]
    } else if search.options.is_empty() {
        let hint = if search.query.trim().is_empty() {
            "  type a name"
        } else if search.is_pending() {
            "  ..."
        } else {
            "  no players found"
        };
        vec![Line::styled(hint, Style::default().fg(Color::DarkGray))]
    } else {
        let start = search
            .highlighted
            .saturating_sub(MAX_OPTIONS_SHOWN.saturating_sub(1));
        search
            .options
            .iter()
            .enumerate()
            .skip(start)
            .take(MAX_OPTIONS_SHOWN)
            .map(|(idx, option)| {
                if idx == search.highlighted {
                    Line::styled(
                        format!("> {} (#{})", option.label, option.id),
                        Style::default().fg(Color::White).bg(Color::DarkGray),
                    )
                } else {
                    Line::raw(format!("  {} (#{})", option.label, option.id))
                }
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines), sections[1]);
}

fn current_player_line(label: &str, action: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("Current player: "),
        Span::styled(label.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled(action.to_string(), Style::default().fg(Color::Red)),
    ])
}

fn render_home(frame: &mut Frame, area: Rect, state: &AppState) {
    let home = &state.home;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(search_height(&home.search)),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    render_search_box(frame, rows[0], &home.search, "Search by player name");

    let Some(selected) = home.selected.as_ref() else {
        return;
    };
    frame.render_widget(
        Paragraph::new(current_player_line(&selected.label, "[r] Remove")),
        rows[1],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(20)])
        .split(rows[2]);

    let error = home.detail_error.as_deref();
    render_player_card(frame, columns[0], home.detail.as_ref(), error);
    render_radar(frame, columns[1], &selected.label, home.detail.as_ref(), error);
}

fn render_player_card(frame: &mut Frame, area: Rect, detail: Option<&Player>, error: Option<&str>) {
    let block = Block::default().title("Player Statistics").borders(Borders::ALL);
    if let (None, Some(error)) = (detail, error) {
        let failed = Paragraph::new(format!("Could not load player: {error}"))
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Red))
            .block(block);
        frame.render_widget(failed, area);
        return;
    }

    let values = detail.map(|player| attribute_values(player, Local::now().date_naive()));
    let lines = ATTRIBUTE_TITLES
        .iter()
        .enumerate()
        .map(|(idx, title)| {
            let value = match values.as_ref() {
                Some(values) => Span::raw(values[idx].clone()),
                None => Span::styled("░░░░░░░░░░", Style::default().fg(Color::DarkGray)),
            };
            Line::from(vec![
                Span::styled(format!("{title:<10}: "), Style::default().add_modifier(Modifier::BOLD)),
                value,
            ])
        })
        .collect::<Vec<_>>();

    let card = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(card, area);
}

fn render_radar(
    frame: &mut Frame,
    area: Rect,
    player_name: &str,
    detail: Option<&Player>,
    error: Option<&str>,
) {
    let block = Block::default()
        .title(format!("Attributes - {player_name}"))
        .borders(Borders::ALL);

    let Some(player) = detail else {
        let (text, color) = match error {
            Some(_) => ("No data", Color::Red),
            None => ("Loading...", Color::DarkGray),
        };
        let loading = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color))
            .block(block);
        frame.render_widget(loading, area);
        return;
    };

    let series = RadarSeries::from_attributes(&player.attributes);
    if series.is_empty() {
        let empty = Paragraph::new("No attributes for this player")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let axes = series.values.len();
    let scale = series.scale();
    let data = radar::polygon_points(&series.values, scale, 1.0);
    let labels = series
        .labels
        .iter()
        .zip(&series.values)
        .enumerate()
        .map(|(i, (label, value))| {
            let (x, y) = radar::axis_point(i, axes, 1.12);
            (x, y, format!("{label} {}", format_opt_number(Some(*value))))
        })
        .collect::<Vec<_>>();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-1.6, 1.6])
        .y_bounds([-1.3, 1.3])
        .paint(move |ctx| {
            for ring in 1..=RING_COUNT {
                for ((x1, y1), (x2, y2)) in radar::outline(&radar::ring_points(axes, ring, 1.0)) {
                    ctx.draw(&CanvasLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: Color::DarkGray,
                    });
                }
            }
            for i in 0..axes {
                let (x2, y2) = radar::axis_point(i, axes, 1.0);
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2,
                    y2,
                    color: Color::DarkGray,
                });
            }
            ctx.layer();
            for ((x1, y1), (x2, y2)) in radar::outline(&data) {
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color: Color::Cyan,
                });
            }
            for (x, y, text) in &labels {
                // Shift left-hand labels so they don't run into the chart.
                let x = if *x < -0.1 { x - 0.04 * text.len() as f64 } else { *x };
                ctx.print(x, *y, Span::styled(text.clone(), Style::default().fg(Color::Yellow)));
            }
        });
    frame.render_widget(canvas, area);
}

fn render_communities(frame: &mut Frame, area: Rect, state: &AppState) {
    let page = &state.communities;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(search_height(&page.search)),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    render_search_box(frame, rows[0], &page.search, "Search by player name");

    let Some(selected) = page.selected.as_ref() else {
        return;
    };
    frame.render_widget(
        Paragraph::new(current_player_line(&selected.label, "[r] Remove")),
        rows[1],
    );

    let lines = Category::ALL
        .iter()
        .enumerate()
        .map(|(idx, category)| {
            let mark = if page.is_checked(*category) { "[x]" } else { "[ ]" };
            let text = format!("{mark} {}", category.label());
            if idx == page.category_cursor {
                Line::styled(
                    format!("> {text}"),
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                )
            } else {
                Line::raw(format!("  {text}"))
            }
        })
        .collect::<Vec<_>>();
    let list = Paragraph::new(lines)
        .block(Block::default().title("Select categories").borders(Borders::ALL));
    frame.render_widget(list, rows[2]);
}

fn render_similar(frame: &mut Frame, area: Rect, state: &AppState) {
    let page = &state.similar;
    let top_height = search_height(&page.search).max(3);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top_height),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    render_search_box(frame, inputs[0], &page.search, "Enter player name");
    render_algorithm_choice(frame, inputs[1], page.algorithm);

    let mut status = if page.loading {
        Line::styled("Finding similar players...", Style::default().fg(Color::Yellow))
    } else {
        Line::styled(
            "[Enter] Find similar players",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )
    };
    if let Some(export) = state.export.as_ref() {
        let text = if export.active {
            format!("   export: {}...", export.message)
        } else {
            format!("   export: {}", export.message)
        };
        status.spans.push(Span::styled(text, Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(status), rows[1]);

    let Some(result) = page.displayed.as_ref() else {
        return;
    };

    let comparison_height = if result.execution_proc.is_empty() { 0 } else { 5 };
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(comparison_height),
        ])
        .split(rows[2]);

    let name_line = Line::from(vec![
        Span::styled("Player: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(result.name.clone()),
        Span::raw("   "),
        Span::styled("[c] Clear result", Style::default().fg(Color::Red)),
    ]);
    frame.render_widget(Paragraph::new(name_line), body[0]);

    render_similar_table(frame, body[1], result, page.table_scroll);

    let graph = Paragraph::new(graph_image_url(result, &state.no_image_url).to_string())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(format!(
                    "Structure Community Graph - {}",
                    page.displayed_algorithm.wire_name()
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(graph, body[2]);

    if comparison_height > 0 {
        render_comparison(frame, body[3], result, page.displayed_algorithm);
    }
}

fn render_algorithm_choice(frame: &mut Frame, area: Rect, current: Algorithm) {
    let spans = Algorithm::ALL
        .iter()
        .flat_map(|alg| {
            let (mark, style) = if *alg == current {
                ("(•) ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            } else {
                ("( ) ", Style::default())
            };
            [Span::styled(format!("{mark}{}", alg.label()), style), Span::raw("  ")]
        })
        .collect::<Vec<_>>();
    let radio = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Choose an algorithm").borders(Borders::ALL));
    frame.render_widget(radio, area);
}

fn render_similar_table(frame: &mut Frame, area: Rect, result: &SimilarityResult, scroll: usize) {
    let block = Block::default().title("Similar players").borders(Borders::ALL);
    if result.similar_players.is_empty() {
        let empty = Paragraph::new("No similar players returned")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Id"),
        Cell::from("Height"),
        Cell::from("Weight"),
        Cell::from("Similarity"),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = result.similar_players.iter().skip(scroll).map(|item| {
        Row::new(vec![
            Cell::from(item.name.clone()),
            Cell::from(item.id.to_string()),
            Cell::from(format_measure(item.height, "cm")),
            Cell::from(format_measure(item.weight, "kg")),
            Cell::from(format_similarity(item.similarity)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .column_spacing(1)
    .block(block);
    frame.render_widget(table, area);
}

fn render_comparison(frame: &mut Frame, area: Rect, result: &SimilarityResult, algorithm: Algorithm) {
    let mut header_cells = vec![Cell::from("Algorithm")];
    let mut value_cells = vec![Cell::from(algorithm.wire_name())];
    for proc in &result.execution_proc {
        header_cells.push(Cell::from(proc.execution_name.clone()));
        value_cells.push(Cell::from(format_execution_time(proc.execution_time)));
    }
    let widths = std::iter::once(Constraint::Length(14))
        .chain(result.execution_proc.iter().map(|_| Constraint::Length(16)))
        .collect::<Vec<_>>();

    let table = Table::new(vec![Row::new(value_cells)], widths)
        .header(Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD)))
        .column_spacing(1)
        .block(Block::default().title("Graph Comparison").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_notification(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(40, 25, area);
    frame.render_widget(Clear, popup);
    let text = vec![
        Line::raw(""),
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::styled("[Enter] Close", Style::default().fg(Color::DarkGray)),
    ];
    let modal = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .title("Notification")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(modal, popup);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Scout Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Search / Communities / Similar",
        "  / or s       Focus the player search",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Search box:",
        "  ↑/↓          Pick a candidate",
        "  Enter        Select player",
        "  Esc          Leave the search box",
        "",
        "Similar players:",
        "  a / ←/→      Choose algorithm",
        "  Enter / f    Find similar players",
        "  c            Clear result",
        "  x            Export results to xlsx",
        "  j/k          Scroll table",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
