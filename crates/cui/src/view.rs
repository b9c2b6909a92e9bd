use crate::app::{App, FocusPane, ASK_HINT, PICKER_COLUMNS};
use oracle_core::{
    picker_grid, AdviceAction, AdviceSession, CardFace, PlayerSlot, SelectionTarget,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Span, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

const CONFIDENCE_BAR_WIDTH: usize = 20;

pub fn draw(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(8),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(root[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(6)])
        .split(middle[0]);

    draw_dealer(frame, left[0], app);
    draw_player(frame, left[1], app);
    draw_advice(frame, middle[1], app);
    draw_events(frame, root[2], app);

    if app.picker_open() {
        draw_picker(frame, app);
    }
    if app.show_help {
        draw_help_popup(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        "Blackjack Oracle | Focus: {} | Hint: {}",
        app.focus_label(app.focus),
        app.next_hint()
    );
    let lines = vec![
        Line::from(title.bold()),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    let block = Block::default().borders(Borders::ALL).title("Table");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_dealer(frame: &mut Frame, area: Rect, app: &App) {
    let line = match app.table.hand().dealer() {
        Some(card) => Line::from(card_span(card.face())),
        None => Line::from("[ Select ]".dark_gray()),
    };
    let block = pane_block("Dealer's Upcard", app.focus == FocusPane::Dealer);
    frame.render_widget(
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn draw_player(frame: &mut Frame, area: Rect, app: &App) {
    let hand = app.table.hand();
    let mut items: Vec<ListItem<'_>> = hand
        .player()
        .iter()
        .enumerate()
        .map(|(idx, card)| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{idx}: ")),
                card_span(card.face()),
            ]))
        })
        .collect();
    if let Some(label) = hand.append_label() {
        items.push(ListItem::new(Line::from(
            format!("+  [ {label} ]").dark_gray(),
        )));
    }
    let title = if hand.player().len() >= 2 {
        "Your Hand (c: Clear Player Hand)"
    } else {
        "Your Hand"
    };
    let block = pane_block(title, app.focus == FocusPane::Player);
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    if app.focus == FocusPane::Player && app.player_slots() > 0 {
        state.select(Some(app.player_cursor.min(app.player_slots() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_advice(frame: &mut Frame, area: Rect, app: &App) {
    let lines = match app.table.session() {
        AdviceSession::Idle if app.table.can_ask() => vec![
            Line::from(""),
            Line::from("Ask the Oracle (o)".bold().yellow()),
        ],
        AdviceSession::Idle => vec![Line::from(""), Line::from(ASK_HINT.dark_gray())],
        AdviceSession::Loading { .. } => vec![
            Line::from(""),
            Line::from("Consulting the Oracle...".yellow()),
        ],
        AdviceSession::Failed => vec![
            Line::from(""),
            Line::from("Failed to get advice. Check the advisor command.".red()),
            Line::from("press o to retry"),
        ],
        AdviceSession::Resolved(result) => {
            let color = action_color(result.action());
            vec![
                Line::from("Recommended Action".dark_gray()),
                Line::from(Span::styled(
                    format!(" {} ", result.action()),
                    Style::default()
                        .fg(Color::White)
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("Confidence Score".bold()),
                Line::from(vec![
                    Span::styled(
                        confidence_bar(result.confidence(), CONFIDENCE_BAR_WIDTH),
                        Style::default().fg(Color::Green),
                    ),
                    Span::raw(format!(" {}%", result.confidence())),
                ]),
                Line::from(""),
                Line::from("AI Reasoning".bold()),
                Line::from(result.explanation().to_string()),
                Line::from(""),
                Line::from("Enter: Clear Hands & Start Over".dark_gray()),
            ]
        }
    };
    let block = pane_block("Oracle", app.focus == FocusPane::Advice);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let start = app.event_log.len().saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .event_log
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect();
    let block = pane_block("Events", app.focus == FocusPane::Events);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_picker(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 80, frame.area());
    frame.render_widget(Clear, area);
    let cells: Vec<CardFace> = picker_grid().collect();
    let mut lines = Vec::new();
    for (row_idx, row) in cells.chunks(PICKER_COLUMNS).enumerate() {
        let mut spans = Vec::new();
        for (col_idx, face) in row.iter().enumerate() {
            let index = row_idx * PICKER_COLUMNS + col_idx;
            let mut style = card_style(*face);
            if index == app.picker_cursor {
                style = style.bg(Color::Yellow).add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(format!(" {:>3} ", face.to_string()), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(
        "arrows/hjkl move | enter choose | esc close".dark_gray(),
    ));
    let title = match app.table.selection().target() {
        Some(SelectionTarget::Dealer) => "Select a Card: dealer".to_string(),
        Some(SelectionTarget::Player(PlayerSlot::Replace(index))) => {
            format!("Select a Card: replace player card {index}")
        }
        Some(SelectionTarget::Player(PlayerSlot::Append)) | None => {
            "Select a Card: add to your hand".to_string()
        }
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn draw_help_popup(frame: &mut Frame) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("q quit | ? help | tab focus | arrows/jk move"),
        Line::from("enter pick for focused slot (Oracle pane: ask / start over)"),
        Line::from("d pick dealer upcard | h/a add player card"),
        Line::from("x remove card under cursor | c clear player hand"),
        Line::from("o/space ask the oracle | r reset table"),
        Line::from("picker: arrows/hjkl move, enter choose, esc close"),
    ];
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn card_style(face: CardFace) -> Style {
    if face.suit.is_red() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    }
}

fn card_span(face: CardFace) -> Span<'static> {
    Span::styled(
        format!("[ {face} ]"),
        card_style(face).add_modifier(Modifier::BOLD),
    )
}

fn action_color(action: AdviceAction) -> Color {
    match action {
        AdviceAction::Hit => Color::Green,
        AdviceAction::Stand => Color::Red,
        AdviceAction::Double => Color::Blue,
        AdviceAction::Split => Color::Magenta,
        AdviceAction::Surrender => Color::Yellow,
    }
}

fn confidence_bar(confidence: u8, width: usize) -> String {
    let filled = (usize::from(confidence.min(100)) * width + 50) / 100;
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    block
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
