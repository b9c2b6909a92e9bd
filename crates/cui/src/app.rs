use crate::advisor::ProcessAdvisor;
use crate::logger::{self, LogBuffer};
use crate::script::ScriptCommand;
use crossterm::event::{KeyCode, KeyEvent};
use oracle_core::{
    picker_grid, AdviceSession, Card, CardFace, Event, PlayerSlot, SelectionTarget, Table,
    PICKER_CELLS,
};
use std::collections::VecDeque;

const MAX_EVENT_LOG: usize = 200;
pub const PICKER_COLUMNS: usize = 4;
pub const ASK_HINT: &str = "Select Dealer's card and at least 2 Player cards.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Dealer,
    Player,
    Advice,
    Events,
}

pub struct App {
    pub table: Table,
    pub advisor: ProcessAdvisor,
    pub focus: FocusPane,
    pub player_cursor: usize,
    pub picker_cursor: usize,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub show_help: bool,
    pub should_quit: bool,
    log_buffer: Option<LogBuffer>,
}

impl App {
    pub fn new(advisor: ProcessAdvisor, log_buffer: Option<LogBuffer>) -> Self {
        let mut app = Self {
            table: Table::new(),
            advisor,
            focus: FocusPane::Dealer,
            player_cursor: 0,
            picker_cursor: 0,
            event_log: VecDeque::new(),
            status_line: "ready".to_string(),
            show_help: false,
            should_quit: false,
            log_buffer,
        };
        let advisor_line = match app.advisor.command() {
            Some(command) => format!("advisor: {}", command.describe()),
            None => "advisor: none configured".to_string(),
        };
        app.push_event_line(advisor_line);
        app
    }

    /// Applies finished advisor calls and pulls in buffered log lines.
    pub fn on_tick(&mut self) {
        for completion in self.advisor.try_completions() {
            self.table
                .complete_advice(completion.token, completion.outcome);
        }
        if let Some(buffer) = self.log_buffer.as_ref() {
            for line in logger::drain(buffer) {
                push_bounded(&mut self.event_log, line);
            }
        }
        self.flush_events();
    }

    pub fn picker_open(&self) -> bool {
        self.table.selection().is_open()
    }

    pub fn focus_label(&self, pane: FocusPane) -> &'static str {
        match pane {
            FocusPane::Dealer => "Dealer",
            FocusPane::Player => "Player",
            FocusPane::Advice => "Oracle",
            FocusPane::Events => "Events",
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        self.focus = match (self.focus, forward) {
            (FocusPane::Dealer, true) => FocusPane::Player,
            (FocusPane::Player, true) => FocusPane::Advice,
            (FocusPane::Advice, true) => FocusPane::Events,
            (FocusPane::Events, true) => FocusPane::Dealer,
            (FocusPane::Dealer, false) => FocusPane::Events,
            (FocusPane::Player, false) => FocusPane::Dealer,
            (FocusPane::Advice, false) => FocusPane::Player,
            (FocusPane::Events, false) => FocusPane::Advice,
        };
    }

    /// Player card slots plus the append placeholder while the hand has room.
    pub fn player_slots(&self) -> usize {
        let hand = self.table.hand();
        hand.player().len() + usize::from(hand.append_label().is_some())
    }

    pub fn move_cursor(&mut self, down: bool) {
        if self.focus == FocusPane::Player {
            let len = self.player_slots();
            move_index(&mut self.player_cursor, len, down);
        }
    }

    pub fn next_hint(&self) -> &'static str {
        match self.table.session() {
            AdviceSession::Loading { .. } => "waiting for the oracle",
            AdviceSession::Resolved(_) => "enter on Oracle to start over",
            AdviceSession::Failed => "press o to retry",
            AdviceSession::Idle if self.table.can_ask() => "press o to ask the oracle",
            AdviceSession::Idle if self.table.hand().dealer().is_none() => "pick the dealer upcard",
            AdviceSession::Idle => "pick your cards",
        }
    }

    pub fn activate_primary(&mut self) {
        match self.focus {
            FocusPane::Dealer => self.open_picker(SelectionTarget::Dealer),
            FocusPane::Player => {
                let len = self.table.hand().player().len();
                let slot = if self.player_cursor < len {
                    PlayerSlot::Replace(self.player_cursor)
                } else {
                    PlayerSlot::Append
                };
                self.open_picker(SelectionTarget::Player(slot));
            }
            FocusPane::Advice => {
                if matches!(self.table.session(), AdviceSession::Resolved(_)) {
                    self.reset_table();
                } else {
                    self.ask();
                }
            }
            FocusPane::Events => {}
        }
    }

    pub fn open_picker(&mut self, target: SelectionTarget) {
        self.table.open_picker(target);
        self.flush_events();
    }

    pub fn handle_picker_key(&mut self, key: KeyEvent) -> bool {
        if !self.picker_open() {
            return false;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.dismiss_picker(),
            KeyCode::Enter | KeyCode::Char(' ') => self.choose_picker_cell(),
            KeyCode::Left | KeyCode::Char('h') => self.move_picker(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_picker(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_picker(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_picker(0, 1),
            _ => {}
        }
        true
    }

    pub fn move_picker(&mut self, dx: isize, dy: isize) {
        let columns = PICKER_COLUMNS as isize;
        let cells = PICKER_CELLS as isize;
        let current = self.picker_cursor as isize;
        let next = current + dx + dy * columns;
        self.picker_cursor = next.rem_euclid(cells) as usize;
    }

    pub fn picker_face(&self) -> Option<CardFace> {
        picker_grid().nth(self.picker_cursor)
    }

    pub fn choose_picker_cell(&mut self) {
        let Some(face) = self.picker_face() else {
            return;
        };
        self.choose_face(face);
    }

    pub fn choose_face(&mut self, face: CardFace) {
        let revision = self.table.hand().revision();
        let committed = self.table.choose_face(face);
        let changed = self.table.hand().revision() != revision;
        match committed {
            None => self.push_status("no slot selected"),
            Some(_) if !changed => self.push_status(format!("hand is full, {face} not added")),
            Some(target) => self.push_status(format!("{face} -> {}", format_target(target))),
        }
        self.flush_events();
        self.normalize_cursors();
    }

    pub fn dismiss_picker(&mut self) {
        self.table.dismiss_picker();
        self.flush_events();
    }

    pub fn remove_selected(&mut self) {
        if self.focus != FocusPane::Player {
            return;
        }
        if self.player_cursor >= self.table.hand().player().len() {
            self.push_status("no card under cursor");
            return;
        }
        self.table.remove_player_card(self.player_cursor);
        self.flush_events();
        self.normalize_cursors();
    }

    pub fn clear_player_hand(&mut self) {
        self.table.clear_player_hand();
        self.flush_events();
        self.normalize_cursors();
    }

    pub fn reset_table(&mut self) {
        self.table.reset_table();
        self.focus = FocusPane::Dealer;
        self.push_status("table reset");
        self.flush_events();
        self.normalize_cursors();
    }

    pub fn ask(&mut self) {
        if self.table.session().is_loading() {
            self.push_status("the oracle is still thinking");
            return;
        }
        if !self.table.can_ask() {
            self.push_status(ASK_HINT);
            return;
        }
        if self.table.request_advice(&mut self.advisor).is_some() {
            self.push_status("consulting the oracle...");
        }
        self.flush_events();
    }

    pub fn apply_script(&mut self, commands: &[ScriptCommand]) {
        for command in commands {
            self.apply_command(*command);
        }
        self.push_event_line(format!("script applied: {} steps", commands.len()));
    }

    fn apply_command(&mut self, command: ScriptCommand) {
        match command {
            ScriptCommand::OpenDealer => self.open_picker(SelectionTarget::Dealer),
            ScriptCommand::OpenPlayer(index) => {
                self.open_picker(SelectionTarget::Player(PlayerSlot::Replace(index)))
            }
            ScriptCommand::OpenAppend => {
                self.open_picker(SelectionTarget::Player(PlayerSlot::Append))
            }
            ScriptCommand::Choose(face) => self.choose_face(face),
            ScriptCommand::Dismiss => self.dismiss_picker(),
            ScriptCommand::Remove(index) => {
                self.table.remove_player_card(index);
                self.flush_events();
                self.normalize_cursors();
            }
            ScriptCommand::ClearPlayer => self.clear_player_hand(),
            ScriptCommand::Reset => self.reset_table(),
            ScriptCommand::Ask => self.ask(),
        }
    }

    pub fn normalize_cursors(&mut self) {
        let len = self.player_slots();
        if len == 0 {
            self.player_cursor = 0;
        } else if self.player_cursor >= len {
            self.player_cursor = len - 1;
        }
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    fn flush_events(&mut self) {
        let events: Vec<Event> = self.table.drain_events().collect();
        for event in events {
            match &event {
                Event::AdviceResolved { action, .. } => {
                    self.focus = FocusPane::Advice;
                    self.push_status(format!("the oracle says {action}"));
                }
                Event::AdviceFailed { .. } => {
                    self.focus = FocusPane::Advice;
                    self.push_status("Failed to get advice. Check the advisor command.");
                }
                _ => {}
            }
            self.push_event_line(format_event(&event));
        }
    }

    fn push_event_line(&mut self, line: String) {
        push_bounded(&mut self.event_log, line);
    }
}

fn push_bounded(log: &mut VecDeque<String>, line: String) {
    log.push_back(line);
    while log.len() > MAX_EVENT_LOG {
        log.pop_front();
    }
}

fn move_index(value: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *value = 0;
        return;
    }
    if down {
        *value = (*value + 1).min(len - 1);
    } else {
        *value = value.saturating_sub(1);
    }
}

fn format_target(target: SelectionTarget) -> String {
    match target {
        SelectionTarget::Dealer => "dealer".to_string(),
        SelectionTarget::Player(PlayerSlot::Append) => "new player card".to_string(),
        SelectionTarget::Player(PlayerSlot::Replace(index)) => format!("player card {index}"),
    }
}

fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_event(event: &Event) -> String {
    match event {
        Event::DealerSet { card, previous } => match previous {
            Some(previous) => format!("dealer {previous} -> {card}"),
            None => format!("dealer shows {card}"),
        },
        Event::PlayerCardAdded { index, card } => format!("player card {index}: {card}"),
        Event::PlayerCardReplaced {
            index,
            previous,
            card,
        } => format!("player card {index}: {previous} -> {card}"),
        Event::PlayerCardRemoved { index, card } => format!("player card {index} removed ({card})"),
        Event::PlayerHandCleared { count } => format!("player hand cleared ({count} cards)"),
        Event::TableReset => "table reset".to_string(),
        Event::PickerOpened { target } => format!("picking {}", format_target(*target)),
        Event::PickerDismissed => "picker dismissed".to_string(),
        Event::AdviceRequested {
            token,
            dealer,
            player,
        } => format!("{token} asked: {} vs {dealer}", format_cards(player)),
        Event::AdviceResolved {
            token,
            action,
            confidence,
        } => format!("{token} resolved: {action} ({confidence}%)"),
        Event::AdviceFailed { token, reason } => format!("{token} failed: {reason}"),
        Event::AdviceInvalidated => "hand changed, advice cleared".to_string(),
        Event::StaleAdviceDiscarded { token } => format!("{token} arrived late, ignored"),
    }
}
