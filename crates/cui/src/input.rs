use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    CloseHelp,
    NextFocus,
    PrevFocus,
    MoveUp,
    MoveDown,
    Activate,
    PickDealer,
    PickHit,
    RemoveCard,
    ClearPlayer,
    ResetTable,
    AskOracle,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc => InputAction::CloseHelp,
        KeyCode::Tab => InputAction::NextFocus,
        KeyCode::BackTab => InputAction::PrevFocus,
        KeyCode::Up | KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Enter => InputAction::Activate,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Char('d') => InputAction::PickDealer,
        KeyCode::Char('h') | KeyCode::Char('a') => InputAction::PickHit,
        KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => InputAction::RemoveCard,
        KeyCode::Char('c') => InputAction::ClearPlayer,
        KeyCode::Char('r') => InputAction::ResetTable,
        KeyCode::Char('o') | KeyCode::Char(' ') => InputAction::AskOracle,
        _ => InputAction::None,
    }
}
