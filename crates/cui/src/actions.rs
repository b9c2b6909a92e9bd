use crate::app::{App, FocusPane};
use crate::input::InputAction;
use oracle_core::{PlayerSlot, SelectionTarget};

pub fn dispatch(app: &mut App, action: InputAction) {
    match action {
        InputAction::None => {}
        InputAction::Quit => app.should_quit = true,
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::CloseHelp => app.show_help = false,
        InputAction::NextFocus => app.cycle_focus(true),
        InputAction::PrevFocus => app.cycle_focus(false),
        InputAction::MoveUp => app.move_cursor(false),
        InputAction::MoveDown => app.move_cursor(true),
        InputAction::Activate => app.activate_primary(),
        InputAction::PickDealer => {
            app.focus = FocusPane::Dealer;
            app.open_picker(SelectionTarget::Dealer);
        }
        InputAction::PickHit => {
            app.focus = FocusPane::Player;
            app.open_picker(SelectionTarget::Player(PlayerSlot::Append));
        }
        InputAction::RemoveCard => app.remove_selected(),
        InputAction::ClearPlayer => app.clear_player_hand(),
        InputAction::ResetTable => app.reset_table(),
        InputAction::AskOracle => app.ask(),
    }
}
