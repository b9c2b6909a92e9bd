use crate::{Card, Event, EventBus, HandStore, PlayerSlot};

/// The slot the next picked card is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    Dealer,
    Player(PlayerSlot),
}

/// Tracks which slot the picker is filling. A card only reaches the hand
/// through [`SelectionController::choose_card`].
#[derive(Debug, Default, Clone)]
pub struct SelectionController {
    target: Option<SelectionTarget>,
    open: bool,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn target(&self) -> Option<SelectionTarget> {
        self.target
    }

    /// Opens the picker even when the target cannot accept a card; the hand
    /// store refuses the commit instead.
    pub fn open_picker(&mut self, target: SelectionTarget, events: &mut EventBus) {
        self.target = Some(target);
        self.open = true;
        events.push(Event::PickerOpened { target });
    }

    /// Commits `card` into the active target and closes the picker. Returns
    /// the target the card was committed to.
    pub fn choose_card(
        &mut self,
        card: Card,
        hand: &mut HandStore,
        events: &mut EventBus,
    ) -> Option<SelectionTarget> {
        self.open = false;
        let Some(target) = self.target.take() else {
            log::debug!("picker choice {card} without a target ignored");
            return None;
        };
        match target {
            SelectionTarget::Dealer => hand.set_dealer(card, events),
            SelectionTarget::Player(slot) => hand.place_or_replace_player_card(card, slot, events),
        }
        Some(target)
    }

    pub fn dismiss(&mut self, events: &mut EventBus) {
        let was_open = self.open;
        self.open = false;
        self.target = None;
        if was_open {
            events.push(Event::PickerDismissed);
        }
    }
}
