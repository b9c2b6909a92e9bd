use crate::{Card, Event, EventBus};

/// Initial two cards plus one hit.
pub const MAX_PLAYER_CARDS: usize = 3;
pub const MIN_PLAYER_CARDS_FOR_ADVICE: usize = 2;

/// Where a picked player card goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSlot {
    /// Add a new card after the last one, if the hand has room.
    Append,
    /// Overwrite the card at this position.
    Replace(usize),
}

/// Dealer upcard and the single player hand.
///
/// Every change bumps [`HandStore::revision`], which is how the owning table
/// notices that cached advice no longer matches the hand.
#[derive(Debug, Default, Clone)]
pub struct HandStore {
    dealer: Option<Card>,
    player: Vec<Card>,
    revision: u64,
}

impl HandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dealer(&self) -> Option<Card> {
        self.dealer
    }

    pub fn player(&self) -> &[Card] {
        &self.player
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_full(&self) -> bool {
        self.player.len() >= MAX_PLAYER_CARDS
    }

    pub fn can_ask(&self) -> bool {
        self.dealer.is_some() && self.player.len() >= MIN_PLAYER_CARDS_FOR_ADVICE
    }

    /// Placeholder text for the next empty player slot, `None` once full.
    pub fn append_label(&self) -> Option<&'static str> {
        match self.player.len() {
            0 => Some("First Card"),
            1 => Some("Second Card"),
            n if n < MAX_PLAYER_CARDS => Some("Hit Card"),
            _ => None,
        }
    }

    pub fn set_dealer(&mut self, card: Card, events: &mut EventBus) {
        let previous = self.dealer.replace(card);
        self.bump();
        events.push(Event::DealerSet { card, previous });
    }

    pub fn place_or_replace_player_card(
        &mut self,
        card: Card,
        slot: PlayerSlot,
        events: &mut EventBus,
    ) {
        if let PlayerSlot::Replace(index) = slot {
            if let Some(existing) = self.player.get_mut(index) {
                let previous = std::mem::replace(existing, card);
                self.bump();
                events.push(Event::PlayerCardReplaced {
                    index,
                    previous,
                    card,
                });
                return;
            }
        }
        if self.is_full() {
            log::debug!("player hand full, dropping {card}");
            return;
        }
        self.player.push(card);
        self.bump();
        events.push(Event::PlayerCardAdded {
            index: self.player.len() - 1,
            card,
        });
    }

    pub fn remove_player_card(&mut self, index: usize, events: &mut EventBus) {
        if index >= self.player.len() {
            return;
        }
        let card = self.player.remove(index);
        self.bump();
        events.push(Event::PlayerCardRemoved { index, card });
    }

    pub fn clear_player_hand(&mut self, events: &mut EventBus) {
        if self.player.is_empty() {
            return;
        }
        let count = self.player.len();
        self.player.clear();
        self.bump();
        events.push(Event::PlayerHandCleared { count });
    }

    pub fn reset(&mut self, events: &mut EventBus) {
        let had_cards = self.dealer.is_some() || !self.player.is_empty();
        self.dealer = None;
        self.player.clear();
        if had_cards {
            self.bump();
        }
        events.push(Event::TableReset);
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}
